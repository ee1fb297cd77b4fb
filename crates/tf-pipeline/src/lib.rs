//! # tf-pipeline
//!
//! The verification-repair pipeline.
//!
//! For one source file the [`driver::Pipeline`] extracts function
//! boundaries through the language profile, asks the fixer oracle for an
//! initial test per function, then drives each candidate through two
//! bounded repair phases — static repair against the profile's verifier,
//! execution repair against its test runner — and assembles the
//! survivors into the final test file.
//!
//! Execution is single-threaded and sequential: one function's repair
//! loop runs to completion before the next begins, and every external
//! invocation is awaited with no timeout or cancellation. The bounded
//! attempt counters are the only limit on total work.
//!
//! ```text
//! ┌────────┐   ┌──────────┐   per function   ┌──────────────┐
//! │ Finder │──>│ Scanner  │─────────────────>│ Repair Loop  │
//! └────────┘   └──────────┘                  │ static  (≤5) │
//!                                            │ execute (≤3) │
//!                                            └──────┬───────┘
//!                                                   │ verdicts
//!                                            ┌──────┴───────┐
//!                                            │   Oracle     │
//!                                            │   Adapters   │
//!                                            └──────────────┘
//! ```

pub mod driver;
pub mod finder;
pub mod profiles;
pub mod repair;
pub mod testing;

pub use driver::{FileReport, Pipeline, PipelineError, RunOutcome, SkipReason, SkippedFunction};
pub use profiles::{profile_for, RustProfile, TypeScriptProfile};
pub use repair::{PhaseContext, PhaseError, PhaseKind, RepairConfig, RepairLoop};
