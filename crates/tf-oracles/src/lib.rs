//! # tf-oracles
//!
//! Oracle adapters: each wraps one external tool as a stateless function
//! of (working directory, target file) → [`tf_core::OracleVerdict`].
//!
//! Two adapter kinds exist per language:
//!
//! | Language   | Static verifier      | Test executor            |
//! |------------|----------------------|--------------------------|
//! | Rust       | `cargo check`        | `cargo test --test …`    |
//! | TypeScript | `npx tsc --noEmit`   | `npx jest … --no-cache`  |
//!
//! A tool exiting non-zero is a normal fail verdict carrying the tool's
//! combined output; only a process that cannot be launched at all (binary
//! missing, spawn failure) surfaces as an adapter error. Invocations are
//! awaited with no explicit timeout; a hanging tool stalls the pipeline.

pub mod cargo;
pub mod process;
pub mod typescript;

pub use cargo::{CargoCheck, CargoTest};
pub use typescript::{JestRunner, TscCheck};
