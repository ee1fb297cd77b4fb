//! # tf-scan
//!
//! Function boundary extraction from raw source text.
//!
//! Two independent scanner variants, selected by the language profile:
//!
//! - [`GrammarScanner`] — for Rust, where a formal-grammar parser (`syn`)
//!   is available in-process. Syntactically invalid source aborts the
//!   whole file.
//! - [`HeuristicScanner`] — for TypeScript, where no parser is available
//!   in-process. Pattern-matches probable declaration starts and bounds
//!   each body by delimiter-depth counting; inherently best-effort.
//!
//! Neither variant builds an AST or does semantic analysis; the output is
//! the exact source span of each function, enough to hand the generation
//! oracle realistic context.

pub mod grammar;
pub mod heuristic;

pub use grammar::GrammarScanner;
pub use heuristic::{HeuristicScanner, QUALIFIER_LOOKBACK_BYTES};
