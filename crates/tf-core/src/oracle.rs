//! The oracle-adapter seam.

use std::path::Path;

use async_trait::async_trait;

use crate::verdict::OracleVerdict;

/// Adapter-level failure: the external tool could not be launched at all.
///
/// A tool that runs and exits non-zero is a normal fail verdict, never
/// this error; the distinction is what lets the repair loop treat failing
/// checks as recoverable and a missing binary as fatal for the phase.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("failed to launch {tool}: {source}")]
    Launch {
        tool: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// An external verdict tool: static verifier or test executor.
///
/// Adapters are stateless functions of (working directory, target file);
/// they read the candidate from disk, so the repair loop persists every
/// fixer round before re-verifying. Both adapter kinds share this one
/// contract so the repair loop handles them uniformly.
#[async_trait]
pub trait OracleAdapter: Send + Sync {
    /// Tool name for logs and config matching, e.g. "cargo test".
    fn name(&self) -> &'static str;

    async fn check(&self, root_dir: &Path, target: &Path) -> Result<OracleVerdict, OracleError>;
}
