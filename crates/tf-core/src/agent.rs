//! The generation/fixer oracle seam.

use std::path::Path;

use async_trait::async_trait;

use crate::example::{ContextFile, TestExample};
use crate::span::FunctionSpan;
use crate::verdict::CorrectionAttempt;

/// Failure of the generation/fixer service itself. Treated like an
/// adapter launch failure: fatal for the function's current phase, but
/// sibling functions continue.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("ANTHROPIC_API_KEY environment variable not set")]
    MissingApiKey,

    #[error("api request failed: {0}")]
    Request(String),

    #[error("api returned no usable content")]
    EmptyResponse,

    #[error("picked example index {index} out of range (have {count})")]
    ExampleOutOfRange { index: usize, count: usize },
}

/// Inputs for the initial generation of one function's test.
#[derive(Debug, Clone)]
pub struct GenerateParams<'a> {
    /// Full text of the source file under test.
    pub source_code: &'a str,
    /// The function the test is for.
    pub function: &'a FunctionSpan,
    /// Example test chosen for this source file, if any were configured.
    pub example: Option<&'a TestExample>,
    pub language: &'a str,
    pub test_runner: &'a str,
    /// Where the assembled test file will live.
    pub test_path: &'a Path,
    pub context_files: &'a [ContextFile],
}

/// Inputs for one fix round inside a repair phase.
#[derive(Debug, Clone)]
pub struct RepairParams<'a> {
    pub source_code: &'a str,
    /// The candidate as it currently stands on disk.
    pub test_code: &'a str,
    /// Accumulated history of this phase, newest last. The latest entry
    /// holds the diagnostics the fix must address.
    pub attempts: &'a [CorrectionAttempt],
    pub example: Option<&'a TestExample>,
    pub language: &'a str,
    pub test_runner: &'a str,
    pub test_path: &'a Path,
    pub context_files: &'a [ContextFile],
}

impl RepairParams<'_> {
    /// Diagnostics from the most recent verification round.
    #[must_use]
    pub fn latest_diagnostics(&self) -> &[String] {
        self.attempts
            .last()
            .map(|attempt| attempt.diagnostics.as_slice())
            .unwrap_or_default()
    }
}

/// The text-transformation oracle the repair loop drives.
///
/// Implementations MUST return bare code text with no surrounding
/// commentary; the pipeline assumes, and does not verify, this contract.
#[async_trait]
pub trait FixerOracle: Send + Sync {
    /// Produce the initial test for one function.
    async fn generate_test(&self, params: GenerateParams<'_>) -> Result<String, AgentError>;

    /// Repair code that failed the static verifier.
    async fn fix_static_errors(&self, params: RepairParams<'_>) -> Result<String, AgentError>;

    /// Repair code whose tests failed execution.
    async fn fix_test_failures(&self, params: RepairParams<'_>) -> Result<String, AgentError>;

    /// Choose the best-matching example for a source file; returns an
    /// index into `examples`.
    async fn pick_example(
        &self,
        source_code: &str,
        examples: &[TestExample],
    ) -> Result<usize, AgentError>;
}
