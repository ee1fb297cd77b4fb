//! The language-profile capability bundle.

use std::path::{Path, PathBuf};

use crate::oracle::OracleAdapter;
use crate::span::FunctionSpan;

/// Boundary extraction failed because the source is not syntactically
/// valid. Fatal for the whole file: no partial spans are returned.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("source is not syntactically valid: {0}")]
    Parse(String),
}

/// Everything the pipeline needs to know about one target language:
/// file conventions, how to extract function boundaries, and which
/// external tools verify and execute candidate tests.
///
/// The two scanner variants are independent implementations behind this
/// seam — there is no shared scanner state to inherit.
pub trait LanguageProfile: Send + Sync {
    /// Language name as used in config and code fences, e.g. "typescript".
    fn name(&self) -> &'static str;

    /// Extension of source files this profile handles, e.g. ".ts".
    fn file_extension(&self) -> &'static str;

    /// Suffix that names a test file, e.g. ".test.ts" or "_test.rs".
    fn test_file_suffix(&self) -> &'static str;

    /// Map a source file to the test file this pipeline would write.
    ///
    /// The default places the test next to its source, replacing the
    /// extension with [`test_file_suffix`](Self::test_file_suffix).
    fn test_path(&self, _root_dir: &Path, source_path: &Path) -> PathBuf {
        let stem = source_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        source_path.with_file_name(format!("{stem}{}", self.test_file_suffix()))
    }

    /// Extract every function boundary from one file's source text, in
    /// source order.
    fn extract_functions(&self, source: &str) -> Result<Vec<FunctionSpan>, ScanError>;

    /// The type/lint checker for this language.
    fn static_verifier(&self) -> &dyn OracleAdapter;

    /// The test runner for this language.
    fn test_executor(&self) -> &dyn OracleAdapter;
}
