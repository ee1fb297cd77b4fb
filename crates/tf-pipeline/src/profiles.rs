//! Language profiles: the capability bundle tying a boundary scanner to
//! its oracle-adapter pair and file conventions.
//!
//! The two scanner variants are independent implementations behind the
//! [`LanguageProfile`] seam; nothing is shared between profiles beyond
//! the trait itself.

use std::path::{Path, PathBuf};

use tf_core::{FunctionSpan, LanguageProfile, OracleAdapter, ScanError};
use tf_oracles::{CargoCheck, CargoTest, JestRunner, TscCheck};
use tf_scan::{GrammarScanner, HeuristicScanner};

/// Rust: grammar-based scanning via `syn`, verified with `cargo check`
/// and executed with `cargo test`.
pub struct RustProfile {
    scanner: GrammarScanner,
    verifier: CargoCheck,
    executor: CargoTest,
}

impl Default for RustProfile {
    fn default() -> Self {
        Self::new()
    }
}

impl RustProfile {
    #[must_use]
    pub fn new() -> Self {
        Self {
            scanner: GrammarScanner::new(),
            verifier: CargoCheck,
            executor: CargoTest,
        }
    }
}

impl LanguageProfile for RustProfile {
    fn name(&self) -> &'static str {
        "rust"
    }

    fn file_extension(&self) -> &'static str {
        ".rs"
    }

    fn test_file_suffix(&self) -> &'static str {
        "_test.rs"
    }

    /// Rust tests live under the project's `tests/` directory so the
    /// executor can target exactly one file with `cargo test --test`.
    fn test_path(&self, root_dir: &Path, source_path: &Path) -> PathBuf {
        let stem = source_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        root_dir
            .join("tests")
            .join(format!("{stem}{}", self.test_file_suffix()))
    }

    fn extract_functions(&self, source: &str) -> Result<Vec<FunctionSpan>, ScanError> {
        self.scanner.extract_functions(source)
    }

    fn static_verifier(&self) -> &dyn OracleAdapter {
        &self.verifier
    }

    fn test_executor(&self) -> &dyn OracleAdapter {
        &self.executor
    }
}

/// TypeScript: heuristic scanning, verified with `tsc` and executed with
/// `jest`. Test files sit next to their sources.
pub struct TypeScriptProfile {
    scanner: HeuristicScanner,
    verifier: TscCheck,
    executor: JestRunner,
}

impl Default for TypeScriptProfile {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeScriptProfile {
    #[must_use]
    pub fn new() -> Self {
        Self {
            scanner: HeuristicScanner::new(),
            verifier: TscCheck,
            executor: JestRunner,
        }
    }
}

impl LanguageProfile for TypeScriptProfile {
    fn name(&self) -> &'static str {
        "typescript"
    }

    fn file_extension(&self) -> &'static str {
        ".ts"
    }

    fn test_file_suffix(&self) -> &'static str {
        ".test.ts"
    }

    fn extract_functions(&self, source: &str) -> Result<Vec<FunctionSpan>, ScanError> {
        self.scanner.extract_functions(source)
    }

    fn static_verifier(&self) -> &dyn OracleAdapter {
        &self.verifier
    }

    fn test_executor(&self) -> &dyn OracleAdapter {
        &self.executor
    }
}

/// Select the profile for a configured language name.
#[must_use]
pub fn profile_for(language: &str) -> Option<Box<dyn LanguageProfile>> {
    match language {
        "rust" => Some(Box::new(RustProfile::new())),
        "typescript" => Some(Box::new(TypeScriptProfile::new())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typescript_tests_sit_next_to_sources() {
        let profile = TypeScriptProfile::new();
        let test_path = profile.test_path(Path::new("/proj"), Path::new("/proj/src/user.ts"));
        assert_eq!(test_path, Path::new("/proj/src/user.test.ts"));
    }

    #[test]
    fn rust_tests_live_under_tests_dir() {
        let profile = RustProfile::new();
        let test_path = profile.test_path(Path::new("/proj"), Path::new("/proj/src/parser.rs"));
        assert_eq!(test_path, Path::new("/proj/tests/parser_test.rs"));
    }

    #[test]
    fn profiles_resolve_by_language_name() {
        assert!(profile_for("rust").is_some());
        assert!(profile_for("typescript").is_some());
        assert!(profile_for("go").is_none());
    }
}
