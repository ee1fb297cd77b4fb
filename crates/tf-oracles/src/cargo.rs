//! Oracle adapters for the Rust profile.

use std::ffi::OsStr;
use std::path::Path;

use async_trait::async_trait;

use tf_core::{OracleAdapter, OracleError, OracleVerdict};

use crate::process::run_tool;

/// Static verifier: `cargo check --tests`, run from the directory
/// containing the target file. Cargo resolves the enclosing package by
/// walking up to the nearest manifest, so a candidate under `tests/` is
/// checked in its real crate context.
#[derive(Debug, Default)]
pub struct CargoCheck;

#[async_trait]
impl OracleAdapter for CargoCheck {
    fn name(&self) -> &'static str {
        "cargo check"
    }

    async fn check(&self, root_dir: &Path, target: &Path) -> Result<OracleVerdict, OracleError> {
        let dir = target.parent().unwrap_or(root_dir);
        run_tool(
            "cargo check",
            "cargo",
            &[OsStr::new("check"), OsStr::new("--tests")],
            dir,
        )
        .await
    }
}

/// Test executor: `cargo test --test <stem>`, scoped to exactly the
/// target integration-test file, run from the project directory.
#[derive(Debug, Default)]
pub struct CargoTest;

#[async_trait]
impl OracleAdapter for CargoTest {
    fn name(&self) -> &'static str {
        "cargo test"
    }

    async fn check(&self, root_dir: &Path, target: &Path) -> Result<OracleVerdict, OracleError> {
        let stem = target
            .file_stem()
            .map(|s| s.to_os_string())
            .unwrap_or_default();
        run_tool(
            "cargo test",
            "cargo",
            &[OsStr::new("test"), OsStr::new("--test"), stem.as_os_str()],
            root_dir,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adapter_names_match_config_spelling() {
        assert_eq!(CargoCheck.name(), "cargo check");
        assert_eq!(CargoTest.name(), "cargo test");
    }
}
