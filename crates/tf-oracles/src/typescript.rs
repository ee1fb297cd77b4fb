//! Oracle adapters for the TypeScript profile.

use std::ffi::OsStr;
use std::path::Path;

use async_trait::async_trait;

use tf_core::{OracleAdapter, OracleError, OracleVerdict};

use crate::process::run_tool;

/// Static verifier: `npx tsc --noEmit`, run from the directory containing
/// the target file so the project's own tsconfig applies.
#[derive(Debug, Default)]
pub struct TscCheck;

#[async_trait]
impl OracleAdapter for TscCheck {
    fn name(&self) -> &'static str {
        "tsc"
    }

    async fn check(&self, root_dir: &Path, target: &Path) -> Result<OracleVerdict, OracleError> {
        let dir = target.parent().unwrap_or(root_dir);
        run_tool(
            "tsc",
            "npx",
            &[OsStr::new("tsc"), OsStr::new("--noEmit")],
            dir,
        )
        .await
    }
}

/// Test executor: `npx jest <target> --no-cache`, run from the project
/// root. Jest exits non-zero on failing tests; that is a fail verdict,
/// not an adapter error.
#[derive(Debug, Default)]
pub struct JestRunner;

#[async_trait]
impl OracleAdapter for JestRunner {
    fn name(&self) -> &'static str {
        "jest"
    }

    async fn check(&self, root_dir: &Path, target: &Path) -> Result<OracleVerdict, OracleError> {
        run_tool(
            "jest",
            "npx",
            &[
                OsStr::new("jest"),
                target.as_os_str(),
                OsStr::new("--no-cache"),
            ],
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
        assert_eq!(TscCheck.name(), "tsc");
        assert_eq!(JestRunner.name(), "jest");
    }
}
