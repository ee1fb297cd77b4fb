//! Shared external-process invocation for oracle adapters.

use std::ffi::OsStr;
use std::path::Path;
use std::process::Output;

use tokio::process::Command;

use tf_core::{OracleError, OracleVerdict};

/// Run a tool in `dir` and normalize its exit into a verdict.
///
/// Blocks the logical thread of control until the tool exits; there is
/// deliberately no timeout here.
pub(crate) async fn run_tool(
    tool: &'static str,
    program: &str,
    args: &[&OsStr],
    dir: &Path,
) -> Result<OracleVerdict, OracleError> {
    let output = Command::new(program)
        .args(args)
        .current_dir(dir)
        .output()
        .await
        .map_err(|source| OracleError::Launch { tool, source })?;

    Ok(verdict_from_output(&output))
}

fn verdict_from_output(output: &Output) -> OracleVerdict {
    if output.status.success() {
        return OracleVerdict::pass();
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    OracleVerdict::fail(format!("{stdout}\n{stderr}"))
}
