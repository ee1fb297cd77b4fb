//! On-disk prompt/response logging.
//!
//! Each oracle call is mirrored to `logs/<timestamp>_<operation>.json`
//! under the current working directory. Logging failures are warnings;
//! they never interrupt generation.

use std::fs;
use std::io;
use std::path::PathBuf;

use tracing::{debug, warn};

/// Saves prompts and responses for debugging and analysis.
pub struct PromptLogger {
    logs_dir: Option<PathBuf>,
}

impl PromptLogger {
    /// Create a logger writing under `./logs`, or a no-op logger when
    /// disabled.
    pub fn new(enabled: bool) -> io::Result<Self> {
        if !enabled {
            return Ok(Self::disabled());
        }

        let logs_dir = std::env::current_dir()?.join("logs");
        fs::create_dir_all(&logs_dir)?;
        Ok(Self {
            logs_dir: Some(logs_dir),
        })
    }

    /// A logger that records nothing.
    #[must_use]
    pub fn disabled() -> Self {
        Self { logs_dir: None }
    }

    /// Record one prompt/response pair.
    pub fn log(&self, operation: &str, prompt: &str, response: &str) {
        if let Err(err) = self.write_entry(operation, prompt, response) {
            warn!(%err, operation, "failed to write prompt log");
        }
    }

    fn write_entry(&self, operation: &str, prompt: &str, response: &str) -> io::Result<()> {
        let Some(logs_dir) = &self.logs_dir else {
            return Ok(());
        };

        let timestamp = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S").to_string();
        let path = logs_dir.join(format!("{timestamp}_{operation}.json"));

        let entry = serde_json::json!({
            "operation": operation,
            "timestamp": timestamp,
            "prompt": prompt,
            "response": response,
        });
        let content = serde_json::to_string_pretty(&entry).map_err(io::Error::other)?;

        fs::write(&path, content)?;
        debug!(path = %path.display(), "saved prompt log");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_logger_writes_nothing() {
        let logger = PromptLogger::disabled();
        logger.log("generate_test", "prompt", "response");
        // Nothing to assert beyond "does not panic"; there is no dir.
        assert!(logger.logs_dir.is_none());
    }

    #[test]
    fn enabled_logger_writes_json_entry() {
        let dir = tempfile::tempdir().unwrap();
        let logger = PromptLogger {
            logs_dir: Some(dir.path().to_path_buf()),
        };

        logger.log("pick_example", "which one?", "{\"exampleIndex\":0}");

        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);

        let content = fs::read_to_string(entries[0].as_ref().unwrap().path()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed["operation"], "pick_example");
        assert_eq!(parsed["prompt"], "which one?");
    }
}
