//! Example tests and auxiliary context handed to the generation oracle.

use serde::{Deserialize, Serialize};

/// Category of an example test, as declared in the project config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestKind {
    Unit,
    Integration,
    Worker,
    Prompt,
}

impl TestKind {
    /// Parse the config-file spelling of a kind.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "unit" => Some(TestKind::Unit),
            "integration" => Some(TestKind::Integration),
            "worker" => Some(TestKind::Worker),
            "prompt" => Some(TestKind::Prompt),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            TestKind::Unit => "unit",
            TestKind::Integration => "integration",
            TestKind::Worker => "worker",
            TestKind::Prompt => "prompt",
        }
    }
}

/// A complete example test file shown to the generation oracle so that
/// generated tests follow the project's own conventions.
#[derive(Debug, Clone)]
pub struct TestExample {
    pub name: String,
    pub kind: TestKind,
    pub content: String,
    pub description: String,
}

/// A file supplying additional context for generation (shared types,
/// utilities, constants).
#[derive(Debug, Clone)]
pub struct ContextFile {
    /// Path relative to the config file.
    pub path: String,
    pub content: String,
    pub description: String,
    /// Free-form category, e.g. "types" or "utils".
    pub kind: String,
}
