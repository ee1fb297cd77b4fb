//! # tf-config
//!
//! Project configuration for a testforge run.
//!
//! A project opts in by placing a JSON file whose name contains
//! `testforge` in its root directory:
//!
//! ```json
//! {
//!   "version": "1",
//!   "settings": {
//!     "language": "typescript",
//!     "test_runner": "jest",
//!     "excluded_dirs": ["./node_modules"],
//!     "excluded_files": ["index.ts"]
//!   },
//!   "examples": [
//!     { "name": "unit example", "type": "unit",
//!       "file_path": "examples/unit.test.ts", "description": "..." }
//!   ],
//!   "context": { "files": [] }
//! }
//! ```
//!
//! Relative paths in the config resolve against the directory the config
//! file was found in.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use tf_core::{ContextFile, TestExample, TestKind};

/// Languages this build knows how to drive.
pub const SUPPORTED_LANGUAGES: &[&str] = &["rust", "typescript"];

fn valid_runners(language: &str) -> &'static [&'static str] {
    match language {
        "rust" => &["cargo test"],
        "typescript" => &["jest"],
        _ => &[],
    }
}

fn default_runner(language: &str) -> &'static str {
    match language {
        "rust" => "cargo test",
        _ => "jest",
    }
}

/// Whether `language` names a supported language.
#[must_use]
pub fn is_valid_language(language: &str) -> bool {
    SUPPORTED_LANGUAGES.contains(&language)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to access path {path}: {source}")]
    Access {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("path must be a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("no testforge config file found in directory {0}")]
    NotFound(PathBuf),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExampleEntry {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub file_path: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub default_test_directory: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub test_runner: String,
    #[serde(default)]
    pub excluded_dirs: Vec<String>,
    #[serde(default)]
    pub excluded_files: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContextEntry {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContextSection {
    #[serde(default)]
    pub files: Vec<ContextEntry>,
}

/// The parsed and validated project configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub examples: Vec<ExampleEntry>,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub context: ContextSection,
    #[serde(skip)]
    base_path: PathBuf,
}

impl Config {
    /// Load and validate the configuration from a project directory.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let dir = dir.as_ref();
        let metadata = fs::metadata(dir).map_err(|source| ConfigError::Access {
            path: dir.to_path_buf(),
            source,
        })?;
        if !metadata.is_dir() {
            return Err(ConfigError::NotADirectory(dir.to_path_buf()));
        }

        let config_path = find_config_file(dir)?;
        debug!(path = %config_path.display(), "loading configuration");

        let data = fs::read_to_string(&config_path).map_err(|source| ConfigError::Read {
            path: config_path.clone(),
            source,
        })?;
        let mut config: Config =
            serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
                path: config_path.clone(),
                source,
            })?;
        config.base_path = dir.to_path_buf();

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.version.is_empty() {
            return Err(ConfigError::Invalid("config version is required".into()));
        }

        let mut seen_names = HashSet::new();
        for (index, example) in self.examples.iter().enumerate() {
            let ordinal = index + 1;
            if example.name.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "example #{ordinal}: name is required"
                )));
            }
            if !seen_names.insert(example.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate example name found: {}",
                    example.name
                )));
            }
            if example.kind.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "example #{ordinal} ({}): type is required",
                    example.name
                )));
            }
            if TestKind::parse(&example.kind).is_none() {
                return Err(ConfigError::Invalid(format!(
                    "example #{ordinal} ({}): invalid test type {:?}. Must be one of: unit, integration, worker, prompt",
                    example.name, example.kind
                )));
            }
            if example.file_path.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "example #{ordinal} ({}): file_path is required",
                    example.name
                )));
            }
            let full_path = self.resolve_path(&example.file_path);
            if !full_path.exists() {
                return Err(ConfigError::Invalid(format!(
                    "example #{ordinal} ({}): file not found at path: {}",
                    example.name,
                    full_path.display()
                )));
            }
            if example.description.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "example #{ordinal} ({}): description is required",
                    example.name
                )));
            }
        }

        for (index, file) in self.context.files.iter().enumerate() {
            let ordinal = index + 1;
            if file.path.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "context file #{ordinal}: path is required"
                )));
            }
            let full_path = self.resolve_path(&file.path);
            if !full_path.exists() {
                return Err(ConfigError::Invalid(format!(
                    "context file #{ordinal}: file not found at path: {}",
                    full_path.display()
                )));
            }
        }

        if !self.settings.language.is_empty() && !is_valid_language(&self.settings.language) {
            return Err(ConfigError::Invalid(format!(
                "unsupported language: {}",
                self.settings.language
            )));
        }
        if !self.settings.test_runner.is_empty() {
            let language = self.language();
            if !valid_runners(language).contains(&self.settings.test_runner.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "test runner {:?} is not valid for language {:?}",
                    self.settings.test_runner, language
                )));
            }
        }

        Ok(())
    }

    fn resolve_path(&self, relative: &str) -> PathBuf {
        self.base_path.join(relative)
    }

    /// Configured language, defaulting to typescript.
    #[must_use]
    pub fn language(&self) -> &str {
        if self.settings.language.is_empty() {
            "typescript"
        } else {
            &self.settings.language
        }
    }

    /// Configured test runner, defaulting per language.
    #[must_use]
    pub fn test_runner(&self) -> &str {
        if self.settings.test_runner.is_empty() {
            default_runner(self.language())
        } else {
            &self.settings.test_runner
        }
    }

    /// Directory the finder searches, defaulting to the config directory.
    #[must_use]
    pub fn root_dir(&self) -> PathBuf {
        if self.settings.default_test_directory.is_empty() {
            self.base_path.clone()
        } else {
            self.resolve_path(&self.settings.default_test_directory)
        }
    }

    /// Excluded directories, normalized to absolute paths. `./`-prefixed
    /// entries resolve against the search root, others against the config
    /// directory.
    #[must_use]
    pub fn excluded_dirs(&self) -> Vec<PathBuf> {
        self.settings
            .excluded_dirs
            .iter()
            .map(|dir| {
                if let Some(rooted) = dir.strip_prefix("./") {
                    self.root_dir().join(rooted)
                } else {
                    self.resolve_path(dir)
                }
            })
            .collect()
    }

    /// Excluded file names.
    #[must_use]
    pub fn excluded_files(&self) -> &[String] {
        &self.settings.excluded_files
    }

    /// Read every configured example file into memory.
    pub fn load_examples(&self) -> Result<Vec<TestExample>, ConfigError> {
        let mut examples = Vec::with_capacity(self.examples.len());
        for entry in &self.examples {
            let full_path = self.resolve_path(&entry.file_path);
            let content = fs::read_to_string(&full_path).map_err(|source| ConfigError::Read {
                path: full_path,
                source,
            })?;
            // Validation already established the kind is one of the known
            // spellings.
            let kind = TestKind::parse(&entry.kind).unwrap_or(TestKind::Unit);
            examples.push(TestExample {
                name: entry.name.clone(),
                kind,
                content,
                description: entry.description.clone(),
            });
        }
        Ok(examples)
    }

    /// Read every configured context file into memory.
    pub fn load_context_files(&self) -> Result<Vec<ContextFile>, ConfigError> {
        let mut files = Vec::with_capacity(self.context.files.len());
        for entry in &self.context.files {
            let full_path = self.resolve_path(&entry.path);
            let content = fs::read_to_string(&full_path).map_err(|source| ConfigError::Read {
                path: full_path,
                source,
            })?;
            files.push(ContextFile {
                path: entry.path.clone(),
                content,
                description: entry.description.clone(),
                kind: entry.kind.clone(),
            });
        }
        Ok(files)
    }
}

fn find_config_file(dir: &Path) -> Result<PathBuf, ConfigError> {
    let entries = fs::read_dir(dir).map_err(|source| ConfigError::Access {
        path: dir.to_path_buf(),
        source,
    })?;

    for entry in entries {
        let entry = entry.map_err(|source| ConfigError::Access {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        let is_json = name.ends_with(".json") || name.ends_with(".jsonc");
        if is_json && name.contains("testforge") {
            return Ok(path);
        }
    }

    Err(ConfigError::NotFound(dir.to_path_buf()))
}
