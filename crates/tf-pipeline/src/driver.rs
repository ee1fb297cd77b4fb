//! Per-file pipeline: extract boundaries, generate, repair, assemble.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use tf_core::{
    AgentError, ContextFile, FixerOracle, GenerateParams, LanguageProfile, RepairPhaseResult,
    ScanError, TestExample,
};

use crate::finder;
use crate::repair::{PhaseContext, PhaseError, RepairConfig, RepairLoop};

/// File-level failures. Any of these aborts the current file; none of
/// them is caused by a single function (function-level problems are
/// recorded in the [`FileReport`] instead and siblings continue).
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("failed to read source file {path}: {source}")]
    ReadSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to extract functions from {path}: {source}")]
    Scan {
        path: PathBuf,
        #[source]
        source: ScanError,
    },

    #[error("no functions found in source file {path}")]
    NoFunctionsFound { path: PathBuf },

    #[error("failed to create test directory {path}: {source}")]
    CreateTestDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write test file {path}: {source}")]
    WriteTestFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error walking search directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Why a function was left out of the final test file.
#[derive(Debug)]
pub enum SkipReason {
    /// A repair phase ran out of attempts without a pass.
    Exhausted {
        phase: &'static str,
        attempts: u32,
    },
    /// A repair phase could not run to a verdict (adapter or fixer
    /// failure).
    PhaseFailed(PhaseError),
    /// The initial generation call failed.
    GenerationFailed(AgentError),
    /// The candidate file could not be created.
    CandidateFile(std::io::Error),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Exhausted { phase, attempts } => {
                write!(f, "{phase} exhausted after {attempts} attempts")
            }
            SkipReason::PhaseFailed(err) => write!(f, "{err}"),
            SkipReason::GenerationFailed(err) => write!(f, "generation failed: {err}"),
            SkipReason::CandidateFile(err) => write!(f, "candidate file error: {err}"),
        }
    }
}

/// One function that did not survive, with enough context to act on.
#[derive(Debug)]
pub struct SkippedFunction {
    pub name: String,
    pub reason: SkipReason,
    /// The candidate left on disk for inspection, when one was written.
    pub candidate_path: Option<PathBuf>,
}

/// Outcome of processing one source file.
#[derive(Debug)]
pub struct FileReport {
    pub source_path: PathBuf,
    pub test_path: PathBuf,
    /// Functions whose tests survived both phases, in source order.
    pub generated: Vec<String>,
    pub skipped: Vec<SkippedFunction>,
    pub test_file_written: bool,
}

impl FileReport {
    /// Human-readable summary for the CLI.
    #[must_use]
    pub fn format_summary(&self) -> String {
        let mut summary = format!(
            "{}: {} generated, {} skipped\n",
            self.source_path.display(),
            self.generated.len(),
            self.skipped.len()
        );
        if self.test_file_written {
            let _ = writeln!(summary, "  test file: {}", self.test_path.display());
        }
        for name in &self.generated {
            let _ = writeln!(summary, "  + {name}");
        }
        for skipped in &self.skipped {
            let _ = writeln!(summary, "  - {}: {}", skipped.name, skipped.reason);
            if let Some(path) = &skipped.candidate_path {
                let _ = writeln!(summary, "    candidate kept at {}", path.display());
            }
        }
        summary
    }
}

/// Outcome of one finder-driven generation step.
#[derive(Debug)]
pub enum RunOutcome {
    Generated(FileReport),
    NoEligibleFiles,
}

/// Sequences the whole per-file flow. Owns the extracted spans and the
/// assembled test-file text for the duration of one file.
pub struct Pipeline<'a> {
    profile: &'a dyn LanguageProfile,
    agent: &'a dyn FixerOracle,
    examples: &'a [TestExample],
    context_files: &'a [ContextFile],
    repair: RepairConfig,
}

impl<'a> Pipeline<'a> {
    #[must_use]
    pub fn new(
        profile: &'a dyn LanguageProfile,
        agent: &'a dyn FixerOracle,
        examples: &'a [TestExample],
        context_files: &'a [ContextFile],
        repair: RepairConfig,
    ) -> Self {
        Self {
            profile,
            agent,
            examples,
            context_files,
            repair,
        }
    }

    /// Find the next file needing a test and run the per-file pipeline
    /// on it. The visited set is owned by the caller and updated here.
    pub async fn generate_next_test(
        &self,
        root_dir: &Path,
        excluded_dirs: &[PathBuf],
        excluded_files: &[String],
        visited: &mut HashSet<PathBuf>,
    ) -> Result<RunOutcome, PipelineError> {
        let Some(source_path) = finder::find_next_file(
            root_dir,
            self.profile,
            excluded_dirs,
            excluded_files,
            visited,
        )?
        else {
            return Ok(RunOutcome::NoEligibleFiles);
        };

        let report = self.generate_for_file(root_dir, &source_path).await?;
        Ok(RunOutcome::Generated(report))
    }

    /// Run the full pipeline for one source file: extract boundaries,
    /// then per function generate → static repair → execution repair,
    /// and finally persist the surviving code blocks.
    pub async fn generate_for_file(
        &self,
        root_dir: &Path,
        source_path: &Path,
    ) -> Result<FileReport, PipelineError> {
        let source_code =
            tokio::fs::read_to_string(source_path)
                .await
                .map_err(|source| PipelineError::ReadSource {
                    path: source_path.to_path_buf(),
                    source,
                })?;

        let functions =
            self.profile
                .extract_functions(&source_code)
                .map_err(|source| PipelineError::Scan {
                    path: source_path.to_path_buf(),
                    source,
                })?;
        if functions.is_empty() {
            return Err(PipelineError::NoFunctionsFound {
                path: source_path.to_path_buf(),
            });
        }
        debug!(
            path = %source_path.display(),
            functions = functions.len(),
            "extracted function boundaries"
        );

        let example = self.best_example(&source_code).await;

        let test_path = self.profile.test_path(root_dir, source_path);
        let test_dir = test_path.parent().unwrap_or(root_dir);
        // Candidates are colocated with the eventual test file, so the
        // directory has to exist before the first temp file is created.
        tokio::fs::create_dir_all(test_dir)
            .await
            .map_err(|source| PipelineError::CreateTestDir {
                path: test_dir.to_path_buf(),
                source,
            })?;

        let repair_loop = RepairLoop::new(self.profile, self.agent, self.repair.clone());

        let mut accumulated = String::new();
        let mut report = FileReport {
            source_path: source_path.to_path_buf(),
            test_path: test_path.clone(),
            generated: Vec::new(),
            skipped: Vec::new(),
            test_file_written: false,
        };

        for function in &functions {
            info!(function = %function.name, "generating test");
            let params = GenerateParams {
                source_code: &source_code,
                function,
                example,
                language: self.profile.name(),
                test_runner: self.profile.test_executor().name(),
                test_path: &test_path,
                context_files: self.context_files,
            };
            let initial = match self.agent.generate_test(params).await {
                Ok(code) => code,
                Err(err) => {
                    error!(function = %function.name, %err, "failed to generate test");
                    report.skipped.push(SkippedFunction {
                        name: function.name.clone(),
                        reason: SkipReason::GenerationFailed(err),
                        candidate_path: None,
                    });
                    continue;
                }
            };

            let candidate_path = match create_candidate_file(
                test_dir,
                &function.name,
                self.profile.test_file_suffix(),
                &initial,
            ) {
                Ok(path) => path,
                Err(err) => {
                    error!(function = %function.name, %err, "failed to create candidate file");
                    report.skipped.push(SkippedFunction {
                        name: function.name.clone(),
                        reason: SkipReason::CandidateFile(err),
                        candidate_path: None,
                    });
                    continue;
                }
            };

            let ctx = PhaseContext {
                root_dir,
                target: &candidate_path,
                source_code: &source_code,
                function_name: &function.name,
                example,
                context_files: self.context_files,
            };

            // Static repair must fully succeed before execution repair
            // begins; an exhausted or failed phase keeps the candidate
            // on disk for inspection and moves on to the next function.
            let code = match repair_loop.run_static_phase(&ctx, initial).await {
                Ok(RepairPhaseResult::Success(code)) => code,
                Ok(RepairPhaseResult::Exhausted { attempts }) => {
                    warn!(function = %function.name, attempts, "static repair exhausted");
                    report.skipped.push(SkippedFunction {
                        name: function.name.clone(),
                        reason: SkipReason::Exhausted {
                            phase: "static-repair",
                            attempts,
                        },
                        candidate_path: Some(candidate_path),
                    });
                    continue;
                }
                Err(err) => {
                    error!(function = %function.name, %err, "static repair aborted");
                    report.skipped.push(SkippedFunction {
                        name: function.name.clone(),
                        reason: SkipReason::PhaseFailed(err),
                        candidate_path: Some(candidate_path),
                    });
                    continue;
                }
            };

            let code = match repair_loop.run_execution_phase(&ctx, code).await {
                Ok(RepairPhaseResult::Success(code)) => code,
                Ok(RepairPhaseResult::Exhausted { attempts }) => {
                    warn!(function = %function.name, attempts, "execution repair exhausted");
                    report.skipped.push(SkippedFunction {
                        name: function.name.clone(),
                        reason: SkipReason::Exhausted {
                            phase: "execution-repair",
                            attempts,
                        },
                        candidate_path: Some(candidate_path),
                    });
                    continue;
                }
                Err(err) => {
                    error!(function = %function.name, %err, "execution repair aborted");
                    report.skipped.push(SkippedFunction {
                        name: function.name.clone(),
                        reason: SkipReason::PhaseFailed(err),
                        candidate_path: Some(candidate_path),
                    });
                    continue;
                }
            };

            // Blank line between surviving blocks.
            if !accumulated.is_empty() {
                accumulated.push('\n');
            }
            accumulated.push_str(&code);
            accumulated.push('\n');
            report.generated.push(function.name.clone());

            if let Err(err) = tokio::fs::remove_file(&candidate_path).await {
                warn!(path = %candidate_path.display(), %err, "failed to remove candidate file");
            }
        }

        if !accumulated.is_empty() {
            info!(path = %test_path.display(), "writing final test file");
            if let Some(parent) = test_path.parent() {
                tokio::fs::create_dir_all(parent).await.map_err(|source| {
                    PipelineError::CreateTestDir {
                        path: parent.to_path_buf(),
                        source,
                    }
                })?;
            }
            tokio::fs::write(&test_path, &accumulated)
                .await
                .map_err(|source| PipelineError::WriteTestFile {
                    path: test_path.clone(),
                    source,
                })?;
            report.test_file_written = true;
        }

        Ok(report)
    }

    /// Ask the fixer oracle which example fits this source best; any
    /// failure falls back to the first configured example.
    async fn best_example(&self, source_code: &str) -> Option<&TestExample> {
        if self.examples.is_empty() {
            return None;
        }
        match self.agent.pick_example(source_code, self.examples).await {
            Ok(index) => self.examples.get(index).or(self.examples.first()),
            Err(err) => {
                error!(%err, "failed to pick example");
                self.examples.first()
            }
        }
    }
}

/// Create the uniquely named on-disk candidate for one function,
/// colocated with the eventual test file, and write the initial code to
/// it. The file is kept; the driver removes it only on success.
fn create_candidate_file(
    dir: &Path,
    function_name: &str,
    suffix: &str,
    contents: &str,
) -> std::io::Result<PathBuf> {
    let file = tempfile::Builder::new()
        .prefix(&format!("{function_name}-"))
        .suffix(suffix)
        .tempfile_in(dir)?;
    let (mut handle, path) = file.keep().map_err(|err| err.error)?;
    handle.write_all(contents.as_bytes())?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_summary_names_survivors_and_skips() {
        let report = FileReport {
            source_path: PathBuf::from("src/user.ts"),
            test_path: PathBuf::from("src/user.test.ts"),
            generated: vec!["login".to_string()],
            skipped: vec![SkippedFunction {
                name: "logout".to_string(),
                reason: SkipReason::Exhausted {
                    phase: "static-repair",
                    attempts: 5,
                },
                candidate_path: Some(PathBuf::from("src/logout-x1.test.ts")),
            }],
            test_file_written: true,
        };

        let summary = report.format_summary();

        assert!(summary.contains("1 generated, 1 skipped"));
        assert!(summary.contains("+ login"));
        assert!(summary.contains("- logout: static-repair exhausted after 5 attempts"));
        assert!(summary.contains("candidate kept at src/logout-x1.test.ts"));
    }

    #[test]
    fn candidate_files_carry_the_function_name_and_test_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let path = create_candidate_file(dir.path(), "login", ".test.ts", "code").unwrap();

        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("login-"));
        assert!(name.ends_with(".test.ts"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "code");
    }
}
