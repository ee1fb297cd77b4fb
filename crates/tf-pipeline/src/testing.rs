//! Scripted test doubles for the pipeline's collaborator seams.
//!
//! Used by this crate's unit tests and the end-to-end tests; none of
//! these touch the network or spawn processes.

use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use tf_core::{
    AgentError, FixerOracle, FunctionSpan, GenerateParams, LanguageProfile, OracleAdapter,
    OracleError, OracleVerdict, RepairParams, ScanError, TestExample,
};
use tf_scan::HeuristicScanner;

enum Script {
    AlwaysPass,
    AlwaysFail(String),
    FailThenPass { diagnostic: String, failures: u32 },
    Unlaunchable,
}

/// An oracle adapter that follows a fixed script and counts invocations.
pub struct ScriptedOracle {
    name: &'static str,
    script: Script,
    pub calls: AtomicU32,
}

impl ScriptedOracle {
    #[must_use]
    pub fn passing(name: &'static str) -> Self {
        Self {
            name,
            script: Script::AlwaysPass,
            calls: AtomicU32::new(0),
        }
    }

    #[must_use]
    pub fn failing(name: &'static str, diagnostic: &str) -> Self {
        Self {
            name,
            script: Script::AlwaysFail(diagnostic.to_string()),
            calls: AtomicU32::new(0),
        }
    }

    /// Fail `failures` times, then pass.
    #[must_use]
    pub fn failing_then_passing(
        name: &'static str,
        diagnostic: &str,
        failures: u32,
    ) -> Self {
        Self {
            name,
            script: Script::FailThenPass {
                diagnostic: diagnostic.to_string(),
                failures,
            },
            calls: AtomicU32::new(0),
        }
    }

    /// Simulates a missing tool binary.
    #[must_use]
    pub fn unlaunchable(name: &'static str) -> Self {
        Self {
            name,
            script: Script::Unlaunchable,
            calls: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl OracleAdapter for ScriptedOracle {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn check(&self, _root_dir: &Path, _target: &Path) -> Result<OracleVerdict, OracleError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        match &self.script {
            Script::AlwaysPass => Ok(OracleVerdict::pass()),
            Script::AlwaysFail(diagnostic) => Ok(OracleVerdict::fail(diagnostic.clone())),
            Script::FailThenPass {
                diagnostic,
                failures,
            } => {
                if call <= *failures {
                    Ok(OracleVerdict::fail(diagnostic.clone()))
                } else {
                    Ok(OracleVerdict::pass())
                }
            }
            Script::Unlaunchable => Err(OracleError::Launch {
                tool: self.name,
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "binary not found"),
            }),
        }
    }
}

/// A fixer oracle with canned outputs and per-operation call counters.
///
/// Fix rounds append a ` // fix N` marker so tests can observe both the
/// number of rounds and the write-back of each round's output.
pub struct ScriptedFixer {
    erroring: bool,
    pub generate_calls: AtomicU32,
    pub fix_static_calls: AtomicU32,
    pub fix_failures_calls: AtomicU32,
}

impl Default for ScriptedFixer {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedFixer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            erroring: false,
            generate_calls: AtomicU32::new(0),
            fix_static_calls: AtomicU32::new(0),
            fix_failures_calls: AtomicU32::new(0),
        }
    }

    /// A fixer whose repair calls always fail, simulating an unreachable
    /// generation service.
    #[must_use]
    pub fn erroring() -> Self {
        Self {
            erroring: true,
            ..Self::new()
        }
    }
}

#[async_trait]
impl FixerOracle for ScriptedFixer {
    async fn generate_test(&self, params: GenerateParams<'_>) -> Result<String, AgentError> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        if self.erroring {
            return Err(AgentError::Request("scripted generation failure".into()));
        }
        Ok(format!("// generated test for {}", params.function.name))
    }

    async fn fix_static_errors(&self, params: RepairParams<'_>) -> Result<String, AgentError> {
        let round = self.fix_static_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.erroring {
            return Err(AgentError::Request("scripted fixer failure".into()));
        }
        Ok(format!("{} // fix {round}", params.test_code))
    }

    async fn fix_test_failures(&self, params: RepairParams<'_>) -> Result<String, AgentError> {
        let round = self.fix_failures_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.erroring {
            return Err(AgentError::Request("scripted fixer failure".into()));
        }
        Ok(format!("{} // fix {round}", params.test_code))
    }

    async fn pick_example(
        &self,
        _source_code: &str,
        examples: &[TestExample],
    ) -> Result<usize, AgentError> {
        if examples.is_empty() {
            return Err(AgentError::Request("no test examples provided".into()));
        }
        Ok(0)
    }
}

/// A TypeScript-shaped profile with scripted adapters: the real heuristic
/// scanner, colocated `.test.ts` naming, and whatever oracles the test
/// wires in.
pub struct FakeProfile {
    scanner: HeuristicScanner,
    pub verifier: Arc<ScriptedOracle>,
    pub executor: Arc<ScriptedOracle>,
}

impl FakeProfile {
    #[must_use]
    pub fn new(verifier: Arc<ScriptedOracle>, executor: Arc<ScriptedOracle>) -> Self {
        Self {
            scanner: HeuristicScanner::new(),
            verifier,
            executor,
        }
    }
}

impl LanguageProfile for FakeProfile {
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
        &*self.verifier
    }

    fn test_executor(&self) -> &dyn OracleAdapter {
        &*self.executor
    }
}
