//! Bounded verification-repair phases.
//!
//! Each function's candidate runs through two phases in sequence: static
//! repair against the profile's verifier, then execution repair against
//! its test runner. A phase is the explicit state machine
//! `Verifying → (Passed | NeedsFix) → Fixing → Verifying → …` with an
//! attempt counter as the only exit besides a pass: for a maximum of M
//! attempts the oracle adapter is invoked at most M times before the
//! phase terminates with `Success` or `Exhausted`.

use std::path::Path;

use tracing::{debug, info, warn};

use tf_core::{
    AgentError, ContextFile, CorrectionAttempt, FixerOracle, LanguageProfile, OracleAdapter,
    OracleError, RepairParams, RepairPhaseResult, TestExample,
};

/// Attempt budgets for the two repair phases.
#[derive(Debug, Clone)]
pub struct RepairConfig {
    /// Maximum static-verification rounds per function.
    pub static_attempts_max: u32,
    /// Maximum execution rounds per function, entered only after static
    /// repair fully succeeds.
    pub execution_attempts_max: u32,
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self {
            static_attempts_max: 5,
            execution_attempts_max: 3,
        }
    }
}

impl RepairConfig {
    /// Tight budgets for fast iteration.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            static_attempts_max: 2,
            execution_attempts_max: 1,
        }
    }
}

/// Which oracle a phase pairs with the fixer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseKind {
    Static,
    Execution,
}

impl PhaseKind {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            PhaseKind::Static => "static-repair",
            PhaseKind::Execution => "execution-repair",
        }
    }
}

/// A phase that could not run to a verdict at all. Distinct from
/// [`RepairPhaseResult::Exhausted`]: exhaustion is the loop completing
/// without a pass, while these are collaborator failures that abort the
/// phase outright. Either way the function is skipped and its siblings
/// continue.
#[derive(Debug, thiserror::Error)]
pub enum PhaseError {
    #[error("oracle adapter failed during {phase}: {source}")]
    Adapter {
        phase: &'static str,
        #[source]
        source: OracleError,
    },

    #[error("fixer oracle failed during {phase}: {source}")]
    Fixer {
        phase: &'static str,
        #[source]
        source: AgentError,
    },

    #[error("failed to persist candidate during {phase}: {source}")]
    Persist {
        phase: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Everything a phase needs besides the candidate code itself.
pub struct PhaseContext<'a> {
    pub root_dir: &'a Path,
    /// On-disk location of the candidate; adapters read from here, so
    /// every fixer round is written back before the next verification.
    pub target: &'a Path,
    pub source_code: &'a str,
    pub function_name: &'a str,
    pub example: Option<&'a TestExample>,
    pub context_files: &'a [ContextFile],
}

/// Drives the two bounded phases for one function.
pub struct RepairLoop<'a> {
    profile: &'a dyn LanguageProfile,
    agent: &'a dyn FixerOracle,
    config: RepairConfig,
}

impl<'a> RepairLoop<'a> {
    #[must_use]
    pub fn new(
        profile: &'a dyn LanguageProfile,
        agent: &'a dyn FixerOracle,
        config: RepairConfig,
    ) -> Self {
        Self {
            profile,
            agent,
            config,
        }
    }

    /// Static-repair phase: drive the candidate until the static
    /// verifier passes or attempts run out.
    pub async fn run_static_phase(
        &self,
        ctx: &PhaseContext<'_>,
        code: String,
    ) -> Result<RepairPhaseResult, PhaseError> {
        self.run_phase(
            PhaseKind::Static,
            self.profile.static_verifier(),
            self.config.static_attempts_max,
            ctx,
            code,
        )
        .await
    }

    /// Execution-repair phase: drive the candidate until its tests pass
    /// or attempts run out. Must only be entered with code that already
    /// passed the static phase.
    pub async fn run_execution_phase(
        &self,
        ctx: &PhaseContext<'_>,
        code: String,
    ) -> Result<RepairPhaseResult, PhaseError> {
        self.run_phase(
            PhaseKind::Execution,
            self.profile.test_executor(),
            self.config.execution_attempts_max,
            ctx,
            code,
        )
        .await
    }

    async fn run_phase(
        &self,
        kind: PhaseKind,
        adapter: &dyn OracleAdapter,
        attempts_max: u32,
        ctx: &PhaseContext<'_>,
        mut code: String,
    ) -> Result<RepairPhaseResult, PhaseError> {
        let phase = kind.label();
        // Attempt history lives for this phase only; it is handed to the
        // fixer as accumulated context and dropped when the phase ends.
        let mut history: Vec<CorrectionAttempt> = Vec::new();

        for attempt in 1..=attempts_max {
            debug!(
                function = ctx.function_name,
                phase,
                attempt,
                tool = adapter.name(),
                "verifying candidate"
            );
            let verdict = adapter
                .check(ctx.root_dir, ctx.target)
                .await
                .map_err(|source| PhaseError::Adapter { phase, source })?;

            if verdict.passed {
                info!(function = ctx.function_name, phase, attempt, "verification passed");
                return Ok(RepairPhaseResult::Success(code));
            }

            let diagnostics: Vec<String> =
                verdict.diagnostic_text.lines().map(str::to_string).collect();
            debug!(
                function = ctx.function_name,
                phase,
                attempt,
                diagnostic_lines = diagnostics.len(),
                "verification failed"
            );
            history.push(CorrectionAttempt {
                code: code.clone(),
                diagnostics,
            });

            info!(function = ctx.function_name, phase, attempt, "requesting fix");
            let params = RepairParams {
                source_code: ctx.source_code,
                test_code: &code,
                attempts: &history,
                example: ctx.example,
                language: self.profile.name(),
                test_runner: self.profile.test_executor().name(),
                test_path: ctx.target,
                context_files: ctx.context_files,
            };
            let fixed = match kind {
                PhaseKind::Static => self.agent.fix_static_errors(params).await,
                PhaseKind::Execution => self.agent.fix_test_failures(params).await,
            }
            .map_err(|source| PhaseError::Fixer { phase, source })?;

            code = fixed;
            tokio::fs::write(ctx.target, &code)
                .await
                .map_err(|source| PhaseError::Persist { phase, source })?;
        }

        warn!(
            function = ctx.function_name,
            phase,
            attempts = attempts_max,
            "attempts exhausted"
        );
        Ok(RepairPhaseResult::Exhausted {
            attempts: attempts_max,
        })
    }
}
