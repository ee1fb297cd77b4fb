//! testforge CLI: generate a test file for the next source file(s) that
//! need one, driving generated code through tool-verified repair.
//!
//! ```bash
//! # One generation against the project in ./my-app
//! testforge --dir ./my-app
//!
//! # Keep going until every eligible file has a test
//! testforge --dir ./my-app --generations -1
//! ```

use std::collections::HashSet;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, bail, Context};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use tf_agent::{ClaudeAgent, PromptLogger};
use tf_config::Config;
use tf_pipeline::{profile_for, Pipeline, RepairConfig, RunOutcome};

#[derive(Debug, Parser)]
#[command(
    name = "testforge",
    version,
    about = "AI-powered test generation with tool-verified repair"
)]
struct Cli {
    /// Path to the project root (must contain a testforge config file)
    #[arg(long, short = 'd')]
    dir: PathBuf,

    /// Number of test generations to run (-1 = until no eligible files
    /// remain)
    #[arg(long, default_value_t = 1)]
    generations: i32,

    /// AI provider to use (currently only anthropic is supported)
    #[arg(long, default_value = "anthropic")]
    provider: String,

    /// Log level when RUST_LOG is unset (debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Disable prompt/response logging to ./logs
    #[arg(long)]
    no_prompt_logs: bool,

    /// Use tight attempt budgets for fast iteration
    #[arg(long)]
    quick: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    info!("starting testforge");
    if let Err(err) = run(cli).await {
        error!(error = %format!("{err:#}"), "application error");
        eprintln!("Error: {err:#}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if cli.provider != "anthropic" {
        bail!("unknown AI provider: {}", cli.provider);
    }

    let config = Config::load(&cli.dir).context("failed to load configuration")?;
    let examples = config.load_examples().context("failed to load test examples")?;
    let context_files = config
        .load_context_files()
        .context("failed to load context files")?;
    if !context_files.is_empty() {
        info!(count = context_files.len(), "loaded context files");
    }

    let profile = profile_for(config.language())
        .ok_or_else(|| anyhow!("unsupported language: {}", config.language()))?;

    let logger = PromptLogger::new(!cli.no_prompt_logs)
        .context("failed to create prompt logger")?;
    let agent = ClaudeAgent::from_env(logger)?;

    let repair = if cli.quick {
        RepairConfig::quick()
    } else {
        RepairConfig::default()
    };
    let pipeline = Pipeline::new(
        profile.as_ref(),
        &agent,
        &examples,
        &context_files,
        repair,
    );

    let root_dir = config.root_dir();
    let excluded_dirs = config.excluded_dirs();
    let excluded_files = config.excluded_files().to_vec();

    let mut visited = HashSet::new();
    let mut completed = 0i32;
    while cli.generations == -1 || completed < cli.generations {
        info!(iteration = completed + 1, "starting test generation");
        let outcome = pipeline
            .generate_next_test(&root_dir, &excluded_dirs, &excluded_files, &mut visited)
            .await?;
        match outcome {
            RunOutcome::NoEligibleFiles => {
                info!("no more files need tests, stopping generation");
                break;
            }
            RunOutcome::Generated(report) => {
                print!("{}", report.format_summary());
                completed += 1;
            }
        }
    }

    info!(count = completed, "completed requested generations");
    Ok(())
}
