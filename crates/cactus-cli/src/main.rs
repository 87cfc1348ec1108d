// SPDX-License-Identifier: MIT OR Apache-2.0
//! `cactus` — the conformance harness's execution entry point.
#![deny(unsafe_code)]

mod output;
mod report;
mod requests;

use anyhow::{Context, Result};
use cactus_config::{load_global_config, parse_run_config};
use cactus_engine::{Engine, Procedure, ProcedureStep};
use cactus_model::Step;
use clap::Parser;
use output::OutputDir;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Exit code used for any failure that isn't the evaluator reporting `FAIL`
/// (config errors, setup failures, IO failures writing the output directory).
const EXIT_SETUP_ERROR: i32 = 2;
/// Exit code used when the evaluator ran to completion and reported `FAIL`.
const EXIT_EVALUATION_FAILED: i32 = 1;

#[derive(Parser, Debug)]
#[command(name = "cactus", version, about = "CSIP-Aus/IEEE 2030.5 conformance test harness")]
struct Cli {
    /// Path to the global config TOML (every known client plus the server
    /// under test).
    #[arg(long)]
    global_config: PathBuf,

    /// Path to the run config TOML (procedure id, participating client
    /// aliases, protocol minor-version target, headless flag).
    #[arg(long)]
    run_config: PathBuf,

    /// Base directory under which `run NNN - <procedure-id>/` is created.
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Enable debug logging.
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(passed) => std::process::exit(if passed { 0 } else { EXIT_EVALUATION_FAILED }),
        Err(error) => {
            eprintln!("error: {error:#}");
            std::process::exit(EXIT_SETUP_ERROR);
        }
    }
}

async fn run(cli: Cli) -> Result<bool> {
    let global = load_global_config(&cli.global_config).with_context(|| format!("loading global config from {}", cli.global_config.display()))?;
    let run_config_content = std::fs::read_to_string(&cli.run_config).with_context(|| format!("reading run config from {}", cli.run_config.display()))?;
    let run_config = parse_run_config(&run_config_content).context("parsing run config")?;

    let output = OutputDir::create(&cli.output_dir, &run_config.test_procedure_id).context("creating run output directory")?;

    let _file_guard = init_logging(&output.log_path(), cli.debug)?;

    output.write_marker(".testprocedureid", &run_config.test_procedure_id)?;
    output.write_marker(".csipaustarget", &run_config.protocol_minor_version)?;
    output.write_marker(".clientids", &run_config.client_aliases.join("\n"))?;
    output.write_marker(".versions", &format!("cactus {}\nprotocol {}", env!("CARGO_PKG_VERSION"), run_config.protocol_minor_version))?;

    tracing::info!(target: "cactus.cli", run_id = output.run_id(), procedure = %run_config.test_procedure_id, "starting run");

    // Loading a procedure document into `Step`s is out of scope for this
    // harness; every step here is attributed to
    // the run's first client alias, driving discovery against the server.
    let owning_client = run_config.client_aliases.first().cloned().context("run config named no client aliases")?;
    let procedure = Procedure {
        id: run_config.test_procedure_id.clone(),
        steps: vec![ProcedureStep {
            step: discovery_step(),
            owning_client_alias: owning_client,
            resource_owning_client_alias: None,
        }],
    };

    let engine = Engine::build(&global, &run_config, procedure).context("assembling run")?;
    let (outcome, responses) = engine.run().await;

    requests::write_all(&output.requests_dir(), &responses.entries()).context("writing request/response log")?;
    output.write_result(outcome.passed)?;
    output.write_report(&report::render(&run_config.test_procedure_id, output.run_id(), &outcome))?;

    if outcome.passed {
        tracing::info!(target: "cactus.cli", "run PASSED");
    } else {
        tracing::warn!(target: "cactus.cli", reasons = ?outcome.reasons, "run FAILED");
    }

    Ok(outcome.passed)
}

fn discovery_step() -> Step {
    use cactus_model::{Invocation, ParamMap, ParamValue};
    let mut params = ParamMap::new();
    params.insert("targets".to_string(), ParamValue::List(vec![ParamValue::String("end-device".to_string())]));
    Step {
        id: "discover".to_string(),
        action: Invocation { type_name: "discovery".to_string(), params },
        checks: Vec::new(),
        repeat_until_pass: false,
    }
}

fn init_logging(log_path: &std::path::Path, debug: bool) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let directory = log_path.parent().context("cactus.log path has no parent directory")?;
    let file_name = log_path.file_name().context("cactus.log path has no file name")?;
    let appender = tracing_appender::rolling::never(directory, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);

    let filter = if debug { EnvFilter::new("cactus=debug") } else { EnvFilter::new("cactus=info") };
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(non_blocking).with_ansi(false).init();

    Ok(guard)
}
