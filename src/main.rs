//! `stepwright` binary: runs scenario files with the HTTP and in-process
//! backends.
//!
//! The in-process registry starts empty, so a step naming an operation fails
//! with "no operation registered" unless a host program embeds the library
//! and registers its own. No broker is attached; `topic://` steps fail as
//! unconfigured.

mod cli;

use std::process::ExitCode;

use clap::Parser;
use stepwright::{EngineConfig, ScenarioRunner, ScenarioSpec, config::ConfigError};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

fn load_config(cli: &Cli) -> Result<EngineConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_toml_file(path)?,
        None => EngineConfig::default(),
    };
    if let Some(host) = &cli.host {
        config.endpoint.host.clone_from(host);
    }
    if let Some(port) = cli.port {
        config.endpoint.port = port;
    }
    if let Some(context) = &cli.context {
        config.endpoint.context.clone_from(context);
    }
    Ok(config.normalized())
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("stepwright: {err}");
            return ExitCode::from(2);
        }
    };

    let runner = ScenarioRunner::from_config(&config);
    let mut failed = 0usize;
    for path in &cli.scenarios {
        let scenario = match ScenarioSpec::from_file(path) {
            Ok(scenario) => scenario,
            Err(err) => {
                eprintln!("stepwright: cannot load {}: {err}", path.display());
                failed += 1;
                continue;
            }
        };
        let report = runner.run(&scenario).await;
        let verdict = if report.passed() { "PASS" } else { "FAIL" };
        println!("{verdict} {}", report.scenario_name);
        for step in &report.steps {
            println!("  {step}");
        }
        if !report.passed() {
            failed += 1;
        }
    }

    println!("{} scenario(s), {failed} failed", cli.scenarios.len());
    if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
