//! Command line interface for the `stepwright` binary.
//!
//! Also read by the build script to render the manual page.

use std::path::PathBuf;

use clap::Parser;

/// Command line arguments for the `stepwright` binary.
#[derive(Debug, Parser)]
#[command(
    name = "stepwright",
    version,
    about = "Run declarative JSON test scenarios against HTTP services"
)]
pub struct Cli {
    /// TOML configuration file.
    #[arg(short, long, env = "STEPWRIGHT_CONFIG")]
    pub config: Option<PathBuf>,
    /// Host used to qualify relative REST targets, e.g. `http://localhost`.
    #[arg(long, env = "STEPWRIGHT_HOST")]
    pub host: Option<String>,
    /// Port used to qualify relative REST targets.
    #[arg(long, env = "STEPWRIGHT_PORT")]
    pub port: Option<u16>,
    /// Path prefix inserted between the port and relative REST targets.
    #[arg(long, env = "STEPWRIGHT_CONTEXT")]
    pub context: Option<String>,
    /// Scenario JSON files, run in order.
    #[arg(required = true)]
    pub scenarios: Vec<PathBuf>,
}
