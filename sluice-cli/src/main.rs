//! Sluice CLI - Command-line interface
//!
//! Runs queueing-discipline simulations and reports latency, throughput,
//! drop-rate, and fairness figures.

mod commands;
mod report;

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sluice")]
#[command(about = "A QoS queueing-discipline simulator")]
struct Cli {
    /// Console log level (error, warn, info, debug, trace); RUST_LOG wins
    /// when set
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: commands::Commands,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    commands::handle_command(cli.command)
}
