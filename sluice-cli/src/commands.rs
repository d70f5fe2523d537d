//! CLI command implementations

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Subcommand};
use sluice_core::discipline::{DisciplineConfig, DisciplineKind};
use sluice_core::engine::Engine;
use sluice_core::metrics::{RunReport, summarize};
use sluice_core::packet::PacketArrival;
use sluice_traffic::{Scenario, TrafficConfig, TrafficGenerator, TrafficModel};
use tracing::info;

use crate::report;

/// Traffic-generation options shared by the simulation commands.
#[derive(Debug, Args)]
pub struct TrafficArgs {
    /// Number of packets to generate
    #[arg(short, long, default_value = "100")]
    packets: usize,
    /// Average packets per simulated second
    #[arg(short, long, default_value = "2.0")]
    rate: f64,
    /// Share of high-priority packets, 0.0 to 1.0
    #[arg(long)]
    high_priority: Option<f64>,
    /// Random seed for reproducible traffic
    #[arg(short, long, default_value = "42")]
    seed: u64,
    /// Use bursty instead of Poisson arrivals
    #[arg(long)]
    bursty: bool,
    /// Packets per burst (bursty traffic only)
    #[arg(long, default_value = "8")]
    burst_size: usize,
}

impl TrafficArgs {
    fn generate(&self) -> Vec<PacketArrival> {
        let mut config = TrafficConfig {
            packets: self.packets,
            arrival_rate: self.rate,
            model: if self.bursty {
                TrafficModel::Bursty {
                    burst_size: self.burst_size,
                    intra_gap: 0.01,
                }
            } else {
                TrafficModel::Poisson
            },
            ..TrafficConfig::default()
        };
        if let Some(ratio) = self.high_priority {
            config = config.with_high_priority_ratio(ratio);
        }
        TrafficGenerator::new(self.seed).generate(&config)
    }
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Compare every discipline on one generated workload
    Compare {
        #[command(flatten)]
        traffic: TrafficArgs,
        /// Buffer capacity in packets (omit for unbounded)
        #[arg(short, long)]
        capacity: Option<usize>,
        /// Round-robin sub-queue count
        #[arg(long)]
        num_queues: Option<usize>,
        /// Write the reports as JSON to this path
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Run a single discipline and show its report
    Run {
        /// Discipline: fcfs, priority, round-robin, fair-queue, or las
        discipline: String,
        #[command(flatten)]
        traffic: TrafficArgs,
        /// Buffer capacity in packets (omit for unbounded)
        #[arg(short, long)]
        capacity: Option<usize>,
        /// Round-robin sub-queue count
        #[arg(long)]
        num_queues: Option<usize>,
        /// Write the report and the full stamped packet sets as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Run a canned traffic scenario across every discipline
    Scenario {
        /// Scenario name: message-texting, video-streaming, online-meeting,
        /// file-download, or mice-and-elephants
        name: String,
        /// Buffer capacity (defaults to the scenario's recommendation)
        #[arg(short, long)]
        capacity: Option<usize>,
        /// Random seed
        #[arg(short, long, default_value = "42")]
        seed: u64,
        /// Write the reports as JSON to this path
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// List the available scenarios
    Scenarios,
}

/// Handle the CLI command
///
/// # Errors
/// Returns an error when traffic generation, a simulation run, or report
/// output fails.
pub fn handle_command(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Compare {
            traffic,
            capacity,
            num_queues,
            json,
        } => compare(&traffic, capacity, num_queues, json),
        Commands::Run {
            discipline,
            traffic,
            capacity,
            num_queues,
            json,
        } => run_single(&discipline, &traffic, capacity, num_queues, json),
        Commands::Scenario {
            name,
            capacity,
            seed,
            json,
        } => run_scenario(&name, capacity, seed, json),
        Commands::Scenarios => {
            for scenario in Scenario::all() {
                println!(
                    "{:<20} (recommended capacity: {})",
                    scenario.name(),
                    scenario.recommended_capacity()
                );
            }
            Ok(())
        }
    }
}

/// Runs one discipline over the arrivals and summarizes the outcome.
fn simulate(
    kind: DisciplineKind,
    config: DisciplineConfig,
    arrivals: &[PacketArrival],
) -> anyhow::Result<RunReport> {
    let mut discipline = kind.build(config);
    let outcome = Engine::new()
        .run(discipline.as_mut(), arrivals)
        .with_context(|| format!("simulating {kind}"))?;
    Ok(summarize(discipline.name(), &outcome))
}

fn compare(
    traffic: &TrafficArgs,
    capacity: Option<usize>,
    num_queues: Option<usize>,
    json: Option<PathBuf>,
) -> anyhow::Result<()> {
    let arrivals = traffic.generate();
    info!(packets = arrivals.len(), "generated workload");

    let config = DisciplineConfig {
        capacity,
        num_queues,
    };
    let reports = DisciplineKind::all()
        .iter()
        .map(|kind| simulate(*kind, config, &arrivals))
        .collect::<anyhow::Result<Vec<_>>>()?;

    report::print_capacity_line(capacity, arrivals.len());
    report::print_table(&reports);
    report::print_flow_breakdowns(&reports);

    if let Some(path) = json {
        report::write_json(&path, &reports)?;
        println!("\nReports written to {}", path.display());
    }
    Ok(())
}

fn run_single(
    discipline: &str,
    traffic: &TrafficArgs,
    capacity: Option<usize>,
    num_queues: Option<usize>,
    json: Option<PathBuf>,
) -> anyhow::Result<()> {
    let kind: DisciplineKind = discipline.parse().map_err(anyhow::Error::msg)?;
    let arrivals = traffic.generate();

    let config = DisciplineConfig {
        capacity,
        num_queues,
    };
    let mut instance = kind.build(config);
    let outcome = Engine::new()
        .run(instance.as_mut(), &arrivals)
        .with_context(|| format!("simulating {kind}"))?;
    let summary = summarize(instance.name(), &outcome);

    report::print_capacity_line(capacity, arrivals.len());
    report::print_table(std::slice::from_ref(&summary));
    report::print_flow_breakdowns(std::slice::from_ref(&summary));

    if let Some(path) = json {
        report::write_json_with_packets(&path, &summary, &outcome)?;
        println!("\nReport and packet trace written to {}", path.display());
    }
    Ok(())
}

fn run_scenario(
    name: &str,
    capacity: Option<usize>,
    seed: u64,
    json: Option<PathBuf>,
) -> anyhow::Result<()> {
    let scenario: Scenario = name.parse().map_err(anyhow::Error::msg)?;
    let arrivals = scenario.traffic(seed);
    let capacity = Some(capacity.unwrap_or(scenario.recommended_capacity()));

    println!("Scenario: {scenario}");
    report::print_capacity_line(capacity, arrivals.len());

    let config = DisciplineConfig {
        capacity,
        num_queues: None,
    };
    let reports = DisciplineKind::all()
        .iter()
        .map(|kind| simulate(*kind, config, &arrivals))
        .collect::<anyhow::Result<Vec<_>>>()?;

    report::print_table(&reports);
    report::print_flow_breakdowns(&reports);

    if let Some(path) = json {
        report::write_json(&path, &reports)?;
        println!("\nReports written to {}", path.display());
    }
    Ok(())
}
