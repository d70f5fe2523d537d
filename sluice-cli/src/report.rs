//! Plain-text tables and JSON output for run reports.
//!
//! Plotting stays outside the simulator; the JSON dump carries everything an
//! external tool needs, including full packet traces for single runs.

use std::path::Path;

use serde::Serialize;
use sluice_core::engine::RunOutcome;
use sluice_core::metrics::RunReport;

/// Prints the buffer configuration header for a batch of runs.
pub fn print_capacity_line(capacity: Option<usize>, offered: usize) {
    match capacity {
        Some(limit) => println!("Offered {offered} packets, buffer capacity {limit}"),
        None => println!("Offered {offered} packets, unbounded buffer"),
    }
}

/// Prints the metrics comparison table.
pub fn print_table(reports: &[RunReport]) {
    let rule = "=".repeat(100);
    println!("\n{rule}");
    println!("PERFORMANCE METRICS COMPARISON");
    println!("{rule}");
    println!(
        "{:<14} {:>9} {:>9} {:>12} {:>12} {:>12} {:>9} {:>9} {:>9}",
        "Strategy",
        "Completed",
        "Dropped",
        "Avg Latency",
        "Avg Waiting",
        "Throughput",
        "Drop %",
        "Pkt Fair",
        "Flow Fair"
    );
    println!("{}", "-".repeat(100));

    for report in reports {
        println!(
            "{:<14} {:>9} {:>9} {:>12.4} {:>12.4} {:>12.4} {:>8.1}% {:>9.4} {:>9.4}",
            report.discipline,
            report.completed,
            report.dropped,
            report.avg_latency,
            report.avg_waiting_time,
            report.throughput,
            report.drop_rate * 100.0,
            report.fairness_per_packet,
            report.fairness_per_flow
        );
    }

    println!("{rule}");
    println!("Note: fairness is Jain's index over packet latencies / per-flow delivery ratios");
    println!("      (1.0 = perfectly equal, 1/n = maximally unequal)");
    println!("{rule}");
}

/// Prints drops-by-flow tables for every report that recorded drops.
pub fn print_flow_breakdowns(reports: &[RunReport]) {
    for report in reports {
        if report.dropped == 0 {
            continue;
        }
        println!("\n{} drops by flow:", report.discipline);
        for (flow, stats) in &report.flows {
            if stats.dropped == 0 {
                continue;
            }
            let share = stats.dropped as f64 / stats.offered as f64 * 100.0;
            println!(
                "  flow {flow}: {}/{} dropped ({share:.1}%)",
                stats.dropped, stats.offered
            );
        }
    }
}

/// Writes the reports as pretty-printed JSON.
///
/// # Errors
/// Fails when the file cannot be written or the reports cannot serialize.
pub fn write_json(path: &Path, reports: &[RunReport]) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(reports)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// A single run's report together with its full packet trace.
#[derive(Serialize)]
struct FullRunDump<'a> {
    report: &'a RunReport,
    outcome: &'a RunOutcome,
}

/// Writes one report plus the stamped and dropped packet sets as JSON, for
/// external plotting and loss analysis.
///
/// # Errors
/// Fails when the file cannot be written or the dump cannot serialize.
pub fn write_json_with_packets(
    path: &Path,
    report: &RunReport,
    outcome: &RunOutcome,
) -> anyhow::Result<()> {
    let dump = FullRunDump { report, outcome };
    let json = serde_json::to_string_pretty(&dump)?;
    std::fs::write(path, json)?;
    Ok(())
}
