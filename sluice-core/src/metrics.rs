//! Metrics derived from one (discipline, packet sequence) run.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::engine::RunOutcome;
use crate::packet::FlowId;

/// Per-flow offered/completed/dropped counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FlowStats {
    /// Packets of this flow that reached admission.
    pub offered: u64,
    /// Packets of this flow that completed service.
    pub completed: u64,
    /// Packets of this flow removed by a drop policy.
    pub dropped: u64,
}

/// Result summary for one run.
///
/// Averages are over completed packets; `drop_rate` is over the congestion
/// universe (completed + dropped). Invalid packets rejected at validation
/// are a distinct error channel and only appear in `rejected`.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Discipline that produced the run.
    pub discipline: String,
    /// Packets that reached admission: completed + dropped.
    pub offered: u64,
    /// Packets that completed service.
    pub completed: u64,
    /// Packets removed by a drop policy.
    pub dropped: u64,
    /// Packets refused at validation.
    pub rejected: u64,
    /// Mean `finish - arrival` over completed packets.
    pub avg_latency: f64,
    /// Mean `start - arrival` over completed packets.
    pub avg_waiting_time: f64,
    /// Completed packets per simulated second of the busy span,
    /// `completed / (max finish - min arrival)`.
    pub throughput: f64,
    /// `dropped / offered`.
    pub drop_rate: f64,
    /// Jain's index over completed packets' latencies.
    pub fairness_per_packet: f64,
    /// Jain's index over per-flow completed/offered ratios. Flows that
    /// offered at least one packet count; a fully dropped flow contributes
    /// a zero ratio.
    pub fairness_per_flow: f64,
    /// Per-flow breakdown.
    pub flows: BTreeMap<FlowId, FlowStats>,
}

/// Jain's fairness index, `(Σx)² / (n·Σx²)`, over non-negative values.
///
/// Ranges from `1/n` (one value dominates) to `1.0` (all equal). An empty
/// or all-zero set yields `0.0`, the maximal-inequality convention.
pub fn jain_index(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let sum: f64 = values.iter().sum();
    let sum_of_squares: f64 = values.iter().map(|x| x * x).sum();
    if sum_of_squares == 0.0 {
        return 0.0;
    }
    (sum * sum) / (values.len() as f64 * sum_of_squares)
}

/// Summarizes a run outcome into a report.
pub fn summarize(discipline: &str, outcome: &RunOutcome) -> RunReport {
    let completed = &outcome.completed;

    let mut flows: BTreeMap<FlowId, FlowStats> = BTreeMap::new();
    for packet in completed {
        let stats = flows.entry(packet.flow).or_default();
        stats.offered += 1;
        stats.completed += 1;
    }
    for packet in &outcome.dropped {
        let stats = flows.entry(packet.flow).or_default();
        stats.offered += 1;
        stats.dropped += 1;
    }

    let latencies: Vec<f64> = completed.iter().filter_map(|p| p.latency()).collect();
    let waiting_times: Vec<f64> = completed.iter().filter_map(|p| p.waiting_time()).collect();

    let avg_latency = mean(&latencies);
    let avg_waiting_time = mean(&waiting_times);

    let throughput = {
        let first_arrival = completed
            .iter()
            .map(|p| p.arrival_time)
            .fold(f64::INFINITY, f64::min);
        let last_finish = completed
            .iter()
            .filter_map(|p| p.finish_time)
            .fold(f64::NEG_INFINITY, f64::max);
        let span = last_finish - first_arrival;
        if completed.is_empty() || span <= 0.0 {
            0.0
        } else {
            completed.len() as f64 / span
        }
    };

    let offered = (completed.len() + outcome.dropped.len()) as u64;
    let drop_rate = if offered == 0 {
        0.0
    } else {
        outcome.dropped.len() as f64 / offered as f64
    };

    let flow_ratios: Vec<f64> = flows
        .values()
        .filter(|stats| stats.offered > 0)
        .map(|stats| stats.completed as f64 / stats.offered as f64)
        .collect();

    RunReport {
        discipline: discipline.to_string(),
        offered,
        completed: completed.len() as u64,
        dropped: outcome.dropped.len() as u64,
        rejected: outcome.rejected.len() as u64,
        avg_latency,
        avg_waiting_time,
        throughput,
        drop_rate,
        fairness_per_packet: jain_index(&latencies),
        fairness_per_flow: jain_index(&flow_ratios),
        flows,
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::{DropReason, Outcome, Packet, PacketArrival};

    fn completed_packet(id: u64, flow: FlowId, arrival: f64, start: f64, service: f64) -> Packet {
        let mut packet = Packet::new(
            PacketArrival {
                id,
                arrival_time: arrival,
                size: 1000,
                priority: 1,
                flow_key: Some(flow),
                service_time: service,
            },
            flow,
        );
        packet.start_time = Some(start);
        packet.finish_time = Some(start + service);
        packet.outcome = Outcome::Completed;
        packet
    }

    fn dropped_packet(id: u64, flow: FlowId, at: f64) -> Packet {
        let mut packet = Packet::new(
            PacketArrival {
                id,
                arrival_time: at,
                size: 1000,
                priority: 1,
                flow_key: Some(flow),
                service_time: 1.0,
            },
            flow,
        );
        packet.mark_dropped(at, DropReason::TailDrop);
        packet
    }

    #[test]
    fn test_jain_index_equal_values() {
        assert_eq!(jain_index(&[2.0, 2.0, 2.0, 2.0]), 1.0);
    }

    #[test]
    fn test_jain_index_one_hot() {
        let index = jain_index(&[1.0, 0.0, 0.0, 0.0]);
        assert!((index - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_jain_index_degenerate_sets() {
        assert_eq!(jain_index(&[]), 0.0);
        assert_eq!(jain_index(&[0.0, 0.0]), 0.0);
        assert_eq!(jain_index(&[3.5]), 1.0);
    }

    #[test]
    fn test_summary_averages_and_throughput() {
        let outcome = RunOutcome {
            completed: vec![
                completed_packet(1, 1, 0.0, 0.0, 1.0), // latency 1, wait 0
                completed_packet(2, 1, 0.0, 1.0, 2.0), // latency 3, wait 1
            ],
            dropped: vec![],
            rejected: vec![],
            final_clock: 3.0,
        };

        let report = summarize("FCFS", &outcome);
        assert_eq!(report.avg_latency, 2.0);
        assert_eq!(report.avg_waiting_time, 0.5);
        // 2 packets over span max(3.0) - min(0.0)
        assert!((report.throughput - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(report.drop_rate, 0.0);
        assert_eq!(report.fairness_per_flow, 1.0);
    }

    #[test]
    fn test_drop_rate_counts_congestion_universe() {
        let outcome = RunOutcome {
            completed: vec![completed_packet(1, 1, 0.0, 0.0, 1.0)],
            dropped: vec![dropped_packet(2, 2, 0.5), dropped_packet(3, 2, 0.6)],
            rejected: vec![],
            final_clock: 1.0,
        };

        let report = summarize("FCFS", &outcome);
        assert_eq!(report.offered, 3);
        assert!((report.drop_rate - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_per_flow_fairness_includes_fully_dropped_flows() {
        // Flow 1 completes everything, flow 2 loses everything.
        let outcome = RunOutcome {
            completed: vec![completed_packet(1, 1, 0.0, 0.0, 1.0)],
            dropped: vec![dropped_packet(2, 2, 0.5)],
            rejected: vec![],
            final_clock: 1.0,
        };

        let report = summarize("FCFS", &outcome);
        // Ratios are [1, 0]: Jain gives 1/2.
        assert!((report.fairness_per_flow - 0.5).abs() < 1e-12);
        assert_eq!(report.flows[&2].dropped, 1);
        assert_eq!(report.flows[&2].completed, 0);
    }

    #[test]
    fn test_empty_run_yields_zeroes() {
        let report = summarize("FCFS", &RunOutcome::default());
        assert_eq!(report.offered, 0);
        assert_eq!(report.avg_latency, 0.0);
        assert_eq!(report.throughput, 0.0);
        assert_eq!(report.drop_rate, 0.0);
        assert_eq!(report.fairness_per_packet, 0.0);
    }
}
