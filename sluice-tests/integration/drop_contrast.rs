//! The drop-policy contrast scenario: three flows bursting 30/5/5 packets
//! into a 20-packet buffer, with the dominant flow arriving first.
//!
//! Global tail drop punishes whoever arrives last; per-flow fair drop makes
//! the dominant flow absorb the congestion; LAS eviction reclaims space
//! from the most-served flow.

use sluice_core::discipline::{DisciplineConfig, DisciplineKind};
use sluice_core::engine::Engine;
use sluice_core::metrics::summarize;
use sluice_core::packet::{DropReason, Outcome, PacketArrival};

const CAPACITY: usize = 20;

/// Flow 1 bursts 30 packets, then flows 2 and 3 burst 5 each, all at t=0.
fn burst_arrivals() -> Vec<PacketArrival> {
    let mut arrivals = Vec::new();
    let mut id = 0;
    for (flow, count) in [(1u8, 30), (2u8, 5), (3u8, 5)] {
        for _ in 0..count {
            arrivals.push(PacketArrival {
                id,
                arrival_time: 0.0,
                size: 1000,
                priority: flow,
                flow_key: None,
                service_time: 1.0,
            });
            id += 1;
        }
    }
    arrivals
}

#[test]
fn test_tail_drop_starves_late_flows() {
    let arrivals = burst_arrivals();
    let mut discipline = DisciplineKind::Fcfs.build(DisciplineConfig::bounded(CAPACITY));
    let outcome = Engine::new().run(discipline.as_mut(), &arrivals).unwrap();
    let report = summarize("FCFS", &outcome);

    // Flow 1 fills the buffer; everything after is rejected.
    assert_eq!(report.flows[&1].completed, 20);
    assert_eq!(report.flows[&1].dropped, 10);
    assert_eq!(report.flows[&2].dropped, 5);
    assert_eq!(report.flows[&3].dropped, 5);

    // 100% loss for the late flows.
    assert_eq!(report.flows[&2].completed, 0);
    assert_eq!(report.flows[&3].completed, 0);

    for packet in &outcome.dropped {
        assert!(matches!(
            packet.outcome,
            Outcome::Dropped {
                reason: DropReason::TailDrop,
                ..
            }
        ));
    }
}

#[test]
fn test_fair_drop_shields_small_flows() {
    let arrivals = burst_arrivals();
    let mut discipline = DisciplineKind::FairQueue.build(DisciplineConfig::bounded(CAPACITY));
    let outcome = Engine::new().run(discipline.as_mut(), &arrivals).unwrap();
    let report = summarize("Fair Queue", &outcome);

    // Flows 2 and 3 offer fewer packets than their fair share and lose
    // nothing; flow 1 absorbs all the congestion.
    assert_eq!(report.flows[&2].dropped, 0);
    assert_eq!(report.flows[&3].dropped, 0);
    assert_eq!(report.flows[&1].dropped, 10);
    assert_eq!(report.flows[&1].completed, 20);

    for packet in &outcome.dropped {
        assert_eq!(packet.flow, 1);
        assert!(matches!(
            packet.outcome,
            Outcome::Dropped {
                reason: DropReason::FairDrop,
                ..
            }
        ));
    }
}

#[test]
fn test_fair_drop_improves_flow_fairness_over_tail_drop() {
    let arrivals = burst_arrivals();

    let mut fcfs = DisciplineKind::Fcfs.build(DisciplineConfig::bounded(CAPACITY));
    let fcfs_report = summarize(
        "FCFS",
        &Engine::new().run(fcfs.as_mut(), &arrivals).unwrap(),
    );

    let mut fair = DisciplineKind::FairQueue.build(DisciplineConfig::bounded(CAPACITY));
    let fair_report = summarize(
        "Fair Queue",
        &Engine::new().run(fair.as_mut(), &arrivals).unwrap(),
    );

    assert!(fair_report.fairness_per_flow > fcfs_report.fairness_per_flow);
}

#[test]
fn test_las_eviction_charges_queued_flow_not_newcomer() {
    let arrivals = burst_arrivals();
    let mut discipline = DisciplineKind::Las.build(DisciplineConfig::bounded(CAPACITY));
    let outcome = Engine::new().run(discipline.as_mut(), &arrivals).unwrap();
    let report = summarize("LAS", &outcome);

    // Every drop is an eviction of an already-queued flow-1 packet; the
    // late flows' packets are all admitted and eventually served.
    assert_eq!(report.flows[&2].dropped, 0);
    assert_eq!(report.flows[&3].dropped, 0);
    assert_eq!(report.flows[&1].dropped, 20);

    for packet in &outcome.dropped {
        assert_eq!(packet.flow, 1);
        assert!(matches!(
            packet.outcome,
            Outcome::Dropped {
                reason: DropReason::MaxServiceEviction,
                ..
            }
        ));
    }
}
