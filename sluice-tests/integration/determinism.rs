//! Whole-run determinism: a fresh engine/discipline pair over an identical
//! pre-generated sequence reproduces every timestamp and metric.

use sluice_core::discipline::{DisciplineConfig, DisciplineKind};
use sluice_core::engine::{Engine, RunOutcome};
use sluice_core::metrics::summarize;
use sluice_core::packet::PacketArrival;
use sluice_traffic::{Scenario, TrafficConfig, TrafficGenerator, TrafficModel};

fn run_fresh(kind: DisciplineKind, capacity: Option<usize>, arrivals: &[PacketArrival]) -> RunOutcome {
    let mut discipline = kind.build(DisciplineConfig {
        capacity,
        num_queues: None,
    });
    Engine::new()
        .run(discipline.as_mut(), arrivals)
        .expect("valid traffic")
}

#[test]
fn test_reruns_are_identical_for_every_discipline() {
    let config = TrafficConfig {
        packets: 200,
        arrival_rate: 4.0,
        model: TrafficModel::Bursty {
            burst_size: 6,
            intra_gap: 0.02,
        },
        ..TrafficConfig::default()
    };
    let arrivals = TrafficGenerator::new(42).generate(&config);

    for kind in DisciplineKind::all() {
        let first = run_fresh(kind, Some(12), &arrivals);
        let second = run_fresh(kind, Some(12), &arrivals);

        // Byte-identical packet stamps, drop records, and clock.
        assert_eq!(first.completed, second.completed, "{kind} diverged");
        assert_eq!(first.dropped, second.dropped, "{kind} diverged");
        assert_eq!(first.final_clock, second.final_clock, "{kind} diverged");

        // And therefore identical serialized reports.
        let first_report = serde_json::to_string(&summarize("run", &first)).unwrap();
        let second_report = serde_json::to_string(&summarize("run", &second)).unwrap();
        assert_eq!(first_report, second_report);
    }
}

#[test]
fn test_scenarios_reproduce_end_to_end() {
    for scenario in Scenario::all() {
        let arrivals = scenario.traffic(42);
        let capacity = Some(scenario.recommended_capacity());

        for kind in DisciplineKind::all() {
            let first = run_fresh(kind, capacity, &arrivals);
            let second = run_fresh(kind, capacity, &arrivals);
            assert_eq!(first.completed, second.completed);
            assert_eq!(first.dropped, second.dropped);
        }
    }
}

#[test]
fn test_regenerated_traffic_reproduces_too() {
    // Not just re-running the same Vec: regenerating from the same seed
    // yields the identical sequence, so end-to-end results match.
    let config = TrafficConfig {
        packets: 120,
        arrival_rate: 3.0,
        ..TrafficConfig::default()
    };
    let first_arrivals = TrafficGenerator::new(7).generate(&config);
    let second_arrivals = TrafficGenerator::new(7).generate(&config);
    assert_eq!(first_arrivals, second_arrivals);

    let first = run_fresh(DisciplineKind::FairQueue, Some(10), &first_arrivals);
    let second = run_fresh(DisciplineKind::FairQueue, Some(10), &second_arrivals);
    assert_eq!(first.completed, second.completed);
    assert_eq!(first.dropped, second.dropped);
}
