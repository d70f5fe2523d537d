//! Packet conservation: every offered packet is exactly one of completed,
//! congestion-dropped, or rejected-invalid.

use proptest::prelude::*;
use sluice_core::discipline::{DisciplineConfig, DisciplineKind};
use sluice_core::engine::Engine;
use sluice_core::packet::PacketArrival;
use sluice_traffic::{TrafficConfig, TrafficGenerator, TrafficModel};

fn run_conservation(kind: DisciplineKind, capacity: Option<usize>, arrivals: &[PacketArrival]) {
    let mut discipline = kind.build(DisciplineConfig {
        capacity,
        num_queues: None,
    });
    let outcome = Engine::new()
        .run(discipline.as_mut(), arrivals)
        .expect("default mode never aborts");

    assert_eq!(
        outcome.completed.len() + outcome.dropped.len() + outcome.rejected.len(),
        arrivals.len(),
        "{kind} leaked or duplicated packets"
    );
    assert!(
        discipline.is_empty(),
        "{kind} left packets queued after the run"
    );
}

#[test]
fn test_conservation_under_congestion() {
    let config = TrafficConfig {
        packets: 150,
        arrival_rate: 5.0,
        model: TrafficModel::Bursty {
            burst_size: 10,
            intra_gap: 0.01,
        },
        ..TrafficConfig::default()
    };
    let arrivals = TrafficGenerator::new(42).generate(&config);

    for kind in DisciplineKind::all() {
        run_conservation(kind, Some(10), &arrivals);
        run_conservation(kind, None, &arrivals);
    }
}

#[test]
fn test_conservation_with_invalid_packets_mixed_in() {
    let mut arrivals = TrafficGenerator::new(7).generate(&TrafficConfig {
        packets: 40,
        ..TrafficConfig::default()
    });
    // Corrupt a few arrivals; they must land on the rejected channel.
    arrivals[5].size = 0;
    arrivals[11].service_time = -1.0;
    arrivals[23].service_time = f64::NAN;

    for kind in DisciplineKind::all() {
        let mut discipline = kind.build(DisciplineConfig::bounded(8));
        let outcome = Engine::new()
            .run(discipline.as_mut(), &arrivals)
            .expect("default mode never aborts");

        assert_eq!(outcome.rejected.len(), 3);
        assert_eq!(
            outcome.completed.len() + outcome.dropped.len() + outcome.rejected.len(),
            arrivals.len()
        );
    }
}

proptest! {
    #[test]
    fn prop_conservation_holds_for_any_workload(
        seed in any::<u64>(),
        packets in 0usize..120,
        rate in 0.5f64..6.0,
        capacity in prop::option::of(0usize..25),
        kind_index in 0usize..5,
    ) {
        let config = TrafficConfig {
            packets,
            arrival_rate: rate,
            ..TrafficConfig::default()
        };
        let arrivals = TrafficGenerator::new(seed).generate(&config);
        let kind = DisciplineKind::all()[kind_index];

        let mut discipline = kind.build(DisciplineConfig { capacity, num_queues: None });
        let outcome = Engine::new()
            .run(discipline.as_mut(), &arrivals)
            .expect("generated traffic is valid");

        prop_assert_eq!(
            outcome.completed.len() + outcome.dropped.len() + outcome.rejected.len(),
            arrivals.len()
        );
        prop_assert!(discipline.is_empty());

        // Completed packets always satisfy the timing invariant.
        for packet in &outcome.completed {
            let start = packet.start_time.unwrap();
            let finish = packet.finish_time.unwrap();
            prop_assert!(packet.arrival_time <= start);
            prop_assert!((finish - start - packet.service_time).abs() < 1e-9);
        }
    }
}
