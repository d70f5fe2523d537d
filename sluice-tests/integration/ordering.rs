//! Ordering guarantees: FCFS completion order and strict priority
//! selection.

use sluice_core::discipline::{DisciplineConfig, DisciplineKind};
use sluice_core::engine::Engine;
use sluice_core::packet::PacketArrival;
use sluice_traffic::{TrafficConfig, TrafficGenerator};

#[test]
fn test_fcfs_completes_in_arrival_order() {
    let arrivals = TrafficGenerator::new(42).generate(&TrafficConfig {
        packets: 80,
        arrival_rate: 4.0,
        ..TrafficConfig::default()
    });

    let mut discipline = DisciplineKind::Fcfs.build(DisciplineConfig::unbounded());
    let outcome = Engine::new().run(discipline.as_mut(), &arrivals).unwrap();

    let completed_ids: Vec<_> = outcome.completed.iter().map(|p| p.id).collect();
    let mut sorted = completed_ids.clone();
    sorted.sort_unstable();
    assert_eq!(completed_ids, sorted);
}

#[test]
fn test_fcfs_order_survives_drops() {
    let arrivals = TrafficGenerator::new(42).generate(&TrafficConfig {
        packets: 80,
        arrival_rate: 6.0,
        ..TrafficConfig::default()
    });

    let mut discipline = DisciplineKind::Fcfs.build(DisciplineConfig::bounded(5));
    let outcome = Engine::new().run(discipline.as_mut(), &arrivals).unwrap();

    // Accepted packets still complete in arrival order.
    let completed_ids: Vec<_> = outcome.completed.iter().map(|p| p.id).collect();
    let mut sorted = completed_ids.clone();
    sorted.sort_unstable();
    assert_eq!(completed_ids, sorted);
    assert!(!outcome.dropped.is_empty());
}

#[test]
fn test_priority_selects_higher_level_when_both_queued() {
    // Two packets arrive while the server is busy with the first; the
    // higher level goes first even though it arrived later.
    let arrivals = vec![
        PacketArrival {
            id: 0,
            arrival_time: 0.0,
            size: 1000,
            priority: 1,
            flow_key: None,
            service_time: 2.0,
        },
        PacketArrival {
            id: 1,
            arrival_time: 0.5,
            size: 1000,
            priority: 1,
            flow_key: None,
            service_time: 1.0,
        },
        PacketArrival {
            id: 2,
            arrival_time: 1.0,
            size: 1000,
            priority: 2,
            flow_key: None,
            service_time: 1.0,
        },
    ];

    let mut discipline = DisciplineKind::Priority.build(DisciplineConfig::unbounded());
    let outcome = Engine::new().run(discipline.as_mut(), &arrivals).unwrap();

    let order: Vec<_> = outcome.completed.iter().map(|p| p.id).collect();
    assert_eq!(order, vec![0, 2, 1]);
}

#[test]
fn test_priority_equal_levels_resolve_by_arrival() {
    let arrivals: Vec<_> = (0..6)
        .map(|i| PacketArrival {
            id: i,
            arrival_time: 0.0,
            size: 1000,
            priority: 2,
            flow_key: None,
            service_time: 0.5,
        })
        .collect();

    let mut discipline = DisciplineKind::Priority.build(DisciplineConfig::unbounded());
    let outcome = Engine::new().run(discipline.as_mut(), &arrivals).unwrap();

    let order: Vec<_> = outcome.completed.iter().map(|p| p.id).collect();
    assert_eq!(order, vec![0, 1, 2, 3, 4, 5]);
}

#[test]
fn test_priority_can_starve_low_priority() {
    // Continuous high-priority load: the lone low-priority packet waits for
    // every high-priority packet despite arriving first.
    let mut arrivals = vec![PacketArrival {
        id: 0,
        arrival_time: 0.0,
        size: 1000,
        priority: 1,
        flow_key: None,
        service_time: 1.0,
    }];
    arrivals.extend((1..10).map(|i| PacketArrival {
        id: i,
        arrival_time: 0.0,
        size: 1000,
        priority: 5,
        flow_key: None,
        service_time: 1.0,
    }));

    let mut discipline = DisciplineKind::Priority.build(DisciplineConfig::unbounded());
    let outcome = Engine::new().run(discipline.as_mut(), &arrivals).unwrap();

    assert_eq!(outcome.completed.last().unwrap().id, 0);
}
