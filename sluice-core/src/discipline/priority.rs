//! Strict priority queueing over a single ordered structure.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::discipline::{Admission, QueueDiscipline, at_capacity};
use crate::packet::{DropReason, Packet};

/// Heap entry ordering packets by (priority desc, arrival asc, id asc).
#[derive(Debug)]
struct HeapEntry {
    packet: Packet,
}

impl Eq for HeapEntry {}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.packet.id == other.packet.id
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Higher priority level first
        match self.packet.priority.cmp(&other.packet.priority) {
            Ordering::Equal => {
                // Earlier arrival first
                match self
                    .packet
                    .arrival_time
                    .total_cmp(&other.packet.arrival_time)
                {
                    // Deterministic by id for reproducibility
                    Ordering::Equal => self.packet.id.cmp(&other.packet.id).reverse(),
                    other => other.reverse(),
                }
            }
            other => other,
        }
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Always serves the highest-priority queued packet.
///
/// Equal priority falls back to arrival order. There is deliberately no
/// starvation protection: low-priority packets wait as long as any
/// higher-priority packet is queued, which is the contrast the fairness-aware
/// disciplines are measured against. Admission uses global tail drop.
#[derive(Debug, Default)]
pub struct PriorityQueue {
    heap: BinaryHeap<HeapEntry>,
    capacity: Option<usize>,
}

impl PriorityQueue {
    /// Creates a priority discipline with the given buffer capacity.
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            heap: BinaryHeap::new(),
            capacity,
        }
    }
}

impl QueueDiscipline for PriorityQueue {
    fn name(&self) -> &'static str {
        "Priority"
    }

    fn admit(&mut self, mut packet: Packet, now: f64) -> Admission {
        if at_capacity(self.capacity, self.heap.len()) {
            packet.mark_dropped(now, DropReason::TailDrop);
            return Admission::Dropped(packet);
        }
        self.heap.push(HeapEntry { packet });
        Admission::Accepted
    }

    fn select_next(&mut self) -> Option<Packet> {
        self.heap.pop().map(|entry| entry.packet)
    }

    fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    fn occupancy(&self) -> usize {
        self.heap.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::PacketArrival;

    fn packet(id: u64, arrival_time: f64, priority: u8) -> Packet {
        Packet::new(
            PacketArrival {
                id,
                arrival_time,
                size: 1000,
                priority,
                flow_key: None,
                service_time: 1.0,
            },
            u64::from(priority),
        )
    }

    #[test]
    fn test_higher_priority_wins() {
        let mut pq = PriorityQueue::new(None);
        pq.admit(packet(1, 0.0, 1), 0.0);
        pq.admit(packet(2, 1.0, 3), 1.0);
        pq.admit(packet(3, 2.0, 2), 2.0);

        assert_eq!(pq.select_next().unwrap().priority, 3);
        assert_eq!(pq.select_next().unwrap().priority, 2);
        assert_eq!(pq.select_next().unwrap().priority, 1);
    }

    #[test]
    fn test_equal_priority_falls_back_to_arrival_order() {
        let mut pq = PriorityQueue::new(None);
        pq.admit(packet(2, 1.0, 2), 1.0);
        pq.admit(packet(1, 0.5, 2), 1.0);

        assert_eq!(pq.select_next().unwrap().id, 1);
        assert_eq!(pq.select_next().unwrap().id, 2);
    }

    #[test]
    fn test_equal_priority_and_arrival_breaks_by_id() {
        let mut pq = PriorityQueue::new(None);
        pq.admit(packet(5, 1.0, 2), 1.0);
        pq.admit(packet(4, 1.0, 2), 1.0);

        assert_eq!(pq.select_next().unwrap().id, 4);
        assert_eq!(pq.select_next().unwrap().id, 5);
    }

    #[test]
    fn test_tail_drop_at_capacity() {
        let mut pq = PriorityQueue::new(Some(1));
        pq.admit(packet(1, 0.0, 1), 0.0);

        // A higher-priority arrival is still rejected: tail drop never
        // evicts queued packets.
        match pq.admit(packet(2, 0.1, 3), 0.1) {
            Admission::Dropped(dropped) => assert_eq!(dropped.id, 2),
            Admission::Accepted => panic!("expected tail drop at capacity"),
        }
        assert_eq!(pq.occupancy(), 1);
    }
}
