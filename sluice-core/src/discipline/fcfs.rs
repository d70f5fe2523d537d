//! First-come, first-served: a single global queue in strict arrival order.

use std::collections::VecDeque;

use crate::discipline::{Admission, QueueDiscipline, at_capacity};
use crate::packet::{DropReason, Packet};

/// Serves packets in exactly the order they arrived.
///
/// Arrival order is already total: the engine admits packets in
/// non-decreasing arrival time, with equal timestamps broken by sequence id.
/// Admission uses global tail drop.
#[derive(Debug, Default)]
pub struct Fcfs {
    queue: VecDeque<Packet>,
    capacity: Option<usize>,
}

impl Fcfs {
    /// Creates an FCFS discipline with the given buffer capacity.
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            queue: VecDeque::new(),
            capacity,
        }
    }
}

impl QueueDiscipline for Fcfs {
    fn name(&self) -> &'static str {
        "FCFS"
    }

    fn admit(&mut self, mut packet: Packet, now: f64) -> Admission {
        if at_capacity(self.capacity, self.queue.len()) {
            packet.mark_dropped(now, DropReason::TailDrop);
            return Admission::Dropped(packet);
        }
        self.queue.push_back(packet);
        Admission::Accepted
    }

    fn select_next(&mut self) -> Option<Packet> {
        self.queue.pop_front()
    }

    fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    fn occupancy(&self) -> usize {
        self.queue.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::{Outcome, PacketArrival};

    fn packet(id: u64, arrival_time: f64) -> Packet {
        Packet::new(
            PacketArrival {
                id,
                arrival_time,
                size: 1000,
                priority: 1,
                flow_key: None,
                service_time: 1.0,
            },
            1,
        )
    }

    #[test]
    fn test_serves_in_arrival_order() {
        let mut fcfs = Fcfs::new(None);
        fcfs.admit(packet(1, 0.0), 0.0);
        fcfs.admit(packet(2, 1.0), 1.0);
        fcfs.admit(packet(3, 2.0), 2.0);

        assert_eq!(fcfs.select_next().unwrap().id, 1);
        assert_eq!(fcfs.select_next().unwrap().id, 2);
        assert_eq!(fcfs.select_next().unwrap().id, 3);
        assert!(fcfs.select_next().is_none());
    }

    #[test]
    fn test_tail_drop_rejects_arrival() {
        let mut fcfs = Fcfs::new(Some(2));
        assert!(matches!(fcfs.admit(packet(1, 0.0), 0.0), Admission::Accepted));
        assert!(matches!(fcfs.admit(packet(2, 0.1), 0.1), Admission::Accepted));

        match fcfs.admit(packet(3, 0.2), 0.2) {
            Admission::Dropped(dropped) => {
                assert_eq!(dropped.id, 3);
                assert_eq!(
                    dropped.outcome,
                    Outcome::Dropped {
                        at: 0.2,
                        reason: DropReason::TailDrop
                    }
                );
            }
            Admission::Accepted => panic!("expected tail drop at capacity"),
        }
        // The queue itself is untouched.
        assert_eq!(fcfs.occupancy(), 2);
        assert_eq!(fcfs.select_next().unwrap().id, 1);
    }

    #[test]
    fn test_empty_queue_query() {
        let mut fcfs = Fcfs::new(None);
        assert!(fcfs.is_empty());
        assert_eq!(fcfs.occupancy(), 0);
        assert!(fcfs.select_next().is_none());
    }
}
