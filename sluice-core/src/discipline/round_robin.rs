//! Round-robin service over per-flow sub-queues.

use std::collections::{BTreeMap, VecDeque};

use crate::discipline::{Admission, QueueDiscipline, at_capacity};
use crate::packet::{DropReason, FlowId, Packet};

/// Cycles over per-flow FIFO queues, serving one packet per visit.
///
/// Sub-queues are created lazily in flow activation order and persist for the
/// run even when momentarily empty. With `num_queues` set, flows fold into
/// `flow % num_queues` buckets, bounding the number of sub-queues the pointer
/// rotates over. Admission uses global tail drop on total occupancy.
#[derive(Debug, Default)]
pub struct RoundRobin {
    /// Sub-queues in activation order; the rotation order.
    queues: Vec<VecDeque<Packet>>,
    /// Bucket key to position in `queues`.
    index: BTreeMap<FlowId, usize>,
    /// Next sub-queue the pointer visits.
    cursor: usize,
    len: usize,
    capacity: Option<usize>,
    num_queues: Option<usize>,
}

impl RoundRobin {
    /// Creates a round-robin discipline with the given buffer capacity and
    /// optional sub-queue count.
    pub fn new(capacity: Option<usize>, num_queues: Option<usize>) -> Self {
        Self {
            queues: Vec::new(),
            index: BTreeMap::new(),
            cursor: 0,
            len: 0,
            capacity,
            num_queues,
        }
    }

    fn bucket_key(&self, flow: FlowId) -> FlowId {
        match self.num_queues {
            Some(n) if n > 0 => flow % n as FlowId,
            _ => flow,
        }
    }
}

impl QueueDiscipline for RoundRobin {
    fn name(&self) -> &'static str {
        "Round-Robin"
    }

    fn admit(&mut self, mut packet: Packet, now: f64) -> Admission {
        if at_capacity(self.capacity, self.len) {
            packet.mark_dropped(now, DropReason::TailDrop);
            return Admission::Dropped(packet);
        }
        let key = self.bucket_key(packet.flow);
        let position = *self.index.entry(key).or_insert_with(|| {
            self.queues.push(VecDeque::new());
            self.queues.len() - 1
        });
        self.queues[position].push_back(packet);
        self.len += 1;
        Admission::Accepted
    }

    fn select_next(&mut self) -> Option<Packet> {
        if self.len == 0 {
            return None;
        }
        // Advance cyclically to the first non-empty sub-queue, then leave
        // the pointer at the following one.
        for step in 0..self.queues.len() {
            let position = (self.cursor + step) % self.queues.len();
            if let Some(packet) = self.queues[position].pop_front() {
                self.cursor = (position + 1) % self.queues.len();
                self.len -= 1;
                return Some(packet);
            }
        }
        None
    }

    fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn occupancy(&self) -> usize {
        self.len
    }
}
