//! Virtual-time fair queueing.

use std::collections::{BTreeMap, VecDeque};

use crate::discipline::{Admission, QueueDiscipline};
use crate::packet::{DropReason, FlowId, Packet};

/// Approximates bit-by-bit round robin with a virtual finish-time clock.
///
/// Each flow keeps a FIFO queue and a `last_finish` scalar. At selection
/// time the candidate virtual finish of every non-empty flow's head packet
/// is `max(virtual_time, last_finish) + service_time`; the smallest wins. A
/// flow that has consumed more service accumulates a larger `last_finish`
/// and is deprioritized proportionally, independent of packet size, which
/// yields max-min fairness among flows.
///
/// Admission uses per-flow fair drop: a full buffer rejects an arrival only
/// when its flow already holds its fair share `max(1, capacity / active)`.
/// A flow under its share is admitted even at full occupancy, so the
/// transient overshoot is bounded by the share rule; this is what lets a
/// small flow keep its packets while a dominant flow pays for congestion.
#[derive(Debug, Default)]
pub struct FairQueue {
    /// Per-flow queues; entries persist for the run once a flow is seen.
    flows: BTreeMap<FlowId, VecDeque<Packet>>,
    /// Virtual finish time of each flow's most recently selected packet.
    last_finish: BTreeMap<FlowId, f64>,
    /// Monotonically non-decreasing virtual clock.
    virtual_time: f64,
    len: usize,
    capacity: Option<usize>,
}

impl FairQueue {
    /// Creates a fair-queueing discipline with the given buffer capacity.
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            flows: BTreeMap::new(),
            last_finish: BTreeMap::new(),
            virtual_time: 0.0,
            len: 0,
            capacity,
        }
    }

    /// Current virtual time, advanced on every selection.
    pub fn virtual_time(&self) -> f64 {
        self.virtual_time
    }

    /// Fair share for the buffer, counting the arriving packet's flow as
    /// active even when its queue is currently empty.
    fn share(&self, capacity: usize, arriving_flow: FlowId) -> usize {
        let mut active = self
            .flows
            .iter()
            .filter(|(_, queue)| !queue.is_empty())
            .count();
        let arriving_queued = self.flows.get(&arriving_flow).map_or(0, VecDeque::len);
        if arriving_queued == 0 {
            active += 1;
        }
        (capacity / active).max(1)
    }
}

impl QueueDiscipline for FairQueue {
    fn name(&self) -> &'static str {
        "Fair Queue"
    }

    fn admit(&mut self, mut packet: Packet, now: f64) -> Admission {
        if let Some(capacity) = self.capacity {
            if self.len >= capacity {
                let share = self.share(capacity, packet.flow);
                let queued = self.flows.get(&packet.flow).map_or(0, VecDeque::len);
                if queued >= share {
                    packet.mark_dropped(now, DropReason::FairDrop);
                    return Admission::Dropped(packet);
                }
            }
        }
        self.flows.entry(packet.flow).or_default().push_back(packet);
        self.len += 1;
        Admission::Accepted
    }

    fn select_next(&mut self) -> Option<Packet> {
        // Smallest candidate virtual finish wins. Equal virtual finishes are
        // the steady state for backlogged flows with equal service times, so
        // ties prefer the flow served least so far (smaller last_finish);
        // remaining ties fall to the smaller flow id via the ascending
        // iteration and strict less-than.
        let mut best: Option<(FlowId, f64, f64)> = None;
        for (&flow, queue) in &self.flows {
            let Some(head) = queue.front() else { continue };
            let last = self.last_finish.get(&flow).copied().unwrap_or(0.0);
            let virtual_start = self.virtual_time.max(last);
            let virtual_finish = virtual_start + head.service_time;
            if best.is_none_or(|(_, finish, best_last)| {
                virtual_finish < finish || (virtual_finish == finish && last < best_last)
            }) {
                best = Some((flow, virtual_finish, last));
            }
        }

        let (flow, virtual_finish, _) = best?;
        let packet = self.flows.get_mut(&flow)?.pop_front()?;
        self.virtual_time = virtual_finish;
        self.last_finish.insert(flow, virtual_finish);
        self.len -= 1;
        Some(packet)
    }

    fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn occupancy(&self) -> usize {
        self.len
    }
}
