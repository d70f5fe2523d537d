//! Least-attained-service scheduling.

use std::collections::{BTreeMap, VecDeque};

use crate::discipline::{Admission, QueueDiscipline, at_capacity};
use crate::packet::{DropReason, FlowId, Packet};

/// Serves the flow that has consumed the least service so far.
///
/// Each flow accumulates attained service as its packets complete; the
/// total is never reset, so a flow that has transmitted nothing is always
/// preferred over one that has transmitted anything. This protects short
/// "mouse" flows without explicit priority tags, at the cost of potentially
/// starving a continuously active "elephant" flow while any other flow
/// remains active. The bookkeeping key is monotone and needs no prediction
/// of future finish times, unlike fair queueing's virtual clock.
///
/// Admission at capacity evicts the tail packet of the most-served flow
/// rather than rejecting the newcomer: the flow that has already consumed
/// the most service pays for congestion, whichever order the burst arrived
/// in.
#[derive(Debug, Default)]
pub struct Las {
    /// Per-flow queues; entries persist for the run once a flow is seen.
    flows: BTreeMap<FlowId, VecDeque<Packet>>,
    /// Cumulative service consumed per flow, never reset.
    attained: BTreeMap<FlowId, f64>,
    len: usize,
    capacity: Option<usize>,
}

impl Las {
    /// Creates a LAS discipline with the given buffer capacity.
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            flows: BTreeMap::new(),
            attained: BTreeMap::new(),
            len: 0,
            capacity,
        }
    }

    /// Attained service for a flow; zero until its first completion.
    pub fn attained_service(&self, flow: FlowId) -> f64 {
        self.attained.get(&flow).copied().unwrap_or(0.0)
    }

    /// The non-empty flow with maximum attained service, ties to the
    /// smaller flow id. `None` when nothing is queued.
    fn most_served_flow(&self) -> Option<FlowId> {
        let mut victim: Option<(FlowId, f64)> = None;
        for (&flow, queue) in &self.flows {
            if queue.is_empty() {
                continue;
            }
            let attained = self.attained_service(flow);
            if victim.is_none_or(|(_, best)| attained > best) {
                victim = Some((flow, attained));
            }
        }
        victim.map(|(flow, _)| flow)
    }
}

impl QueueDiscipline for Las {
    fn name(&self) -> &'static str {
        "LAS"
    }

    fn admit(&mut self, mut packet: Packet, now: f64) -> Admission {
        if at_capacity(self.capacity, self.len) {
            let victim = self
                .most_served_flow()
                .and_then(|flow| self.flows.get_mut(&flow))
                .and_then(VecDeque::pop_back);
            match victim {
                Some(mut evicted) => {
                    evicted.mark_dropped(now, DropReason::MaxServiceEviction);
                    self.flows.entry(packet.flow).or_default().push_back(packet);
                    // Occupancy is unchanged: one out, one in.
                    return Admission::Dropped(evicted);
                }
                None => {
                    // Zero capacity: nothing queued to evict.
                    packet.mark_dropped(now, DropReason::MaxServiceEviction);
                    return Admission::Dropped(packet);
                }
            }
        }
        self.attained.entry(packet.flow).or_insert(0.0);
        self.flows.entry(packet.flow).or_default().push_back(packet);
        self.len += 1;
        Admission::Accepted
    }

    fn select_next(&mut self) -> Option<Packet> {
        // Minimum attained service wins; ascending flow-id iteration with
        // strict less-than breaks ties toward the smaller flow id.
        let mut best: Option<(FlowId, f64)> = None;
        for (&flow, queue) in &self.flows {
            if queue.is_empty() {
                continue;
            }
            let attained = self.attained_service(flow);
            if best.is_none_or(|(_, least)| attained < least) {
                best = Some((flow, attained));
            }
        }

        let (flow, _) = best?;
        let packet = self.flows.get_mut(&flow)?.pop_front()?;
        self.len -= 1;
        Some(packet)
    }

    fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn occupancy(&self) -> usize {
        self.len
    }

    fn on_service_complete(&mut self, packet: &Packet) {
        *self.attained.entry(packet.flow).or_insert(0.0) += packet.service_time;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::{Outcome, PacketArrival};

    fn packet(id: u64, flow: FlowId, service_time: f64) -> Packet {
        Packet::new(
            PacketArrival {
                id,
                arrival_time: 0.0,
                size: 1000,
                priority: 1,
                flow_key: Some(flow),
                service_time,
            },
            flow,
        )
    }

    #[test]
    fn test_zero_attained_flow_takes_precedence() {
        let mut las = Las::new(None);
        las.admit(packet(1, 1, 2.0), 0.0);
        las.admit(packet(2, 1, 2.0), 0.0);

        let served = las.select_next().unwrap();
        assert_eq!(served.flow, 1);
        las.on_service_complete(&served);

        // A newly active flow has attained 0 and wins over flow 1.
        las.admit(packet(3, 2, 2.0), 1.0);
        assert_eq!(las.select_next().unwrap().flow, 2);
    }

    #[test]
    fn test_ties_break_by_flow_id() {
        let mut las = Las::new(None);
        las.admit(packet(1, 3, 1.0), 0.0);
        las.admit(packet(2, 2, 1.0), 0.0);

        // Both flows have attained 0; the smaller flow id is served first.
        assert_eq!(las.select_next().unwrap().flow, 2);
        assert_eq!(las.select_next().unwrap().flow, 3);
    }

    #[test]
    fn test_attained_service_accumulates() {
        let mut las = Las::new(None);
        let p1 = packet(1, 1, 1.5);
        las.on_service_complete(&p1);
        las.on_service_complete(&p1);
        assert_eq!(las.attained_service(1), 3.0);
        assert_eq!(las.attained_service(2), 0.0);
    }

    #[test]
    fn test_eviction_hits_most_served_flow() {
        let mut las = Las::new(Some(2));
        // Flow 1 has consumed service; flow 2 has not.
        las.on_service_complete(&packet(0, 1, 5.0));
        las.admit(packet(1, 1, 1.0), 0.0);
        las.admit(packet(2, 2, 1.0), 0.0);

        // Buffer full: the arrival evicts flow 1's tail, not the newcomer.
        match las.admit(packet(3, 3, 1.0), 1.0) {
            Admission::Dropped(evicted) => {
                assert_eq!(evicted.id, 1);
                assert_eq!(
                    evicted.outcome,
                    Outcome::Dropped {
                        at: 1.0,
                        reason: DropReason::MaxServiceEviction
                    }
                );
            }
            Admission::Accepted => panic!("expected eviction at capacity"),
        }
        // The newcomer was admitted in the evicted packet's place.
        assert_eq!(las.occupancy(), 2);
        assert_eq!(las.select_next().unwrap().flow, 2);
        assert_eq!(las.select_next().unwrap().flow, 3);
    }

    #[test]
    fn test_eviction_pops_tail_of_victim_queue() {
        let mut las = Las::new(Some(2));
        las.on_service_complete(&packet(0, 1, 5.0));
        las.admit(packet(1, 1, 1.0), 0.0);
        las.admit(packet(2, 1, 1.0), 0.0);

        match las.admit(packet(3, 2, 1.0), 1.0) {
            // The victim flow's newest packet goes, not its head.
            Admission::Dropped(evicted) => assert_eq!(evicted.id, 2),
            Admission::Accepted => panic!("expected eviction at capacity"),
        }
    }
}
