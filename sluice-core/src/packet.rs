//! Packet model: the immutable arrival record plus timing and outcome fields
//! stamped during a simulation run.

use serde::Serialize;

/// Unique packet sequence number.
pub type PacketId = u64;

/// Grouping key assigned by a [`crate::flow::FlowClassifier`].
pub type FlowId = u64;

/// Which drop policy removed a packet from the system.
///
/// Congestion drops are normal outcomes, not errors; the reason tag records
/// which admission rule fired so loss analysis can distinguish them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DropReason {
    /// Arrival rejected because total occupancy reached capacity.
    TailDrop,
    /// Arrival rejected because its flow already held its fair share of a
    /// full buffer.
    FairDrop,
    /// A previously queued packet of the most-served flow was evicted to
    /// make room for the arrival.
    MaxServiceEviction,
}

impl DropReason {
    /// Returns string representation of the drop reason for reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            DropReason::TailDrop => "TailDrop",
            DropReason::FairDrop => "FairDrop",
            DropReason::MaxServiceEviction => "MaxServiceEviction",
        }
    }
}

/// Final disposition of an offered packet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Outcome {
    /// Queued or in service; transient state during a run.
    Pending,
    /// Occupied the server for its full service time.
    Completed,
    /// Removed by a drop policy at the given simulated time.
    Dropped {
        /// Simulated time of the drop.
        at: f64,
        /// Which policy removed the packet.
        reason: DropReason,
    },
}

/// Arrival record handed to the engine by a traffic generator.
///
/// Times are simulated seconds on the engine's logical clock; nothing in the
/// core reads wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PacketArrival {
    /// Sequence number, strictly increasing across the generated stream.
    pub id: PacketId,
    /// Arrival time, non-decreasing across the generated stream.
    pub arrival_time: f64,
    /// Payload size in bytes, non-zero.
    pub size: u32,
    /// Priority level. Higher value means higher priority.
    pub priority: u8,
    /// Explicit flow key, honored by [`crate::flow::KeyClassifier`]. When
    /// absent, classifiers fall back to the priority level.
    pub flow_key: Option<u64>,
    /// Time the server needs to transmit this packet, positive.
    pub service_time: f64,
}

/// A packet travelling through a queue discipline.
///
/// Created from a [`PacketArrival`] at admission, after classification.
/// The arrival fields stay untouched for the packet's lifetime; the engine
/// stamps `start_time`/`finish_time` on completion and drop policies stamp
/// the outcome on eviction or rejection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Packet {
    /// Sequence number from the arrival record.
    pub id: PacketId,
    /// Flow this packet was classified into.
    pub flow: FlowId,
    /// Arrival time in simulated seconds.
    pub arrival_time: f64,
    /// Payload size in bytes.
    pub size: u32,
    /// Priority level. Higher value means higher priority.
    pub priority: u8,
    /// Service time in simulated seconds.
    pub service_time: f64,
    /// When the server started transmitting this packet, if it did.
    pub start_time: Option<f64>,
    /// When transmission finished. Always `start_time + service_time`;
    /// service is non-preemptive.
    pub finish_time: Option<f64>,
    /// Final disposition.
    pub outcome: Outcome,
}

impl Packet {
    /// Builds a pending packet from its arrival record and classified flow.
    pub fn new(arrival: PacketArrival, flow: FlowId) -> Self {
        Self {
            id: arrival.id,
            flow,
            arrival_time: arrival.arrival_time,
            size: arrival.size,
            priority: arrival.priority,
            service_time: arrival.service_time,
            start_time: None,
            finish_time: None,
            outcome: Outcome::Pending,
        }
    }

    /// Total time in the system, `finish - arrival`. `None` until completed.
    pub fn latency(&self) -> Option<f64> {
        self.finish_time.map(|finish| finish - self.arrival_time)
    }

    /// Time spent queued before service, `start - arrival`. `None` until
    /// service starts.
    pub fn waiting_time(&self) -> Option<f64> {
        self.start_time.map(|start| start - self.arrival_time)
    }

    /// Whether a drop policy removed this packet.
    pub fn is_dropped(&self) -> bool {
        matches!(self.outcome, Outcome::Dropped { .. })
    }

    /// Stamps the drop outcome. Called by drop policies inside `admit`.
    pub(crate) fn mark_dropped(&mut self, at: f64, reason: DropReason) {
        self.outcome = Outcome::Dropped { at, reason };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arrival(id: PacketId, arrival_time: f64) -> PacketArrival {
        PacketArrival {
            id,
            arrival_time,
            size: 1000,
            priority: 1,
            flow_key: None,
            service_time: 1.0,
        }
    }

    #[test]
    fn test_packet_starts_pending() {
        let packet = Packet::new(arrival(1, 0.5), 1);
        assert_eq!(packet.outcome, Outcome::Pending);
        assert_eq!(packet.latency(), None);
        assert_eq!(packet.waiting_time(), None);
        assert!(!packet.is_dropped());
    }

    #[test]
    fn test_packet_timing() {
        let mut packet = Packet::new(arrival(1, 1.0), 1);
        packet.start_time = Some(3.0);
        packet.finish_time = Some(4.0);

        assert_eq!(packet.waiting_time(), Some(2.0));
        assert_eq!(packet.latency(), Some(3.0));
    }

    #[test]
    fn test_mark_dropped_records_reason() {
        let mut packet = Packet::new(arrival(7, 0.0), 2);
        packet.mark_dropped(2.5, DropReason::FairDrop);

        assert!(packet.is_dropped());
        assert_eq!(
            packet.outcome,
            Outcome::Dropped {
                at: 2.5,
                reason: DropReason::FairDrop
            }
        );
    }

    #[test]
    fn test_drop_reason_string_conversion() {
        assert_eq!(DropReason::TailDrop.as_str(), "TailDrop");
        assert_eq!(DropReason::MaxServiceEviction.as_str(), "MaxServiceEviction");
    }
}
