//! Discrete-event engine driving one discipline over one packet sequence.

use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::discipline::{Admission, QueueDiscipline};
use crate::flow::{FlowClassifier, PriorityClassifier};
use crate::packet::{Outcome, Packet, PacketArrival, PacketId};

/// Why an offered packet failed validation.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum ValidationError {
    /// Packet size must be positive.
    #[error("packet size must be positive")]
    ZeroSize,

    /// Service time must be a positive, finite number.
    #[error("service time must be positive and finite, got {0}")]
    NonPositiveServiceTime(f64),

    /// Arrival time must be a non-negative, finite number.
    #[error("arrival time must be non-negative and finite, got {0}")]
    InvalidArrivalTime(f64),

    /// Arrival times must be non-decreasing across the input sequence.
    #[error("arrival time {arrival} precedes previous arrival {previous}")]
    NonMonotonicArrival {
        /// Offending arrival time.
        arrival: f64,
        /// Arrival time of the previous valid packet.
        previous: f64,
    },

    /// Packet ids must be strictly increasing across the input sequence.
    #[error("packet id {id} does not increase over previous id {previous}")]
    NonMonotonicId {
        /// Offending packet id.
        id: PacketId,
        /// Id of the previous valid packet.
        previous: PacketId,
    },
}

/// Errors that abort a simulation run.
#[derive(Debug, Error)]
pub enum EngineError {
    /// An offered packet failed validation and the engine is configured to
    /// abort on invalid input.
    #[error("invalid packet {id}: {source}")]
    InvalidPacket {
        /// Id of the offending packet.
        id: PacketId,
        /// The validation failure.
        source: ValidationError,
    },
}

/// What the engine does with a packet that fails validation.
///
/// Invalid packets are never coerced: they either abort the run or are
/// rejected individually, on a channel distinct from congestion drops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// Record the rejection and keep processing the rest of the sequence.
    #[default]
    RejectAndContinue,
    /// Fail the whole run on the first invalid packet.
    Abort,
}

/// Engine configuration for one run.
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineConfig {
    /// How invalid packets are handled.
    pub validation: ValidationMode,
}

/// An offered packet the engine refused to admit, with the reason.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct RejectedPacket {
    /// Id of the rejected packet.
    pub id: PacketId,
    /// Why validation failed.
    #[serde(serialize_with = "serialize_error")]
    pub error: ValidationError,
}

fn serialize_error<S: serde::Serializer>(
    error: &ValidationError,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

/// Everything a run produced: the stamped packet sets and the final clock.
///
/// `completed` packets carry start/finish stamps for external plotting;
/// `dropped` packets carry their drop time and reason for loss analysis.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct RunOutcome {
    /// Packets that occupied the server for their full service time, in
    /// completion order.
    pub completed: Vec<Packet>,
    /// Packets removed by a drop policy, in drop order.
    pub dropped: Vec<Packet>,
    /// Packets refused at validation; a distinct channel from congestion.
    pub rejected: Vec<RejectedPacket>,
    /// Clock value when the run finished.
    pub final_clock: f64,
}

impl RunOutcome {
    /// Total packets offered to the engine.
    pub fn offered(&self) -> usize {
        self.completed.len() + self.dropped.len() + self.rejected.len()
    }
}

/// Drives a discipline over an arrival-time-ordered packet sequence.
///
/// The engine owns the logical clock and the (at most one) packet in
/// service. It alternates between admitting every packet that has arrived
/// by the current clock and serving the next selected packet; service is
/// non-preemptive, so the clock jumps from one finish time to the next.
/// Construct a fresh engine/discipline pair per run; no state survives a
/// run or is shared between instances.
pub struct Engine {
    clock: f64,
    classifier: Box<dyn FlowClassifier>,
    config: EngineConfig,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Creates an engine with the default priority-as-flow classifier.
    pub fn new() -> Self {
        Self::with_classifier(Box::new(PriorityClassifier))
    }

    /// Creates an engine with a custom flow classifier.
    pub fn with_classifier(classifier: Box<dyn FlowClassifier>) -> Self {
        Self {
            clock: 0.0,
            classifier,
            config: EngineConfig::default(),
        }
    }

    /// Replaces the engine configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Current simulated time.
    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// Runs the discipline over the whole arrival sequence.
    ///
    /// Arrivals must be ordered by non-decreasing arrival time; the engine
    /// validates this along with per-packet field checks. The run processes
    /// the bounded sequence to exhaustion and then drains the discipline.
    ///
    /// # Errors
    ///
    /// `EngineError::InvalidPacket` if a packet fails validation while
    /// [`ValidationMode::Abort`] is configured.
    pub fn run(
        &mut self,
        discipline: &mut dyn QueueDiscipline,
        arrivals: &[PacketArrival],
    ) -> Result<RunOutcome, EngineError> {
        let mut outcome = RunOutcome::default();
        let mut index = 0;
        let mut previous: Option<(PacketId, f64)> = None;

        while index < arrivals.len() || !discipline.is_empty() {
            // Admit everything that has arrived by now. Invalid packets are
            // rejected as soon as they are reached so a malformed arrival
            // time can never stall the clock.
            while index < arrivals.len() {
                let arrival = arrivals[index];
                match validate(&arrival, previous) {
                    Err(error) => {
                        index += 1;
                        warn!(id = arrival.id, %error, "rejecting invalid packet");
                        if self.config.validation == ValidationMode::Abort {
                            return Err(EngineError::InvalidPacket {
                                id: arrival.id,
                                source: error,
                            });
                        }
                        outcome.rejected.push(RejectedPacket {
                            id: arrival.id,
                            error,
                        });
                    }
                    Ok(()) if arrival.arrival_time <= self.clock => {
                        index += 1;
                        previous = Some((arrival.id, arrival.arrival_time));
                        let flow = self.classifier.classify(&arrival);
                        let packet = Packet::new(arrival, flow);
                        match discipline.admit(packet, self.clock) {
                            Admission::Accepted => {
                                trace!(id = arrival.id, flow, "packet admitted");
                            }
                            Admission::Dropped(dropped) => {
                                debug!(
                                    id = dropped.id,
                                    flow = dropped.flow,
                                    occupancy = discipline.occupancy(),
                                    "packet dropped"
                                );
                                outcome.dropped.push(dropped);
                            }
                        }
                    }
                    // Next packet is still in the future.
                    Ok(()) => break,
                }
            }

            if let Some(mut packet) = discipline.select_next() {
                let start = self.clock.max(packet.arrival_time);
                let finish = start + packet.service_time;
                packet.start_time = Some(start);
                packet.finish_time = Some(finish);
                packet.outcome = Outcome::Completed;
                self.clock = finish;
                discipline.on_service_complete(&packet);
                trace!(id = packet.id, start, finish, "packet served");
                outcome.completed.push(packet);
            } else if index < arrivals.len() {
                // Idle server, nothing queued: jump to the next arrival.
                self.clock = arrivals[index].arrival_time;
            } else {
                break;
            }
        }

        outcome.final_clock = self.clock;
        Ok(outcome)
    }
}

/// Field and sequence checks for one arrival record.
fn validate(
    arrival: &PacketArrival,
    previous: Option<(PacketId, f64)>,
) -> Result<(), ValidationError> {
    if arrival.size == 0 {
        return Err(ValidationError::ZeroSize);
    }
    if !arrival.service_time.is_finite() || arrival.service_time <= 0.0 {
        return Err(ValidationError::NonPositiveServiceTime(arrival.service_time));
    }
    if !arrival.arrival_time.is_finite() || arrival.arrival_time < 0.0 {
        return Err(ValidationError::InvalidArrivalTime(arrival.arrival_time));
    }
    if let Some((previous_id, previous_arrival)) = previous {
        if arrival.id <= previous_id {
            return Err(ValidationError::NonMonotonicId {
                id: arrival.id,
                previous: previous_id,
            });
        }
        if arrival.arrival_time < previous_arrival {
            return Err(ValidationError::NonMonotonicArrival {
                arrival: arrival.arrival_time,
                previous: previous_arrival,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discipline::Fcfs;

    fn arrival(id: PacketId, arrival_time: f64, service_time: f64) -> PacketArrival {
        PacketArrival {
            id,
            arrival_time,
            size: 1000,
            priority: 1,
            flow_key: None,
            service_time,
        }
    }

    #[test]
    fn test_stamps_follow_non_preemptive_service() {
        let mut engine = Engine::new();
        let mut fcfs = Fcfs::new(None);
        let arrivals = vec![
            arrival(1, 0.0, 2.0),
            arrival(2, 0.5, 1.0),
            arrival(3, 5.0, 1.0),
        ];

        let outcome = engine.run(&mut fcfs, &arrivals).unwrap();
        assert_eq!(outcome.completed.len(), 3);

        let p1 = &outcome.completed[0];
        assert_eq!((p1.start_time, p1.finish_time), (Some(0.0), Some(2.0)));

        // Packet 2 arrived during packet 1's service and waits for it.
        let p2 = &outcome.completed[1];
        assert_eq!((p2.start_time, p2.finish_time), (Some(2.0), Some(3.0)));

        // Packet 3 arrives after an idle gap; the clock jumps forward.
        let p3 = &outcome.completed[2];
        assert_eq!((p3.start_time, p3.finish_time), (Some(5.0), Some(6.0)));
        assert_eq!(outcome.final_clock, 6.0);
    }

    #[test]
    fn test_completion_invariants() {
        let mut engine = Engine::new();
        let mut fcfs = Fcfs::new(None);
        let arrivals: Vec<_> = (0..20)
            .map(|i| arrival(i, f64::from(i as u32) * 0.3, 0.7))
            .collect();

        let outcome = engine.run(&mut fcfs, &arrivals).unwrap();
        for packet in &outcome.completed {
            let start = packet.start_time.unwrap();
            let finish = packet.finish_time.unwrap();
            assert!(packet.arrival_time <= start);
            assert!(start <= finish);
            assert!((finish - start - packet.service_time).abs() < 1e-12);
        }
    }

    #[test]
    fn test_invalid_packet_rejected_and_run_continues() {
        let mut engine = Engine::new();
        let mut fcfs = Fcfs::new(None);
        let mut bad = arrival(2, 1.0, 1.0);
        bad.size = 0;
        let arrivals = vec![arrival(1, 0.0, 1.0), bad, arrival(3, 2.0, 1.0)];

        let outcome = engine.run(&mut fcfs, &arrivals).unwrap();
        assert_eq!(outcome.completed.len(), 2);
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(outcome.rejected[0].id, 2);
        assert_eq!(outcome.rejected[0].error, ValidationError::ZeroSize);
        assert_eq!(outcome.offered(), 3);
    }

    #[test]
    fn test_invalid_packet_aborts_when_configured() {
        let mut engine = Engine::new().with_config(EngineConfig {
            validation: ValidationMode::Abort,
        });
        let mut fcfs = Fcfs::new(None);
        let arrivals = vec![arrival(1, 0.0, 1.0), arrival(1, 1.0, 1.0)];

        match engine.run(&mut fcfs, &arrivals) {
            Err(EngineError::InvalidPacket { id, source }) => {
                assert_eq!(id, 1);
                assert!(matches!(source, ValidationError::NonMonotonicId { .. }));
            }
            Ok(_) => panic!("expected abort on duplicate id"),
        }
    }

    #[test]
    fn test_non_monotonic_arrival_rejected() {
        let mut engine = Engine::new();
        let mut fcfs = Fcfs::new(None);
        let arrivals = vec![arrival(1, 3.0, 1.0), arrival(2, 1.0, 1.0)];

        let outcome = engine.run(&mut fcfs, &arrivals).unwrap();
        assert_eq!(outcome.completed.len(), 1);
        assert!(matches!(
            outcome.rejected[0].error,
            ValidationError::NonMonotonicArrival { .. }
        ));
    }

    #[test]
    fn test_nan_arrival_cannot_stall_the_run() {
        let mut engine = Engine::new();
        let mut fcfs = Fcfs::new(None);
        let arrivals = vec![
            arrival(1, 0.0, 1.0),
            arrival(2, f64::NAN, 1.0),
            arrival(3, 4.0, 1.0),
        ];

        let outcome = engine.run(&mut fcfs, &arrivals).unwrap();
        assert_eq!(outcome.completed.len(), 2);
        assert_eq!(outcome.rejected.len(), 1);
    }

    #[test]
    fn test_conservation_with_drops() {
        let mut engine = Engine::new();
        let mut fcfs = Fcfs::new(Some(2));
        // A burst at t=0 overwhelms the two-packet buffer.
        let arrivals: Vec<_> = (0..10).map(|i| arrival(i, 0.0, 1.0)).collect();

        let outcome = engine.run(&mut fcfs, &arrivals).unwrap();
        assert_eq!(outcome.offered(), 10);
        assert_eq!(
            outcome.completed.len() + outcome.dropped.len() + outcome.rejected.len(),
            10
        );
        assert!(!outcome.dropped.is_empty());
    }
}
