//! Flow classification: mapping an arriving packet to the grouping key used
//! by flow-aware disciplines.

use crate::packet::{FlowId, PacketArrival};

/// Maps an arrival to its flow id.
///
/// Flow-aware disciplines (round-robin, fair queueing, LAS) keep per-flow
/// queues and bookkeeping keyed by the id this returns. Classification
/// happens once, at admission; the id travels with the packet afterwards.
pub trait FlowClassifier {
    /// Returns the flow id for an arrival.
    fn classify(&self, arrival: &PacketArrival) -> FlowId;
}

/// Classifies by priority level: every priority class is one flow.
///
/// This conflates "priority" and "flow", which is fine when each traffic
/// source uses a distinct priority level (as the bundled scenarios do) but
/// does not isolate tenants sharing a level; use [`KeyClassifier`] with
/// explicit flow keys for that.
#[derive(Debug, Clone, Copy, Default)]
pub struct PriorityClassifier;

impl FlowClassifier for PriorityClassifier {
    fn classify(&self, arrival: &PacketArrival) -> FlowId {
        FlowId::from(arrival.priority)
    }
}

/// Classifies by the arrival's explicit flow key, falling back to the
/// priority level when no key is present.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyClassifier;

impl FlowClassifier for KeyClassifier {
    fn classify(&self, arrival: &PacketArrival) -> FlowId {
        arrival.flow_key.unwrap_or_else(|| FlowId::from(arrival.priority))
    }
}

impl<F> FlowClassifier for F
where
    F: Fn(&PacketArrival) -> FlowId,
{
    fn classify(&self, arrival: &PacketArrival) -> FlowId {
        self(arrival)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arrival(priority: u8, flow_key: Option<u64>) -> PacketArrival {
        PacketArrival {
            id: 0,
            arrival_time: 0.0,
            size: 100,
            priority,
            flow_key,
            service_time: 0.1,
        }
    }

    #[test]
    fn test_priority_classifier_uses_priority() {
        let classifier = PriorityClassifier;
        assert_eq!(classifier.classify(&arrival(3, Some(99))), 3);
    }

    #[test]
    fn test_key_classifier_prefers_explicit_key() {
        let classifier = KeyClassifier;
        assert_eq!(classifier.classify(&arrival(3, Some(99))), 99);
        assert_eq!(classifier.classify(&arrival(3, None)), 3);
    }

    #[test]
    fn test_closure_classifier() {
        let classifier = |arrival: &PacketArrival| FlowId::from(arrival.priority % 2);
        assert_eq!(classifier.classify(&arrival(5, None)), 1);
    }
}
