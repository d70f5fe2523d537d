//! Queue disciplines: the strategies deciding which queued packet the server
//! transmits next and which packet a full buffer discards.
//!
//! All five variants implement [`QueueDiscipline`] and are driven by the
//! engine through the same call sequence: `admit` once per arrival in
//! arrival order, `select_next` whenever the server idles, and
//! `on_service_complete` after each transmission. Selection is fully
//! deterministic; every tie-break is total.

mod fair_queue;
mod fcfs;
mod las;
mod priority;
mod round_robin;

use std::str::FromStr;

pub use fair_queue::FairQueue;
pub use fcfs::Fcfs;
pub use las::Las;
pub use priority::PriorityQueue;
pub use round_robin::RoundRobin;

use crate::packet::Packet;

/// Result of offering a packet to a discipline.
#[derive(Debug)]
pub enum Admission {
    /// The arrival was enqueued.
    Accepted,
    /// A packet left the system: either the arrival itself was rejected
    /// (tail drop, fair drop) or a previously queued packet was evicted to
    /// make room (LAS). The packet carries its drop time and reason.
    Dropped(Packet),
}

/// Scheduling strategy for a single shared server.
///
/// A discipline owns every enqueued packet until it is selected for service
/// or dropped. Instances hold no state shared with other instances or other
/// runs; the engine constructs a fresh discipline per run.
pub trait QueueDiscipline {
    /// Human-readable strategy name for reports.
    fn name(&self) -> &'static str;

    /// Offers an arriving packet, consulting the discipline's drop policy
    /// when the buffer is at capacity. `now` is the engine clock, used to
    /// stamp drop times.
    fn admit(&mut self, packet: Packet, now: f64) -> Admission;

    /// Removes and returns the next packet to serve, or `None` when no
    /// packet is queued. Deterministic given identical call history.
    fn select_next(&mut self) -> Option<Packet>;

    /// Whether no packet is queued.
    fn is_empty(&self) -> bool;

    /// Total queued packets across all internal queues.
    fn occupancy(&self) -> usize;

    /// Hook invoked after a packet finishes service. LAS uses it to account
    /// attained service; the default is a no-op.
    fn on_service_complete(&mut self, _packet: &Packet) {}
}

/// Whether a buffer with the given capacity is full. `None` means unbounded.
pub(crate) fn at_capacity(capacity: Option<usize>, occupancy: usize) -> bool {
    capacity.is_some_and(|limit| occupancy >= limit)
}

/// Per-discipline configuration accepted by [`DisciplineKind::build`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DisciplineConfig {
    /// Buffer capacity in packets. `None` means never drop.
    pub capacity: Option<usize>,
    /// Number of round-robin sub-queues. When set, flows fold into
    /// `flow % num_queues` buckets; ignored by other disciplines.
    pub num_queues: Option<usize>,
}

impl DisciplineConfig {
    /// Unbounded buffer, one sub-queue per flow.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Bounded buffer of `capacity` packets.
    pub fn bounded(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            num_queues: None,
        }
    }
}

/// The five scheduling strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisciplineKind {
    /// First-come, first-served.
    Fcfs,
    /// Strict priority, highest level first.
    Priority,
    /// Cyclic service over per-flow queues.
    RoundRobin,
    /// Virtual-time fair queueing.
    FairQueue,
    /// Least attained service first.
    Las,
}

impl DisciplineKind {
    /// All strategies, in comparison-report order.
    pub fn all() -> [DisciplineKind; 5] {
        [
            DisciplineKind::Fcfs,
            DisciplineKind::Priority,
            DisciplineKind::RoundRobin,
            DisciplineKind::FairQueue,
            DisciplineKind::Las,
        ]
    }

    /// Constructs a fresh discipline instance with the given configuration.
    pub fn build(&self, config: DisciplineConfig) -> Box<dyn QueueDiscipline> {
        match self {
            DisciplineKind::Fcfs => Box::new(Fcfs::new(config.capacity)),
            DisciplineKind::Priority => Box::new(PriorityQueue::new(config.capacity)),
            DisciplineKind::RoundRobin => {
                Box::new(RoundRobin::new(config.capacity, config.num_queues))
            }
            DisciplineKind::FairQueue => Box::new(FairQueue::new(config.capacity)),
            DisciplineKind::Las => Box::new(Las::new(config.capacity)),
        }
    }
}

impl FromStr for DisciplineKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fcfs" => Ok(DisciplineKind::Fcfs),
            "priority" => Ok(DisciplineKind::Priority),
            "round-robin" | "rr" => Ok(DisciplineKind::RoundRobin),
            "fair-queue" | "fq" => Ok(DisciplineKind::FairQueue),
            "las" => Ok(DisciplineKind::Las),
            _ => Err(format!("unknown discipline: {s}")),
        }
    }
}

impl std::fmt::Display for DisciplineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisciplineKind::Fcfs => write!(f, "fcfs"),
            DisciplineKind::Priority => write!(f, "priority"),
            DisciplineKind::RoundRobin => write!(f, "round-robin"),
            DisciplineKind::FairQueue => write!(f, "fair-queue"),
            DisciplineKind::Las => write!(f, "las"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trips_through_str() {
        for kind in DisciplineKind::all() {
            let parsed: DisciplineKind = kind.to_string().parse().unwrap();
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn test_kind_parse_aliases() {
        assert_eq!("rr".parse::<DisciplineKind>().unwrap(), DisciplineKind::RoundRobin);
        assert_eq!("fq".parse::<DisciplineKind>().unwrap(), DisciplineKind::FairQueue);
        assert!("wfq".parse::<DisciplineKind>().is_err());
    }

    #[test]
    fn test_build_produces_named_disciplines() {
        let config = DisciplineConfig::bounded(8);
        let names: Vec<_> = DisciplineKind::all()
            .iter()
            .map(|kind| kind.build(config).name())
            .collect();
        assert_eq!(
            names,
            vec!["FCFS", "Priority", "Round-Robin", "Fair Queue", "LAS"]
        );
    }

    #[test]
    fn test_at_capacity() {
        assert!(!at_capacity(None, usize::MAX));
        assert!(at_capacity(Some(0), 0));
        assert!(!at_capacity(Some(4), 3));
        assert!(at_capacity(Some(4), 4));
    }
}
