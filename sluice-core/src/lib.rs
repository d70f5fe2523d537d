//! Sluice core - queue disciplines and the discrete-event engine behind them.
//!
//! This crate simulates how a single shared resource (a network link or
//! server) schedules a stream of discrete packets under competing scheduling
//! disciplines, and derives the resulting latency, throughput, drop-rate,
//! and fairness figures.
//!
//! # Components
//!
//! - **Packet model**: immutable arrival records stamped with timing and
//!   outcome during a run
//! - **Flow classification**: pluggable mapping from packet to flow id
//! - **Queue disciplines**: FCFS, strict priority, round-robin, virtual-time
//!   fair queueing, and least-attained-service, each owning its queues and
//!   admission/eviction logic
//! - **Engine**: single-threaded discrete-event driver with a purely
//!   logical clock; same input, same output, every run
//! - **Metrics**: per-run summary including Jain's fairness indices
//!
//! # Example
//!
//! ```rust
//! use sluice_core::discipline::{DisciplineConfig, DisciplineKind};
//! use sluice_core::engine::Engine;
//! use sluice_core::metrics::summarize;
//! use sluice_core::packet::PacketArrival;
//!
//! let arrivals: Vec<PacketArrival> = (0..10)
//!     .map(|i| PacketArrival {
//!         id: i,
//!         arrival_time: i as f64 * 0.4,
//!         size: 1200,
//!         priority: 1 + (i % 3) as u8,
//!         flow_key: None,
//!         service_time: 0.5,
//!     })
//!     .collect();
//!
//! let mut discipline = DisciplineKind::FairQueue.build(DisciplineConfig::bounded(16));
//! let outcome = Engine::new().run(discipline.as_mut(), &arrivals)?;
//! let report = summarize(discipline.name(), &outcome);
//! assert_eq!(report.completed, 10);
//! # Ok::<(), sluice_core::engine::EngineError>(())
//! ```

pub mod discipline;
pub mod engine;
pub mod flow;
pub mod metrics;
pub mod packet;

pub use discipline::{Admission, DisciplineConfig, DisciplineKind, QueueDiscipline};
pub use engine::{Engine, EngineConfig, EngineError, RunOutcome, ValidationError, ValidationMode};
pub use flow::{FlowClassifier, KeyClassifier, PriorityClassifier};
pub use metrics::{FlowStats, RunReport, jain_index, summarize};
pub use packet::{DropReason, FlowId, Outcome, Packet, PacketArrival, PacketId};
