//! Sluice traffic - deterministic workload generation for the simulator.
//!
//! Produces the arrival-time-ordered packet sequences the engine consumes.
//! Generation is seeded: the same seed always produces the identical
//! sequence, so simulation runs are reproducible end to end.
//!
//! Two entry points:
//!
//! - [`TrafficGenerator`]: parameterized synthetic traffic (Poisson or
//!   bursty arrivals, weighted priorities and sizes)
//! - [`Scenario`]: pre-built traffic shapes modelling recognizable
//!   workloads (texting, streaming, meetings, downloads, mice-and-elephants)

mod generator;
mod scenarios;

pub use generator::{TrafficConfig, TrafficGenerator, TrafficModel};
pub use scenarios::Scenario;
