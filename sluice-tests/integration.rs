//! Integration tests for Sluice
//!
//! These tests verify the testable properties of the simulator across
//! component boundaries: packet conservation, discipline ordering
//! guarantees, fairness bounds, the drop-policy contrast scenario, and
//! whole-run determinism.

#[path = "integration/conservation.rs"]
mod conservation;

#[path = "integration/determinism.rs"]
mod determinism;

#[path = "integration/drop_contrast.rs"]
mod drop_contrast;

#[path = "integration/fairness.rs"]
mod fairness;

#[path = "integration/ordering.rs"]
mod ordering;
