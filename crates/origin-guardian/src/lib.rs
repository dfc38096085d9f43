//! Run health monitoring for lattice field simulations.
//!
//! This crate provides:
//! - Energy conservation checks against a baseline
//! - Constraint floor margin for runs under the non-cancellation projector
//! - Energy drift history across a run

pub mod conservation;
pub mod drift;

pub use conservation::{ConservationMonitor, ConservationState};
pub use drift::DriftTracker;
