//! origin: lattice scalar fields under the Origin Axiom non-cancellation constraint.
//!
//! This is the umbrella crate that provides the [`Simulation`] runner and
//! re-exports core types from sub-crates.

pub use origin_field::{
    self, Combination, Complex64, ComplexField, ConstraintProjector, DiagnosticSample,
    EnergyBreakdown, FieldError, FieldSet, Grid, InitOptions, Integrator, PotentialModel,
    RunPhase, ShiftPolicy,
};
pub use origin_format::{self, FormatError, RunSpec};
pub use origin_guardian::{self, ConservationMonitor, ConservationState, DriftTracker};

pub mod noise;
pub mod simulation;

pub use noise::gaussian_field;
pub use simulation::{RunRecord, Simulation};

/// Errors from building or running a simulation.
pub type SimulationError = FormatError;

pub type Result<T> = std::result::Result<T, SimulationError>;
