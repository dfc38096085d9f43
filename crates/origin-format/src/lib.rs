//! JSON run specifications for lattice field simulations.
//!
//! A run file names the grid, the fields and their couplings, an optional
//! non-cancellation constraint, the integration schedule, and how initial
//! conditions are drawn. [`RunSpec`] loads and validates such a file and
//! builds the core objects from it.

pub mod build;
pub mod error;
pub mod schema;

pub use error::{FormatError, Result};
pub use schema::{
    ConstraintSpec, CrossCouplingSpec, FieldSpec, GridSpec, InitialKind, InitialSpec,
    IntegrationSpec, PolicySpec, RunSpec, TermSpec,
};
