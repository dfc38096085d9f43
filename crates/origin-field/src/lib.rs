//! Complex scalar fields on a periodic lattice with a global non-cancellation floor.
//!
//! Implements:
//! - Periodic D-dimensional grids with nearest-neighbour Laplacian
//! - Named complex fields with conjugate momenta
//! - Quadratic, quartic, and cross-coupled potentials
//! - Leapfrog (symplectic Euler) time stepping
//! - A projector keeping |⟨Σ cᵢφᵢ⟩ − A_ref| at or above ε
//!
//! # Example
//!
//! ```
//! use origin_field::{
//!     Complex64, ComplexField, ConstraintProjector, FieldSet, Grid, InitOptions, Integrator,
//!     PotentialModel,
//! };
//!
//! let grid = Grid::new(&[8, 8, 8]).unwrap();
//! let mut fields = FieldSet::new(grid, &["phi", "chi"]).unwrap();
//!
//! let phi = ComplexField::from_fn(fields.grid(), |x| Complex64::new(1e-3 * x[0] as f64, 0.0));
//! fields
//!     .set_initial_conditions([("phi", &phi)], InitOptions::default())
//!     .unwrap();
//!
//! let potential = PotentialModel::builder(2)
//!     .mass(0, 0.5)
//!     .mass(1, 0.5)
//!     .cross_coupling(0, 1, 0.1)
//!     .build()
//!     .unwrap();
//! let projector =
//!     ConstraintProjector::new(0.05, Complex64::new(0.0, 0.0), fields.combination(&["phi", "chi"]).unwrap())
//!         .unwrap();
//!
//! let mut integrator = Integrator::new(potential, &fields)
//!     .unwrap()
//!     .with_constraint(projector, &fields)
//!     .unwrap();
//! integrator.run(&mut fields, 0.01, 10).unwrap();
//!
//! let combo = fields.combination(&["phi", "chi"]).unwrap();
//! assert!(fields.global_mean(&combo).norm() >= 0.05);
//! assert_eq!(fields.step_index(), 10);
//! ```

pub mod constraint;
pub mod diagnostics;
pub mod error;
pub mod field;
pub mod grid;
pub mod integrator;
pub mod potential;

pub use constraint::{ConstraintProjector, ShiftPolicy};
pub use diagnostics::{DiagnosticSample, EnergyBreakdown, energy, global_amplitude, total_energy};
pub use error::{FieldError, Result};
pub use field::{Combination, ComplexField, FieldSet, InitOptions, RunPhase};
pub use grid::Grid;
pub use integrator::Integrator;
pub use num_complex::Complex64;
pub use potential::{FieldCoupling, PotentialBuilder, PotentialModel};
