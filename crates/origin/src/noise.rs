//! Seeded initial-condition generators.
//!
//! The core never draws random numbers; callers build arrays here and hand
//! them to [`FieldSet::set_initial_conditions`](origin_field::FieldSet::set_initial_conditions).

use origin_field::{Complex64, ComplexField, Grid};
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::{Result, SimulationError};

/// Complex Gaussian noise: real and imaginary parts drawn independently
/// from N(0, amplitude²), sites in linear order.
pub fn gaussian_field<R: Rng + ?Sized>(
    grid: &Grid,
    amplitude: f64,
    rng: &mut R,
) -> Result<ComplexField> {
    let normal = Normal::new(0.0, amplitude).map_err(|err| {
        SimulationError::InvalidParameter(format!("noise amplitude {amplitude}: {err}"))
    })?;
    Ok(ComplexField::from_fn(grid, |_| {
        let re = normal.sample(rng);
        let im = normal.sample(rng);
        Complex64::new(re, im)
    }))
}
