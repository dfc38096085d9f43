//! Global amplitude, energy, and counter read-outs.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::field::{Combination, FieldSet};
use crate::integrator::Integrator;
use crate::potential::PotentialModel;

/// Energy split into its lattice contributions, summed over sites and fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyBreakdown {
    /// ½ Σ |π|².
    pub kinetic: f64,
    /// ½ c² Σ |φ(x+ê) − φ(x)|².
    pub gradient: f64,
    /// Σ V(φ).
    pub potential: f64,
    pub total: f64,
}

/// Spatial mean of a field combination. Same as [`FieldSet::global_mean`].
pub fn global_amplitude(fields: &FieldSet, combination: &Combination) -> Complex64 {
    fields.global_mean(combination)
}

/// Energy of the current configuration.
///
/// The gradient term uses forward differences, which on a periodic lattice
/// equals −Re Σ φ*·∇²φ.
pub fn energy(fields: &FieldSet, potential: &PotentialModel) -> EnergyBreakdown {
    let grid = fields.grid();
    let c2 = grid.wave_speed().powi(2);

    let kinetic = 0.5
        * fields
            .momenta()
            .iter()
            .flat_map(|pi| pi.iter())
            .map(|p| p.norm_sqr())
            .sum::<f64>();
    let gradient = 0.5
        * c2
        * fields
            .values()
            .iter()
            .map(|phi| grid.gradient_squared(phi))
            .sum::<f64>();
    let potential = potential.potential_energy(fields);

    EnergyBreakdown {
        kinetic,
        gradient,
        potential,
        total: kinetic + gradient + potential,
    }
}

/// Total energy of the current configuration.
pub fn total_energy(fields: &FieldSet, potential: &PotentialModel) -> f64 {
    energy(fields, potential).total
}

/// One row of run diagnostics, ready for the caller to serialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticSample {
    pub step_index: u64,
    pub t: f64,
    pub amplitude_re: f64,
    pub amplitude_im: f64,
    pub amplitude_abs: f64,
    pub energy: f64,
    pub constraint_hits: u64,
}

impl DiagnosticSample {
    /// Read the diagnostics of `fields` for the given combination.
    pub fn capture(fields: &FieldSet, integrator: &Integrator, combination: &Combination) -> Self {
        let amplitude = global_amplitude(fields, combination);
        Self {
            step_index: fields.step_index(),
            t: fields.time(),
            amplitude_re: amplitude.re,
            amplitude_im: amplitude.im,
            amplitude_abs: amplitude.norm(),
            energy: integrator.total_energy(fields),
            constraint_hits: fields.constraint_hits(),
        }
    }

    pub fn amplitude(&self) -> Complex64 {
        Complex64::new(self.amplitude_re, self.amplitude_im)
    }
}
