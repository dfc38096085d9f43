//! Energy conservation and constraint-floor monitoring.
//!
//! Energy is only conserved for unconstrained runs; the projector injects
//! energy whenever it shifts the mean. The floor margin is the quantity to
//! watch when a constraint is attached.

use num_complex::Complex64;
use origin_field::{FieldSet, Integrator};

/// Baseline quantities captured before integration.
#[derive(Debug, Clone)]
pub struct ConservationState {
    pub baseline_energy: f64,
    /// Mean of the constrained combination, if the integrator has a projector.
    pub baseline_amplitude: Option<Complex64>,
}

impl ConservationState {
    /// Record the baseline from the current fields.
    pub fn new(fields: &FieldSet, integrator: &Integrator) -> Self {
        Self {
            baseline_energy: integrator.total_energy(fields),
            baseline_amplitude: integrator
                .constraint()
                .map(|projector| fields.global_mean(projector.combination())),
        }
    }
}

/// Conservation errors at the current step.
#[derive(Debug, Clone)]
pub struct ConservationMonitor {
    /// Relative energy error: |E - E₀| / |E₀|
    pub energy_error: f64,
    /// `distance - epsilon`; negative means the mean sits inside the floor.
    pub floor_margin: Option<f64>,
}

impl ConservationMonitor {
    /// Compare the current fields against `baseline`.
    pub fn check(baseline: &ConservationState, fields: &FieldSet, integrator: &Integrator) -> Self {
        let energy = integrator.total_energy(fields);

        // Absolute error when the baseline is (near) zero
        let energy_error = if baseline.baseline_energy.abs() > 1e-12 {
            (energy - baseline.baseline_energy).abs() / baseline.baseline_energy.abs()
        } else {
            (energy - baseline.baseline_energy).abs()
        };

        let floor_margin = integrator
            .constraint()
            .map(|projector| projector.distance(fields) - projector.epsilon());

        Self {
            energy_error,
            floor_margin,
        }
    }

    /// True when energy drifted beyond `energy_tol` or the mean is inside the floor.
    pub fn is_violated(&self, energy_tol: f64) -> bool {
        let floor_broken = self
            .floor_margin
            .is_some_and(|margin| margin < 0.0);
        self.energy_error > energy_tol || floor_broken
    }
}
