//! Run driver: builds a simulation from a [`RunSpec`] and samples diagnostics.

use origin_field::{
    Combination, ComplexField, DiagnosticSample, FieldSet, InitOptions, Integrator, PotentialModel,
};
use origin_format::{InitialKind, RunSpec};
use origin_guardian::{ConservationMonitor, ConservationState, DriftTracker};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::noise::gaussian_field;

/// Default relative energy drift above which an unconstrained run warns.
pub const DEFAULT_ENERGY_TOLERANCE: f64 = 1e-2;

/// Diagnostics collected over one call to [`Simulation::run`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub samples: Vec<DiagnosticSample>,
    pub final_sample: DiagnosticSample,
    /// Largest relative energy change over the sampled steps.
    pub max_energy_drift: f64,
}

/// A configured field set and integrator with its sampling schedule.
pub struct Simulation {
    name: String,
    fields: FieldSet,
    integrator: Integrator,
    /// Combination whose mean is reported: the constrained one, or the sum of
    /// all fields for unconstrained runs.
    combination: Combination,
    dt: f64,
    steps: usize,
    sample_every: usize,
    energy_tolerance: f64,
}

impl Simulation {
    /// Validate `spec`, build every core object, and draw initial conditions.
    pub fn from_spec(spec: &RunSpec) -> Result<Self> {
        spec.check_schedule()?;

        let mut fields = spec.build_fields(spec.build_grid()?)?;
        let potential = spec.build_potential()?;
        let constraint = spec.build_constraint(&fields)?;

        let options = InitOptions {
            mean_subtract: spec.initial.mean_subtract,
        };
        match spec.initial.kind {
            InitialKind::GaussianNoise => {
                let mut rng = StdRng::seed_from_u64(spec.initial.seed);
                let arrays = spec
                    .fields
                    .iter()
                    .map(|_| gaussian_field(fields.grid(), spec.initial.amplitude, &mut rng))
                    .collect::<Result<Vec<ComplexField>>>()?;
                let names = spec.field_names();
                fields.set_initial_conditions(names.into_iter().zip(arrays.iter()), options)?;
            }
            InitialKind::Zero => {
                fields.set_initial_conditions(
                    std::iter::empty::<(&str, &ComplexField)>(),
                    options,
                )?;
            }
        }

        let mut integrator = Integrator::new(potential, &fields)?;
        let combination = match constraint {
            Some(projector) => {
                let combination = projector.combination().clone();
                integrator = integrator.with_constraint(projector, &fields)?;
                combination
            }
            None => Combination::sum(&(0..fields.n_fields()).collect::<Vec<_>>())?,
        };

        Ok(Self {
            name: spec.name.clone(),
            fields,
            integrator,
            combination,
            dt: spec.integration.dt,
            steps: spec.integration.steps,
            sample_every: spec.integration.sample_every,
            energy_tolerance: DEFAULT_ENERGY_TOLERANCE,
        })
    }

    /// Set the relative energy drift that triggers a warning.
    pub fn with_energy_tolerance(mut self, tolerance: f64) -> Self {
        self.energy_tolerance = tolerance;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &FieldSet {
        &self.fields
    }

    pub fn integrator(&self) -> &Integrator {
        &self.integrator
    }

    pub fn combination(&self) -> &Combination {
        &self.combination
    }

    /// Take one diagnostic sample of the current state.
    pub fn sample(&self) -> DiagnosticSample {
        DiagnosticSample::capture(&self.fields, &self.integrator, &self.combination)
    }

    /// Advance the configured number of steps.
    ///
    /// Samples the state before the first step, every `sample_every` steps,
    /// and after the last step.
    pub fn run(&mut self) -> Result<RunRecord> {
        let constrained = self.integrator.constraint().is_some();
        let conserves_energy = !constrained && !has_cross_couplings(self.integrator.potential());
        log::info!(
            "run '{}': {} field(s) on {:?}, dt = {}, {} steps, constrained = {}",
            self.name,
            self.fields.n_fields(),
            self.fields.grid().dims(),
            self.dt,
            self.steps,
            constrained
        );

        let baseline = ConservationState::new(&self.fields, &self.integrator);
        let mut tracker = DriftTracker::new();
        let mut samples = Vec::with_capacity(self.steps / self.sample_every + 2);
        let mut warned = false;

        let first = self.sample();
        tracker.record(first.energy);
        samples.push(first);

        for k in 1..=self.steps {
            self.integrator.step(&mut self.fields, self.dt)?;
            if k % self.sample_every != 0 && k != self.steps {
                continue;
            }

            let sample = self.sample();
            log::info!(
                "step {}: |A| = {:.6e}, E = {:.6e}, hits = {}",
                sample.step_index,
                sample.amplitude_abs,
                sample.energy,
                sample.constraint_hits
            );
            tracker.record(sample.energy);
            samples.push(sample);

            let monitor = ConservationMonitor::check(&baseline, &self.fields, &self.integrator);
            let energy_tol = if conserves_energy {
                self.energy_tolerance
            } else {
                f64::INFINITY
            };
            if !warned && monitor.is_violated(energy_tol) {
                log::warn!(
                    "step {}: energy error {:.3e}, floor margin {:?}",
                    self.fields.step_index(),
                    monitor.energy_error,
                    monitor.floor_margin
                );
                warned = true;
            }
        }

        let final_sample = samples.last().cloned().unwrap_or_else(|| self.sample());
        let max_energy_drift = tracker.max_relative_drift();
        log::info!(
            "run '{}' done: {} sample(s), hits = {}, max energy drift = {:.3e}",
            self.name,
            samples.len(),
            final_sample.constraint_hits,
            max_energy_drift
        );

        Ok(RunRecord {
            samples,
            final_sample,
            max_energy_drift,
        })
    }
}

/// Cross-coupled forces are not the exact gradient of the cross-coupling
/// energy, so such runs have no conserved energy to monitor.
fn has_cross_couplings(potential: &PotentialModel) -> bool {
    let n = potential.n_fields();
    (0..n).any(|i| ((i + 1)..n).any(|j| potential.cross_coupling(i, j) != 0.0))
}
