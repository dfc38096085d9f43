//! Leapfrog (momentum-then-position) time stepping.

use num_complex::Complex64;

use crate::constraint::ConstraintProjector;
use crate::diagnostics::{self, EnergyBreakdown};
use crate::error::{FieldError, Result};
use crate::field::{FieldSet, RunPhase};
use crate::potential::PotentialModel;

/// Evolves a [`FieldSet`] under a potential and an optional constraint.
///
/// The integrator does not own the fields; each [`step`](Self::step)
/// borrows them mutably and must be handed a set with the field count and
/// grid it was built for. Scratch buffers for forces and the Laplacian are
/// allocated once and reused.
#[derive(Debug, Clone)]
pub struct Integrator {
    potential: PotentialModel,
    constraint: Option<ConstraintProjector>,

    /// Grid extents the scratch buffers are sized for.
    dims: Vec<usize>,

    /// Per-field force buffers.
    force: Vec<Vec<Complex64>>,

    /// Laplacian of the field currently being updated.
    laplacian: Vec<Complex64>,
}

impl Integrator {
    /// Create an integrator for `fields` with no constraint.
    pub fn new(potential: PotentialModel, fields: &FieldSet) -> Result<Self> {
        check_field_count(&potential, fields)?;
        let n_sites = fields.grid().n_sites();
        log::debug!(
            "integrator: {} field(s) on {:?}, c = {}",
            fields.n_fields(),
            fields.grid().dims(),
            fields.grid().wave_speed()
        );

        Ok(Self {
            dims: fields.grid().dims().to_vec(),
            force: vec![vec![Complex64::new(0.0, 0.0); n_sites]; potential.n_fields()],
            laplacian: vec![Complex64::new(0.0, 0.0); n_sites],
            potential,
            constraint: None,
        })
    }

    /// Attach a constraint projector. Its combination must refer to fields of `fields`.
    pub fn with_constraint(
        mut self,
        projector: ConstraintProjector,
        fields: &FieldSet,
    ) -> Result<Self> {
        self.check_fields(fields)?;
        fields.check_combination(projector.combination())?;
        log::debug!(
            "integrator: constraint ε = {}, reference = {}, policy = {:?}",
            projector.epsilon(),
            projector.reference(),
            projector.policy()
        );
        self.constraint = Some(projector);
        Ok(self)
    }

    /// Replace the potential before the first step.
    ///
    /// Couplings are frozen once integration has begun.
    pub fn reparameterize(&mut self, potential: PotentialModel, fields: &FieldSet) -> Result<()> {
        if fields.phase() == RunPhase::Stepped {
            return Err(FieldError::IntegrationStarted);
        }
        self.check_fields(fields)?;
        check_field_count(&potential, fields)?;
        log::debug!("integrator: potential re-parameterized before integration");
        self.potential = potential;
        Ok(())
    }

    pub fn potential(&self) -> &PotentialModel {
        &self.potential
    }

    pub fn constraint(&self) -> Option<&ConstraintProjector> {
        self.constraint.as_ref()
    }

    /// Advance the fields by one timestep.
    ///
    /// ```text
    /// π ← π + dt·(c²∇²φ + F(φ))
    /// φ ← φ + dt·π
    /// ```
    ///
    /// followed by the constraint projection and the clock update. All
    /// forces are evaluated on the pre-step configuration.
    ///
    /// Fails without touching `fields` if they do not have the field count
    /// and grid this integrator was built for.
    pub fn step(&mut self, fields: &mut FieldSet, dt: f64) -> Result<()> {
        self.check_fields(fields)?;

        let c2 = fields.grid().wave_speed().powi(2);
        let (grid, values, momenta) = fields.parts_mut();
        self.potential.force_into(values, &mut self.force);

        for ((phi, pi), force) in values.iter_mut().zip(momenta.iter_mut()).zip(&self.force) {
            grid.laplacian_into(phi, &mut self.laplacian);
            for ((p, lap), f) in pi.iter_mut().zip(&self.laplacian).zip(force) {
                *p += (*lap * c2 + *f) * dt;
            }
            for (x, p) in phi.iter_mut().zip(pi.iter()) {
                *x += *p * dt;
            }
        }

        if let Some(projector) = &self.constraint {
            projector.project(fields);
        }
        fields.advance_clock(dt);
        Ok(())
    }

    /// Take `n_steps` steps of size `dt`.
    pub fn run(&mut self, fields: &mut FieldSet, dt: f64, n_steps: usize) -> Result<()> {
        for _ in 0..n_steps {
            self.step(fields, dt)?;
        }
        Ok(())
    }

    /// Kinetic, gradient and potential energy of `fields`.
    pub fn energy(&self, fields: &FieldSet) -> EnergyBreakdown {
        diagnostics::energy(fields, &self.potential)
    }

    /// Total energy of `fields`.
    pub fn total_energy(&self, fields: &FieldSet) -> f64 {
        self.energy(fields).total
    }

    fn check_fields(&self, fields: &FieldSet) -> Result<()> {
        check_field_count(&self.potential, fields)?;
        if fields.grid().dims() != self.dims.as_slice() {
            return Err(FieldError::ShapeMismatch {
                field: "<field set>".into(),
                expected: self.dims.clone(),
                found: fields.grid().dims().to_vec(),
            });
        }
        Ok(())
    }
}

fn check_field_count(potential: &PotentialModel, fields: &FieldSet) -> Result<()> {
    if potential.n_fields() == fields.n_fields() {
        Ok(())
    } else {
        Err(FieldError::FieldCountMismatch {
            expected: fields.n_fields(),
            found: potential.n_fields(),
        })
    }
}
