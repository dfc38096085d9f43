//! Global non-cancellation constraint (the Origin Axiom).
//!
//! After every step the spatial mean A of a chosen field combination must
//! satisfy |A − reference| ≥ ε. When it does not, a uniform shift moves A
//! radially out to the floor:
//!
//! ```text
//! diff   = A − reference
//! dir    = diff / |diff|        (1 + 0i when diff = 0)
//! target = reference + ε(1 + η) · dir
//! A     += target − A
//! ```
//!
//! The small overshoot η keeps the recomputed mean at or above ε despite
//! rounding in the summation. The projection is a hard floor applied after the field update, never a
//! penalty inside the force.

use num_complex::Complex64;

use crate::error::{FieldError, Result};
use crate::field::{Combination, FieldSet};

/// Relative overshoot η of the projection target past ε.
const OVERSHOOT: f64 = 1e-10;

/// How a uniform shift of a combination's mean is split between the fields
/// that contribute to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShiftPolicy {
    /// Every contributing field absorbs an equal share of the shift.
    #[default]
    EvenSplit,
    /// The whole shift is applied to one contributing field.
    SingleField(usize),
}

impl ShiftPolicy {
    /// Check that the policy is usable with `combination`.
    pub fn validate(&self, combination: &Combination) -> Result<()> {
        match *self {
            Self::EvenSplit => Ok(()),
            Self::SingleField(i) if combination.contains(i) => Ok(()),
            Self::SingleField(i) => Err(FieldError::InvalidCombination(format!(
                "field {i} does not contribute to the constrained combination"
            ))),
        }
    }

    /// Per-field multipliers s_k such that adding s_k·δ to field k shifts the
    /// combination's mean by exactly δ.
    pub(crate) fn shares(&self, combination: &Combination) -> Vec<(usize, Complex64)> {
        match *self {
            Self::EvenSplit => {
                let n = combination.n_terms() as f64;
                combination
                    .terms()
                    .iter()
                    .map(|&(i, coeff)| (i, (coeff * n).inv()))
                    .collect()
            }
            Self::SingleField(i) => combination
                .coefficient(i)
                .map(|coeff| vec![(i, coeff.inv())])
                .unwrap_or_default(),
        }
    }
}

/// Enforces |mean(combination) − reference| ≥ ε by a uniform additive shift.
#[derive(Debug, Clone)]
pub struct ConstraintProjector {
    epsilon: f64,
    reference: Complex64,
    combination: Combination,
    policy: ShiftPolicy,
    shares: Vec<(usize, Complex64)>,
}

impl ConstraintProjector {
    /// Create a projector with the even-split policy.
    pub fn new(epsilon: f64, reference: Complex64, combination: Combination) -> Result<Self> {
        if !epsilon.is_finite() || epsilon <= 0.0 {
            return Err(FieldError::InvalidEpsilon(epsilon));
        }
        let policy = ShiftPolicy::default();
        let shares = policy.shares(&combination);
        Ok(Self {
            epsilon,
            reference,
            combination,
            policy,
            shares,
        })
    }

    /// Choose how the correction is split between contributing fields.
    pub fn with_policy(mut self, policy: ShiftPolicy) -> Result<Self> {
        policy.validate(&self.combination)?;
        self.shares = policy.shares(&self.combination);
        self.policy = policy;
        Ok(self)
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn reference(&self) -> Complex64 {
        self.reference
    }

    pub fn combination(&self) -> &Combination {
        &self.combination
    }

    pub fn policy(&self) -> ShiftPolicy {
        self.policy
    }

    /// |mean(combination) − reference| for the current fields.
    pub fn distance(&self, fields: &FieldSet) -> f64 {
        (fields.global_mean(&self.combination) - self.reference).norm()
    }

    /// Whether the floor currently holds.
    pub fn is_satisfied(&self, fields: &FieldSet) -> bool {
        self.distance(fields) >= self.epsilon
    }

    /// Apply the floor. Returns `true` if the fields were modified.
    pub fn project(&self, fields: &mut FieldSet) -> bool {
        let mean = fields.global_mean(&self.combination);
        let diff = mean - self.reference;
        let dist = diff.norm();
        if dist >= self.epsilon {
            return false;
        }

        let direction = if dist > 0.0 {
            diff / dist
        } else {
            Complex64::new(1.0, 0.0)
        };
        let target = self.reference + direction * (self.epsilon * (1.0 + OVERSHOOT));
        let delta = target - mean;

        fields.shift_fields(&self.shares, delta);
        fields.record_constraint_hit();
        log::trace!(
            "constraint floor hit at step {}: |A - ref| = {dist:.3e} < {:.3e}",
            fields.step_index(),
            self.epsilon
        );
        true
    }
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use crate::field::{ComplexField, InitOptions};
    use crate::grid::Grid;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn floor_holds_after_projection(
            re in -0.2..0.2_f64,
            im in -0.2..0.2_f64,
            eps in 1e-4..0.5_f64,
            split in prop::bool::ANY,
        ) {
            let grid = Grid::new(&[4, 4]).unwrap();
            let mut fields = FieldSet::new(grid, &["phi", "chi"]).unwrap();
            let phi = ComplexField::from_fn(fields.grid(), |x| {
                Complex64::new(re + 0.1 * x[0] as f64, im - 0.05 * x[1] as f64)
            });
            fields
                .set_initial_conditions([("phi", &phi)], InitOptions { mean_subtract: false })
                .unwrap();

            let psi = Combination::sum(&[0, 1]).unwrap();
            let policy = if split { ShiftPolicy::EvenSplit } else { ShiftPolicy::SingleField(1) };
            let projector = ConstraintProjector::new(eps, Complex64::new(0.0, 0.0), psi)
                .unwrap()
                .with_policy(policy)
                .unwrap();

            let hit = projector.project(&mut fields);
            prop_assert!(projector.distance(&fields) >= eps);
            prop_assert!(projector.is_satisfied(&fields));
            prop_assert_eq!(fields.constraint_hits(), u64::from(hit));
            prop_assert!(!projector.project(&mut fields));
        }
    }
}
