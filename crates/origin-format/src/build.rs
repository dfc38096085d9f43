//! Construction of core objects from a [`RunSpec`].

use num_complex::Complex64;
use origin_field::{
    ConstraintProjector, FieldCoupling, FieldSet, Grid, PotentialModel, ShiftPolicy,
};

use crate::error::Result;
use crate::schema::{PolicySpec, RunSpec};

impl RunSpec {
    pub fn build_grid(&self) -> Result<Grid> {
        Ok(Grid::new(&self.grid.dims)?.with_wave_speed(self.grid.wave_speed)?)
    }

    /// Zero-initialized fields on `grid`, in declaration order.
    pub fn build_fields(&self, grid: Grid) -> Result<FieldSet> {
        Ok(FieldSet::new(grid, &self.field_names())?)
    }

    pub fn build_potential(&self) -> Result<PotentialModel> {
        let mut builder = PotentialModel::builder(self.fields.len());
        for (i, field) in self.fields.iter().enumerate() {
            builder = builder.field(i, FieldCoupling::new(field.mass, field.self_coupling));
        }
        for coupling in &self.cross_couplings {
            let a = self.field_index(&coupling.a)?;
            let b = self.field_index(&coupling.b)?;
            builder = builder.cross_coupling(a, b, coupling.g);
        }
        Ok(builder.build()?)
    }

    /// Projector for `fields`, or `None` for an unconstrained run.
    pub fn build_constraint(&self, fields: &FieldSet) -> Result<Option<ConstraintProjector>> {
        let Some(spec) = &self.constraint else {
            return Ok(None);
        };

        let mut terms = Vec::with_capacity(spec.combination.len());
        for term in &spec.combination {
            self.field_index(&term.field)?;
            terms.push((term.field.as_str(), Complex64::new(term.coefficient, 0.0)));
        }
        let combination = fields.weighted_combination(&terms)?;

        let policy = match &spec.policy {
            PolicySpec::EvenSplit => ShiftPolicy::EvenSplit,
            PolicySpec::SingleField(name) => ShiftPolicy::SingleField(self.field_index(name)?),
        };
        let reference = Complex64::new(spec.reference[0], spec.reference[1]);

        let projector =
            ConstraintProjector::new(spec.epsilon, reference, combination)?.with_policy(policy)?;
        Ok(Some(projector))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FormatError;
    use crate::schema::{ConstraintSpec, CrossCouplingSpec, TermSpec};
    use origin_field::FieldError;

    fn two_field() -> RunSpec {
        RunSpec::from_json(
            r#"{
                "grid": { "dims": [4, 4], "wave_speed": 0.5 },
                "fields": [
                    { "name": "phi", "mass": 0.5, "self_coupling": 0.2 },
                    { "name": "chi", "mass": 0.8 }
                ],
                "cross_couplings": [ { "a": "chi", "b": "phi", "g": 0.05 } ],
                "constraint": {
                    "epsilon": 0.05,
                    "reference": [0.1, -0.1],
                    "combination": [ { "field": "phi" }, { "field": "chi", "coefficient": 2.0 } ]
                },
                "integration": { "dt": 0.01, "steps": 10 }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_build_grid_and_fields() {
        let spec = two_field();
        let grid = spec.build_grid().unwrap();
        assert_eq!(grid.dims(), &[4, 4]);
        assert_eq!(grid.wave_speed(), 0.5);

        let fields = spec.build_fields(grid).unwrap();
        assert_eq!(fields.names(), &["phi".to_string(), "chi".to_string()]);
    }

    #[test]
    fn test_build_potential() {
        let potential = two_field().build_potential().unwrap();
        assert_eq!(potential.n_fields(), 2);
        assert_eq!(potential.mass(0), 0.5);
        assert_eq!(potential.self_coupling(0), 0.2);
        assert_eq!(potential.cross_coupling(0, 1), 0.05);
        assert_eq!(potential.cross_coupling(1, 0), 0.05);
    }

    #[test]
    fn test_build_constraint() {
        let spec = two_field();
        let fields = spec.build_fields(spec.build_grid().unwrap()).unwrap();
        let projector = spec.build_constraint(&fields).unwrap().unwrap();

        assert_eq!(projector.epsilon(), 0.05);
        assert_eq!(projector.reference(), Complex64::new(0.1, -0.1));
        assert_eq!(projector.policy(), ShiftPolicy::EvenSplit);
        assert_eq!(
            projector.combination().coefficient(1),
            Some(Complex64::new(2.0, 0.0))
        );
    }

    #[test]
    fn test_unconstrained_run_has_no_projector() {
        let mut spec = two_field();
        spec.constraint = None;
        let fields = spec.build_fields(spec.build_grid().unwrap()).unwrap();
        assert!(spec.build_constraint(&fields).unwrap().is_none());
    }

    #[test]
    fn test_unknown_names_rejected() {
        let mut spec = two_field();
        spec.cross_couplings.push(CrossCouplingSpec {
            a: "phi".to_string(),
            b: "psi".to_string(),
            g: 1.0,
        });
        assert!(matches!(spec.validate(), Err(FormatError::UnknownField(name)) if name == "psi"));

        let mut spec = two_field();
        spec.constraint = Some(ConstraintSpec {
            epsilon: 0.05,
            reference: [0.0, 0.0],
            combination: vec![TermSpec {
                field: "phi".to_string(),
                coefficient: 1.0,
            }],
            policy: PolicySpec::SingleField("psi".to_string()),
        });
        assert!(matches!(spec.validate(), Err(FormatError::UnknownField(_))));
    }

    #[test]
    fn test_core_errors_are_wrapped() {
        let mut spec = two_field();
        spec.constraint.as_mut().unwrap().epsilon = -1.0;
        assert!(matches!(
            spec.validate(),
            Err(FormatError::Field(FieldError::InvalidEpsilon(_)))
        ));

        let mut spec = two_field();
        spec.grid.dims = vec![4, 0];
        assert!(matches!(
            spec.validate(),
            Err(FormatError::Field(FieldError::InvalidGrid(_)))
        ));

        let mut spec = two_field();
        spec.fields[1].name = "phi".to_string();
        assert!(matches!(
            spec.validate(),
            Err(FormatError::Field(FieldError::DuplicateField(_)))
        ));

        // A policy field outside the combination.
        let mut spec = two_field();
        let constraint = spec.constraint.as_mut().unwrap();
        constraint.combination.truncate(1);
        constraint.policy = PolicySpec::SingleField("chi".to_string());
        assert!(matches!(
            spec.validate(),
            Err(FormatError::Field(FieldError::InvalidCombination(_)))
        ));
    }
}
