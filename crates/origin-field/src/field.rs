//! Complex field arrays, linear combinations, and the field set that owns them.

use num_complex::Complex64;

use crate::constraint::ShiftPolicy;
use crate::error::{FieldError, Result};
use crate::grid::Grid;

const ZERO: Complex64 = Complex64::new(0.0, 0.0);

/// Dense complex array with an explicit shape.
///
/// This is the form in which initial conditions and perturbations are
/// handed to a [`FieldSet`].
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexField {
    shape: Vec<usize>,
    data: Vec<Complex64>,
}

impl ComplexField {
    /// Zero-filled array of the given shape.
    pub fn zeros(shape: &[usize]) -> Self {
        Self {
            shape: shape.to_vec(),
            data: vec![ZERO; shape.iter().product()],
        }
    }

    /// Wrap existing data. The data length must equal the product of the shape.
    pub fn from_vec(shape: &[usize], data: Vec<Complex64>) -> Result<Self> {
        let expected: usize = shape.iter().product();
        if expected != data.len() {
            return Err(FieldError::ShapeMismatch {
                field: "<array>".into(),
                expected: shape.to_vec(),
                found: vec![data.len()],
            });
        }
        Ok(Self {
            shape: shape.to_vec(),
            data,
        })
    }

    /// Evaluate `f` at the coordinates of every site of `grid`.
    pub fn from_fn<F>(grid: &Grid, mut f: F) -> Self
    where
        F: FnMut(&[usize]) -> Complex64,
    {
        let data = (0..grid.n_sites())
            .map(|site| f(&grid.site_coords(site)))
            .collect();
        Self {
            shape: grid.dims().to_vec(),
            data,
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn as_slice(&self) -> &[Complex64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [Complex64] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<Complex64> {
        self.data
    }

    /// Spatial average.
    pub fn mean(&self) -> Complex64 {
        mean(&self.data)
    }
}

/// Fixed linear map from the fields of a set to one complex scalar field.
///
/// Terms are `(field index, coefficient)` pairs with distinct indices and
/// nonzero coefficients.
#[derive(Debug, Clone, PartialEq)]
pub struct Combination {
    terms: Vec<(usize, Complex64)>,
}

impl Combination {
    /// The identity map onto a single field.
    pub fn single(field: usize) -> Self {
        Self {
            terms: vec![(field, Complex64::new(1.0, 0.0))],
        }
    }

    /// Unit-weight sum of several fields, e.g. ψ = φ + χ.
    pub fn sum(fields: &[usize]) -> Result<Self> {
        Self::from_terms(
            fields
                .iter()
                .map(|&i| (i, Complex64::new(1.0, 0.0)))
                .collect(),
        )
    }

    /// General weighted combination.
    pub fn from_terms(terms: Vec<(usize, Complex64)>) -> Result<Self> {
        if terms.is_empty() {
            return Err(FieldError::InvalidCombination(
                "combination has no terms".into(),
            ));
        }
        for (n, &(field, coeff)) in terms.iter().enumerate() {
            if coeff == ZERO || !coeff.is_finite() {
                return Err(FieldError::InvalidCombination(format!(
                    "coefficient of field {field} must be finite and nonzero"
                )));
            }
            if terms[..n].iter().any(|&(other, _)| other == field) {
                return Err(FieldError::InvalidCombination(format!(
                    "field {field} appears twice"
                )));
            }
        }
        Ok(Self { terms })
    }

    pub fn terms(&self) -> &[(usize, Complex64)] {
        &self.terms
    }

    /// Number of contributing fields.
    pub fn n_terms(&self) -> usize {
        self.terms.len()
    }

    pub fn contains(&self, field: usize) -> bool {
        self.terms.iter().any(|&(i, _)| i == field)
    }

    pub fn coefficient(&self, field: usize) -> Option<Complex64> {
        self.terms
            .iter()
            .find_map(|&(i, coeff)| (i == field).then_some(coeff))
    }
}

/// Options for [`FieldSet::set_initial_conditions`].
#[derive(Debug, Clone, Copy)]
pub struct InitOptions {
    /// Subtract each field's spatial mean before storing it.
    pub mean_subtract: bool,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            mean_subtract: true,
        }
    }
}

/// Integration phase of a field set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    /// Freshly allocated or re-initialized; configuration may still change.
    Initialized,
    /// At least one step has been taken.
    Stepped,
}

/// Named complex fields and their conjugate momenta on a shared grid.
#[derive(Debug, Clone)]
pub struct FieldSet {
    grid: Grid,
    names: Vec<String>,

    /// Field values φ_i, one array per field.
    values: Vec<Vec<Complex64>>,

    /// Conjugate momenta π_i.
    momenta: Vec<Vec<Complex64>>,

    step_index: u64,
    time: f64,
    constraint_hits: u64,
}

impl FieldSet {
    /// Allocate zero-filled fields with the given names.
    pub fn new(grid: Grid, names: &[&str]) -> Result<Self> {
        if names.is_empty() {
            return Err(FieldError::InvalidField("field set needs at least one field".into()));
        }
        for (n, name) in names.iter().enumerate() {
            if name.is_empty() {
                return Err(FieldError::InvalidField("field name is empty".into()));
            }
            if names[..n].contains(name) {
                return Err(FieldError::DuplicateField(name.to_string()));
            }
        }

        let n_sites = grid.n_sites();
        Ok(Self {
            names: names.iter().map(|s| s.to_string()).collect(),
            values: vec![vec![ZERO; n_sites]; names.len()],
            momenta: vec![vec![ZERO; n_sites]; names.len()],
            grid,
            step_index: 0,
            time: 0.0,
            constraint_hits: 0,
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn n_fields(&self) -> usize {
        self.names.len()
    }

    /// Index of the named field.
    pub fn index_of(&self, name: &str) -> Result<usize> {
        self.names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| FieldError::UnknownField(name.to_string()))
    }

    /// Values of the named field.
    pub fn field(&self, name: &str) -> Result<&[Complex64]> {
        Ok(&self.values[self.index_of(name)?])
    }

    /// Values of field `i`.
    pub fn field_at(&self, i: usize) -> &[Complex64] {
        &self.values[i]
    }

    /// Momentum of field `i`.
    pub fn momentum_at(&self, i: usize) -> &[Complex64] {
        &self.momenta[i]
    }

    /// Number of completed steps.
    pub fn step_index(&self) -> u64 {
        self.step_index
    }

    /// Accumulated simulated time.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Number of steps in which the constraint projector modified the fields.
    pub fn constraint_hits(&self) -> u64 {
        self.constraint_hits
    }

    pub fn phase(&self) -> RunPhase {
        if self.step_index == 0 {
            RunPhase::Initialized
        } else {
            RunPhase::Stepped
        }
    }

    /// Overwrite the fields and restart the clock.
    ///
    /// Every named array must have exactly the grid shape. Fields that are
    /// not named are reset to zero. Momenta and all counters are reset. All
    /// inputs are validated before anything is written.
    pub fn set_initial_conditions<'a, I>(&mut self, values: I, options: InitOptions) -> Result<()>
    where
        I: IntoIterator<Item = (&'a str, &'a ComplexField)>,
    {
        let mut assigned: Vec<(usize, &ComplexField)> = Vec::new();
        for (name, array) in values {
            let index = self.index_of(name)?;
            if assigned.iter().any(|&(i, _)| i == index) {
                return Err(FieldError::DuplicateField(name.to_string()));
            }
            self.grid.check_shape(name, array.shape())?;
            assigned.push((index, array));
        }

        for field in &mut self.values {
            field.fill(ZERO);
        }
        for (index, array) in assigned {
            let target = &mut self.values[index];
            target.copy_from_slice(array.as_slice());
            if options.mean_subtract {
                let m = mean(target);
                for value in target.iter_mut() {
                    *value -= m;
                }
            }
        }
        for momentum in &mut self.momenta {
            momentum.fill(ZERO);
        }

        self.step_index = 0;
        self.time = 0.0;
        self.constraint_hits = 0;
        Ok(())
    }

    /// Add a perturbation to one field before integration begins.
    pub fn add_perturbation(&mut self, name: &str, bump: &ComplexField) -> Result<()> {
        if self.phase() == RunPhase::Stepped {
            return Err(FieldError::IntegrationStarted);
        }
        let index = self.index_of(name)?;
        self.grid.check_shape(name, bump.shape())?;
        for (value, delta) in self.values[index].iter_mut().zip(bump.as_slice()) {
            *value += delta;
        }
        Ok(())
    }

    /// Spatial mean of a linear combination of fields.
    ///
    /// # Panics
    ///
    /// Panics if the combination refers to a field index outside this set.
    pub fn global_mean(&self, combination: &Combination) -> Complex64 {
        combination
            .terms()
            .iter()
            .map(|&(i, coeff)| coeff * mean(&self.values[i]))
            .sum()
    }

    /// Spatial mean of the named field.
    pub fn field_mean(&self, name: &str) -> Result<Complex64> {
        Ok(mean(self.field(name)?))
    }

    /// Build a unit-weight sum of the named fields.
    pub fn combination(&self, names: &[&str]) -> Result<Combination> {
        let indices = names
            .iter()
            .map(|name| self.index_of(name))
            .collect::<Result<Vec<_>>>()?;
        Combination::sum(&indices)
    }

    /// Build a weighted combination of the named fields.
    pub fn weighted_combination(&self, terms: &[(&str, Complex64)]) -> Result<Combination> {
        let terms = terms
            .iter()
            .map(|&(name, coeff)| Ok((self.index_of(name)?, coeff)))
            .collect::<Result<Vec<_>>>()?;
        Combination::from_terms(terms)
    }

    /// Check that every field referenced by `combination` exists.
    pub fn check_combination(&self, combination: &Combination) -> Result<()> {
        match combination
            .terms()
            .iter()
            .find(|&&(i, _)| i >= self.n_fields())
        {
            Some(&(i, _)) => Err(FieldError::UnknownField(format!("index {i}"))),
            None => Ok(()),
        }
    }

    /// Shift the mean of `combination` by `delta`, splitting evenly between
    /// the contributing fields.
    pub fn apply_uniform_shift(&mut self, combination: &Combination, delta: Complex64) {
        let shares = ShiftPolicy::EvenSplit.shares(combination);
        self.shift_fields(&shares, delta);
    }

    /// Shift the mean of `combination` by `delta` using an explicit policy.
    pub fn apply_shift_with(
        &mut self,
        combination: &Combination,
        delta: Complex64,
        policy: ShiftPolicy,
    ) -> Result<()> {
        policy.validate(combination)?;
        let shares = policy.shares(combination);
        self.shift_fields(&shares, delta);
        Ok(())
    }

    /// Add `share · delta` uniformly to every site of each listed field.
    pub(crate) fn shift_fields(&mut self, shares: &[(usize, Complex64)], delta: Complex64) {
        for &(i, share) in shares {
            let shift = share * delta;
            for value in &mut self.values[i] {
                *value += shift;
            }
        }
    }

    /// Split borrow used by the integrator.
    pub(crate) fn parts_mut(&mut self) -> (&Grid, &mut [Vec<Complex64>], &mut [Vec<Complex64>]) {
        (&self.grid, &mut self.values, &mut self.momenta)
    }

    pub(crate) fn values(&self) -> &[Vec<Complex64>] {
        &self.values
    }

    pub(crate) fn momenta(&self) -> &[Vec<Complex64>] {
        &self.momenta
    }

    pub(crate) fn advance_clock(&mut self, dt: f64) {
        self.step_index += 1;
        self.time += dt;
    }

    pub(crate) fn record_constraint_hit(&mut self) {
        self.constraint_hits += 1;
    }
}

fn mean(values: &[Complex64]) -> Complex64 {
    values.iter().sum::<Complex64>() / values.len() as f64
}
