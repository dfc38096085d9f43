//! Mass, quartic self-interaction, and cross-coupling potential for N fields.
//!
//! Force on field i:
//!
//! ```text
//! F_i = −(m_i² φ_i + λ_i |φ_i|² φ_i + Σ_{j≠i} g_ij |φ_j|² φ_i)
//! ```
//!
//! Energy density per site:
//!
//! ```text
//! V = Σ_i ½ m_i² |φ_i|² + Σ_i ¼ λ_i |φ_i|⁴ + Σ_{i<j} g_ij |φ_i|² |φ_j|²
//! ```

use num_complex::Complex64;

use crate::error::{FieldError, Result};
use crate::field::FieldSet;

/// Mass and self-coupling of one field.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FieldCoupling {
    pub mass: f64,
    pub self_coupling: f64,
}

impl FieldCoupling {
    pub fn new(mass: f64, self_coupling: f64) -> Self {
        Self {
            mass,
            self_coupling,
        }
    }
}

/// Immutable couplings for an N-field model.
#[derive(Debug, Clone, PartialEq)]
pub struct PotentialModel {
    /// Squared masses m_i².
    mass_sq: Vec<f64>,
    masses: Vec<f64>,
    self_couplings: Vec<f64>,
    /// Row-major n × n cross-coupling matrix, zero diagonal.
    cross: Vec<f64>,
}

impl PotentialModel {
    /// Massless, non-interacting fields.
    pub fn free(n_fields: usize) -> Self {
        Self {
            mass_sq: vec![0.0; n_fields],
            masses: vec![0.0; n_fields],
            self_couplings: vec![0.0; n_fields],
            cross: vec![0.0; n_fields * n_fields],
        }
    }

    /// Start a builder for `n_fields` fields.
    pub fn builder(n_fields: usize) -> PotentialBuilder {
        PotentialBuilder::new(n_fields)
    }

    /// Build from per-field parameters and an explicit cross-coupling matrix.
    ///
    /// The matrix must be square, symmetric, and have a zero diagonal.
    pub fn from_matrix(fields: &[FieldCoupling], cross: &[Vec<f64>]) -> Result<Self> {
        let n = fields.len();
        if cross.len() != n || cross.iter().any(|row| row.len() != n) {
            return Err(FieldError::InvalidCoupling(format!(
                "cross-coupling matrix must be {n}×{n}"
            )));
        }
        let model = Self {
            mass_sq: fields.iter().map(|f| f.mass * f.mass).collect(),
            masses: fields.iter().map(|f| f.mass).collect(),
            self_couplings: fields.iter().map(|f| f.self_coupling).collect(),
            cross: cross.iter().flatten().copied().collect(),
        };
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> Result<()> {
        let n = self.n_fields();
        if n == 0 {
            return Err(FieldError::InvalidCoupling("potential needs at least one field".into()));
        }
        for i in 0..n {
            if !self.masses[i].is_finite() || !self.self_couplings[i].is_finite() {
                return Err(FieldError::InvalidCoupling(format!(
                    "field {i} has a non-finite mass or self-coupling"
                )));
            }
            if self.cross[i * n + i] != 0.0 {
                return Err(FieldError::InvalidCoupling(format!(
                    "diagonal entry g[{i}][{i}] = {} must be zero",
                    self.cross[i * n + i]
                )));
            }
            for j in (i + 1)..n {
                let (gij, gji) = (self.cross[i * n + j], self.cross[j * n + i]);
                if !gij.is_finite() || gij != gji {
                    return Err(FieldError::InvalidCoupling(format!(
                        "g[{i}][{j}] = {gij} and g[{j}][{i}] = {gji} must be equal and finite"
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn n_fields(&self) -> usize {
        self.masses.len()
    }

    pub fn mass(&self, i: usize) -> f64 {
        self.masses[i]
    }

    pub fn self_coupling(&self, i: usize) -> f64 {
        self.self_couplings[i]
    }

    pub fn cross_coupling(&self, i: usize, j: usize) -> f64 {
        self.cross[i * self.n_fields() + j]
    }

    /// Force on every field for the current configuration.
    pub fn force(&self, fields: &FieldSet) -> Vec<Vec<Complex64>> {
        let n_sites = fields.grid().n_sites();
        let mut out = vec![vec![Complex64::new(0.0, 0.0); n_sites]; self.n_fields()];
        self.force_into(fields.values(), &mut out);
        out
    }

    /// Force written into preallocated buffers, one per field.
    pub fn force_into(&self, values: &[Vec<Complex64>], out: &mut [Vec<Complex64>]) {
        let n = self.n_fields();
        debug_assert_eq!(values.len(), n);
        debug_assert_eq!(out.len(), n);

        let n_sites = values.first().map_or(0, Vec::len);
        for site in 0..n_sites {
            for i in 0..n {
                let phi = values[i][site];
                let row = &self.cross[i * n..(i + 1) * n];
                let cross: f64 = row
                    .iter()
                    .zip(values)
                    .map(|(g, other)| g * other[site].norm_sqr())
                    .sum();
                let coeff = self.mass_sq[i] + self.self_couplings[i] * phi.norm_sqr() + cross;
                out[i][site] = -(phi * coeff);
            }
        }
    }

    /// Potential energy density at every site.
    pub fn potential_density(&self, fields: &FieldSet) -> Vec<f64> {
        let values = fields.values();
        (0..fields.grid().n_sites())
            .map(|site| self.site_density(values, site))
            .collect()
    }

    /// Potential energy summed over sites.
    pub fn potential_energy(&self, fields: &FieldSet) -> f64 {
        let values = fields.values();
        (0..fields.grid().n_sites())
            .map(|site| self.site_density(values, site))
            .sum()
    }

    #[inline]
    fn site_density(&self, values: &[Vec<Complex64>], site: usize) -> f64 {
        let n = self.n_fields();
        let mut v = 0.0;
        for i in 0..n {
            let a = values[i][site].norm_sqr();
            v += 0.5 * self.mass_sq[i] * a + 0.25 * self.self_couplings[i] * a * a;
            for j in (i + 1)..n {
                let g = self.cross[i * n + j];
                if g != 0.0 {
                    v += g * a * values[j][site].norm_sqr();
                }
            }
        }
        v
    }
}

/// Chained configuration for [`PotentialModel`]. Cross-couplings are set
/// symmetrically, and the first invalid call is reported by [`build`].
///
/// [`build`]: PotentialBuilder::build
#[derive(Debug, Clone)]
pub struct PotentialBuilder {
    model: PotentialModel,
    error: Option<FieldError>,
}

impl PotentialBuilder {
    fn new(n_fields: usize) -> Self {
        Self {
            model: PotentialModel::free(n_fields),
            error: None,
        }
    }

    fn check_index(&mut self, i: usize) -> bool {
        if i < self.model.n_fields() {
            return true;
        }
        if self.error.is_none() {
            self.error = Some(FieldError::InvalidCoupling(format!(
                "field index {i} out of range for {} fields",
                self.model.n_fields()
            )));
        }
        false
    }

    /// Set the mass of field `i`.
    pub fn mass(mut self, i: usize, mass: f64) -> Self {
        if self.check_index(i) {
            self.model.masses[i] = mass;
            self.model.mass_sq[i] = mass * mass;
        }
        self
    }

    /// Set the quartic self-coupling λ of field `i`.
    pub fn self_coupling(mut self, i: usize, lambda: f64) -> Self {
        if self.check_index(i) {
            self.model.self_couplings[i] = lambda;
        }
        self
    }

    /// Set mass and self-coupling of field `i` together.
    pub fn field(self, i: usize, coupling: FieldCoupling) -> Self {
        self.mass(i, coupling.mass)
            .self_coupling(i, coupling.self_coupling)
    }

    /// Set the cross-coupling g between two distinct fields.
    pub fn cross_coupling(mut self, i: usize, j: usize, g: f64) -> Self {
        if !(self.check_index(i) && self.check_index(j)) {
            return self;
        }
        if i == j {
            if self.error.is_none() {
                self.error = Some(FieldError::InvalidCoupling(format!(
                    "cross-coupling of field {i} with itself; use self_coupling"
                )));
            }
            return self;
        }
        let n = self.model.n_fields();
        self.model.cross[i * n + j] = g;
        self.model.cross[j * n + i] = g;
        self
    }

    pub fn build(self) -> Result<PotentialModel> {
        if let Some(err) = self.error {
            return Err(err);
        }
        self.model.validate()?;
        Ok(self.model)
    }
}
