//! Periodic D-dimensional lattice with unit spacing.

use num_complex::Complex64;

use crate::error::{FieldError, Result};

/// Periodic lattice for scalar field evolution.
///
/// Sites are linearized with axis 0 varying fastest. Neighbor tables are
/// built once so the stencil loops never branch at the boundary.
#[derive(Debug, Clone)]
pub struct Grid {
    /// Extent along each axis.
    dims: Vec<usize>,

    /// Linear-index stride of each axis.
    strides: Vec<usize>,

    /// Number of lattice sites.
    n_sites: usize,

    /// Wave speed c in the kinetic term.
    wave_speed: f64,

    /// Forward neighbor of every site, stored as `forward[axis * n_sites + site]`.
    forward: Vec<usize>,

    /// Backward neighbor of every site, same layout as `forward`.
    backward: Vec<usize>,
}

impl Grid {
    /// Create a periodic grid with the given extents and wave speed 1.
    pub fn new(dims: &[usize]) -> Result<Self> {
        if dims.is_empty() {
            return Err(FieldError::InvalidGrid("grid needs at least one axis".into()));
        }
        if let Some(axis) = dims.iter().position(|&n| n == 0) {
            return Err(FieldError::InvalidGrid(format!("axis {axis} has zero extent")));
        }

        let too_large = || FieldError::InvalidGrid(format!("grid {dims:?} has too many sites"));
        let mut strides = Vec::with_capacity(dims.len());
        let mut n_sites: usize = 1;
        for &n in dims {
            strides.push(n_sites);
            n_sites = n_sites.checked_mul(n).ok_or_else(too_large)?;
        }
        let table_len = dims.len().checked_mul(n_sites).ok_or_else(too_large)?;
        // Field arrays and neighbor tables must stay within allocation limits.
        let max_len = isize::MAX as usize / std::mem::size_of::<Complex64>();
        if table_len > max_len {
            return Err(too_large());
        }

        let mut forward = vec![0; table_len];
        let mut backward = vec![0; table_len];
        for (axis, (&n, &stride)) in dims.iter().zip(&strides).enumerate() {
            let offset = axis * n_sites;
            for site in 0..n_sites {
                let c = (site / stride) % n;
                let base = site - c * stride;
                forward[offset + site] = base + ((c + 1) % n) * stride;
                backward[offset + site] = base + ((c + n - 1) % n) * stride;
            }
        }

        Ok(Self {
            dims: dims.to_vec(),
            strides,
            n_sites,
            wave_speed: 1.0,
            forward,
            backward,
        })
    }

    /// Set the wave speed c.
    pub fn with_wave_speed(mut self, c: f64) -> Result<Self> {
        if !c.is_finite() || c <= 0.0 {
            return Err(FieldError::InvalidGrid(format!(
                "wave speed must be finite and positive, got {c}"
            )));
        }
        self.wave_speed = c;
        Ok(self)
    }

    /// Extent along each axis.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Number of axes D.
    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    /// Number of lattice sites.
    pub fn n_sites(&self) -> usize {
        self.n_sites
    }

    /// Wave speed c.
    pub fn wave_speed(&self) -> f64 {
        self.wave_speed
    }

    /// Convert coordinates to a linear site index. Coordinates wrap periodically.
    #[inline]
    pub fn site_index(&self, coords: &[usize]) -> usize {
        debug_assert_eq!(coords.len(), self.dims.len());
        coords
            .iter()
            .zip(self.dims.iter().zip(&self.strides))
            .map(|(&c, (&n, &stride))| (c % n) * stride)
            .sum()
    }

    /// Convert a linear site index to coordinates.
    pub fn site_coords(&self, site: usize) -> Vec<usize> {
        self.dims
            .iter()
            .zip(&self.strides)
            .map(|(&n, &stride)| (site / stride) % n)
            .collect()
    }

    /// Neighboring site in the +axis direction (periodic).
    #[inline]
    pub fn neighbor(&self, site: usize, axis: usize) -> usize {
        self.forward[axis * self.n_sites + site]
    }

    /// Neighboring site in the -axis direction (periodic).
    #[inline]
    pub fn neighbor_back(&self, site: usize, axis: usize) -> usize {
        self.backward[axis * self.n_sites + site]
    }

    /// Check that an array shape matches this grid.
    pub fn check_shape(&self, field: &str, shape: &[usize]) -> Result<()> {
        if shape == self.dims.as_slice() {
            Ok(())
        } else {
            Err(FieldError::ShapeMismatch {
                field: field.to_string(),
                expected: self.dims.clone(),
                found: shape.to_vec(),
            })
        }
    }

    /// Discrete Laplacian with the 2nd-order central stencil.
    pub fn laplacian(&self, field: &[Complex64]) -> Vec<Complex64> {
        let mut out = vec![Complex64::new(0.0, 0.0); self.n_sites];
        self.laplacian_into(field, &mut out);
        out
    }

    /// Discrete Laplacian written into `out`.
    ///
    /// Each axis contributes `φ(x+ê) + φ(x−ê) − 2φ(x)`, so a constant field
    /// maps to exactly zero.
    pub fn laplacian_into(&self, field: &[Complex64], out: &mut [Complex64]) {
        debug_assert_eq!(field.len(), self.n_sites);
        debug_assert_eq!(out.len(), self.n_sites);

        out.fill(Complex64::new(0.0, 0.0));
        for axis in 0..self.dims.len() {
            let range = axis * self.n_sites..(axis + 1) * self.n_sites;
            let fwd = &self.forward[range.clone()];
            let bwd = &self.backward[range];
            for (site, lap) in out.iter_mut().enumerate() {
                *lap += field[fwd[site]] + field[bwd[site]] - field[site] * 2.0;
            }
        }
    }

    /// Sum of squared forward differences, Σ_x Σ_axes |φ(x+ê) − φ(x)|².
    pub fn gradient_squared(&self, field: &[Complex64]) -> f64 {
        debug_assert_eq!(field.len(), self.n_sites);

        let mut sum = 0.0;
        for axis in 0..self.dims.len() {
            let fwd = &self.forward[axis * self.n_sites..(axis + 1) * self.n_sites];
            for (site, value) in field.iter().enumerate() {
                sum += (field[fwd[site]] - *value).norm_sqr();
            }
        }
        sum
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    #[test]
    fn test_grid_creation() {
        let grid = Grid::new(&[4, 4, 4]).unwrap();
        assert_eq!(grid.n_sites(), 64);
        assert_eq!(grid.ndim(), 3);
        assert_eq!(grid.wave_speed(), 1.0);
    }

    #[test]
    fn test_invalid_grids() {
        assert!(matches!(Grid::new(&[]), Err(FieldError::InvalidGrid(_))));
        assert!(matches!(Grid::new(&[4, 0]), Err(FieldError::InvalidGrid(_))));
        let grid = Grid::new(&[4]).unwrap();
        assert!(grid.clone().with_wave_speed(0.0).is_err());
        assert!(grid.with_wave_speed(f64::NAN).is_err());
    }

    #[test]
    fn test_site_indexing() {
        let grid = Grid::new(&[3, 4, 5]).unwrap();
        let site = grid.site_index(&[1, 2, 3]);
        assert_eq!(site, 1 + 3 * (2 + 4 * 3));
        assert_eq!(grid.site_coords(site), vec![1, 2, 3]);
    }

    #[test]
    fn test_neighbors_wrap() {
        let grid = Grid::new(&[4, 4, 4]).unwrap();
        let origin = grid.site_index(&[0, 0, 0]);

        let fwd = grid.neighbor(origin, 1);
        assert_eq!(grid.site_coords(fwd), vec![0, 1, 0]);

        let back = grid.neighbor_back(origin, 2);
        assert_eq!(grid.site_coords(back), vec![0, 0, 3]);

        let corner = grid.site_index(&[3, 3, 3]);
        assert_eq!(grid.site_coords(grid.neighbor(corner, 0)), vec![0, 3, 3]);
    }

    #[test]
    fn test_laplacian_constant_is_zero() {
        let grid = Grid::new(&[5, 3, 4]).unwrap();
        let field = vec![c(0.1, -0.7); grid.n_sites()];
        let lap = grid.laplacian(&field);
        assert!(lap.iter().all(|z| *z == c(0.0, 0.0)));
    }

    #[test]
    fn test_laplacian_point_source() {
        let grid = Grid::new(&[4, 4, 4]).unwrap();
        let mut field = vec![c(0.0, 0.0); grid.n_sites()];
        let center = grid.site_index(&[1, 2, 3]);
        field[center] = c(1.0, 0.0);

        let lap = grid.laplacian(&field);
        assert_eq!(lap[center], c(-6.0, 0.0));
        for axis in 0..3 {
            assert_eq!(lap[grid.neighbor(center, axis)], c(1.0, 0.0));
            assert_eq!(lap[grid.neighbor_back(center, axis)], c(1.0, 0.0));
        }
        let total: Complex64 = lap.iter().sum();
        assert_relative_eq!(total.norm(), 0.0, epsilon = 1e-14);
    }

    #[test]
    fn test_laplacian_plane_wave_eigenvalue() {
        let n = 16;
        let grid = Grid::new(&[n]).unwrap();
        let k = 3.0 * 2.0 * std::f64::consts::PI / n as f64;
        let field: Vec<Complex64> = (0..n)
            .map(|x| Complex64::from_polar(1.0, k * x as f64))
            .collect();

        let lap = grid.laplacian(&field);
        let eigen = 2.0 * k.cos() - 2.0;
        for (l, f) in lap.iter().zip(&field) {
            assert_relative_eq!(l.re, eigen * f.re, epsilon = 1e-12);
            assert_relative_eq!(l.im, eigen * f.im, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_gradient_matches_laplacian_identity() {
        // Σ|∇φ|² = −Re Σ φ*·∇²φ on a periodic lattice.
        let grid = Grid::new(&[4, 3, 5]).unwrap();
        let field: Vec<Complex64> = (0..grid.n_sites())
            .map(|i| c((i as f64 * 0.37).sin(), (i as f64 * 0.11).cos()))
            .collect();

        let lap = grid.laplacian(&field);
        let via_lap: f64 = -field
            .iter()
            .zip(&lap)
            .map(|(f, l)| (f.conj() * l).re)
            .sum::<f64>();

        assert_relative_eq!(grid.gradient_squared(&field), via_lap, epsilon = 1e-10);
    }

    #[test]
    fn test_single_site_axis_is_inert() {
        let grid = Grid::new(&[1, 6]).unwrap();
        let field: Vec<Complex64> = (0..6).map(|i| c(i as f64, 0.0)).collect();
        let lap = grid.laplacian(&field);
        let reference = Grid::new(&[6]).unwrap().laplacian(&field);
        assert_eq!(lap, reference);
    }

    #[test]
    fn test_site_count_overflow_rejected() {
        let huge = usize::MAX / 2 + 1;
        assert!(matches!(
            Grid::new(&[huge, 2]),
            Err(FieldError::InvalidGrid(_))
        ));
        assert!(matches!(
            Grid::new(&[huge, 3, 5]),
            Err(FieldError::InvalidGrid(_))
        ));
        // Site count fits but the neighbor tables would not.
        assert!(matches!(
            Grid::new(&[huge, 1]),
            Err(FieldError::InvalidGrid(_))
        ));
        // Representable, but beyond what a field array can hold.
        assert!(matches!(
            Grid::new(&[usize::MAX / 16 + 1]),
            Err(FieldError::InvalidGrid(_))
        ));
    }

    #[test]
    fn test_check_shape() {
        let grid = Grid::new(&[4, 4]).unwrap();
        assert!(grid.check_shape("phi", &[4, 4]).is_ok());
        assert!(matches!(
            grid.check_shape("phi", &[16]),
            Err(FieldError::ShapeMismatch { .. })
        ));
    }
}
