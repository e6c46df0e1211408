//! Empirical point-density (histogram) distribution.
//!
//! The fixed part is a strictly increasing grid of support points; the
//! tunable part is one raw log-mass per grid point. Evaluation normalizes
//! the log-masses through a safe softmax, so any finite theta is a valid
//! density. Each grid point owns a bin whose edges sit halfway to its
//! neighbours (the end bins extend symmetrically).
use crate::{
    dist::Parameterized,
    errors::{FitError, FitResult},
    numerics::safe_softmax,
    types::{Grad, Theta},
};
use ndarray::Array1;
use std::hash::{Hash, Hasher};

/// Strictly increasing grid of support points for a [`PointDensity`].
///
/// Participates in specialization keys, so equality and hashing go through
/// the IEEE bit patterns of the grid points (NaNs are rejected up front).
#[derive(Debug, Clone)]
pub struct Grid {
    xs: Vec<f64>,
}

impl Grid {
    /// Construct a validated grid.
    ///
    /// # Errors
    /// - [`FitError::InvalidParameter`] if the grid has fewer than two
    ///   points, contains a non-finite value, or is not strictly
    ///   increasing.
    pub fn new(xs: Vec<f64>) -> FitResult<Self> {
        if xs.len() < 2 {
            return Err(FitError::InvalidParameter {
                name: "grid",
                value: xs.len() as f64,
                reason: "A grid needs at least two support points.",
            });
        }
        for window in xs.windows(2) {
            if !window[0].is_finite() || !window[1].is_finite() {
                return Err(FitError::InvalidParameter {
                    name: "grid",
                    value: if window[0].is_finite() { window[1] } else { window[0] },
                    reason: "Grid points must be finite.",
                });
            }
            if window[1] <= window[0] {
                return Err(FitError::InvalidParameter {
                    name: "grid",
                    value: window[1],
                    reason: "Grid points must be strictly increasing.",
                });
            }
        }
        Ok(Self { xs })
    }

    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    pub fn points(&self) -> &[f64] {
        &self.xs
    }

    /// Lower and upper edge of the bin owned by grid point `j`.
    fn bin_edges(&self, j: usize) -> (f64, f64) {
        let n = self.xs.len();
        let lower = if j == 0 {
            self.xs[0] - 0.5 * (self.xs[1] - self.xs[0])
        } else {
            0.5 * (self.xs[j - 1] + self.xs[j])
        };
        let upper = if j == n - 1 {
            self.xs[n - 1] + 0.5 * (self.xs[n - 1] - self.xs[n - 2])
        } else {
            0.5 * (self.xs[j] + self.xs[j + 1])
        };
        (lower, upper)
    }

    fn bin_width(&self, j: usize) -> f64 {
        let (lower, upper) = self.bin_edges(j);
        upper - lower
    }

    /// Index of the bin containing `x`, or `None` outside the support.
    fn bin_of(&self, x: f64) -> Option<usize> {
        let n = self.xs.len();
        let (support_low, _) = self.bin_edges(0);
        let (_, support_high) = self.bin_edges(n - 1);
        if x < support_low || x > support_high {
            return None;
        }
        // First grid point at or above x; the owning bin is that point or
        // its left neighbour, split at the midpoint between them.
        let j = self.xs.partition_point(|&c| c < x);
        if j == 0 {
            return Some(0);
        }
        if j == n {
            return Some(n - 1);
        }
        let mid = 0.5 * (self.xs[j - 1] + self.xs[j]);
        Some(if x >= mid { j } else { j - 1 })
    }
}

impl PartialEq for Grid {
    fn eq(&self, other: &Self) -> bool {
        self.xs.len() == other.xs.len()
            && self.xs.iter().zip(&other.xs).all(|(a, b)| a.to_bits() == b.to_bits())
    }
}

impl Eq for Grid {}

impl Hash for Grid {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for &x in &self.xs {
            state.write_u64(x.to_bits());
        }
    }
}

/// Histogram distribution: normalized probability mass per grid bin.
#[derive(Debug, Clone, PartialEq)]
pub struct PointDensity {
    grid: Grid,
    /// Raw (unnormalized) log-masses; the tunable vector.
    log_masses: Vec<f64>,
    /// Softmax-normalized masses, cached at construction.
    masses: Vec<f64>,
}

impl PointDensity {
    /// Build from `(point, density)` pairs, e.g. a community histogram.
    ///
    /// Densities are converted to bin masses (`density · bin width`) and
    /// normalized; they do not need to integrate to 1 on input.
    ///
    /// # Errors
    /// - [`FitError::ShapeMismatch`] if the lengths differ.
    /// - [`FitError::InvalidParameter`] for a non-finite or non-positive
    ///   density, or an invalid grid.
    pub fn from_pairs(xs: Vec<f64>, densities: &[f64]) -> FitResult<Self> {
        let grid = Grid::new(xs)?;
        if densities.len() != grid.len() {
            return Err(FitError::ShapeMismatch {
                what: "point-density pairs",
                expected: grid.len(),
                actual: densities.len(),
            });
        }
        let mut log_masses = Vec::with_capacity(densities.len());
        for (j, &d) in densities.iter().enumerate() {
            if !d.is_finite() || d <= 0.0 {
                return Err(FitError::InvalidParameter {
                    name: "density",
                    value: d,
                    reason: "Reference densities must be finite and strictly positive.",
                });
            }
            log_masses.push((d * grid.bin_width(j)).ln());
        }
        let theta = Array1::from(log_masses);
        Self::structure(&grid, &theta)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn masses(&self) -> &[f64] {
        &self.masses
    }

    /// Log-density at `x`: `ln(mass_bin) - ln(width_bin)` for the owning
    /// bin, `-∞` outside the support.
    pub fn logpdf(&self, x: f64) -> f64 {
        match self.grid.bin_of(x) {
            Some(j) => self.masses[j].ln() - self.grid.bin_width(j).ln(),
            None => f64::NEG_INFINITY,
        }
    }

    /// CDF at `x`: full masses of bins below plus the linear fraction of
    /// the bin containing `x`.
    pub fn cdf(&self, x: f64) -> f64 {
        self.bin_coverage(x).iter().zip(&self.masses).map(|(a, m)| a * m).sum()
    }

    /// Per-bin coverage coefficients `a_j ∈ [0, 1]` such that
    /// `cdf(x) = Σ_j a_j · mass_j`.
    fn bin_coverage(&self, x: f64) -> Vec<f64> {
        (0..self.grid.len())
            .map(|j| {
                let (lower, upper) = self.grid.bin_edges(j);
                if x >= upper {
                    1.0
                } else if x <= lower {
                    0.0
                } else {
                    (x - lower) / (upper - lower)
                }
            })
            .collect()
    }

    /// Gradient of `logpdf(x)` with respect to the raw log-masses.
    ///
    /// With `p = softmax(θ)` and owning bin `b`:
    /// `∂ logpdf / ∂ θ_j = δ_{jb} - p_j`. Outside the support the
    /// log-density is constant (`-∞`), so the gradient is zero.
    pub(crate) fn grad_logpdf(&self, x: f64) -> Grad {
        let mut grad = Array1::zeros(self.grid.len());
        if let Some(bin) = self.grid.bin_of(x) {
            for (j, &p) in self.masses.iter().enumerate() {
                grad[j] = if j == bin { 1.0 - p } else { -p };
            }
        }
        grad
    }

    /// Gradient of `cdf(x)` with respect to the raw log-masses:
    /// `∂ cdf / ∂ θ_j = p_j · (a_j - cdf(x))`.
    pub(crate) fn grad_cdf(&self, x: f64) -> Grad {
        let coverage = self.bin_coverage(x);
        let cdf = coverage.iter().zip(&self.masses).map(|(a, m)| a * m).sum::<f64>();
        coverage.iter().zip(&self.masses).map(|(a, p)| p * (a - cdf)).collect()
    }
}

impl Parameterized for PointDensity {
    type Fixed = Grid;

    fn destructure(&self) -> (Grid, Theta) {
        (self.grid.clone(), Array1::from(self.log_masses.clone()))
    }

    fn structure(grid: &Grid, theta: &Theta) -> FitResult<Self> {
        if theta.len() != grid.len() {
            return Err(FitError::ShapeMismatch {
                what: "point-density log-masses",
                expected: grid.len(),
                actual: theta.len(),
            });
        }
        for &value in theta.iter() {
            if !value.is_finite() {
                return Err(FitError::InvalidParameter {
                    name: "log_mass",
                    value,
                    reason: "Log-masses must be finite.",
                });
            }
        }
        let log_masses = theta.to_vec();
        let masses = safe_softmax(&log_masses);
        Ok(Self { grid: grid.clone(), log_masses, masses })
    }

    fn theta_len(grid: &Grid) -> usize {
        grid.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finitediff::FiniteDiff;

    fn uniform_grid() -> Grid {
        Grid::new(vec![0.0, 1.0, 2.0, 3.0]).unwrap()
    }

    #[test]
    // Purpose
    // -------
    // Verify grid validation: too few points, non-monotone order.
    //
    // Given
    // -----
    // - A single-point grid and a decreasing grid.
    //
    // Expect
    // ------
    // - Both constructions fail with `FitError::InvalidParameter`.
    fn grid_validation_rejects_bad_grids() {
        assert!(matches!(
            Grid::new(vec![1.0]),
            Err(FitError::InvalidParameter { name: "grid", .. })
        ));
        assert!(matches!(
            Grid::new(vec![0.0, 2.0, 1.0]),
            Err(FitError::InvalidParameter { name: "grid", .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Verify the round-trip identity on raw log-masses.
    //
    // Given
    // -----
    // - A four-point uniform grid and an arbitrary finite theta.
    //
    // Expect
    // ------
    // - destructure(structure(grid, theta)) returns theta unchanged and
    //   the same grid.
    fn structure_destructure_round_trip() {
        let grid = uniform_grid();
        let theta: Theta = Array1::from(vec![-0.1, 0.4, 1.0, -2.0]);
        let pd = PointDensity::structure(&grid, &theta).unwrap();
        let (grid_back, theta_back) = pd.destructure();
        assert_eq!(grid_back, grid);
        for (a, b) in theta_back.iter().zip(theta.iter()) {
            assert!((a - b).abs() < 1e-15);
        }
    }

    #[test]
    // Purpose
    // -------
    // Verify CDF boundary behavior and total mass.
    //
    // Given
    // -----
    // - Equal masses on a uniform grid (bins [-0.5, 3.5] overall).
    //
    // Expect
    // ------
    // - cdf below the support is 0, above is 1, and the midpoint of the
    //   support splits the mass evenly.
    fn cdf_covers_unit_mass() {
        let grid = uniform_grid();
        let theta: Theta = Array1::from(vec![0.0; 4]);
        let pd = PointDensity::structure(&grid, &theta).unwrap();
        assert_eq!(pd.cdf(-1.0), 0.0);
        assert!((pd.cdf(10.0) - 1.0).abs() < 1e-12);
        assert!((pd.cdf(1.5) - 0.5).abs() < 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Verify that `from_pairs` normalizes densities into a proper mass
    // vector.
    //
    // Given
    // -----
    // - Densities proportional to [1, 2, 3, 2] on the uniform grid.
    //
    // Expect
    // ------
    // - Masses sum to 1 and keep the input proportions.
    fn from_pairs_normalizes() {
        let pd = PointDensity::from_pairs(vec![0.0, 1.0, 2.0, 3.0], &[1.0, 2.0, 3.0, 2.0]).unwrap();
        let total: f64 = pd.masses().iter().sum();
        assert!((total - 1.0).abs() < 1e-12);
        assert!((pd.masses()[2] / pd.masses()[0] - 3.0).abs() < 1e-9);
    }

    #[test]
    // Purpose
    // -------
    // Verify analytic logpdf and cdf gradients against central finite
    // differences across 20 random parameter draws.
    //
    // Given
    // -----
    // - Random raw log-masses in [-2, 2] on the uniform grid and a random
    //   evaluation point inside the support per draw, seeded.
    //
    // Expect
    // ------
    // - Relative agreement within 1e-4 (absolute floor 1e-6) elementwise.
    fn gradients_match_finite_differences() {
        use rand::{rngs::StdRng, Rng, SeedableRng};

        let grid = uniform_grid();
        let mut rng = StdRng::seed_from_u64(19);
        for draw in 0..20 {
            let theta: Theta = (0..4).map(|_| rng.gen_range(-2.0..2.0)).collect();
            let x = rng.gen_range(-0.4..3.4);
            let pd = PointDensity::structure(&grid, &theta).unwrap();

            let analytic_lp = pd.grad_logpdf(x);
            let fd_lp = theta.central_diff(&|t: &Theta| {
                PointDensity::structure(&grid, t).map(|d| d.logpdf(x)).unwrap_or(f64::NAN)
            });
            let analytic_cdf = pd.grad_cdf(x);
            let fd_cdf = theta.central_diff(&|t: &Theta| {
                PointDensity::structure(&grid, t).map(|d| d.cdf(x)).unwrap_or(f64::NAN)
            });
            for j in 0..4 {
                let tol_lp = (1e-4 * fd_lp[j].abs().max(1.0)).max(1e-6);
                assert!(
                    (analytic_lp[j] - fd_lp[j]).abs() < tol_lp,
                    "draw {draw} logpdf grad at x = {x}: analytic {} vs fd {}",
                    analytic_lp[j],
                    fd_lp[j]
                );
                let tol_cdf = (1e-4 * fd_cdf[j].abs().max(1.0)).max(1e-6);
                assert!(
                    (analytic_cdf[j] - fd_cdf[j]).abs() < tol_cdf,
                    "draw {draw} cdf grad at x = {x}: analytic {} vs fd {}",
                    analytic_cdf[j],
                    fd_cdf[j]
                );
            }
        }
    }
}
