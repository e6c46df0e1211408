//! Fit-quality metrics computed on discretized densities.
use crate::errors::{FitError, FitResult};

/// First-order Wasserstein distance between two densities sampled on the
/// same evenly spaced grid.
///
/// Computes the running sum of pointwise differences and returns the sum
/// of its absolute values. Inputs are taken as given; they are not
/// renormalized.
///
/// # Errors
/// - [`FitError::ShapeMismatch`] if the two samplings differ in length.
pub fn wasserstein_distance(xs: &[f64], ys: &[f64]) -> FitResult<f64> {
    if xs.len() != ys.len() {
        return Err(FitError::ShapeMismatch {
            what: "density samplings for Wasserstein distance",
            expected: xs.len(),
            actual: ys.len(),
        });
    }
    let mut cumulative = 0.0;
    let mut total = 0.0;
    for (&x, &y) in xs.iter().zip(ys) {
        cumulative += x - y;
        total += cumulative.abs();
    }
    Ok(total)
}
