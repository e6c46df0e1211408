//! Numerically stable scalar helpers shared by the likelihood and loss code.
//!
//! These guard against overflow/underflow for extreme tail inputs so that
//! loss evaluations stay finite wherever the mathematical value is finite:
//!
//! - [`softplus`]: `ln(1 + e^x)` without overflow for large `x`.
//! - [`log_sum_exp`]: stable `ln(Σ exp(x_i))` via max-shifting.
//! - [`safe_softmax`]: softmax over a slice, written through the same
//!   max-shift so that no intermediate exponential overflows.
//! - [`sigma`]: the standard logistic function, delegated to `statrs`.

use statrs::function::logistic::logistic;

/// Cutoff above which `softplus(x) ≈ x` to machine precision.
const SOFTPLUS_CUTOFF: f64 = 20.0;

/// Stable softplus: `ln(1 + e^x)`.
///
/// For `x > 20`, `e^x` dominates and the result is `x` to machine
/// precision; evaluating `x.exp()` there would overflow for large inputs.
pub fn softplus(x: f64) -> f64 {
    if x > SOFTPLUS_CUTOFF { x } else { x.exp().ln_1p() }
}

/// Standard logistic function `σ(x) = 1 / (1 + e^{-x})`.
pub fn sigma(x: f64) -> f64 {
    logistic(x)
}

/// Stable `ln(Σ_i exp(x_i))` over a non-empty slice.
///
/// Shifts by the maximum element before exponentiating, so the result is
/// finite whenever any `x_i` is finite. Returns `-∞` for an empty slice or
/// when every element is `-∞` (an empty sum has zero mass).
pub fn log_sum_exp(xs: &[f64]) -> f64 {
    let max = xs.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return max;
    }
    let sum: f64 = xs.iter().map(|&x| (x - max).exp()).sum();
    max + sum.ln()
}

/// Softmax over a slice, computed through the same max-shift as
/// [`log_sum_exp`] so no intermediate exponential overflows.
///
/// The output sums to 1 whenever at least one input is finite.
pub fn safe_softmax(xs: &[f64]) -> Vec<f64> {
    let lse = log_sum_exp(xs);
    xs.iter().map(|&x| (x - lse).exp()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Verify that `softplus` agrees with the naive formula in the moderate
    // range and passes through large arguments unchanged.
    //
    // Given
    // -----
    // - A moderate input (1.5) and a large input (800.0).
    //
    // Expect
    // ------
    // - `softplus(1.5)` matches `ln(1 + e^1.5)` closely.
    // - `softplus(800.0)` is finite and equals the input.
    fn softplus_matches_naive_and_survives_large_inputs() {
        let naive = (1.0_f64 + 1.5_f64.exp()).ln();
        assert!((softplus(1.5) - naive).abs() < 1e-12);
        assert_eq!(softplus(800.0), 800.0);
    }

    #[test]
    // Purpose
    // -------
    // Verify that `log_sum_exp` is exact on a small example and stable when
    // all inputs are far into the tails.
    //
    // Given
    // -----
    // - The slice [ln 1, ln 2, ln 3] whose exp-sum is 6.
    // - A slice of very large negative values.
    //
    // Expect
    // ------
    // - `log_sum_exp` returns ln 6 on the first slice.
    // - The second result is finite (no underflow to -inf).
    fn log_sum_exp_is_exact_and_stable() {
        let xs = [1.0_f64.ln(), 2.0_f64.ln(), 3.0_f64.ln()];
        assert!((log_sum_exp(&xs) - 6.0_f64.ln()).abs() < 1e-12);

        let tails = [-900.0, -901.0, -902.0];
        assert!(log_sum_exp(&tails).is_finite());
    }

    #[test]
    // Purpose
    // -------
    // Verify that `safe_softmax` normalizes to 1 and preserves ordering.
    //
    // Given
    // -----
    // - A slice with one dominant element.
    //
    // Expect
    // ------
    // - Outputs sum to 1 and the dominant element gets the largest mass.
    fn safe_softmax_normalizes() {
        let p = safe_softmax(&[0.0, 1.0, -1.0]);
        let total: f64 = p.iter().sum();
        assert!((total - 1.0).abs() < 1e-12);
        assert!(p[1] > p[0] && p[0] > p[2]);
    }

    #[test]
    // Purpose
    // -------
    // Verify `sigma` at the symmetry point and deep in both tails.
    //
    // Given
    // -----
    // - Inputs 0, +50, and -50.
    //
    // Expect
    // ------
    // - σ(0) = 0.5; σ(±50) saturate toward 1 and 0 without NaN.
    fn sigma_symmetry_and_saturation() {
        assert!((sigma(0.0) - 0.5).abs() < 1e-15);
        assert!(sigma(50.0) > 1.0 - 1e-12);
        assert!(sigma(-50.0) < 1e-12);
    }
}
