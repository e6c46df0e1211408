//! Single logistic distribution with location/scale parameters.
//!
//! The optimizer-space parameterization stores `[loc, ln scale]` so every
//! iterate an optimizer proposes maps back to a valid distribution. All
//! densities are evaluated through stable softplus/log-sum-exp forms so
//! tail inputs stay finite.
use crate::{
    dist::Parameterized,
    errors::{FitError, FitResult},
    numerics::{sigma, softplus},
    types::Theta,
};
use ndarray::array;

/// Number of tunable parameters of a single logistic: `[loc, ln scale]`.
pub const LOGISTIC_THETA_LEN: usize = 2;

/// Logistic distribution `Logistic(loc, scale)`.
///
/// Invariants (validated by [`Logistic::new`]):
/// - `loc` is finite,
/// - `scale` is finite and strictly positive.
#[derive(Debug, Clone, PartialEq)]
pub struct Logistic {
    pub loc: f64,
    pub scale: f64,
}

impl Logistic {
    /// Construct a validated logistic distribution.
    ///
    /// # Errors
    /// - [`FitError::InvalidParameter`] if `loc` is non-finite or `scale`
    ///   is non-finite or ≤ 0.
    pub fn new(loc: f64, scale: f64) -> FitResult<Self> {
        if !loc.is_finite() {
            return Err(FitError::InvalidParameter {
                name: "loc",
                value: loc,
                reason: "Location must be finite.",
            });
        }
        if !scale.is_finite() || scale <= 0.0 {
            return Err(FitError::InvalidParameter {
                name: "scale",
                value: scale,
                reason: "Scale must be finite and strictly positive.",
            });
        }
        Ok(Self { loc, scale })
    }

    /// Standardized coordinate `y = (x - loc) / scale`.
    fn standardize(&self, x: f64) -> f64 {
        (x - self.loc) / self.scale
    }

    /// Log-density `ln f(x)`.
    ///
    /// Uses the identity `ln f(x) = -y - 2·softplus(-y) - ln scale`, which
    /// stays finite for `y` deep in either tail.
    pub fn logpdf(&self, x: f64) -> f64 {
        let y = self.standardize(x);
        -y - 2.0 * softplus(-y) - self.scale.ln()
    }

    /// Cumulative distribution function `F(x) = σ((x - loc) / scale)`.
    pub fn cdf(&self, x: f64) -> f64 {
        sigma(self.standardize(x))
    }

    /// Gradient of `logpdf(x)` with respect to `[loc, ln scale]`.
    pub(crate) fn grad_logpdf(&self, x: f64) -> [f64; 2] {
        let y = self.standardize(x);
        let s = sigma(y);
        let d_loc = (2.0 * s - 1.0) / self.scale;
        let d_lnscale = y * (2.0 * s - 1.0) - 1.0;
        [d_loc, d_lnscale]
    }

    /// Gradient of `cdf(x)` with respect to `[loc, ln scale]`.
    pub(crate) fn grad_cdf(&self, x: f64) -> [f64; 2] {
        let y = self.standardize(x);
        let s = sigma(y);
        let pdf_y = s * (1.0 - s);
        [-pdf_y / self.scale, -y * pdf_y]
    }
}

impl Parameterized for Logistic {
    type Fixed = ();

    fn destructure(&self) -> ((), Theta) {
        ((), array![self.loc, self.scale.ln()])
    }

    fn structure(_fixed: &(), theta: &Theta) -> FitResult<Self> {
        if theta.len() != LOGISTIC_THETA_LEN {
            return Err(FitError::ShapeMismatch {
                what: "logistic tunable parameters",
                expected: LOGISTIC_THETA_LEN,
                actual: theta.len(),
            });
        }
        for (index, &value) in theta.iter().enumerate() {
            if !value.is_finite() {
                return Err(FitError::InvalidParameter {
                    name: if index == 0 { "loc" } else { "ln_scale" },
                    value,
                    reason: "Tunable parameters must be finite.",
                });
            }
        }
        Logistic::new(theta[0], theta[1].exp())
    }

    fn theta_len(_fixed: &()) -> usize {
        LOGISTIC_THETA_LEN
    }
}
