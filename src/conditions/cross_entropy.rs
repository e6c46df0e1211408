//! Cross-entropy condition: pull the fitted density toward a reference
//! density sampled on a fixed set of points.
use crate::{
    conditions::interval::validate_weight,
    dist::Dist,
    errors::{FitError, FitResult},
    types::Grad,
};
use ndarray::Array1;

/// Penalizes the weighted cross-entropy `-w * Σ_j d_j * ln f(x_j)` between
/// a reference density (given pointwise) and the fitted distribution.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossEntropyCondition {
    pub weight: f64,
    pub xs: Vec<f64>,
    pub densities: Vec<f64>,
}

impl CrossEntropyCondition {
    /// Construct a validated cross-entropy condition.
    ///
    /// # Errors
    /// - [`FitError::ShapeMismatch`] if `xs` and `densities` differ in
    ///   length.
    /// - [`FitError::InvalidParameter`] if the point set is empty, the
    ///   weight is invalid, a point is non-finite, or a reference density
    ///   value is negative or non-finite.
    pub fn new(weight: f64, xs: Vec<f64>, densities: Vec<f64>) -> FitResult<Self> {
        validate_weight(weight)?;
        if xs.len() != densities.len() {
            return Err(FitError::ShapeMismatch {
                what: "cross-entropy points vs. reference densities",
                expected: xs.len(),
                actual: densities.len(),
            });
        }
        if xs.is_empty() {
            return Err(FitError::InvalidParameter {
                name: "xs",
                value: 0.0,
                reason: "Cross-entropy conditions need at least one point.",
            });
        }
        for &x in &xs {
            if !x.is_finite() {
                return Err(FitError::InvalidParameter {
                    name: "xs",
                    value: x,
                    reason: "Evaluation points must be finite.",
                });
            }
        }
        for &d in &densities {
            if !d.is_finite() || d < 0.0 {
                return Err(FitError::InvalidParameter {
                    name: "densities",
                    value: d,
                    reason: "Reference density values must be finite and non-negative.",
                });
            }
        }
        Ok(Self { weight, xs, densities })
    }

    /// Weighted cross-entropy between the reference and fitted densities.
    pub fn loss(&self, dist: &Dist) -> f64 {
        let scores = dist.logpdf_batch(&self.xs);
        let total: f64 =
            self.densities.iter().zip(scores.iter()).map(|(&d, &lp)| d * lp).sum();
        -self.weight * total
    }

    /// Gradient of [`CrossEntropyCondition::loss`] with respect to the
    /// distribution's tunable vector.
    pub fn grad(&self, dist: &Dist) -> Grad {
        let mut grad: Grad = Array1::zeros(dist.theta_len());
        for (&x, &d) in self.xs.iter().zip(&self.densities) {
            grad.scaled_add(d, &dist.grad_logpdf(x));
        }
        grad * (-self.weight)
    }

    pub fn describe_fit(&self, dist: &Dist) -> String {
        format!(
            "cross-entropy over {} points: loss {:.6}",
            self.xs.len(),
            self.loss(dist),
        )
    }
}
