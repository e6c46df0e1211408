//! Interval condition: penalize deviation of an interval's probability
//! mass from a target.
//!
//! An unbounded side contributes a constant CDF value (0 below, 1 above),
//! so its gradient contribution is identically zero. Boundedness is part
//! of the condition's fixed shape, not its numeric payload.
use crate::{
    dist::Dist,
    errors::{FitError, FitResult},
    types::Grad,
};
use ndarray::Array1;

/// Requires `P(min < X <= max)` to be close to a target probability `p`,
/// weighted by `weight`. Either bound may be absent.
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalCondition {
    pub weight: f64,
    pub p: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl IntervalCondition {
    /// Construct a validated interval condition.
    ///
    /// # Errors
    /// - [`FitError::InvalidParameter`] if `weight` is negative or
    ///   non-finite, `p` lies outside `[0, 1]`, a present bound is
    ///   non-finite, or `min >= max` when both bounds are present.
    pub fn new(weight: f64, p: f64, min: Option<f64>, max: Option<f64>) -> FitResult<Self> {
        validate_weight(weight)?;
        if !p.is_finite() || !(0.0..=1.0).contains(&p) {
            return Err(FitError::InvalidParameter {
                name: "p",
                value: p,
                reason: "Target probability must lie in [0, 1].",
            });
        }
        for (name, bound) in [("min", min), ("max", max)] {
            if let Some(value) = bound {
                if !value.is_finite() {
                    return Err(FitError::InvalidParameter {
                        name,
                        value,
                        reason: "Interval bounds must be finite when present.",
                    });
                }
            }
        }
        if let (Some(lo), Some(hi)) = (min, max) {
            if lo >= hi {
                return Err(FitError::InvalidParameter {
                    name: "min",
                    value: lo,
                    reason: "Lower bound must be strictly below the upper bound.",
                });
            }
        }
        Ok(Self { weight, p, min, max })
    }

    /// Probability mass the distribution assigns to the interval.
    pub fn actual_mass(&self, dist: &Dist) -> f64 {
        let upper = self.max.map_or(1.0, |hi| dist.cdf(hi));
        let lower = self.min.map_or(0.0, |lo| dist.cdf(lo));
        upper - lower
    }

    /// Weighted squared deviation of the interval mass from the target.
    pub fn loss(&self, dist: &Dist) -> f64 {
        let diff = self.actual_mass(dist) - self.p;
        self.weight * diff * diff
    }

    /// Gradient of [`IntervalCondition::loss`] with respect to the
    /// distribution's tunable vector.
    pub fn grad(&self, dist: &Dist) -> Grad {
        let diff = self.actual_mass(dist) - self.p;
        let n = dist.theta_len();
        let mut grad: Grad = Array1::zeros(n);
        if let Some(hi) = self.max {
            grad += &dist.grad_cdf(hi);
        }
        if let Some(lo) = self.min {
            grad -= &dist.grad_cdf(lo);
        }
        grad * (2.0 * self.weight * diff)
    }

    pub fn describe_fit(&self, dist: &Dist) -> String {
        let actual = self.actual_mass(dist);
        format!(
            "interval ({}, {}]: target mass {:.4}, actual {:.4}, loss {:.6}",
            self.min.map_or("-inf".to_string(), |v| format!("{v}")),
            self.max.map_or("inf".to_string(), |v| format!("{v}")),
            self.p,
            actual,
            self.loss(dist),
        )
    }
}

pub(crate) fn validate_weight(weight: f64) -> FitResult<()> {
    if !weight.is_finite() || weight < 0.0 {
        return Err(FitError::InvalidParameter {
            name: "weight",
            value: weight,
            reason: "Condition weight must be finite and non-negative.",
        });
    }
    Ok(())
}
