//! loss — composition of condition losses into one differentiable
//! objective.
//!
//! Purpose
//! -------
//! Turn a distribution shape plus a weighted condition list into a single
//! scalar objective with an exact gradient, the form the optimizer layer
//! consumes. Composition is shape-driven: the numeric tunable vector is
//! the only input that varies between evaluations.
//!
//! Key behaviors
//! -------------
//! - [`CompiledLoss`]: validates the shape once, interns it in the
//!   specialization cache, then evaluates `value`/`grad` by rebuilding the
//!   distribution from the tunable vector and folding condition losses.
//! - Two composition strategies: [`Strategy::Fused`] treats the whole
//!   condition list as one compiled shape; [`Strategy::Decomposed`]
//!   compiles each condition separately and sums the scaled pieces. Both
//!   produce the same value and gradient.
//! - Every composed loss and single-condition loss is multiplied by
//!   [`LOSS_SCALE`] before it is returned.
//! - Fail-fast: the first structuring or validation error aborts the
//!   evaluation; a non-finite result is reported as [`FitError::NonFiniteLoss`]
//!   instead of leaking into the optimizer.
//!
//! Invariants & assumptions
//! ------------------------
//! - The gradient of a composed loss is the elementwise sum of the
//!   per-condition gradients over one shared tunable vector.
//! - `value` and `grad` are pure; all caching is keyed on shapes, never
//!   on numeric values.
//!
//! Downstream usage
//! ----------------
//! - [`CompiledLoss`] implements the optimizer layer's `Objective` trait
//!   and is what `fit_conditions` minimizes.
pub mod specialize;

pub use self::specialize::SpecKey;

use crate::{
    conditions::{Condition, ConditionFixed},
    dist::{Dist, DistFixed, Parameterized},
    errors::{FitError, FitResult},
    optimize::Objective,
    types::{Grad, Loss, Theta, LOSS_SCALE},
};
use ndarray::Array1;

/// How a condition list is compiled into loss shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// One compiled shape covering the whole condition list.
    #[default]
    Fused,
    /// One compiled shape per condition; scaled pieces are summed.
    Decomposed,
}

/// A condition list compiled against a fixed distribution shape.
#[derive(Debug, Clone)]
pub struct CompiledLoss {
    fixed: DistFixed,
    conditions: Vec<Condition>,
    strategy: Strategy,
    keys: Vec<SpecKey>,
}

impl CompiledLoss {
    /// Compile `conditions` against the distribution shape `fixed`.
    ///
    /// Interns the resulting shape key(s) in the process-wide
    /// specialization cache; the first compilation of a shape emits one
    /// trace event carrying a truncated repr of the conditions' numeric
    /// payloads.
    pub fn new(fixed: DistFixed, conditions: Vec<Condition>, strategy: Strategy) -> Self {
        let parts: Vec<(ConditionFixed, Theta)> =
            conditions.iter().map(|c| c.destructure()).collect();
        let keyed = match strategy {
            Strategy::Fused => {
                let key = SpecKey {
                    dist: fixed.clone(),
                    conditions: parts.iter().map(|(shape, _)| shape.clone()).collect(),
                };
                let payloads: Vec<Vec<f64>> =
                    parts.iter().map(|(_, payload)| payload.to_vec()).collect();
                vec![(key, specialize::truncate_repr(format!("{payloads:?}")))]
            }
            Strategy::Decomposed => parts
                .iter()
                .map(|(shape, payload)| {
                    (
                        SpecKey { dist: fixed.clone(), conditions: vec![shape.clone()] },
                        specialize::truncate_repr(format!("{:?}", payload.to_vec())),
                    )
                })
                .collect(),
        };
        let mut keys = Vec::with_capacity(keyed.len());
        for (key, params) in keyed {
            specialize::intern(&key, &params);
            keys.push(key);
        }
        Self { fixed, conditions, strategy, keys }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Length of the tunable vector this loss expects.
    pub fn theta_len(&self) -> usize {
        self.fixed.theta_len()
    }

    /// Shape keys this loss was compiled under (one if fused, one per
    /// condition if decomposed).
    pub fn keys(&self) -> &[SpecKey] {
        &self.keys
    }

    fn check_theta(&self, theta: &Theta) -> FitResult<()> {
        if theta.len() != self.theta_len() {
            return Err(FitError::ShapeMismatch {
                what: "tunable vector for compiled loss",
                expected: self.theta_len(),
                actual: theta.len(),
            });
        }
        Ok(())
    }

    /// Composed scaled loss at `theta`.
    ///
    /// # Errors
    /// - [`FitError::ShapeMismatch`] if `theta` has the wrong length.
    /// - Any structuring error from rebuilding the distribution.
    /// - [`FitError::NonFiniteLoss`] if a composed value is NaN or
    ///   infinite.
    pub fn value(&self, theta: &Theta) -> FitResult<Loss> {
        self.check_theta(theta)?;
        let dist = Dist::structure(&self.fixed, theta)?;
        for key in &self.keys {
            specialize::touch(key);
        }
        match self.strategy {
            Strategy::Fused => {
                let raw: f64 = self.conditions.iter().map(|c| c.loss(&dist)).sum();
                finite_loss(LOSS_SCALE * raw)
            }
            Strategy::Decomposed => {
                let mut total = 0.0;
                for condition in &self.conditions {
                    total += finite_loss(LOSS_SCALE * condition.loss(&dist))?;
                }
                Ok(total)
            }
        }
    }

    /// Gradient of the composed scaled loss at `theta`.
    ///
    /// Per-condition gradients are summed elementwise over the shared
    /// tunable vector, then scaled.
    ///
    /// # Errors
    /// Same taxonomy as [`CompiledLoss::value`], plus
    /// [`FitError::InvalidGradient`] for a non-finite gradient entry.
    pub fn grad(&self, theta: &Theta) -> FitResult<Grad> {
        self.check_theta(theta)?;
        let dist = Dist::structure(&self.fixed, theta)?;
        for key in &self.keys {
            specialize::touch(key);
        }
        let mut grad: Grad = Array1::zeros(theta.len());
        for condition in &self.conditions {
            grad += &condition.grad(&dist);
        }
        grad *= LOSS_SCALE;
        for (index, &value) in grad.iter().enumerate() {
            if !value.is_finite() {
                return Err(FitError::InvalidGradient {
                    index,
                    value,
                    reason: "Composed gradient entries must be finite.",
                });
            }
        }
        Ok(grad)
    }
}

impl Objective for CompiledLoss {
    fn value(&self, theta: &Theta) -> FitResult<Loss> {
        CompiledLoss::value(self, theta)
    }

    fn grad(&self, theta: &Theta) -> FitResult<Grad> {
        CompiledLoss::grad(self, theta)
    }

    fn check(&self, theta: &Theta) -> FitResult<()> {
        self.check_theta(theta)
    }
}

fn finite_loss(value: f64) -> FitResult<Loss> {
    if !value.is_finite() {
        return Err(FitError::NonFiniteLoss { value });
    }
    Ok(value)
}

/// Scaled loss of a single condition against a distribution rebuilt from
/// `(fixed, theta)`.
pub fn condition_loss(condition: &Condition, fixed: &DistFixed, theta: &Theta) -> FitResult<Loss> {
    let dist = Dist::structure(fixed, theta)?;
    finite_loss(LOSS_SCALE * condition.loss(&dist))
}

/// Gradient of a single condition's scaled loss with respect to `theta`.
pub fn condition_loss_grad(
    condition: &Condition,
    fixed: &DistFixed,
    theta: &Theta,
) -> FitResult<Grad> {
    let dist = Dist::structure(fixed, theta)?;
    let grad = condition.grad(&dist) * LOSS_SCALE;
    for (index, &value) in grad.iter().enumerate() {
        if !value.is_finite() {
            return Err(FitError::InvalidGradient {
                index,
                value,
                reason: "Condition gradient entries must be finite.",
            });
        }
    }
    Ok(grad)
}
