//! conditions — probabilistic constraints and their loss functions.
//!
//! Purpose
//! -------
//! Define the closed set of condition kinds a fit can be driven by
//! (interval mass, cross-entropy against a reference density, sample
//! log-likelihood) and their uniform loss/gradient surface over any
//! distribution variant.
//!
//! Key behaviors
//! -------------
//! - [`Condition`]: tagged union over the condition variants, dispatching
//!   `loss`, `grad`, and `describe_fit` exhaustively.
//! - Registry capability: every condition splits into a hashable fixed
//!   shape ([`ConditionFixed`]) and a flat numeric payload, mirroring the
//!   distribution registry. The fixed shape is the condition half of a
//!   specialization key.
//! - Each condition's loss is non-negative-weighted; a zero weight makes
//!   the condition inert without changing the key.
//!
//! Invariants & assumptions
//! ------------------------
//! - `loss` and `grad` never mutate the condition or the distribution;
//!   both are pure functions of `(condition, dist)`.
//! - `grad` returns a vector of the distribution's `theta_len`; the
//!   composition engine is responsible for summing across conditions.
//! - Numeric payload layouts are positional and documented per variant;
//!   `structure` rejects an inconsistent payload length with
//!   `ShapeMismatch` before any constructor validation runs.
//!
//! Downstream usage
//! ----------------
//! - The loss composition engine iterates conditions fail-fast, scales the
//!   composed value, and interns `(DistFixed, [ConditionFixed])` keys.
//! - [`describe_fit`] backs the user-facing fit report.
pub mod cross_entropy;
pub mod interval;
pub mod log_likelihood;

pub use self::cross_entropy::CrossEntropyCondition;
pub use self::interval::IntervalCondition;
pub use self::log_likelihood::LogLikelihoodCondition;

use crate::{
    dist::{Dist, Parameterized},
    errors::{FitError, FitResult},
    types::{Grad, Theta},
};
use ndarray::Array1;
use std::str::FromStr;

/// Static tag naming a condition kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionKind {
    Interval,
    CrossEntropy,
    LogLikelihood,
}

impl ConditionKind {
    pub fn name(&self) -> &'static str {
        match self {
            ConditionKind::Interval => "interval",
            ConditionKind::CrossEntropy => "cross_entropy",
            ConditionKind::LogLikelihood => "log_likelihood",
        }
    }
}

impl FromStr for ConditionKind {
    type Err = FitError;

    /// Parse a condition kind tag (case-insensitive).
    ///
    /// # Errors
    /// Returns [`FitError::UnknownVariant`] for an unrecognized name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "interval" => Ok(ConditionKind::Interval),
            "cross_entropy" => Ok(ConditionKind::CrossEntropy),
            "log_likelihood" => Ok(ConditionKind::LogLikelihood),
            _ => Err(FitError::UnknownVariant { kind: s.to_string() }),
        }
    }
}

/// Fixed (structural) shape of a condition, tagged by kind. Hashable so a
/// condition list can participate in a specialization key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConditionFixed {
    Interval { has_min: bool, has_max: bool },
    CrossEntropy { num_points: usize },
    LogLikelihood { num_observations: usize },
}

impl ConditionFixed {
    pub fn kind(&self) -> ConditionKind {
        match self {
            ConditionFixed::Interval { .. } => ConditionKind::Interval,
            ConditionFixed::CrossEntropy { .. } => ConditionKind::CrossEntropy,
            ConditionFixed::LogLikelihood { .. } => ConditionKind::LogLikelihood,
        }
    }

    /// Numeric-payload length implied by this fixed shape.
    pub fn payload_len(&self) -> usize {
        match self {
            ConditionFixed::Interval { has_min, has_max } => {
                2 + usize::from(*has_min) + usize::from(*has_max)
            }
            ConditionFixed::CrossEntropy { num_points } => 1 + 2 * num_points,
            ConditionFixed::LogLikelihood { num_observations } => 1 + num_observations,
        }
    }
}

/// Tagged union over the supported condition variants.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Interval(IntervalCondition),
    CrossEntropy(CrossEntropyCondition),
    LogLikelihood(LogLikelihoodCondition),
}

impl Condition {
    pub fn kind(&self) -> ConditionKind {
        match self {
            Condition::Interval(_) => ConditionKind::Interval,
            Condition::CrossEntropy(_) => ConditionKind::CrossEntropy,
            Condition::LogLikelihood(_) => ConditionKind::LogLikelihood,
        }
    }

    /// Scalar loss of this condition against `dist`.
    pub fn loss(&self, dist: &Dist) -> f64 {
        match self {
            Condition::Interval(c) => c.loss(dist),
            Condition::CrossEntropy(c) => c.loss(dist),
            Condition::LogLikelihood(c) => c.loss(dist),
        }
    }

    /// Gradient of this condition's loss with respect to the
    /// distribution's tunable vector.
    pub fn grad(&self, dist: &Dist) -> Grad {
        match self {
            Condition::Interval(c) => c.grad(dist),
            Condition::CrossEntropy(c) => c.grad(dist),
            Condition::LogLikelihood(c) => c.grad(dist),
        }
    }

    /// Human-readable account of how well `dist` satisfies this condition.
    pub fn describe_fit(&self, dist: &Dist) -> String {
        match self {
            Condition::Interval(c) => c.describe_fit(dist),
            Condition::CrossEntropy(c) => c.describe_fit(dist),
            Condition::LogLikelihood(c) => c.describe_fit(dist),
        }
    }
}

impl Parameterized for Condition {
    type Fixed = ConditionFixed;

    /// Numeric payload layouts (positional):
    /// - interval: `[weight, p, min?, max?]` with present bounds appended
    ///   in that order;
    /// - cross-entropy: `[weight, xs.., densities..]`;
    /// - log-likelihood: `[weight, observations..]`.
    fn destructure(&self) -> (ConditionFixed, Theta) {
        match self {
            Condition::Interval(c) => {
                let mut payload = vec![c.weight, c.p];
                payload.extend(c.min);
                payload.extend(c.max);
                (
                    ConditionFixed::Interval {
                        has_min: c.min.is_some(),
                        has_max: c.max.is_some(),
                    },
                    Array1::from(payload),
                )
            }
            Condition::CrossEntropy(c) => {
                let mut payload = Vec::with_capacity(1 + 2 * c.xs.len());
                payload.push(c.weight);
                payload.extend_from_slice(&c.xs);
                payload.extend_from_slice(&c.densities);
                (
                    ConditionFixed::CrossEntropy { num_points: c.xs.len() },
                    Array1::from(payload),
                )
            }
            Condition::LogLikelihood(c) => {
                let mut payload = Vec::with_capacity(1 + c.observations.len());
                payload.push(c.weight);
                payload.extend_from_slice(&c.observations);
                (
                    ConditionFixed::LogLikelihood { num_observations: c.observations.len() },
                    Array1::from(payload),
                )
            }
        }
    }

    fn structure(fixed: &ConditionFixed, payload: &Theta) -> FitResult<Self> {
        let expected = fixed.payload_len();
        if payload.len() != expected {
            return Err(FitError::ShapeMismatch {
                what: "condition numeric payload",
                expected,
                actual: payload.len(),
            });
        }
        match fixed {
            ConditionFixed::Interval { has_min, has_max } => {
                let mut rest = payload.iter().copied().skip(2);
                let min = has_min.then(|| rest.next()).flatten();
                let max = has_max.then(|| rest.next()).flatten();
                Ok(Condition::Interval(IntervalCondition::new(
                    payload[0], payload[1], min, max,
                )?))
            }
            ConditionFixed::CrossEntropy { num_points } => {
                let xs = payload.iter().copied().skip(1).take(*num_points).collect();
                let densities = payload.iter().copied().skip(1 + num_points).collect();
                Ok(Condition::CrossEntropy(CrossEntropyCondition::new(payload[0], xs, densities)?))
            }
            ConditionFixed::LogLikelihood { .. } => {
                let observations = payload.iter().copied().skip(1).collect();
                Ok(Condition::LogLikelihood(LogLikelihoodCondition::new(
                    payload[0],
                    observations,
                )?))
            }
        }
    }

    fn theta_len(fixed: &ConditionFixed) -> usize {
        fixed.payload_len()
    }
}

/// Report how well `dist` satisfies each condition, one line per
/// condition.
pub fn describe_fit(dist: &Dist, conditions: &[Condition]) -> String {
    conditions.iter().map(|c| c.describe_fit(dist)).collect::<Vec<_>>().join("\n")
}
