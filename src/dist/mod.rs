//! dist — distribution variants and the variant registry.
//!
//! Purpose
//! -------
//! Define the closed set of distribution kinds the loss engine can fit
//! (single logistic, mixture of logistics, empirical point density) and
//! the registry capability that flattens each variant into a uniform
//! `(fixed part, tunable vector)` pair and reconstructs it.
//!
//! Key behaviors
//! -------------
//! - [`Parameterized`]: the structure/destructure capability every variant
//!   implements. The two operations are exact inverses; the fixed part is
//!   hashable so it can participate in a specialization key, and the
//!   tunable part is a flat `ndarray` vector so it can be differentiated.
//! - [`Dist`]: tagged union over all variants with exhaustive matching for
//!   the numeric operations (`logpdf`, `cdf`, analytic gradients). No
//!   virtual dispatch inside hot numeric loops.
//! - [`DistKind`] / [`DistFixed`]: the static tag and fixed parameters; a
//!   kind tag parses via `FromStr` and an unrecognized name fails with
//!   [`FitError::UnknownVariant`].
//!
//! Invariants & assumptions
//! ------------------------
//! - The tunable-vector length is a deterministic function of the fixed
//!   part ([`DistFixed::theta_len`]); `structure` with an inconsistent
//!   length fails with `ShapeMismatch`.
//! - Instances are immutable once built; the optimizer mutates only the
//!   flat tunable vector and reconstructs a fresh instance per evaluation.
//!
//! Downstream usage
//! ----------------
//! - The loss composition engine reconstructs a [`Dist`] from
//!   `(DistFixed, Theta)` once per evaluation and hands it to each
//!   condition's loss function.
//! - [`DistFixed`] is the distribution half of a specialization key.
pub mod logistic;
pub mod mixture;
pub mod point_density;

pub use self::logistic::Logistic;
pub use self::mixture::LogisticMixture;
pub use self::point_density::{Grid, PointDensity};

use crate::{
    errors::{FitError, FitResult},
    types::{Grad, Theta},
};
use ndarray::Array1;
use std::{fmt::Debug, hash::Hash, str::FromStr};

/// Capability implemented by every distribution and condition variant:
/// flatten into a `(fixed, numeric)` pair and rebuild from one.
///
/// `destructure` and `structure` must be exact inverses (within floating
/// tolerance on the numeric part). The fixed part feeds specialization
/// keys; the numeric part is what gets differentiated and vectorized.
pub trait Parameterized: Sized {
    type Fixed: Clone + Debug + Hash + Eq;

    fn destructure(&self) -> (Self::Fixed, Theta);
    fn structure(fixed: &Self::Fixed, theta: &Theta) -> FitResult<Self>;

    /// Tunable-vector length implied by the fixed part.
    fn theta_len(fixed: &Self::Fixed) -> usize;
}

/// Static tag naming a distribution kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DistKind {
    Logistic,
    LogisticMixture,
    PointDensity,
}

impl DistKind {
    pub fn name(&self) -> &'static str {
        match self {
            DistKind::Logistic => "logistic",
            DistKind::LogisticMixture => "logistic_mixture",
            DistKind::PointDensity => "point_density",
        }
    }
}

impl FromStr for DistKind {
    type Err = FitError;

    /// Parse a distribution kind tag (case-insensitive).
    ///
    /// # Errors
    /// Returns [`FitError::UnknownVariant`] for an unrecognized name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "logistic" => Ok(DistKind::Logistic),
            "logistic_mixture" => Ok(DistKind::LogisticMixture),
            "point_density" => Ok(DistKind::PointDensity),
            _ => Err(FitError::UnknownVariant { kind: s.to_string() }),
        }
    }
}

/// Fixed (structural, non-differentiable) parameters of a distribution,
/// tagged by kind. Hashable so it can key a specialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DistFixed {
    Logistic,
    LogisticMixture { num_components: usize },
    PointDensity { grid: Grid },
}

impl DistFixed {
    pub fn kind(&self) -> DistKind {
        match self {
            DistFixed::Logistic => DistKind::Logistic,
            DistFixed::LogisticMixture { .. } => DistKind::LogisticMixture,
            DistFixed::PointDensity { .. } => DistKind::PointDensity,
        }
    }

    /// Tunable-vector length implied by this fixed part.
    pub fn theta_len(&self) -> usize {
        match self {
            DistFixed::Logistic => <Logistic as Parameterized>::theta_len(&()),
            DistFixed::LogisticMixture { num_components } => {
                <LogisticMixture as Parameterized>::theta_len(num_components)
            }
            DistFixed::PointDensity { grid } => <PointDensity as Parameterized>::theta_len(grid),
        }
    }
}

/// Tagged union over the supported distribution variants.
#[derive(Debug, Clone, PartialEq)]
pub enum Dist {
    Logistic(Logistic),
    LogisticMixture(LogisticMixture),
    PointDensity(PointDensity),
}

impl Dist {
    pub fn kind(&self) -> DistKind {
        match self {
            Dist::Logistic(_) => DistKind::Logistic,
            Dist::LogisticMixture(_) => DistKind::LogisticMixture,
            Dist::PointDensity(_) => DistKind::PointDensity,
        }
    }

    /// Flatten into `(fixed part, tunable vector)`.
    pub fn destructure(&self) -> (DistFixed, Theta) {
        match self {
            Dist::Logistic(d) => {
                let ((), theta) = d.destructure();
                (DistFixed::Logistic, theta)
            }
            Dist::LogisticMixture(d) => {
                let (num_components, theta) = d.destructure();
                (DistFixed::LogisticMixture { num_components }, theta)
            }
            Dist::PointDensity(d) => {
                let (grid, theta) = d.destructure();
                (DistFixed::PointDensity { grid }, theta)
            }
        }
    }

    /// Rebuild a distribution from its fixed part and tunable vector.
    ///
    /// # Errors
    /// - [`FitError::ShapeMismatch`] if `theta.len()` is inconsistent with
    ///   the fixed part.
    /// - [`FitError::InvalidParameter`] for non-finite tunable entries.
    pub fn structure(fixed: &DistFixed, theta: &Theta) -> FitResult<Self> {
        match fixed {
            DistFixed::Logistic => Ok(Dist::Logistic(Logistic::structure(&(), theta)?)),
            DistFixed::LogisticMixture { num_components } => {
                Ok(Dist::LogisticMixture(LogisticMixture::structure(num_components, theta)?))
            }
            DistFixed::PointDensity { grid } => {
                Ok(Dist::PointDensity(PointDensity::structure(grid, theta)?))
            }
        }
    }

    /// Length of this distribution's tunable vector.
    pub fn theta_len(&self) -> usize {
        match self {
            Dist::Logistic(_) => logistic::LOGISTIC_THETA_LEN,
            Dist::LogisticMixture(d) => d.num_components() * mixture::PARAMS_PER_COMPONENT,
            Dist::PointDensity(d) => d.grid().len(),
        }
    }

    /// Log-density at a single observation.
    pub fn logpdf(&self, x: f64) -> f64 {
        match self {
            Dist::Logistic(d) => d.logpdf(x),
            Dist::LogisticMixture(d) => d.logpdf(x),
            Dist::PointDensity(d) => d.logpdf(x),
        }
    }

    /// Independent log-densities over a batch of observations.
    pub fn logpdf_batch(&self, data: &[f64]) -> Array1<f64> {
        match self {
            Dist::LogisticMixture(d) => d.logpdf_batch(data),
            _ => data.iter().map(|&x| self.logpdf(x)).collect(),
        }
    }

    /// Cumulative distribution function at `x`.
    pub fn cdf(&self, x: f64) -> f64 {
        match self {
            Dist::Logistic(d) => d.cdf(x),
            Dist::LogisticMixture(d) => d.cdf(x),
            Dist::PointDensity(d) => d.cdf(x),
        }
    }

    /// Gradient of `logpdf(x)` with respect to the tunable vector.
    pub fn grad_logpdf(&self, x: f64) -> Grad {
        match self {
            Dist::Logistic(d) => Array1::from(d.grad_logpdf(x).to_vec()),
            Dist::LogisticMixture(d) => d.grad_logpdf(x),
            Dist::PointDensity(d) => d.grad_logpdf(x),
        }
    }

    /// Gradient of `cdf(x)` with respect to the tunable vector.
    pub fn grad_cdf(&self, x: f64) -> Grad {
        match self {
            Dist::Logistic(d) => Array1::from(d.grad_cdf(x).to_vec()),
            Dist::LogisticMixture(d) => d.grad_cdf(x),
            Dist::PointDensity(d) => d.grad_cdf(x),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Verify kind-tag parsing, including the unknown-variant error path.
    //
    // Given
    // -----
    // - Valid names in mixed case and one unknown name.
    //
    // Expect
    // ------
    // - Valid names parse to the right kinds; the unknown name returns
    //   `FitError::UnknownVariant` carrying the offending tag.
    fn kind_parsing_and_unknown_variant() {
        assert_eq!("logistic".parse::<DistKind>().unwrap(), DistKind::Logistic);
        assert_eq!("Logistic_Mixture".parse::<DistKind>().unwrap(), DistKind::LogisticMixture);
        assert_eq!("POINT_DENSITY".parse::<DistKind>().unwrap(), DistKind::PointDensity);
        match "gaussian".parse::<DistKind>() {
            Err(FitError::UnknownVariant { kind }) => assert_eq!(kind, "gaussian"),
            other => panic!("Expected UnknownVariant, got {other:?}"),
        }
    }

    #[test]
    // Purpose
    // -------
    // Verify the registry round-trip through the `Dist` union for every
    // variant.
    //
    // Given
    // -----
    // - One instance of each distribution kind.
    //
    // Expect
    // ------
    // - `Dist::structure(Dist::destructure(d)) == d` within floating
    //   tolerance, and the fixed part determines the theta length.
    fn dist_union_round_trips_every_variant() {
        let dists = [
            Dist::Logistic(Logistic::new(0.5, 2.0).unwrap()),
            Dist::LogisticMixture(
                LogisticMixture::new(
                    vec![Logistic::new(-1.0, 1.0).unwrap(), Logistic::new(1.0, 0.5).unwrap()],
                    vec![0.4, 0.6],
                )
                .unwrap(),
            ),
            Dist::PointDensity(
                PointDensity::from_pairs(vec![0.0, 0.5, 1.0], &[0.5, 1.0, 0.5]).unwrap(),
            ),
        ];

        for d in dists {
            let (fixed, theta) = d.destructure();
            assert_eq!(theta.len(), fixed.theta_len());
            let back = Dist::structure(&fixed, &theta).unwrap();
            let (_, theta_back) = back.destructure();
            for (a, b) in theta_back.iter().zip(theta.iter()) {
                assert!((a - b).abs() < 1e-9);
            }
        }
    }
}
