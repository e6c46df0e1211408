//! Mixture-of-logistics distribution, the default parametric family.
//!
//! Purpose
//! -------
//! Provide the k-component logistic mixture used as the default fitting
//! target: a fixed component count plus a flat tunable vector of
//! `[loc, ln scale, ln weight]` triples, with log-density, CDF, and
//! analytic gradients in that optimizer space.
//!
//! Key behaviors
//! -------------
//! - Combine component log-densities with component log-weights through a
//!   numerically stable log-sum-exp, so tail inputs 10+ standard deviations
//!   from every component stay finite.
//! - Batched evaluation over N observations returns N independent
//!   log-densities; callers sum when a total log-likelihood is needed.
//! - `structure` maps any finite theta to a valid mixture: scales through
//!   `exp`, mixing weights through a safe softmax over the `ln weight`
//!   slots.
//!
//! Invariants & assumptions
//! ------------------------
//! - `num_components >= 1`; the tunable vector has exactly `3k` entries.
//! - Stored mixing weights are normalized (sum to 1) and strictly
//!   positive, so their logarithms are finite.
//! - `structure(destructure(m)) == m` within floating tolerance.
//!
//! Conventions
//! -----------
//! - Theta layout is component-major: `[loc_0, ln s_0, ln w_0, loc_1, ...]`,
//!   mirroring the reference layout of per-component triples.
//! - Gradients are always taken with respect to theta, not model space.
//!
//! Testing notes
//! -------------
//! - Unit tests cover round-trips, shape errors, log-sum-exp stability in
//!   deep tails, and analytic-vs-finite-difference gradient agreement.
use crate::{
    dist::{Parameterized, logistic::Logistic},
    errors::{FitError, FitResult},
    numerics::{log_sum_exp, safe_softmax, sigma},
    types::{Grad, Theta},
};
use ndarray::Array1;

/// Tunable parameters per mixture component: `[loc, ln scale, ln weight]`.
pub const PARAMS_PER_COMPONENT: usize = 3;

/// Mixture of logistic distributions with normalized mixing weights.
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticMixture {
    components: Vec<Logistic>,
    weights: Vec<f64>,
}

impl LogisticMixture {
    /// Construct a validated mixture.
    ///
    /// Mixing weights need not be pre-normalized; they are rescaled to sum
    /// to 1 here. Each weight must be finite and strictly positive so its
    /// logarithm participates in the log-sum-exp density.
    ///
    /// # Errors
    /// - [`FitError::ShapeMismatch`] if `weights.len() != components.len()`.
    /// - [`FitError::InvalidParameter`] for an empty mixture or a weight
    ///   that is non-finite or ≤ 0.
    pub fn new(components: Vec<Logistic>, weights: Vec<f64>) -> FitResult<Self> {
        if components.is_empty() {
            return Err(FitError::InvalidParameter {
                name: "num_components",
                value: 0.0,
                reason: "A mixture needs at least one component.",
            });
        }
        if weights.len() != components.len() {
            return Err(FitError::ShapeMismatch {
                what: "mixture weights",
                expected: components.len(),
                actual: weights.len(),
            });
        }
        for &w in &weights {
            if !w.is_finite() || w <= 0.0 {
                return Err(FitError::InvalidParameter {
                    name: "weight",
                    value: w,
                    reason: "Mixing weights must be finite and strictly positive.",
                });
            }
        }
        let total: f64 = weights.iter().sum();
        let weights = weights.into_iter().map(|w| w / total).collect();
        Ok(Self { components, weights })
    }

    pub fn num_components(&self) -> usize {
        self.components.len()
    }

    pub fn components(&self) -> &[Logistic] {
        &self.components
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Per-component `ln w_i + ln f_i(x)` terms.
    fn component_scores(&self, x: f64) -> Vec<f64> {
        self.components
            .iter()
            .zip(&self.weights)
            .map(|(c, &w)| w.ln() + c.logpdf(x))
            .collect()
    }

    /// Log-density `ln Σ_i w_i f_i(x)` via log-sum-exp.
    pub fn logpdf(&self, x: f64) -> f64 {
        log_sum_exp(&self.component_scores(x))
    }

    /// Independent log-densities for a batch of observations.
    pub fn logpdf_batch(&self, data: &[f64]) -> Array1<f64> {
        data.iter().map(|&x| self.logpdf(x)).collect()
    }

    /// CDF `F(x) = Σ_i w_i σ((x - loc_i) / scale_i)`.
    pub fn cdf(&self, x: f64) -> f64 {
        self.components.iter().zip(&self.weights).map(|(c, &w)| w * c.cdf(x)).sum()
    }

    /// Gradient of `logpdf(x)` with respect to the flat theta vector.
    ///
    /// Uses the component responsibilities
    /// `r_i = exp(ln w_i + ln f_i(x) - logpdf(x))`; the `ln weight` slots
    /// pick up the softmax Jacobian, giving `r_i - w_i`.
    pub(crate) fn grad_logpdf(&self, x: f64) -> Grad {
        let scores = self.component_scores(x);
        let total = log_sum_exp(&scores);
        let mut grad = Array1::zeros(self.components.len() * PARAMS_PER_COMPONENT);
        for (i, (component, &weight)) in self.components.iter().zip(&self.weights).enumerate() {
            let responsibility = (scores[i] - total).exp();
            let [d_loc, d_lnscale] = component.grad_logpdf(x);
            grad[PARAMS_PER_COMPONENT * i] = responsibility * d_loc;
            grad[PARAMS_PER_COMPONENT * i + 1] = responsibility * d_lnscale;
            grad[PARAMS_PER_COMPONENT * i + 2] = responsibility - weight;
        }
        grad
    }

    /// Gradient of `cdf(x)` with respect to the flat theta vector.
    pub(crate) fn grad_cdf(&self, x: f64) -> Grad {
        let cdf = self.cdf(x);
        let mut grad = Array1::zeros(self.components.len() * PARAMS_PER_COMPONENT);
        for (i, (component, &weight)) in self.components.iter().zip(&self.weights).enumerate() {
            let y = (x - component.loc) / component.scale;
            let s = sigma(y);
            let pdf_y = s * (1.0 - s);
            grad[PARAMS_PER_COMPONENT * i] = -weight * pdf_y / component.scale;
            grad[PARAMS_PER_COMPONENT * i + 1] = -weight * y * pdf_y;
            grad[PARAMS_PER_COMPONENT * i + 2] = weight * (s - cdf);
        }
        grad
    }
}

impl Parameterized for LogisticMixture {
    type Fixed = usize;

    fn destructure(&self) -> (usize, Theta) {
        let mut theta = Vec::with_capacity(self.components.len() * PARAMS_PER_COMPONENT);
        for (component, &weight) in self.components.iter().zip(&self.weights) {
            theta.push(component.loc);
            theta.push(component.scale.ln());
            theta.push(weight.ln());
        }
        (self.components.len(), Array1::from(theta))
    }

    fn structure(num_components: &usize, theta: &Theta) -> FitResult<Self> {
        let k = *num_components;
        if k == 0 {
            return Err(FitError::InvalidParameter {
                name: "num_components",
                value: 0.0,
                reason: "A mixture needs at least one component.",
            });
        }
        let expected = k * PARAMS_PER_COMPONENT;
        if theta.len() != expected {
            return Err(FitError::ShapeMismatch {
                what: "mixture tunable parameters",
                expected,
                actual: theta.len(),
            });
        }
        for &value in theta.iter() {
            if !value.is_finite() {
                return Err(FitError::InvalidParameter {
                    name: "theta",
                    value,
                    reason: "Tunable parameters must be finite.",
                });
            }
        }

        let mut components = Vec::with_capacity(k);
        let log_weights: Vec<f64> =
            (0..k).map(|i| theta[PARAMS_PER_COMPONENT * i + 2]).collect();
        let weights = safe_softmax(&log_weights);
        for i in 0..k {
            let loc = theta[PARAMS_PER_COMPONENT * i];
            let scale = theta[PARAMS_PER_COMPONENT * i + 1].exp();
            components.push(Logistic::new(loc, scale)?);
        }
        LogisticMixture::new(components, weights)
    }

    fn theta_len(num_components: &usize) -> usize {
        num_components * PARAMS_PER_COMPONENT
    }
}
