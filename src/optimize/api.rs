//! High-level fitting entry points.
//!
//! [`minimize`] runs L-BFGS on any [`Objective`]; [`fit_conditions`]
//! compiles a condition list against a distribution shape and minimizes
//! the composed loss from a caller-supplied starting point;
//! [`fit_mixture_from_samples`] is the common special case of fitting a
//! logistic mixture to raw observations with a deterministic
//! quantile-based starting point.
use crate::{
    conditions::{Condition, LogLikelihoodCondition},
    dist::{Dist, DistFixed, LogisticMixture},
    errors::{FitError, FitResult},
    loss::{CompiledLoss, Strategy},
    optimize::{
        adapter::ArgminProblem,
        builders::{build_optimizer_hager_zhang, build_optimizer_more_thuente},
        run::run_lbfgs,
        traits::{FitOptions, FitOutcome, LineSearcher, Objective},
    },
    types::Theta,
};
use ndarray::Array1;

/// Minimize an [`Objective`] with L-BFGS and the configured line search.
///
/// Validates the starting point via `f.check(theta0)`, wraps the
/// objective in an [`ArgminProblem`], builds the solver matching
/// `opts.line_searcher`, and delegates to the shared runner.
///
/// # Errors
/// - Propagates any error from `f.check`.
/// - Propagates builder and runtime errors from the solver layer.
pub fn minimize<F: Objective>(f: &F, theta0: Theta, opts: &FitOptions) -> FitResult<FitOutcome> {
    f.check(&theta0)?;
    let problem = ArgminProblem::new(f);
    match opts.line_searcher {
        LineSearcher::MoreThuente => {
            let solver = build_optimizer_more_thuente(opts)?;
            run_lbfgs(theta0, opts, problem, solver)
        }
        LineSearcher::HagerZhang => {
            let solver = build_optimizer_hager_zhang(opts)?;
            run_lbfgs(theta0, opts, problem, solver)
        }
    }
}

/// Fit a distribution of shape `fixed` to a weighted condition list.
///
/// Compiles the conditions under `strategy`, minimizes the composed loss
/// starting from `theta0`, and rebuilds the fitted distribution from the
/// best parameters found.
///
/// # Errors
/// - [`FitError::ShapeMismatch`] if `theta0` is inconsistent with
///   `fixed`.
/// - Any solver or validation error from the minimization.
pub fn fit_conditions(
    fixed: DistFixed, conditions: Vec<Condition>, strategy: Strategy, theta0: Theta,
    opts: &FitOptions,
) -> FitResult<(Dist, FitOutcome)> {
    let compiled = CompiledLoss::new(fixed.clone(), conditions, strategy);
    let outcome = minimize(&compiled, theta0, opts)?;
    let fitted = Dist::structure(&fixed, &outcome.theta_hat)?;
    Ok((fitted, outcome))
}

/// Fit a `num_components`-component logistic mixture to raw samples by
/// maximum likelihood.
///
/// The starting point is deterministic: component locations at evenly
/// spaced sample quantiles, a shared spread-based scale, and uniform
/// weights. The samples enter the loss as a single log-likelihood
/// condition with unit weight.
///
/// # Errors
/// - [`FitError::InvalidParameter`] if `num_components == 0` or fewer
///   samples than components are provided.
/// - [`FitError::InvalidObservation`] for a non-finite sample.
/// - Any solver error from the minimization.
pub fn fit_mixture_from_samples(
    samples: &[f64], num_components: usize, opts: &FitOptions,
) -> FitResult<(LogisticMixture, FitOutcome)> {
    if num_components == 0 {
        return Err(FitError::InvalidParameter {
            name: "num_components",
            value: 0.0,
            reason: "A mixture needs at least one component.",
        });
    }
    if samples.len() < num_components {
        return Err(FitError::InvalidParameter {
            name: "samples",
            value: samples.len() as f64,
            reason: "Need at least one sample per mixture component.",
        });
    }
    let theta0 = mixture_init_from_samples(samples, num_components)?;
    let condition =
        Condition::LogLikelihood(LogLikelihoodCondition::new(1.0, samples.to_vec())?);
    let fixed = DistFixed::LogisticMixture { num_components };
    let (fitted, outcome) =
        fit_conditions(fixed, vec![condition], Strategy::Fused, theta0, opts)?;
    match fitted {
        Dist::LogisticMixture(mixture) => Ok((mixture, outcome)),
        _ => Err(FitError::UnknownError),
    }
}

/// Deterministic mixture starting point: locations at evenly spaced
/// sample quantiles, one shared scale derived from the interquartile
/// range, uniform weights.
fn mixture_init_from_samples(samples: &[f64], num_components: usize) -> FitResult<Theta> {
    for (index, &value) in samples.iter().enumerate() {
        if !value.is_finite() {
            return Err(FitError::InvalidObservation { index, value });
        }
    }
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = sorted.len();

    let quantile = |q: f64| -> f64 {
        let idx = (q * (n - 1) as f64).round() as usize;
        sorted[idx.min(n - 1)]
    };
    // IQR of a logistic is about 2.2 scales; floor the estimate so a
    // degenerate sample cannot start at scale zero.
    let iqr = quantile(0.75) - quantile(0.25);
    let scale = (iqr / 2.2).max(1e-3 * (1.0 + iqr.abs()));

    let mut theta = Vec::with_capacity(3 * num_components);
    for i in 0..num_components {
        let q = (i as f64 + 0.5) / num_components as f64;
        theta.push(quantile(q));
        theta.push(scale.ln());
        theta.push(0.0);
    }
    Ok(Array1::from(theta))
}
