//! Public surface of the minimization layer.
//!
//! - [`Objective`]: trait the loss layer implements for anything that can
//!   be minimized.
//! - [`FitOptions`] and [`Tolerances`]: solver configuration.
//! - [`LineSearcher`]: choice of line search used by L-BFGS.
//! - [`FitOutcome`]: normalized result returned by the high-level
//!   `minimize` API.
//!
//! Convention: the objective is minimized as-is. If an analytic gradient
//! is provided it must be the gradient of the objective itself; no sign
//! flips happen anywhere in this layer.
use crate::{
    errors::{FitError, FitResult},
    optimize::validation::{validate_theta_hat, validate_value, verify_tol_grad, verify_tol_loss},
    types::{FnEvalMap, Grad, Loss, Theta},
};
use argmin::core::TerminationStatus;
use argmin_math::ArgminL2Norm;
use std::str::FromStr;

/// A scalar objective `L(θ)` over a flat parameter vector.
///
/// Required:
/// - `value(&Theta) -> FitResult<Loss>`: evaluate `L(θ)`.
///
/// Optional:
/// - `grad(&Theta) -> FitResult<Grad>`: analytic gradient `∇L(θ)`. When
///   not implemented, robust finite differences of `value` are used.
/// - `check(&Theta) -> FitResult<()>`: validation hook called once before
///   optimization to reject an obviously invalid starting point.
pub trait Objective {
    fn value(&self, theta: &Theta) -> FitResult<Loss>;

    fn grad(&self, _theta: &Theta) -> FitResult<Grad> {
        Err(FitError::GradientNotImplemented)
    }

    fn check(&self, _theta: &Theta) -> FitResult<()> {
        Ok(())
    }
}

/// Choice of line search used inside the L-BFGS solver.
///
/// Parses case-insensitively from `"MoreThuente"` or `"HagerZhang"`;
/// unknown names return [`FitError::InvalidLineSearch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSearcher {
    MoreThuente,
    HagerZhang,
}

impl FromStr for LineSearcher {
    type Err = FitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "morethuente" => Ok(LineSearcher::MoreThuente),
            "hagerzhang" => Ok(LineSearcher::HagerZhang),
            _ => Err(FitError::InvalidLineSearch {
                name: s.to_string(),
                reason: "Valid options are case insensitive 'MoreThuente' or 'HagerZhang'.",
            }),
        }
    }
}

/// Solver-level configuration.
///
/// - `tols`: numerical tolerances and the iteration cap.
/// - `line_searcher`: line-search algorithm used by L-BFGS.
/// - `verbose`: if `true`, attaches a progress observer (behind the
///   `obs_slog` feature).
/// - `lbfgs_mem`: optional L-BFGS history size; `None` uses the crate
///   default.
#[derive(Debug, Clone, PartialEq)]
pub struct FitOptions {
    pub tols: Tolerances,
    pub line_searcher: LineSearcher,
    pub verbose: bool,
    pub lbfgs_mem: Option<usize>,
}

impl FitOptions {
    /// Create a validated set of solver options.
    ///
    /// # Errors
    /// - [`FitError::InvalidLBFGSMem`] if `lbfgs_mem == Some(0)`.
    pub fn new(
        tols: Tolerances, line_searcher: LineSearcher, verbose: bool, lbfgs_mem: Option<usize>,
    ) -> FitResult<Self> {
        if let Some(m) = lbfgs_mem {
            if m == 0 {
                return Err(FitError::InvalidLBFGSMem {
                    mem: m,
                    reason: "L-BFGS memory must be greater than zero.",
                });
            }
        }
        Ok(Self { tols, line_searcher, verbose, lbfgs_mem })
    }
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            tols: Tolerances::new(Some(1e-6), None, Some(300)).unwrap(),
            line_searcher: LineSearcher::MoreThuente,
            verbose: false,
            lbfgs_mem: None,
        }
    }
}

/// Numerical tolerances and iteration limits for a solver run.
///
/// - `tol_grad`: terminate when the gradient norm falls below this.
/// - `tol_loss`: terminate when the change in loss falls below this.
/// - `max_iter`: hard cap on the number of iterations.
///
/// Any field can be `None` but at least one of the three must be
/// provided.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub tol_grad: Option<f64>,
    pub tol_loss: Option<f64>,
    pub max_iter: Option<usize>,
}

impl Tolerances {
    /// Construct validated tolerances.
    ///
    /// # Errors
    /// - [`FitError::NoTolerancesProvided`] if all three are `None`.
    /// - [`FitError::InvalidTolGrad`] / [`FitError::InvalidTolLoss`] for a
    ///   non-finite or non-positive tolerance.
    /// - [`FitError::InvalidMaxIter`] if `max_iter == Some(0)`.
    pub fn new(
        tol_grad: Option<f64>, tol_loss: Option<f64>, max_iter: Option<usize>,
    ) -> FitResult<Self> {
        if tol_grad.is_none() && tol_loss.is_none() && max_iter.is_none() {
            return Err(FitError::NoTolerancesProvided);
        }
        verify_tol_grad(tol_grad)?;
        verify_tol_loss(tol_loss)?;
        if let Some(max_iter) = max_iter {
            if max_iter == 0 {
                return Err(FitError::InvalidMaxIter {
                    max_iter,
                    reason: "Maximum iterations must be greater than zero.",
                });
            }
        }
        Ok(Self { tol_grad, tol_loss, max_iter })
    }
}

/// Canonical result returned by `minimize`.
///
/// - `theta_hat`: best parameter vector found.
/// - `loss`: best objective value `L(θ̂)`.
/// - `converged`: `true` if the solver reported a terminating status
///   other than `NotTerminated`.
/// - `status`: human-readable termination status.
/// - `iterations`: number of solver iterations performed.
/// - `fn_evals`: function-evaluation counters reported by the solver.
/// - `grad_norm`: norm of the last available gradient, if present.
#[derive(Debug, Clone, PartialEq)]
pub struct FitOutcome {
    pub theta_hat: Theta,
    pub loss: f64,
    pub converged: bool,
    pub status: String,
    pub iterations: usize,
    pub fn_evals: FnEvalMap,
    pub grad_norm: Option<f64>,
}

impl FitOutcome {
    /// Build a validated [`FitOutcome`] from raw solver state.
    ///
    /// # Errors
    /// Propagates validation errors for `theta_hat` (present, finite) and
    /// `loss` (finite).
    pub fn new(
        theta_hat_opt: Option<Theta>, loss: f64, termination: TerminationStatus, iterations: u64,
        fn_evals: FnEvalMap, grad: Option<Grad>,
    ) -> FitResult<Self> {
        let theta_hat = validate_theta_hat(theta_hat_opt)?;
        validate_value(loss)?;
        let status: String;
        let converged = match termination {
            TerminationStatus::NotTerminated => {
                status = "Not terminated".to_string();
                false
            }
            _ => {
                status = format!("{termination:?}");
                true
            }
        };
        let iterations = iterations as usize;
        let grad_norm = grad.map(|g| g.l2_norm());
        Ok(Self { theta_hat, loss, converged, status, iterations, fn_evals, grad_norm })
    }
}
