//! Adapter that exposes an [`Objective`] as an `argmin` problem.
//!
//! The objective is minimized directly; analytic gradients pass through
//! unchanged. When no analytic gradient is available the loss closure is
//! finite-differenced: central differences first, falling back to forward
//! differences if a loss evaluation failed or the central-difference
//! gradient does not validate.
use std::cell::RefCell;

use crate::{
    errors::FitError,
    optimize::{traits::Objective, validation::validate_grad},
    types::{Grad, Loss, Theta},
};
use argmin::core::{CostFunction, Error, Gradient};
use finitediff::FiniteDiff;

/// Bridges an [`Objective`] to `argmin`'s `CostFunction` and `Gradient`.
#[derive(Debug, Clone)]
pub struct ArgminProblem<'a, F: Objective> {
    pub f: &'a F,
}

impl<'a, F: Objective> ArgminProblem<'a, F> {
    pub fn new(f: &'a F) -> Self {
        Self { f }
    }
}

impl<F: Objective> CostFunction for ArgminProblem<'_, F> {
    type Param = Theta;
    type Output = Loss;

    /// Evaluate the objective, rejecting non-finite values.
    ///
    /// # Errors
    /// Propagates any `FitError` from the objective via `?`; a non-finite
    /// value is reported as `NonFiniteLoss`.
    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        let output = self.f.value(theta)?;
        if !output.is_finite() {
            return Err((FitError::NonFiniteLoss { value: output }).into());
        }
        Ok(output)
    }
}

impl<F: Objective> Gradient for ArgminProblem<'_, F> {
    type Param = Theta;
    type Gradient = Grad;

    /// Evaluate the objective's gradient at `theta`.
    ///
    /// Analytic gradients are validated and returned as-is. Otherwise the
    /// loss is finite-differenced; the FD closure cannot return `Result`,
    /// so the first loss-evaluation error is captured in `closure_err` and
    /// the closure returns NaN, after which central differences are
    /// retried as forward differences.
    ///
    /// # Errors
    /// - Propagates objective errors other than `GradientNotImplemented`.
    /// - Propagates any error raised by loss evaluations during FD.
    /// - Returns validation errors for a wrong-dimension or non-finite
    ///   gradient.
    fn gradient(&self, theta: &Self::Param) -> Result<Self::Gradient, Error> {
        let dim = theta.len();
        match self.f.grad(theta) {
            Ok(g) => {
                validate_grad(&g, dim)?;
                Ok(g)
            }
            Err(FitError::GradientNotImplemented) => {
                let closure_err: RefCell<Option<Error>> = RefCell::new(None);
                let loss_func = |theta: &Theta| -> f64 {
                    match self.cost(theta) {
                        Ok(val) => val,
                        Err(e) => {
                            let mut slot = closure_err.borrow_mut();
                            if slot.is_none() {
                                *slot = Some(e);
                            }
                            f64::NAN
                        }
                    }
                };
                let fd_grad = theta.central_diff(&loss_func);
                if closure_err.borrow().is_some() {
                    return run_forward_diff(theta, &loss_func, &closure_err);
                }
                match validate_grad(&fd_grad, dim) {
                    Ok(()) => Ok(fd_grad),
                    Err(_) => run_forward_diff(theta, &loss_func, &closure_err),
                }
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Forward-difference gradient with error capture.
///
/// Clears `closure_err`, runs `forward_diff`, surfaces any captured loss
/// error, and validates the resulting gradient.
fn run_forward_diff<G: Fn(&Theta) -> f64>(
    theta: &Theta, func: &G, closure_err: &RefCell<Option<Error>>,
) -> Result<Grad, Error> {
    closure_err.replace(None);
    let fd_grad = theta.forward_diff(func);
    if let Some(err) = closure_err.take() {
        return Err(err);
    }
    validate_grad(&fd_grad, theta.len())?;
    Ok(fd_grad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FitResult;
    use ndarray::Array1;

    /// Quadratic bowl `|θ - c|²` with an optional analytic gradient.
    struct Quadratic {
        center: Theta,
        analytic: bool,
    }

    impl Objective for Quadratic {
        fn value(&self, theta: &Theta) -> FitResult<Loss> {
            let diff = theta - &self.center;
            Ok(diff.dot(&diff))
        }

        fn grad(&self, theta: &Theta) -> FitResult<Grad> {
            if !self.analytic {
                return Err(FitError::GradientNotImplemented);
            }
            Ok((theta - &self.center) * 2.0)
        }
    }

    #[test]
    // Purpose
    // -------
    // Verify that the adapter passes an analytic gradient through without
    // a sign flip.
    //
    // Given
    // -----
    // - A quadratic bowl centered at the origin, evaluated at [1, -2].
    //
    // Expect
    // ------
    // - The gradient is exactly 2θ, pointing away from the minimum.
    fn analytic_gradient_passes_through() {
        let f = Quadratic { center: Array1::zeros(2), analytic: true };
        let problem = ArgminProblem::new(&f);
        let theta = Theta::from(vec![1.0, -2.0]);
        let g = problem.gradient(&theta).unwrap();
        assert!((g[0] - 2.0).abs() < 1e-12);
        assert!((g[1] + 4.0).abs() < 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Verify the finite-difference fallback when no analytic gradient is
    // implemented.
    //
    // Given
    // -----
    // - The same quadratic bowl with `analytic = false`.
    //
    // Expect
    // ------
    // - The FD gradient matches 2θ within 1e-5.
    fn finite_difference_fallback_matches_analytic() {
        let f = Quadratic { center: Array1::zeros(2), analytic: false };
        let problem = ArgminProblem::new(&f);
        let theta = Theta::from(vec![0.5, 1.5]);
        let g = problem.gradient(&theta).unwrap();
        assert!((g[0] - 1.0).abs() < 1e-5);
        assert!((g[1] - 3.0).abs() < 1e-5);
    }

    #[test]
    // Purpose
    // -------
    // Verify that a non-finite objective value is rejected at the adapter
    // boundary.
    //
    // Given
    // -----
    // - An objective that always returns infinity.
    //
    // Expect
    // ------
    // - `cost` returns an error instead of an infinite value.
    fn non_finite_loss_is_rejected() {
        struct Inf;
        impl Objective for Inf {
            fn value(&self, _theta: &Theta) -> FitResult<Loss> {
                Ok(f64::INFINITY)
            }
        }
        let problem = ArgminProblem::new(&Inf);
        assert!(problem.cost(&Theta::from(vec![0.0])).is_err());
    }
}
