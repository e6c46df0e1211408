//! Validation helpers shared across the minimization layer.
//!
//! Centralizes the consistency checks used by the solver interface:
//! tolerance checks, gradient dimension/finiteness checks, and validation
//! of the final parameter estimate and objective value. All helpers
//! report through domain-specific [`FitError`] variants.
use crate::{
    errors::{FitError, FitResult},
    types::{Grad, Theta},
};

/// Validate the optional gradient-norm tolerance.
///
/// # Errors
/// Returns [`FitError::InvalidTolGrad`] if the value is non-finite or
/// not strictly positive.
pub fn verify_tol_grad(tol: Option<f64>) -> FitResult<()> {
    if let Some(tol) = tol {
        if !tol.is_finite() {
            return Err(FitError::InvalidTolGrad { tol, reason: "Tolerance must be finite." });
        }
        if tol <= 0.0 {
            return Err(FitError::InvalidTolGrad { tol, reason: "Tolerance must be positive." });
        }
    }
    Ok(())
}

/// Validate the optional loss-change tolerance.
///
/// # Errors
/// Returns [`FitError::InvalidTolLoss`] if the value is non-finite or
/// not strictly positive.
pub fn verify_tol_loss(tol: Option<f64>) -> FitResult<()> {
    if let Some(tol) = tol {
        if !tol.is_finite() {
            return Err(FitError::InvalidTolLoss { tol, reason: "Tolerance must be finite." });
        }
        if tol <= 0.0 {
            return Err(FitError::InvalidTolLoss { tol, reason: "Tolerance must be positive." });
        }
    }
    Ok(())
}

/// Validate a gradient vector against dimension and finiteness.
///
/// # Errors
/// - [`FitError::GradientDimMismatch`] if the length does not match
///   `dim`.
/// - [`FitError::InvalidGradient`] with the index and value of the first
///   non-finite element.
pub fn validate_grad(grad: &Grad, dim: usize) -> FitResult<()> {
    if grad.len() != dim {
        return Err(FitError::GradientDimMismatch { expected: dim, found: grad.len() });
    }
    for (index, &value) in grad.iter().enumerate() {
        if !value.is_finite() {
            return Err(FitError::InvalidGradient {
                index,
                value,
                reason: "Gradient elements must be finite.",
            });
        }
    }
    Ok(())
}

/// Validate and unwrap the final parameter estimate.
///
/// # Errors
/// - [`FitError::MissingThetaHat`] if no vector was produced.
/// - [`FitError::InvalidThetaHat`] if any element is non-finite.
pub fn validate_theta_hat(theta_hat: Option<Theta>) -> FitResult<Theta> {
    match theta_hat {
        Some(t) => {
            for (index, &value) in t.iter().enumerate() {
                if !value.is_finite() {
                    return Err(FitError::InvalidThetaHat {
                        index,
                        value,
                        reason: "Parameter estimates must be finite.",
                    });
                }
            }
            Ok(t)
        }
        None => Err(FitError::MissingThetaHat),
    }
}

/// Validate that a scalar objective value is finite.
///
/// # Errors
/// Returns [`FitError::NonFiniteLoss`] if the value is NaN or infinite.
pub fn validate_value(value: f64) -> FitResult<()> {
    if !value.is_finite() {
        return Err(FitError::NonFiniteLoss { value });
    }
    Ok(())
}
