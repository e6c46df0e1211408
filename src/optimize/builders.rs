//! optimize::builders — L-BFGS solver construction helpers.
//!
//! Purpose
//! -------
//! Provide small, focused builders for the L-BFGS solvers used by the
//! fitting layer. These hide Argmin's generic wiring and apply crate-level
//! options (tolerances, memory size) so higher-level code can request a
//! configured solver without touching Argmin-specific types.
//!
//! Key behaviors
//! -------------
//! - Construct L-BFGS solvers with either Hager–Zhang or More–Thuente
//!   line search over the crate's `(Theta, Grad, Loss)` aliases.
//! - Apply optional gradient and loss-change tolerances from
//!   [`FitOptions`] via a shared configuration helper.
//! - Leave the initial parameter vector and maximum iterations to the
//!   runner layer, keeping these builders side-effect free.
//!
//! Invariants & assumptions
//! ------------------------
//! - The L-BFGS memory (`m`) is either provided via `opts.lbfgs_mem` or
//!   defaults to [`DEFAULT_LBFGS_MEM`].
//! - Any tolerance Argmin rejects surfaces as a [`FitError`] through the
//!   crate's `From<argmin::core::Error>` conversion; raw Argmin errors
//!   never cross module boundaries.
//!
//! Downstream usage
//! ----------------
//! - `minimize` selects [`build_optimizer_hager_zhang`] or
//!   [`build_optimizer_more_thuente`] from the configured line search and
//!   hands the solver to `run_lbfgs`.
use argmin::solver::quasinewton::LBFGS;

use crate::{
    errors::FitResult,
    optimize::traits::FitOptions,
    types::{
        Grad, HagerZhangLS, LbfgsHagerZhang, LbfgsMoreThuente, Loss, MoreThuenteLS, Theta,
        DEFAULT_LBFGS_MEM,
    },
};

/// Construct an L-BFGS solver with Hager–Zhang line search, configured
/// with the memory size and tolerances from `opts`.
///
/// # Errors
/// Surfaces any tolerance Argmin rejects as a [`FitError`]
/// (via `From<argmin::core::Error>`).
///
/// [`FitError`]: crate::errors::FitError
pub fn build_optimizer_hager_zhang(opts: &FitOptions) -> FitResult<LbfgsHagerZhang> {
    let hager_zhang = HagerZhangLS::new();
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    let lbfgs = LbfgsHagerZhang::new(hager_zhang, mem);
    configure_lbfgs(lbfgs, opts)
}

/// Construct an L-BFGS solver with More–Thuente line search, configured
/// with the memory size and tolerances from `opts`.
///
/// # Errors
/// Surfaces any tolerance Argmin rejects as a [`FitError`]
/// (via `From<argmin::core::Error>`).
///
/// [`FitError`]: crate::errors::FitError
pub fn build_optimizer_more_thuente(opts: &FitOptions) -> FitResult<LbfgsMoreThuente> {
    let more_thuente = MoreThuenteLS::new();
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    let lbfgs = LbfgsMoreThuente::new(more_thuente, mem);
    configure_lbfgs(lbfgs, opts)
}

/// Apply optional tolerances from `opts` to an L-BFGS solver, generic
/// over the line-search type. When a tolerance is `None` the
/// corresponding Argmin default remains in effect.
///
/// # Errors
/// Propagates Argmin configuration errors as [`FitError`].
///
/// [`FitError`]: crate::errors::FitError
pub fn configure_lbfgs<L>(
    mut solver: LBFGS<L, Theta, Grad, Loss>, opts: &FitOptions,
) -> FitResult<LBFGS<L, Theta, Grad, Loss>> {
    if let Some(g) = opts.tols.tol_grad {
        solver = solver.with_tolerance_grad(g)?;
    }
    if let Some(c) = opts.tols.tol_loss {
        solver = solver.with_tolerance_cost(c)?;
    }
    Ok(solver)
}
