//! types — shared numeric aliases and solver wiring.
//!
//! Purpose
//! -------
//! Centralize the core numeric types and solver aliases used across the
//! distribution, condition, loss, and optimizer layers. Defining these in
//! one place keeps the rest of the crate agnostic to `ndarray` and Argmin
//! generics.
//!
//! Key behaviors
//! -------------
//! - Define canonical aliases for tunable-parameter vectors, gradients,
//!   and scalar losses (`Theta`, `Grad`, `Loss`).
//! - Provide a standard map type for Argmin function-evaluation counters
//!   (`FnEvalMap`).
//! - Expose pre-wired L-BFGS solver aliases for the supported line-search
//!   strategies over the common `(Theta, Grad, Loss)` shapes.
//!
//! Invariants & assumptions
//! ------------------------
//! - All tunable vectors and gradients are `ndarray` containers over `f64`.
//! - `Loss` is a scalar `f64`; the composition engine guarantees finiteness
//!   before a value crosses a module boundary.
//! - The line-search aliases assume Argmin's three-parameter forms
//!   `(Param, Gradient, Float)` as of the pinned Argmin version.
//!
//! Conventions
//! -----------
//! - `Theta` and `Grad` are treated as flat vectors whose length is a
//!   deterministic function of a distribution's fixed parameters.
//! - `DEFAULT_LBFGS_MEM` encodes the typical history size for L-BFGS;
//!   callers may override it via per-run options.
//!
//! Downstream usage
//! ----------------
//! - Distribution and condition code imports [`Theta`] and [`Grad`] instead
//!   of referring to `ndarray` generics directly.
//! - The optimizer layer constructs concrete L-BFGS instances via the
//!   provided solver aliases (e.g., [`LbfgsHagerZhang`]).
//!
//! Testing notes
//! -------------
//! - This module only defines type aliases and constants; correctness is
//!   exercised indirectly by the surrounding modules.
use argmin::solver::{
    linesearch::{HagerZhangLineSearch, MoreThuenteLineSearch},
    quasinewton::LBFGS,
};
use ndarray::Array1;
use std::collections::HashMap;

/// Flat tunable-parameter vector `θ` of a distribution.
///
/// Alias for `ndarray::Array1<f64>`, used as the canonical parameter type
/// throughout the crate.
pub type Theta = Array1<f64>;

/// Gradient vector `∇L(θ)` matching the shape of [`Theta`].
pub type Grad = Array1<f64>;

/// Scalar loss value produced by the composition engine.
pub type Loss = f64;

/// Function-evaluation counters as reported by the solver.
///
/// Maps human-readable counter names (e.g., `"cost_count"`) to counts.
pub type FnEvalMap = HashMap<String, u64>;

/// Default history size (`m`) for L-BFGS runs.
pub const DEFAULT_LBFGS_MEM: usize = 7;

/// Fixed scale factor applied to every composed loss before it is returned.
///
/// Conditions the loss for the solver's default step sizes; not otherwise
/// load-bearing.
pub const LOSS_SCALE: f64 = 100.0;

/// Hager–Zhang line search specialized to this crate's numeric types.
pub type HagerZhangLS = HagerZhangLineSearch<Theta, Grad, Loss>;

/// More–Thuente line search specialized to this crate's numeric types.
pub type MoreThuenteLS = MoreThuenteLineSearch<Theta, Grad, Loss>;

/// L-BFGS solver wired to the Hager–Zhang line search.
pub type LbfgsHagerZhang = LBFGS<HagerZhangLS, Theta, Grad, Loss>;

/// L-BFGS solver wired to the More–Thuente line search.
pub type LbfgsMoreThuente = LBFGS<MoreThuenteLS, Theta, Grad, Loss>;
