//! optimize — argmin-powered minimization of composed losses.
//!
//! Purpose
//! -------
//! Provide a high-level, Argmin-backed solver layer for **minimizing**
//! scalar objectives `L(θ)`. The loss layer implements a single trait,
//! [`Objective`], and calls [`minimize`] to run L-BFGS with a
//! configurable line search, tolerances, and finite-difference fallbacks.
//! Convenience entry points compile condition lists and fit mixtures to
//! raw samples.
//!
//! Key behaviors
//! -------------
//! - Bridge an [`Objective`] into an Argmin-compatible problem via
//!   [`adapter::ArgminProblem`]; no sign flips anywhere, the objective is
//!   minimized as-is.
//! - Expose [`minimize`], which validates the starting point with
//!   [`Objective::check`], selects an L-BFGS solver via [`builders`]
//!   based on [`traits::LineSearcher`], executes via [`run::run_lbfgs`],
//!   and normalizes results into a [`FitOutcome`].
//! - Fall back to robust finite differences of the objective when no
//!   analytic gradient is implemented (central first, then forward).
//! - Centralize configuration ([`Tolerances`], [`FitOptions`]) and
//!   validation ([`validation`]) so downstream code can assume finite,
//!   internally consistent inputs.
//!
//! Invariants & assumptions
//! ------------------------
//! - Parameters live in an unconstrained optimizer space as `Theta`
//!   (`Array1<f64>`); any mapping from constrained parameters happens in
//!   the distribution layer's structure/destructure pair.
//! - [`Objective::value`] and [`Objective::grad`] report invalid inputs
//!   as recoverable [`FitError`] values, never panics.
//! - Configuration types are validated on construction and treated as
//!   internally consistent by the solver layer.
//!
//! Downstream usage
//! ----------------
//! - `CompiledLoss` implements [`Objective`]; [`fit_conditions`] and
//!   [`fit_mixture_from_samples`] are the crate's main fitting entry
//!   points and return a rebuilt distribution next to the raw
//!   [`FitOutcome`].
//!
//! Testing notes
//! -------------
//! - Submodule tests cover gradient handling in [`adapter`], solver
//!   construction in [`builders`], validation rules, and quadratic-bowl
//!   convergence of [`minimize`]; integration tests exercise full
//!   condition-driven fits.
//!
//! [`FitError`]: crate::errors::FitError

pub mod adapter;
pub mod api;
pub mod builders;
pub mod run;
pub mod traits;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::api::{fit_conditions, fit_mixture_from_samples, minimize};
pub use self::traits::{FitOptions, FitOutcome, LineSearcher, Objective, Tolerances};
