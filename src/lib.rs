//! condfit — fit parametric distributions to weighted probabilistic
//! conditions.
//!
//! Purpose
//! -------
//! Serve as the crate root for a condition-fitting loss engine: given a
//! distribution shape (single logistic, logistic mixture, or empirical
//! point density) and a list of weighted probabilistic conditions
//! (interval masses, cross-entropy against a reference density, sample
//! log-likelihoods), compose a single differentiable loss and minimize it
//! with L-BFGS.
//!
//! Key behaviors
//! -------------
//! - Registry layer ([`dist`], [`conditions`]): every variant splits into
//!   a hashable fixed shape and a flat numeric vector, and rebuilds from
//!   one. Only the numeric vector varies between solver iterations.
//! - Loss layer ([`loss`]): composes per-condition losses (fused or
//!   decomposed), supplies exact analytic gradients, and interns each
//!   shape in a process-wide specialization cache with a one-time trace
//!   event per new shape.
//! - Solver layer ([`optimize`]): Argmin-backed L-BFGS with configurable
//!   line search and finite-difference fallbacks, plus high-level entry
//!   points `fit_conditions` and `fit_mixture_from_samples`.
//! - Diagnostics: [`metrics::wasserstein_distance`] for fit quality and
//!   [`conditions::describe_fit`] for per-condition reports.
//!
//! Invariants & assumptions
//! ------------------------
//! - Tunable parameters live in an unconstrained optimizer space
//!   (log scales, softmax weights), so every iterate a solver proposes
//!   maps back to a valid distribution.
//! - Numeric code reports invalid inputs as [`errors::FitError`] values;
//!   non-test code never panics on user input.
//!
//! Downstream usage
//! ----------------
//! - Typical flow: build a [`dist::DistFixed`] and a
//!   `Vec<conditions::Condition>`, call [`optimize::fit_conditions`] with
//!   a starting vector and [`optimize::FitOptions`], then inspect the
//!   fitted [`dist::Dist`] and the [`optimize::FitOutcome`].
//!
//! Testing notes
//! -------------
//! - Submodules carry unit tests (gradients against central finite
//!   differences, registry round-trips, validation rules); `tests/`
//!   exercises full condition-driven fits end to end.

pub mod conditions;
pub mod dist;
pub mod errors;
pub mod loss;
pub mod metrics;
pub mod numerics;
pub mod optimize;
pub mod types;
