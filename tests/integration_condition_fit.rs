//! Integration tests for condition-driven distribution fitting.
//!
//! Purpose
//! -------
//! - Validate the end-to-end pipeline: from condition construction,
//!   through loss compilation and L-BFGS minimization, to the fitted
//!   distribution and its diagnostics.
//! - Exercise realistic fitting regimes (mixtures on sampled data,
//!   interval targets, strategy comparisons) rather than toy edge cases
//!   only.
//!
//! Coverage
//! --------
//! - `dist`: logistic and mixture shapes round-tripping through the
//!   solver's unconstrained parameter space.
//! - `conditions`: interval and log-likelihood conditions driving fits.
//! - `loss`: fused vs decomposed composition, specialization-cache
//!   behavior across repeated evaluations.
//! - `optimize`: `minimize`, `fit_conditions`, and
//!   `fit_mixture_from_samples` with LBFGS + More–Thuente settings.
//!
//! Exclusions
//! ----------
//! - Fine-grained gradient and validation checks — covered by unit tests
//!   in the corresponding modules.
//! - Exhaustive sweeps over component counts and sample sizes — those
//!   belong in targeted property tests.
use condfit::{
    conditions::{Condition, IntervalCondition, LogLikelihoodCondition},
    dist::{Dist, DistFixed},
    loss::{CompiledLoss, Strategy},
    metrics::wasserstein_distance,
    optimize::{fit_conditions, FitOptions, LineSearcher, Tolerances},
    types::Theta,
};
use condfit::optimize::fit_mixture_from_samples;
use ndarray::Array1;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Baseline solver options for the integration fits: gradient tolerance
/// 1e-8, 500-iteration cap, More–Thuente line search.
fn fit_opts() -> FitOptions {
    FitOptions::new(
        Tolerances::new(Some(1e-8), None, Some(500)).unwrap(),
        LineSearcher::MoreThuente,
        false,
        None,
    )
    .expect("Baseline fit options should be valid")
}

/// Draw logistic samples by inverting the CDF on uniform draws.
fn logistic_samples(rng: &mut StdRng, loc: f64, scale: f64, n: usize) -> Vec<f64> {
    (0..n)
        .map(|_| {
            let u: f64 = rng.gen_range(1e-9..1.0 - 1e-9);
            loc + scale * (u / (1.0 - u)).ln()
        })
        .collect()
}

#[test]
// Purpose
// -------
// Fit a logistic to a single median condition and verify the condition
// is satisfied at the optimum.
//
// Given
// -----
// - The condition P(X <= 0) = 0.5 and a deliberately off-center start
//   (loc 3, scale 2).
//
// Expect
// ------
// - The fit converges, the final loss is near zero, and the fitted
//   distribution puts mass 0.5 below zero within 1e-3.
fn interval_condition_fit_reaches_target_mass() {
    let condition =
        Condition::Interval(IntervalCondition::new(1.0, 0.5, None, Some(0.0)).unwrap());
    let theta0 = Theta::from(vec![3.0, 2.0_f64.ln()]);

    let (fitted, outcome) = fit_conditions(
        DistFixed::Logistic,
        vec![condition],
        Strategy::Fused,
        theta0,
        &fit_opts(),
    )
    .expect("Interval fit should succeed");

    assert!(outcome.converged, "Solver should terminate: {}", outcome.status);
    assert!(outcome.loss < 1e-6, "Final loss should vanish, got {}", outcome.loss);
    assert!((fitted.cdf(0.0) - 0.5).abs() < 1e-3);
}

#[test]
// Purpose
// -------
// Verify that fused and decomposed composition strategies drive a fit to
// the same optimum.
//
// Given
// -----
// - Two interval conditions pinning the 25th and 75th percentiles, fit
//   under both strategies from the same start.
//
// Expect
// ------
// - Both losses land near zero and the fitted parameters agree within
//   1e-3.
fn fused_and_decomposed_fits_agree() {
    let conditions = || {
        vec![
            Condition::Interval(IntervalCondition::new(1.0, 0.25, None, Some(-1.0)).unwrap()),
            Condition::Interval(IntervalCondition::new(1.0, 0.75, None, Some(1.0)).unwrap()),
        ]
    };
    let theta0 = || Theta::from(vec![0.5, 0.0]);

    let (fused_dist, fused_out) = fit_conditions(
        DistFixed::Logistic,
        conditions(),
        Strategy::Fused,
        theta0(),
        &fit_opts(),
    )
    .expect("Fused fit should succeed");
    let (dec_dist, dec_out) = fit_conditions(
        DistFixed::Logistic,
        conditions(),
        Strategy::Decomposed,
        theta0(),
        &fit_opts(),
    )
    .expect("Decomposed fit should succeed");

    assert!(fused_out.loss < 1e-6);
    assert!(dec_out.loss < 1e-6);

    let (fa, fb) = match (&fused_dist, &dec_dist) {
        (Dist::Logistic(a), Dist::Logistic(b)) => (a, b),
        other => panic!("Expected logistic fits, got {other:?}"),
    };
    assert!((fa.loc - fb.loc).abs() < 1e-3);
    assert!((fa.scale - fb.scale).abs() < 1e-3);
}

#[test]
// Purpose
// -------
// Verify that repeated evaluations of one compiled shape specialize it
// exactly once while every evaluation registers as a reuse.
//
// Given
// -----
// - A decomposed compiled loss over two conditions, evaluated at several
//   distinct tunable vectors.
//
// Expect
// ------
// - Each per-condition shape key reports one specialization and at least
//   as many hits as evaluations.
fn repeated_evaluations_specialize_once() {
    use condfit::loss::specialize::{times_hit, times_specialized};

    // Shapes chosen to be unique to this test so parallel tests cannot
    // intern them first.
    let conditions = vec![
        Condition::LogLikelihood(
            LogLikelihoodCondition::new(1.0, (0..37).map(|i| i as f64 * 0.1).collect()).unwrap(),
        ),
        Condition::Interval(IntervalCondition::new(1.0, 0.5, Some(-41.5), Some(41.5)).unwrap()),
    ];
    let compiled = CompiledLoss::new(DistFixed::Logistic, conditions, Strategy::Decomposed);

    let evaluations = 5;
    for i in 0..evaluations {
        let theta = Theta::from(vec![0.1 * i as f64, 0.0]);
        compiled.value(&theta).expect("Evaluation should succeed");
    }

    for key in compiled.keys() {
        assert_eq!(times_specialized(key), 1);
        assert!(times_hit(key) >= evaluations as u64);
    }
}

#[test]
// Purpose
// -------
// Recover a two-component logistic mixture from sampled data by maximum
// likelihood.
//
// Given
// -----
// - 1000 seeded samples from an equal-weight mixture of Logistic(-2, 1)
//   and Logistic(2, 1).
//
// Expect
// ------
// - The fit converges with component locations within 0.3 of the truth
//   (in either order) and weights within 0.1 of one half.
fn mixture_recovery_from_samples() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut samples = logistic_samples(&mut rng, -2.0, 1.0, 500);
    samples.extend(logistic_samples(&mut rng, 2.0, 1.0, 500));

    let (mixture, outcome) =
        fit_mixture_from_samples(&samples, 2, &fit_opts()).expect("Mixture fit should succeed");

    assert!(outcome.converged, "Solver should terminate: {}", outcome.status);

    let mut locs: Vec<f64> = mixture.components().iter().map(|c| c.loc).collect();
    locs.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert!((locs[0] + 2.0).abs() < 0.3, "Left component at {}", locs[0]);
    assert!((locs[1] - 2.0).abs() < 0.3, "Right component at {}", locs[1]);

    for &w in mixture.weights() {
        assert!((w - 0.5).abs() < 0.1, "Component weight {w} should be near 0.5");
    }
}

#[test]
// Purpose
// -------
// Compare a fitted density against the truth with the Wasserstein
// metric and confirm it beats a deliberately wrong baseline.
//
// Given
// -----
// - Logistic(0, 1) truth, a near-exact fit, and a shifted baseline, all
//   discretized on the same grid.
//
// Expect
// ------
// - distance(truth, near-fit) is far smaller than
//   distance(truth, shifted baseline).
fn wasserstein_ranks_fits_sensibly() {
    let truth = Dist::structure(&DistFixed::Logistic, &Array1::from(vec![0.0, 0.0])).unwrap();
    let near = Dist::structure(&DistFixed::Logistic, &Array1::from(vec![0.05, 0.02])).unwrap();
    let far = Dist::structure(&DistFixed::Logistic, &Array1::from(vec![2.0, 0.0])).unwrap();

    let grid: Vec<f64> = (0..200).map(|i| -10.0 + 0.1 * i as f64).collect();
    let density =
        |d: &Dist| -> Vec<f64> { grid.iter().map(|&x| d.logpdf(x).exp()).collect() };

    let truth_d = density(&truth);
    let d_near = wasserstein_distance(&truth_d, &density(&near)).unwrap();
    let d_far = wasserstein_distance(&truth_d, &density(&far)).unwrap();

    assert!(d_near < d_far / 5.0, "near {d_near} should beat far {d_far}");
}
