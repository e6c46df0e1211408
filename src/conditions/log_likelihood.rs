//! Log-likelihood condition: negative log-likelihood of observed samples.
use crate::{
    conditions::interval::validate_weight,
    dist::Dist,
    errors::{FitError, FitResult},
    types::Grad,
};
use ndarray::Array1;

/// Penalizes the weighted negative log-likelihood `-w * Σ_j ln f(x_j)` of
/// a fixed set of observations under the fitted distribution.
#[derive(Debug, Clone, PartialEq)]
pub struct LogLikelihoodCondition {
    pub weight: f64,
    pub observations: Vec<f64>,
}

impl LogLikelihoodCondition {
    /// Construct a validated log-likelihood condition.
    ///
    /// # Errors
    /// - [`FitError::InvalidParameter`] if the observation set is empty or
    ///   the weight is invalid.
    /// - [`FitError::InvalidObservation`] for a non-finite observation,
    ///   carrying its index.
    pub fn new(weight: f64, observations: Vec<f64>) -> FitResult<Self> {
        validate_weight(weight)?;
        if observations.is_empty() {
            return Err(FitError::InvalidParameter {
                name: "observations",
                value: 0.0,
                reason: "Log-likelihood conditions need at least one observation.",
            });
        }
        for (index, &value) in observations.iter().enumerate() {
            if !value.is_finite() {
                return Err(FitError::InvalidObservation { index, value });
            }
        }
        Ok(Self { weight, observations })
    }

    /// Weighted negative log-likelihood of the observations.
    pub fn loss(&self, dist: &Dist) -> f64 {
        -self.weight * dist.logpdf_batch(&self.observations).sum()
    }

    /// Gradient of [`LogLikelihoodCondition::loss`] with respect to the
    /// distribution's tunable vector.
    pub fn grad(&self, dist: &Dist) -> Grad {
        let mut grad: Grad = Array1::zeros(dist.theta_len());
        for &x in &self.observations {
            grad += &dist.grad_logpdf(x);
        }
        grad * (-self.weight)
    }

    pub fn describe_fit(&self, dist: &Dist) -> String {
        let mean_logpdf =
            dist.logpdf_batch(&self.observations).sum() / self.observations.len() as f64;
        format!(
            "log-likelihood over {} observations: mean logpdf {:.4}, loss {:.6}",
            self.observations.len(),
            mean_logpdf,
            self.loss(dist),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dist::{DistFixed, Logistic},
        types::Theta,
    };
    use finitediff::FiniteDiff;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    #[test]
    // Purpose
    // -------
    // Verify that a non-finite observation is rejected with its index.
    //
    // Given
    // -----
    // - Observations [0.0, NaN, 1.0].
    //
    // Expect
    // ------
    // - Construction fails with `FitError::InvalidObservation { index: 1 }`.
    fn new_rejects_non_finite_observation() {
        let err = LogLikelihoodCondition::new(1.0, vec![0.0, f64::NAN, 1.0])
            .expect_err("NaN observation should fail");
        match err {
            FitError::InvalidObservation { index: 1, .. } => {}
            other => panic!("Expected InvalidObservation at index 1, got {other:?}"),
        }
    }

    #[test]
    // Purpose
    // -------
    // Verify the loss against a direct hand computation and that the
    // weight scales it linearly.
    //
    // Given
    // -----
    // - Logistic(0, 1) and observations [-1, 0, 1] with weights 1 and 3.
    //
    // Expect
    // ------
    // - loss(w=1) == -(logpdf(-1) + logpdf(0) + logpdf(1)) and
    //   loss(w=3) == 3 * loss(w=1).
    fn loss_matches_hand_computation_and_scales_with_weight() {
        let d = Logistic::new(0.0, 1.0).unwrap();
        let expected = -(d.logpdf(-1.0) + d.logpdf(0.0) + d.logpdf(1.0));
        let dist = Dist::Logistic(d);

        let unit = LogLikelihoodCondition::new(1.0, vec![-1.0, 0.0, 1.0]).unwrap();
        let tripled = LogLikelihoodCondition::new(3.0, vec![-1.0, 0.0, 1.0]).unwrap();
        assert!((unit.loss(&dist) - expected).abs() < 1e-12);
        assert!((tripled.loss(&dist) - 3.0 * expected).abs() < 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Verify that the loss is minimized near the data's center: the
    // gradient's loc component changes sign around the sample mean.
    //
    // Given
    // -----
    // - Observations centered at 2.0 and logistics located left and right
    //   of the center.
    //
    // Expect
    // ------
    // - d loss / d loc is negative left of the center and positive right
    //   of it.
    fn grad_points_toward_sample_center() {
        let cond = LogLikelihoodCondition::new(1.0, vec![1.5, 2.0, 2.5]).unwrap();
        let left = Dist::Logistic(Logistic::new(0.0, 1.0).unwrap());
        let right = Dist::Logistic(Logistic::new(4.0, 1.0).unwrap());
        assert!(cond.grad(&left)[0] < 0.0);
        assert!(cond.grad(&right)[0] > 0.0);
    }

    #[test]
    // Purpose
    // -------
    // Verify the analytic condition gradient against central finite
    // differences in optimizer space across 20 random parameter draws.
    //
    // Given
    // -----
    // - Random logistic thetas (loc in [-3, 3], ln scale in [-1, 1]),
    //   random weights, and five random observations in [-4, 4] per draw,
    //   seeded.
    //
    // Expect
    // ------
    // - Relative agreement within 1e-4 (absolute floor 1e-6) elementwise.
    fn grad_matches_finite_differences_across_random_draws() {
        let mut rng = StdRng::seed_from_u64(13);
        for draw in 0..20 {
            let weight = rng.gen_range(0.1..3.0);
            let observations: Vec<f64> = (0..5).map(|_| rng.gen_range(-4.0..4.0)).collect();
            let cond = LogLikelihoodCondition::new(weight, observations).unwrap();
            let theta = Theta::from(vec![rng.gen_range(-3.0..3.0), rng.gen_range(-1.0..1.0)]);

            let dist = Dist::structure(&DistFixed::Logistic, &theta).unwrap();
            let analytic = cond.grad(&dist);
            let fd = theta.central_diff(&|t: &Theta| {
                Dist::structure(&DistFixed::Logistic, t)
                    .map(|d| cond.loss(&d))
                    .unwrap_or(f64::NAN)
            });
            for i in 0..theta.len() {
                let tol = 1e-4 * fd[i].abs().max(1.0);
                assert!(
                    (analytic[i] - fd[i]).abs() < tol.max(1e-6),
                    "draw {draw} component {i}: analytic {} vs fd {}",
                    analytic[i],
                    fd[i]
                );
            }
        }
    }
}
