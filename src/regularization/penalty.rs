//! Weight-penalty regularization: L1, L2 and ElasticNet
//!
//! These techniques leave the signal path untouched and contribute a scalar
//! penalty to the reported loss plus a gradient term on the weights.

use ndarray::Array2;

use crate::error::{NetworkError, Result};
use crate::regularization::Regularizer;

fn validate_lambda(lambda: f64) -> Result<()> {
    if !lambda.is_finite() || lambda < 0.0 {
        return Err(NetworkError::InvalidParameter {
            name: "lambda",
            value: lambda,
        });
    }
    Ok(())
}

/// L1 (lasso): penalty `lambda * sum(|w|)`, subgradient `lambda * sign(w)`
pub struct L1 {
    lambda: f64,
}

impl L1 {
    pub fn new(lambda: f64) -> Result<Self> {
        validate_lambda(lambda)?;
        Ok(Self { lambda })
    }
}

impl Regularizer for L1 {
    fn penalty(&self, weights: &[Array2<f64>]) -> f64 {
        self.lambda
            * weights
                .iter()
                .map(|w| w.mapv(f64::abs).sum())
                .sum::<f64>()
    }

    fn penalty_gradient(&self, weights: &Array2<f64>) -> Array2<f64> {
        weights.mapv(|w| self.lambda * w.signum())
    }
}

/// L2 (ridge): penalty `lambda / 2 * sum(w^2)`, gradient `lambda * w`
pub struct L2 {
    lambda: f64,
}

impl L2 {
    pub fn new(lambda: f64) -> Result<Self> {
        validate_lambda(lambda)?;
        Ok(Self { lambda })
    }
}

impl Regularizer for L2 {
    fn penalty(&self, weights: &[Array2<f64>]) -> f64 {
        self.lambda / 2.0 * weights.iter().map(|w| (w * w).sum()).sum::<f64>()
    }

    fn penalty_gradient(&self, weights: &Array2<f64>) -> Array2<f64> {
        weights * self.lambda
    }
}

/// Weighted combination of L1 and L2.
///
/// `l1_ratio` in [0, 1]: 1.0 is pure L1, 0.0 is pure L2.
pub struct ElasticNet {
    lambda: f64,
    l1_ratio: f64,
}

impl ElasticNet {
    pub fn new(lambda: f64, l1_ratio: f64) -> Result<Self> {
        validate_lambda(lambda)?;
        if !l1_ratio.is_finite() || !(0.0..=1.0).contains(&l1_ratio) {
            return Err(NetworkError::InvalidParameter {
                name: "l1_ratio",
                value: l1_ratio,
            });
        }
        Ok(Self { lambda, l1_ratio })
    }
}

impl Regularizer for ElasticNet {
    fn penalty(&self, weights: &[Array2<f64>]) -> f64 {
        let l1: f64 = weights.iter().map(|w| w.mapv(f64::abs).sum()).sum();
        let l2: f64 = weights.iter().map(|w| (w * w).sum()).sum();
        self.lambda * (self.l1_ratio * l1 + (1.0 - self.l1_ratio) / 2.0 * l2)
    }

    fn penalty_gradient(&self, weights: &Array2<f64>) -> Array2<f64> {
        weights.mapv(|w| self.lambda * (self.l1_ratio * w.signum() + (1.0 - self.l1_ratio) * w))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn sample_weights() -> Vec<Array2<f64>> {
        vec![array![[1.0, -2.0], [0.0, 3.0]]]
    }

    #[test]
    fn test_lambda_must_be_non_negative() {
        assert!(L1::new(-0.1).is_err());
        assert!(L2::new(f64::INFINITY).is_err());
        assert!(ElasticNet::new(0.1, 1.5).is_err());
    }

    #[test]
    fn test_l1_penalty_and_gradient() {
        let l1 = L1::new(0.5).unwrap();
        let weights = sample_weights();
        // 0.5 * (1 + 2 + 0 + 3) = 3.0
        assert_relative_eq!(l1.penalty(&weights), 3.0, epsilon = 1e-12);

        let grad = l1.penalty_gradient(&weights[0]);
        assert_eq!(grad, array![[0.5, -0.5], [0.0, 0.5]]);
    }

    #[test]
    fn test_l2_penalty_and_gradient() {
        let l2 = L2::new(0.1).unwrap();
        let weights = sample_weights();
        // 0.1 / 2 * (1 + 4 + 0 + 9) = 0.7
        assert_relative_eq!(l2.penalty(&weights), 0.7, epsilon = 1e-12);

        let grad = l2.penalty_gradient(&weights[0]);
        assert_relative_eq!(grad[[0, 1]], -0.2, epsilon = 1e-12);
    }

    #[test]
    fn test_elastic_net_mixes_both() {
        let weights = sample_weights();
        let en = ElasticNet::new(0.5, 0.5).unwrap();
        let l1 = L1::new(0.5).unwrap();
        let l2 = L2::new(0.5).unwrap();

        let expected = 0.5 * l1.penalty(&weights) + 0.5 * l2.penalty(&weights);
        assert_relative_eq!(en.penalty(&weights), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_elastic_net_extremes_match_pure_penalties() {
        let weights = sample_weights();
        let pure_l1 = ElasticNet::new(0.3, 1.0).unwrap();
        let pure_l2 = ElasticNet::new(0.3, 0.0).unwrap();

        assert_relative_eq!(
            pure_l1.penalty(&weights),
            L1::new(0.3).unwrap().penalty(&weights),
            epsilon = 1e-12
        );
        assert_relative_eq!(
            pure_l2.penalty(&weights),
            L2::new(0.3).unwrap().penalty(&weights),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_signal_path_untouched() {
        let mut l2 = L2::new(0.1).unwrap();
        let signal = array![1.0, 2.0, 3.0];
        assert_eq!(l2.apply_forward(&signal, true), signal);
        assert_eq!(l2.apply_backward(&signal), signal);
    }
}
