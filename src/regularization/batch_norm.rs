//! Batch normalization over a feature vector
//!
//! Training mode normalizes against the statistics of the current vector and
//! folds them into the running mean/variance via an exponential moving
//! average. Inference mode normalizes against the running statistics only,
//! so evaluation is deterministic regardless of the current input's spread.

use ndarray::Array1;

use crate::error::{NetworkError, Result};
use crate::regularization::Regularizer;

/// Batch normalization with learnable scale/shift and running statistics
pub struct BatchNorm {
    features: usize,
    momentum: f64,
    epsilon: f64,
    /// Learnable scale (gamma)
    pub gamma: Array1<f64>,
    /// Learnable shift (beta)
    pub beta: Array1<f64>,
    running_mean: f64,
    running_var: f64,
}

impl BatchNorm {
    pub fn new(features: usize, momentum: f64, epsilon: f64) -> Result<Self> {
        if features == 0 {
            return Err(NetworkError::InvalidParameter {
                name: "features",
                value: 0.0,
            });
        }
        if !momentum.is_finite() || !(0.0..=1.0).contains(&momentum) {
            return Err(NetworkError::InvalidParameter {
                name: "momentum",
                value: momentum,
            });
        }
        if !epsilon.is_finite() || epsilon <= 0.0 {
            return Err(NetworkError::InvalidParameter {
                name: "epsilon",
                value: epsilon,
            });
        }
        Ok(Self {
            features,
            momentum,
            epsilon,
            gamma: Array1::ones(features),
            beta: Array1::zeros(features),
            running_mean: 0.0,
            running_var: 1.0,
        })
    }

    /// Defaults: momentum 0.9, epsilon 1e-5
    pub fn with_defaults(features: usize) -> Result<Self> {
        Self::new(features, 0.9, 1e-5)
    }

    pub fn running_mean(&self) -> f64 {
        self.running_mean
    }

    pub fn running_var(&self) -> f64 {
        self.running_var
    }

    fn normalize(&self, inputs: &Array1<f64>, mean: f64, var: f64) -> Array1<f64> {
        let std = (var + self.epsilon).sqrt();
        let normalized = inputs.mapv(|v| (v - mean) / std);
        &normalized * &self.gamma + &self.beta
    }
}

impl Regularizer for BatchNorm {
    fn apply_forward(&mut self, inputs: &Array1<f64>, training: bool) -> Array1<f64> {
        debug_assert_eq!(inputs.len(), self.features);

        if training {
            let n = inputs.len() as f64;
            let mean = inputs.sum() / n;
            let var = inputs.mapv(|v| (v - mean).powi(2)).sum() / n;

            self.running_mean = self.momentum * self.running_mean + (1.0 - self.momentum) * mean;
            self.running_var = self.momentum * self.running_var + (1.0 - self.momentum) * var;

            self.normalize(inputs, mean, var)
        } else {
            self.normalize(inputs, self.running_mean, self.running_var)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_rejects_invalid_parameters() {
        assert!(BatchNorm::new(0, 0.9, 1e-5).is_err());
        assert!(BatchNorm::new(3, 1.5, 1e-5).is_err());
        assert!(BatchNorm::new(3, 0.9, 0.0).is_err());
    }

    #[test]
    fn test_training_normalizes_to_zero_mean_unit_var() {
        let mut bn = BatchNorm::with_defaults(4).unwrap();
        let out = bn.apply_forward(&array![1.0, 2.0, 3.0, 4.0], true);

        let mean = out.sum() / 4.0;
        let var = out.mapv(|v| (v - mean).powi(2)).sum() / 4.0;
        assert_relative_eq!(mean, 0.0, epsilon = 1e-10);
        assert_relative_eq!(var, 1.0, epsilon = 1e-3);
    }

    #[test]
    fn test_running_statistics_follow_ema() {
        let mut bn = BatchNorm::new(2, 0.5, 1e-5).unwrap();
        bn.apply_forward(&array![2.0, 4.0], true);

        // batch mean 3.0, batch var 1.0:
        // running_mean = 0.5 * 0 + 0.5 * 3 = 1.5
        // running_var  = 0.5 * 1 + 0.5 * 1 = 1.0
        assert_relative_eq!(bn.running_mean(), 1.5, epsilon = 1e-12);
        assert_relative_eq!(bn.running_var(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_inference_uses_running_statistics() {
        let mut bn = BatchNorm::new(2, 0.0, 1e-5).unwrap();
        // momentum 0 makes running stats adopt the batch stats directly
        bn.apply_forward(&array![10.0, 20.0], true);

        // Inference input with very different batch statistics must still be
        // normalized with the stored running mean/var (15, 25).
        let out = bn.apply_forward(&array![15.0, 15.0], false);
        let expected = (15.0 - 15.0) / (25.0_f64 + 1e-5).sqrt();
        assert_relative_eq!(out[0], expected, epsilon = 1e-10);
        assert_relative_eq!(out[1], expected, epsilon = 1e-10);
    }

    #[test]
    fn test_gamma_beta_scale_and_shift() {
        let mut bn = BatchNorm::with_defaults(2).unwrap();
        bn.gamma = array![2.0, 2.0];
        bn.beta = array![1.0, 1.0];

        let out = bn.apply_forward(&array![-1.0, 1.0], true);
        // normalized is roughly [-1, 1]; scaled/shifted to about [-1, 3]
        assert!(out[0] < 0.0);
        assert!(out[1] > 2.0);
    }
}
