//! Inverted dropout
//!
//! During training each element survives with probability `1 - rate` and is
//! scaled by `1 / (1 - rate)` so the expected activation is unchanged. The
//! mask drawn on the forward pass is cached and consumed by the matching
//! backward call; it is never regenerated between the two.

use ndarray::{Array1, Array2};
use rand::Rng;

use crate::error::{NetworkError, Result};
use crate::regularization::Regularizer;

/// Dropout with a cached per-pass mask
pub struct Dropout {
    rate: f64,
    mask: Option<Array1<f64>>,
}

impl Dropout {
    /// `rate` is the drop probability, valid in [0, 1)
    pub fn new(rate: f64) -> Result<Self> {
        if !rate.is_finite() || !(0.0..1.0).contains(&rate) {
            return Err(NetworkError::InvalidParameter {
                name: "dropout_rate",
                value: rate,
            });
        }
        Ok(Self { rate, mask: None })
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }
}

impl Regularizer for Dropout {
    fn apply_forward(&mut self, inputs: &Array1<f64>, training: bool) -> Array1<f64> {
        if !training || self.rate == 0.0 {
            return inputs.clone();
        }

        let mut rng = rand::thread_rng();
        let keep_scale = 1.0 / (1.0 - self.rate);
        let mask = Array1::from_shape_fn(inputs.len(), |_| {
            if rng.gen::<f64>() >= self.rate {
                keep_scale
            } else {
                0.0
            }
        });

        let output = inputs * &mask;
        self.mask = Some(mask);
        output
    }

    fn apply_backward(&mut self, gradients: &Array1<f64>) -> Array1<f64> {
        // The mask is valid for exactly one forward/backward pair
        match self.mask.take() {
            Some(mask) => gradients * &mask,
            None => gradients.clone(),
        }
    }

    fn penalty(&self, _weights: &[Array2<f64>]) -> f64 {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array1;

    #[test]
    fn test_rejects_invalid_rate() {
        assert!(Dropout::new(1.0).is_err());
        assert!(Dropout::new(-0.1).is_err());
        assert!(Dropout::new(f64::NAN).is_err());
        assert!(Dropout::new(0.0).is_ok());
    }

    #[test]
    fn test_inference_passes_through() {
        let mut dropout = Dropout::new(0.5).unwrap();
        let inputs = Array1::linspace(0.0, 1.0, 10);
        assert_eq!(dropout.apply_forward(&inputs, false), inputs);
    }

    #[test]
    fn test_mask_values_are_zero_or_scaled() {
        let mut dropout = Dropout::new(0.25).unwrap();
        let inputs = Array1::ones(100);
        let out = dropout.apply_forward(&inputs, true);
        let scale = 1.0 / 0.75;
        assert!(out.iter().all(|&v| v == 0.0 || (v - scale).abs() < 1e-12));
    }

    #[test]
    fn test_backward_reuses_forward_mask() {
        let mut dropout = Dropout::new(0.5).unwrap();
        let inputs = Array1::ones(200);

        // With all-ones signals both calls return the mask itself, so the
        // outputs must be identical element for element.
        let forwarded = dropout.apply_forward(&inputs, true);
        let backwarded = dropout.apply_backward(&inputs);
        assert_eq!(forwarded, backwarded);
    }

    #[test]
    fn test_mask_consumed_after_backward() {
        let mut dropout = Dropout::new(0.5).unwrap();
        let inputs = Array1::ones(10);
        dropout.apply_forward(&inputs, true);
        dropout.apply_backward(&inputs);

        // Without a fresh forward pass, backward is a pass-through
        assert_eq!(dropout.apply_backward(&inputs), inputs);
    }
}
