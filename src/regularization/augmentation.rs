//! Input data augmentation
//!
//! Applies configured random transforms to raw input vectors during
//! training: additive Gaussian noise, a uniform scale factor, and a uniform
//! shift. Evaluation inputs are never augmented.

use ndarray::Array1;
use rand::Rng;
use rand_distr::Normal;

use crate::error::{NetworkError, Result};
use crate::regularization::Regularizer;

/// Randomized input transforms, training-time only
#[derive(Default)]
pub struct DataAugmentation {
    noise_std: Option<f64>,
    scale_range: Option<(f64, f64)>,
    shift_range: Option<(f64, f64)>,
}

impl DataAugmentation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add zero-mean Gaussian noise with the given standard deviation
    pub fn with_noise(mut self, std: f64) -> Result<Self> {
        if !std.is_finite() || std < 0.0 {
            return Err(NetworkError::InvalidParameter {
                name: "noise_std",
                value: std,
            });
        }
        self.noise_std = Some(std);
        Ok(self)
    }

    /// Multiply the whole vector by a factor drawn uniformly from the range
    pub fn with_scale(mut self, low: f64, high: f64) -> Result<Self> {
        if !(low.is_finite() && high.is_finite()) || low > high {
            return Err(NetworkError::InvalidParameter {
                name: "scale_range",
                value: low,
            });
        }
        self.scale_range = Some((low, high));
        Ok(self)
    }

    /// Add an offset drawn uniformly from the range to every element
    pub fn with_shift(mut self, low: f64, high: f64) -> Result<Self> {
        if !(low.is_finite() && high.is_finite()) || low > high {
            return Err(NetworkError::InvalidParameter {
                name: "shift_range",
                value: low,
            });
        }
        self.shift_range = Some((low, high));
        Ok(self)
    }
}

impl Regularizer for DataAugmentation {
    fn apply_forward(&mut self, inputs: &Array1<f64>, training: bool) -> Array1<f64> {
        if !training {
            return inputs.clone();
        }

        let mut rng = rand::thread_rng();
        let mut output = inputs.clone();

        if let Some(std) = self.noise_std {
            if std > 0.0 {
                let normal = Normal::new(0.0, std).unwrap();
                output = output.mapv(|v| v + rng.sample(normal));
            }
        }
        if let Some((low, high)) = self.scale_range {
            let factor = if low < high { rng.gen_range(low..high) } else { low };
            output *= factor;
        }
        if let Some((low, high)) = self.shift_range {
            let offset = if low < high { rng.gen_range(low..high) } else { low };
            output += offset;
        }

        output
    }
}
