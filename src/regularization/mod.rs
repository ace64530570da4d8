//! Regularization Techniques
//!
//! Composable wrappers around the network's forward/backward signals plus
//! weight-penalty terms:
//! - Dropout (inverted, with a cached mask)
//! - L1 / L2 / ElasticNet penalties
//! - Batch normalization with running statistics
//! - Early stopping
//! - Input data augmentation
//!
//! Techniques are combined through [`RegularizationPipeline`], which applies
//! them in registration order on the forward path and in reverse order on
//! the backward path.

mod augmentation;
mod batch_norm;
mod dropout;
mod early_stopping;
mod penalty;

pub use augmentation::DataAugmentation;
pub use batch_norm::BatchNorm;
pub use dropout::Dropout;
pub use early_stopping::EarlyStopping;
pub use penalty::{ElasticNet, L1, L2};

use ndarray::{Array1, Array2};

/// A single regularization technique.
///
/// Signal-shaping techniques (dropout, batch norm, augmentation) override
/// `apply_forward`/`apply_backward`; weight-penalty techniques (L1, L2,
/// elastic net) override `penalty`/`penalty_gradient` and leave the signal
/// path untouched.
pub trait Regularizer {
    /// Transform a layer input; `training` distinguishes train and inference
    fn apply_forward(&mut self, inputs: &Array1<f64>, training: bool) -> Array1<f64> {
        let _ = training;
        inputs.clone()
    }

    /// Transform a backpropagated gradient vector
    fn apply_backward(&mut self, gradients: &Array1<f64>) -> Array1<f64> {
        gradients.clone()
    }

    /// Scalar penalty added to the reported loss
    fn penalty(&self, weights: &[Array2<f64>]) -> f64 {
        let _ = weights;
        0.0
    }

    /// Per-matrix gradient contribution of the penalty term
    fn penalty_gradient(&self, weights: &Array2<f64>) -> Array2<f64> {
        Array2::zeros(weights.dim())
    }
}

/// Ordered composition of regularization techniques
#[derive(Default)]
pub struct RegularizationPipeline {
    techniques: Vec<Box<dyn Regularizer>>,
}

impl RegularizationPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a technique; forward order follows registration order
    pub fn add(mut self, technique: Box<dyn Regularizer>) -> Self {
        self.techniques.push(technique);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.techniques.is_empty()
    }

    /// Apply every technique in registration order
    pub fn apply_forward(&mut self, inputs: &Array1<f64>, training: bool) -> Array1<f64> {
        let mut current = inputs.clone();
        for technique in self.techniques.iter_mut() {
            current = technique.apply_forward(&current, training);
        }
        current
    }

    /// Apply every technique in reverse registration order
    pub fn apply_backward(&mut self, gradients: &Array1<f64>) -> Array1<f64> {
        let mut current = gradients.clone();
        for technique in self.techniques.iter_mut().rev() {
            current = technique.apply_backward(&current);
        }
        current
    }

    /// Sum of all technique penalties
    pub fn penalty(&self, weights: &[Array2<f64>]) -> f64 {
        self.techniques.iter().map(|t| t.penalty(weights)).sum()
    }

    /// Combined penalty gradient of all techniques for one weight matrix
    pub fn penalty_gradient(&self, weights: &Array2<f64>) -> Array2<f64> {
        let mut total = Array2::zeros(weights.dim());
        for technique in &self.techniques {
            total = total + technique.penalty_gradient(weights);
        }
        total
    }
}
