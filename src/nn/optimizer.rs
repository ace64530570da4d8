//! Optimization Algorithms
//!
//! Pluggable weight-update rules used in place of the network's built-in
//! momentum update:
//! - Gradient Descent
//! - Momentum
//! - AdaGrad
//! - Adam (Adaptive Moment Estimation)
//!
//! A single optimizer instance serves every layer of one network; state is
//! kept per layer, keyed by the integer layer index. The iteration counter
//! advances once per `update_weights` call, so with a multi-layer network it
//! ticks once per layer per training example.

use std::collections::HashMap;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Types of built-in optimizers
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum OptimizerType {
    GradientDescent,
    Momentum,
    AdaGrad,
    Adam,
}

/// Optimizer trait for per-layer weight updates
pub trait Optimizer {
    /// Apply one update and return the new weights for the layer
    fn update_weights(
        &mut self,
        weights: &Array2<f64>,
        gradients: &Array2<f64>,
        layer: usize,
    ) -> Array2<f64>;

    /// Clear the iteration counter and all per-layer state
    fn reset(&mut self);

    /// Number of `update_weights` calls since construction or last reset
    fn iteration_count(&self) -> usize;
}

/// Plain stochastic gradient descent: w -= lr * g
pub struct GradientDescent {
    pub learning_rate: f64,
    iterations: usize,
}

impl GradientDescent {
    pub fn new(learning_rate: f64) -> Self {
        Self {
            learning_rate,
            iterations: 0,
        }
    }
}

impl Optimizer for GradientDescent {
    fn update_weights(
        &mut self,
        weights: &Array2<f64>,
        gradients: &Array2<f64>,
        _layer: usize,
    ) -> Array2<f64> {
        self.iterations += 1;
        weights - &(gradients * self.learning_rate)
    }

    fn reset(&mut self) {
        self.iterations = 0;
    }

    fn iteration_count(&self) -> usize {
        self.iterations
    }
}

/// Gradient descent with velocity: v = beta * v + lr * g; w -= v
pub struct MomentumOptimizer {
    pub learning_rate: f64,
    pub beta: f64,
    iterations: usize,
    velocity: HashMap<usize, Array2<f64>>,
}

impl MomentumOptimizer {
    pub fn new(learning_rate: f64) -> Self {
        Self {
            learning_rate,
            beta: 0.9,
            iterations: 0,
            velocity: HashMap::new(),
        }
    }

    pub fn with_beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }
}

impl Optimizer for MomentumOptimizer {
    fn update_weights(
        &mut self,
        weights: &Array2<f64>,
        gradients: &Array2<f64>,
        layer: usize,
    ) -> Array2<f64> {
        self.iterations += 1;

        let v = self
            .velocity
            .entry(layer)
            .or_insert_with(|| Array2::zeros(weights.dim()));
        *v = &*v * self.beta + &(gradients * self.learning_rate);

        weights - &*v
    }

    fn reset(&mut self) {
        self.iterations = 0;
        self.velocity.clear();
    }

    fn iteration_count(&self) -> usize {
        self.iterations
    }
}

/// AdaGrad: per-weight learning rates from accumulated squared gradients
pub struct AdaGrad {
    pub learning_rate: f64,
    pub epsilon: f64,
    iterations: usize,
    accumulated: HashMap<usize, Array2<f64>>,
}

impl AdaGrad {
    pub fn new(learning_rate: f64) -> Self {
        Self {
            learning_rate,
            epsilon: 1e-8,
            iterations: 0,
            accumulated: HashMap::new(),
        }
    }
}

impl Optimizer for AdaGrad {
    fn update_weights(
        &mut self,
        weights: &Array2<f64>,
        gradients: &Array2<f64>,
        layer: usize,
    ) -> Array2<f64> {
        self.iterations += 1;

        let acc = self
            .accumulated
            .entry(layer)
            .or_insert_with(|| Array2::zeros(weights.dim()));
        *acc = &*acc + &(gradients * gradients);

        let scaled = gradients * self.learning_rate / (acc.mapv(f64::sqrt) + self.epsilon);
        weights - &scaled
    }

    fn reset(&mut self) {
        self.iterations = 0;
        self.accumulated.clear();
    }

    fn iteration_count(&self) -> usize {
        self.iterations
    }
}

/// Adam optimizer with bias-corrected first and second moment estimates
pub struct Adam {
    pub learning_rate: f64,
    pub beta1: f64,
    pub beta2: f64,
    pub epsilon: f64,
    iterations: usize,
    moments: HashMap<usize, (Array2<f64>, Array2<f64>)>,
}

impl Adam {
    pub fn new(learning_rate: f64) -> Self {
        Self {
            learning_rate,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
            iterations: 0,
            moments: HashMap::new(),
        }
    }

    pub fn with_betas(mut self, beta1: f64, beta2: f64) -> Self {
        self.beta1 = beta1;
        self.beta2 = beta2;
        self
    }
}

impl Optimizer for Adam {
    fn update_weights(
        &mut self,
        weights: &Array2<f64>,
        gradients: &Array2<f64>,
        layer: usize,
    ) -> Array2<f64> {
        self.iterations += 1;
        let t = self.iterations as i32;

        let (m, v) = self
            .moments
            .entry(layer)
            .or_insert_with(|| (Array2::zeros(weights.dim()), Array2::zeros(weights.dim())));

        // Biased moment estimates
        *m = &*m * self.beta1 + &(gradients * (1.0 - self.beta1));
        *v = &*v * self.beta2 + &(gradients * gradients * (1.0 - self.beta2));

        // Bias correction counteracts the zero initialization of m and v
        let m_hat = &*m / (1.0 - self.beta1.powi(t));
        let v_hat = &*v / (1.0 - self.beta2.powi(t));

        weights - &(&m_hat * self.learning_rate / &(v_hat.mapv(f64::sqrt) + self.epsilon))
    }

    fn reset(&mut self) {
        self.iterations = 0;
        self.moments.clear();
    }

    fn iteration_count(&self) -> usize {
        self.iterations
    }
}

/// Create a built-in optimizer from its type tag
pub fn create_optimizer(optimizer_type: OptimizerType, learning_rate: f64) -> Box<dyn Optimizer> {
    match optimizer_type {
        OptimizerType::GradientDescent => Box::new(GradientDescent::new(learning_rate)),
        OptimizerType::Momentum => Box::new(MomentumOptimizer::new(learning_rate)),
        OptimizerType::AdaGrad => Box::new(AdaGrad::new(learning_rate)),
        OptimizerType::Adam => Box::new(Adam::new(learning_rate)),
    }
}
