//! Activation Functions
//!
//! Implements common activation functions and their derivatives for use in
//! backpropagation. Derivatives are expressed in terms of the forward
//! *output* rather than the pre-activation input, which lets the backward
//! pass reuse stored activation values. This is exact for Sigmoid/Tanh and
//! equivalent for ReLU/LeakyReLU since they preserve sign.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Types of activation functions available
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum ActivationType {
    /// Sigmoid: 1 / (1 + exp(-x))
    Sigmoid,
    /// Hyperbolic tangent
    Tanh,
    /// Rectified Linear Unit: max(0, x)
    ReLU,
    /// Leaky ReLU: x if x > 0, else alpha * x
    LeakyReLU,
    /// Linear (identity): x
    Linear,
}

/// Activation function trait with a forward map and an output-based derivative
pub trait Activation: Send + Sync {
    /// Apply the activation function to a pre-activation value
    fn forward(&self, x: f64) -> f64;

    /// Derivative dy/dx expressed in terms of the forward output `y`
    fn derivative(&self, y: f64) -> f64;

    /// Apply the activation element-wise
    fn activate(&self, x: &Array1<f64>) -> Array1<f64> {
        x.mapv(|v| self.forward(v))
    }
}

/// Sigmoid activation function
pub struct Sigmoid;

impl Activation for Sigmoid {
    fn forward(&self, x: f64) -> f64 {
        1.0 / (1.0 + (-x).exp())
    }

    fn derivative(&self, y: f64) -> f64 {
        y * (1.0 - y)
    }
}

/// Tanh activation function
pub struct Tanh;

impl Activation for Tanh {
    fn forward(&self, x: f64) -> f64 {
        x.tanh()
    }

    fn derivative(&self, y: f64) -> f64 {
        1.0 - y * y
    }
}

/// ReLU activation function
pub struct ReLU;

impl Activation for ReLU {
    fn forward(&self, x: f64) -> f64 {
        x.max(0.0)
    }

    fn derivative(&self, y: f64) -> f64 {
        if y > 0.0 {
            1.0
        } else {
            0.0
        }
    }
}

/// Leaky ReLU activation function
pub struct LeakyReLU {
    pub alpha: f64,
}

impl Default for LeakyReLU {
    fn default() -> Self {
        Self { alpha: 0.01 }
    }
}

impl Activation for LeakyReLU {
    fn forward(&self, x: f64) -> f64 {
        if x > 0.0 {
            x
        } else {
            self.alpha * x
        }
    }

    fn derivative(&self, y: f64) -> f64 {
        if y > 0.0 {
            1.0
        } else {
            self.alpha
        }
    }
}

/// Linear (identity) activation function
pub struct Linear;

impl Activation for Linear {
    fn forward(&self, x: f64) -> f64 {
        x
    }

    fn derivative(&self, _y: f64) -> f64 {
        1.0
    }
}

/// User-supplied activation built from a forward/derivative closure pair
pub struct CustomActivation {
    forward: Box<dyn Fn(f64) -> f64 + Send + Sync>,
    derivative: Box<dyn Fn(f64) -> f64 + Send + Sync>,
}

impl CustomActivation {
    pub fn new<F, D>(forward: F, derivative: D) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
        D: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        Self {
            forward: Box::new(forward),
            derivative: Box::new(derivative),
        }
    }
}

impl Activation for CustomActivation {
    fn forward(&self, x: f64) -> f64 {
        (self.forward)(x)
    }

    fn derivative(&self, y: f64) -> f64 {
        (self.derivative)(y)
    }
}

/// Create an activation function from its type tag
pub fn create_activation(activation_type: ActivationType) -> Box<dyn Activation> {
    match activation_type {
        ActivationType::Sigmoid => Box::new(Sigmoid),
        ActivationType::Tanh => Box::new(Tanh),
        ActivationType::ReLU => Box::new(ReLU),
        ActivationType::LeakyReLU => Box::new(LeakyReLU::default()),
        ActivationType::Linear => Box::new(Linear),
    }
}
