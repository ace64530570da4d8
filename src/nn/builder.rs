//! Network construction
//!
//! The builder composes a validator check, a weight initializer, an
//! activation function and an optional optimizer into a [`Network`]. All
//! strategies are fixed at build time; in particular the optimizer cannot be
//! swapped on a live network.

use crate::error::{NetworkError, Result};
use crate::nn::activation::{Activation, Sigmoid};
use crate::nn::initializer::{RandomUniform, WeightInitializer};
use crate::nn::network::Network;
use crate::nn::optimizer::Optimizer;
use crate::validation::validate_structure;

/// Builder for [`Network`] instances.
///
/// Defaults: random uniform weights in [-1, 1), sigmoid activation, no
/// optimizer (the network's own momentum rule applies), learning rate 0.25,
/// momentum 0.1, bias enabled.
pub struct NetworkBuilder {
    structure: Vec<usize>,
    initializer: Box<dyn WeightInitializer>,
    activation: Box<dyn Activation>,
    optimizer: Option<Box<dyn Optimizer>>,
    learning_rate: f64,
    momentum: f64,
    disable_bias: bool,
}

impl NetworkBuilder {
    pub fn new(structure: &[usize]) -> Self {
        Self {
            structure: structure.to_vec(),
            initializer: Box::new(RandomUniform::default()),
            activation: Box::new(Sigmoid),
            optimizer: None,
            learning_rate: 0.25,
            momentum: 0.1,
            disable_bias: false,
        }
    }

    pub fn weight_initializer(mut self, initializer: Box<dyn WeightInitializer>) -> Self {
        self.initializer = initializer;
        self
    }

    pub fn activation(mut self, activation: Box<dyn Activation>) -> Self {
        self.activation = activation;
        self
    }

    /// Attach a pluggable learning algorithm; replaces the built-in momentum
    /// update for every layer.
    pub fn optimizer(mut self, optimizer: Box<dyn Optimizer>) -> Self {
        self.optimizer = Some(optimizer);
        self
    }

    pub fn learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn momentum(mut self, momentum: f64) -> Self {
        self.momentum = momentum;
        self
    }

    /// Drop the constant-1 bias node from every layer
    pub fn disable_bias(mut self) -> Self {
        self.disable_bias = true;
        self
    }

    pub fn build(self) -> Result<Network> {
        validate_structure(&self.structure)?;
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(NetworkError::InvalidParameter {
                name: "learning_rate",
                value: self.learning_rate,
            });
        }
        if !self.momentum.is_finite() || self.momentum < 0.0 {
            return Err(NetworkError::InvalidParameter {
                name: "momentum",
                value: self.momentum,
            });
        }

        Ok(Network::new(
            self.structure,
            self.learning_rate,
            self.momentum,
            self.disable_bias,
            self.activation,
            self.initializer,
            self.optimizer,
        ))
    }
}
