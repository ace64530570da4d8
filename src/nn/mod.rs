//! Neural Network Module
//!
//! Building blocks for feedforward backpropagation networks:
//! - Activation functions with output-based derivatives
//! - Weight initialization strategies
//! - Pluggable optimizers with per-layer state
//! - The network itself plus its builder

mod activation;
mod builder;
mod initializer;
mod network;
mod optimizer;

pub use activation::{
    create_activation, Activation, ActivationType, CustomActivation, LeakyReLU, Linear, ReLU,
    Sigmoid, Tanh,
};
pub use builder::NetworkBuilder;
pub use initializer::{
    create_initializer, CustomInitializer, Fixed, He, InitializerType, RandomUniform,
    WeightInitializer, Xavier,
};
pub use network::{Network, NetworkState};
pub use optimizer::{
    create_optimizer, AdaGrad, Adam, GradientDescent, MomentumOptimizer, Optimizer, OptimizerType,
};
