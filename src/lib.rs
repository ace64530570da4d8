//! # Feedforward Backpropagation Training Engine
//!
//! This library provides a modular feedforward neural network trained by
//! backpropagation, built from injectable strategies: weight initializers,
//! activation functions, optimizers and regularization techniques, with a
//! training-loop coordinator on top.
//!
//! ## Modules
//!
//! - `nn` - Network, builder, activations, initializers, optimizers
//! - `regularization` - Dropout, L1/L2/ElasticNet, batch norm, early
//!   stopping, data augmentation and their composition pipeline
//! - `training` - Trainer, epoch loop, validation split, metrics
//! - `validation` - Structure/vector/record validation
//! - `error` - Error taxonomy
//!
//! ## Example
//!
//! ```
//! use ndarray::array;
//! use rust_backprop::nn::NetworkBuilder;
//!
//! let mut network = NetworkBuilder::new(&[2, 3, 1])
//!     .learning_rate(0.5)
//!     .build()
//!     .unwrap();
//!
//! let error = network.train(&array![0.0, 1.0], &array![1.0]).unwrap();
//! assert!(error.is_finite());
//! ```

pub mod error;
pub mod nn;
pub mod regularization;
pub mod training;
pub mod validation;

pub use error::{NetworkError, Result};
pub use nn::{Network, NetworkBuilder, NetworkState};
pub use regularization::RegularizationPipeline;
pub use training::{Trainer, TrainerConfig, TrainingRecord};
