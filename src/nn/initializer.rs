//! Weight Initialization Strategies
//!
//! Each strategy produces a full weight matrix for one layer transition.
//! Matrix rows correspond to source nodes (including the bias node when
//! enabled), columns to destination neurons.

use ndarray::Array2;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::Rng;
use rand_distr::Normal;
use serde::{Deserialize, Serialize};

/// Types of built-in weight initializers
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum InitializerType {
    /// Uniform draw over [-1, 1)
    Random,
    /// Xavier/Glorot: uniform over ±sqrt(6 / (fan_in + fan_out))
    Xavier,
    /// He/Kaiming: normal(0, sqrt(2 / fan_in))
    He,
}

/// Strategy producing the initial weight matrix for one layer transition
pub trait WeightInitializer: Send + Sync {
    /// Build a `from_size` x `to_size` matrix for the given layer index
    fn initialize(&self, from_size: usize, to_size: usize, layer: usize) -> Array2<f64>;
}

/// Uniform random initialization over a configurable half-open range
pub struct RandomUniform {
    pub low: f64,
    pub high: f64,
}

impl Default for RandomUniform {
    fn default() -> Self {
        Self {
            low: -1.0,
            high: 1.0,
        }
    }
}

impl WeightInitializer for RandomUniform {
    fn initialize(&self, from_size: usize, to_size: usize, _layer: usize) -> Array2<f64> {
        Array2::random((from_size, to_size), Uniform::new(self.low, self.high))
    }
}

/// Xavier/Glorot initialization, suited to sigmoid and tanh activations
pub struct Xavier;

impl WeightInitializer for Xavier {
    fn initialize(&self, from_size: usize, to_size: usize, _layer: usize) -> Array2<f64> {
        let limit = (6.0 / (from_size + to_size) as f64).sqrt();
        Array2::random((from_size, to_size), Uniform::new(-limit, limit))
    }
}

/// He/Kaiming initialization, suited to ReLU-family activations
pub struct He;

impl WeightInitializer for He {
    fn initialize(&self, from_size: usize, to_size: usize, _layer: usize) -> Array2<f64> {
        let mut rng = rand::thread_rng();
        let std = (2.0 / from_size as f64).sqrt();
        // std is positive for any non-empty layer, so the distribution is valid
        let normal = Normal::new(0.0, std).unwrap();
        Array2::from_shape_fn((from_size, to_size), |_| rng.sample(normal))
    }
}

/// Constant initialization, used for deterministic tests
pub struct Fixed(pub f64);

impl WeightInitializer for Fixed {
    fn initialize(&self, from_size: usize, to_size: usize, _layer: usize) -> Array2<f64> {
        Array2::from_elem((from_size, to_size), self.0)
    }
}

/// User-supplied initialization from a `(layer, row, col) -> weight` function
pub struct CustomInitializer {
    f: Box<dyn Fn(usize, usize, usize) -> f64 + Send + Sync>,
}

impl CustomInitializer {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(usize, usize, usize) -> f64 + Send + Sync + 'static,
    {
        Self { f: Box::new(f) }
    }
}

impl WeightInitializer for CustomInitializer {
    fn initialize(&self, from_size: usize, to_size: usize, layer: usize) -> Array2<f64> {
        Array2::from_shape_fn((from_size, to_size), |(i, j)| (self.f)(layer, i, j))
    }
}

/// Create a built-in initializer from its type tag
pub fn create_initializer(initializer_type: InitializerType) -> Box<dyn WeightInitializer> {
    match initializer_type {
        InitializerType::Random => Box::new(RandomUniform::default()),
        InitializerType::Xavier => Box::new(Xavier),
        InitializerType::He => Box::new(He),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_range() {
        let init = RandomUniform::default();
        let w = init.initialize(10, 8, 0);
        assert_eq!(w.dim(), (10, 8));
        assert!(w.iter().all(|&v| (-1.0..1.0).contains(&v)));
    }

    #[test]
    fn test_xavier_limit() {
        let init = Xavier;
        let w = init.initialize(6, 6, 0);
        let limit = (6.0 / 12.0_f64).sqrt();
        assert!(w.iter().all(|&v| v.abs() <= limit));
    }

    #[test]
    fn test_he_spread() {
        let init = He;
        let w = init.initialize(200, 50, 0);
        // Sample standard deviation should land near sqrt(2 / 200) = 0.1
        let mean = w.mean().unwrap();
        let var = w.mapv(|v| (v - mean).powi(2)).mean().unwrap();
        assert!((var.sqrt() - 0.1).abs() < 0.02);
    }

    #[test]
    fn test_fixed() {
        let init = Fixed(0.5);
        let w = init.initialize(3, 2, 1);
        assert!(w.iter().all(|&v| v == 0.5));
    }

    #[test]
    fn test_factory_covers_builtins() {
        for t in [
            InitializerType::Random,
            InitializerType::Xavier,
            InitializerType::He,
        ] {
            let w = create_initializer(t).initialize(4, 3, 0);
            assert_eq!(w.dim(), (4, 3));
        }
    }

    #[test]
    fn test_custom_receives_indices() {
        let init = CustomInitializer::new(|layer, i, j| (layer * 100 + i * 10 + j) as f64);
        let w = init.initialize(2, 3, 1);
        assert_eq!(w[[0, 0]], 100.0);
        assert_eq!(w[[1, 2]], 112.0);
    }
}
