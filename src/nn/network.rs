//! Feedforward Network with Backpropagation
//!
//! The network owns per-layer activation nodes and the weight matrices
//! between layers. Every non-output layer carries a constant-1 bias node
//! (unless bias is disabled); the bias node has its own trainable weight row,
//! so `weights[l]` has one row per activation node of layer `l` (bias
//! included) and one column per neuron of layer `l + 1`.
//!
//! Weight matrices are created lazily on the first `eval`/`train` call, or
//! explicitly through [`Network::init_network`].

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::{NetworkError, Result};
use crate::nn::activation::Activation;
use crate::nn::initializer::WeightInitializer;
use crate::nn::optimizer::Optimizer;
use crate::validation::validate_vector;

/// Deep-copied view of a network's trainable state, consumed by external
/// visualization and reporting tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkState {
    pub structure: Vec<usize>,
    pub weights: Vec<Array2<f64>>,
    pub activation_nodes: Vec<Array1<f64>>,
    pub learning_rate: f64,
    pub momentum: f64,
    pub disable_bias: bool,
}

/// Feedforward neural network trained by backpropagation
pub struct Network {
    structure: Vec<usize>,
    learning_rate: f64,
    momentum: f64,
    disable_bias: bool,
    activation: Box<dyn Activation>,
    initializer: Box<dyn WeightInitializer>,
    optimizer: Option<Box<dyn Optimizer>>,
    activation_nodes: Vec<Array1<f64>>,
    weights: Vec<Array2<f64>>,
    last_changes: Vec<Array2<f64>>,
    input_gradient: Option<Array1<f64>>,
    initialized: bool,
}

impl Network {
    pub(crate) fn new(
        structure: Vec<usize>,
        learning_rate: f64,
        momentum: f64,
        disable_bias: bool,
        activation: Box<dyn Activation>,
        initializer: Box<dyn WeightInitializer>,
        optimizer: Option<Box<dyn Optimizer>>,
    ) -> Self {
        Self {
            structure,
            learning_rate,
            momentum,
            disable_bias,
            activation,
            initializer,
            optimizer,
            activation_nodes: Vec::new(),
            weights: Vec::new(),
            last_changes: Vec::new(),
            input_gradient: None,
            initialized: false,
        }
    }

    /// Layer sizes as configured, without bias nodes
    pub fn structure(&self) -> &[usize] {
        &self.structure
    }

    /// Size of the input layer
    pub fn input_size(&self) -> usize {
        self.structure[0]
    }

    /// Size of the output layer
    pub fn output_size(&self) -> usize {
        self.structure[self.structure.len() - 1]
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn momentum(&self) -> f64 {
        self.momentum
    }

    /// Number of activation nodes in a layer, bias node included
    fn layer_nodes(&self, layer: usize) -> usize {
        let last = self.structure.len() - 1;
        if layer == last || self.disable_bias {
            self.structure[layer]
        } else {
            self.structure[layer] + 1
        }
    }

    /// (Re)create activation nodes, weight matrices and momentum state.
    ///
    /// Drops any previously learned weights. Called automatically by
    /// `eval`/`train` when the network has not been initialized yet.
    pub fn init_network(&mut self) {
        let layers = self.structure.len();

        self.activation_nodes = (0..layers)
            .map(|l| {
                let mut nodes = Array1::zeros(self.layer_nodes(l));
                if self.layer_nodes(l) > self.structure[l] {
                    nodes[self.structure[l]] = 1.0; // bias node
                }
                nodes
            })
            .collect();

        self.weights = (0..layers - 1)
            .map(|l| {
                self.initializer
                    .initialize(self.layer_nodes(l), self.structure[l + 1], l)
            })
            .collect();

        self.last_changes = self.weights.iter().map(|w| Array2::zeros(w.dim())).collect();

        if let Some(opt) = self.optimizer.as_mut() {
            opt.reset();
        }
        self.input_gradient = None;
        self.initialized = true;
    }

    /// Evaluate an input vector and return a copy of the output activations.
    pub fn eval(&mut self, input: &Array1<f64>) -> Result<Array1<f64>> {
        validate_vector(input, self.input_size())?;
        if !self.initialized {
            self.init_network();
        }
        self.feed_forward(input);
        Ok(self.output())
    }

    /// Run one forward/backward pass for a single example and return the
    /// squared error `0.5 * sum((expected - actual)^2)` measured before the
    /// weight update.
    pub fn train(&mut self, input: &Array1<f64>, expected: &Array1<f64>) -> Result<f64> {
        validate_vector(input, self.input_size())?;
        validate_vector(expected, self.output_size())?;
        if !self.initialized {
            self.init_network();
        }

        self.feed_forward(input);
        let error = self.calculate_error(expected);
        self.backpropagate(expected);
        Ok(error)
    }

    /// Squared error of the current output against an expected vector
    fn calculate_error(&self, expected: &Array1<f64>) -> f64 {
        let output = &self.activation_nodes[self.structure.len() - 1];
        0.5 * expected
            .iter()
            .zip(output.iter())
            .map(|(e, a)| (e - a).powi(2))
            .sum::<f64>()
    }

    fn feed_forward(&mut self, input: &Array1<f64>) {
        // Bias slot (if any) keeps its constant 1.0
        for (i, &v) in input.iter().enumerate() {
            self.activation_nodes[0][i] = v;
        }

        for l in 0..self.structure.len() - 1 {
            let z = self.activation_nodes[l].dot(&self.weights[l]);
            for j in 0..self.structure[l + 1] {
                self.activation_nodes[l + 1][j] = self.activation.forward(z[j]);
            }
        }
    }

    /// Backward pass: compute deltas layer by layer in reverse, then update
    /// the weights with either the attached optimizer or the built-in
    /// momentum rule.
    fn backpropagate(&mut self, expected: &Array1<f64>) {
        let deltas = self.calculate_deltas(expected);

        // Error signal at the input layer, captured before the weight update
        // so signal-shaping wrappers can close their forward/backward pair
        self.input_gradient = Some(Array1::from_shape_fn(self.structure[0], |i| {
            (0..self.structure[1])
                .map(|j| deltas[0][j] * self.weights[0][[i, j]])
                .sum()
        }));

        if self.optimizer.is_some() {
            self.update_with_optimizer(&deltas);
        } else {
            self.update_with_momentum(&deltas);
        }
    }

    /// Deltas for layers 1..N-1; `deltas[l - 1]` has `structure[l]` entries.
    ///
    /// Output layer: delta_j = (expected_j - actual_j) * f'(actual_j).
    /// Hidden layers: delta_i = sum_j(delta_j * w[l][i][j]) * f'(a[l][i]).
    fn calculate_deltas(&self, expected: &Array1<f64>) -> Vec<Array1<f64>> {
        let last = self.structure.len() - 1;
        let mut deltas = vec![Array1::zeros(0); last];

        let output = &self.activation_nodes[last];
        deltas[last - 1] = Array1::from_shape_fn(self.structure[last], |j| {
            (expected[j] - output[j]) * self.activation.derivative(output[j])
        });

        for l in (1..last).rev() {
            let layer_deltas = {
                let next = &deltas[l];
                Array1::from_shape_fn(self.structure[l], |i| {
                    let propagated: f64 = (0..self.structure[l + 1])
                        .map(|j| next[j] * self.weights[l][[i, j]])
                        .sum();
                    propagated * self.activation.derivative(self.activation_nodes[l][i])
                })
            };
            deltas[l - 1] = layer_deltas;
        }

        deltas
    }

    /// Built-in update: dw = lr * delta_j * a_i + momentum * last_change,
    /// with the applied change persisted for the next call.
    fn update_with_momentum(&mut self, deltas: &[Array1<f64>]) {
        for l in (0..self.weights.len()).rev() {
            let (rows, cols) = self.weights[l].dim();
            for i in 0..rows {
                for j in 0..cols {
                    let change = self.learning_rate * deltas[l][j] * self.activation_nodes[l][i]
                        + self.momentum * self.last_changes[l][[i, j]];
                    self.weights[l][[i, j]] += change;
                    self.last_changes[l][[i, j]] = change;
                }
            }
        }
    }

    /// Optimizer update path: gradients of the squared error are
    /// g[i][j] = -delta_j * a_i, handed to the optimizer one layer at a time.
    fn update_with_optimizer(&mut self, deltas: &[Array1<f64>]) {
        if let Some(optimizer) = self.optimizer.as_mut() {
            for l in (0..self.weights.len()).rev() {
                let nodes = &self.activation_nodes[l];
                let gradients =
                    Array2::from_shape_fn(self.weights[l].dim(), |(i, j)| -deltas[l][j] * nodes[i]);
                self.weights[l] = optimizer.update_weights(&self.weights[l], &gradients, l);
            }
        }
    }

    /// Copy of the output layer's activations
    fn output(&self) -> Array1<f64> {
        self.activation_nodes[self.structure.len() - 1].clone()
    }

    /// Deep-copied snapshot of the trainable state
    pub fn state(&self) -> Result<NetworkState> {
        if !self.initialized {
            return Err(NetworkError::NotInitialized);
        }
        Ok(NetworkState {
            structure: self.structure.clone(),
            weights: self.weights.clone(),
            activation_nodes: self.activation_nodes.clone(),
            learning_rate: self.learning_rate,
            momentum: self.momentum,
            disable_bias: self.disable_bias,
        })
    }

    /// Replace the weight matrices with externally captured ones.
    ///
    /// Shapes must match the configured structure exactly; momentum state is
    /// zeroed so training resumes cleanly from the restored weights.
    pub fn restore_weights(&mut self, weights: Vec<Array2<f64>>) -> Result<()> {
        if weights.len() != self.structure.len() - 1 {
            return Err(NetworkError::DimensionMismatch {
                expected: self.structure.len() - 1,
                got: weights.len(),
            });
        }
        for (l, w) in weights.iter().enumerate() {
            let expected = (self.layer_nodes(l), self.structure[l + 1]);
            if w.dim() != expected {
                return Err(NetworkError::DimensionMismatch {
                    expected: expected.0 * expected.1,
                    got: w.len(),
                });
            }
        }

        if !self.initialized {
            self.init_network();
        }
        self.last_changes = weights.iter().map(|w| Array2::zeros(w.dim())).collect();
        self.weights = weights;
        Ok(())
    }

    /// Borrow the current weight matrices (empty before initialization)
    pub fn weights(&self) -> &[Array2<f64>] {
        &self.weights
    }

    /// Backpropagated error signal at the input layer from the most recent
    /// `train` call, `None` before the first one
    pub fn input_gradient(&self) -> Option<&Array1<f64>> {
        self.input_gradient.as_ref()
    }

    /// Apply an extra learning-rate-scaled descent step to every weight
    /// matrix.
    ///
    /// `gradient_for` is called once per layer with the current weights and
    /// returns a same-shaped gradient. The trainer uses this to fold weight
    /// penalties (L1, L2, elastic net) into the update.
    pub fn apply_penalty_gradients<F>(&mut self, mut gradient_for: F)
    where
        F: FnMut(&Array2<f64>) -> Array2<f64>,
    {
        for w in self.weights.iter_mut() {
            let step = gradient_for(&*w) * self.learning_rate;
            *w -= &step;
        }
    }

    /// Total number of trainable weights
    pub fn num_parameters(&self) -> usize {
        self.weights.iter().map(|w| w.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nn::activation::{Linear, Sigmoid};
    use crate::nn::builder::NetworkBuilder;
    use crate::nn::initializer::Fixed;
    use crate::nn::optimizer::{Adam, GradientDescent};
    use approx::assert_relative_eq;
    use ndarray::array;

    fn fixed_linear(structure: &[usize]) -> Network {
        NetworkBuilder::new(structure)
            .weight_initializer(Box::new(Fixed(0.5)))
            .activation(Box::new(Linear))
            .disable_bias()
            .learning_rate(0.1)
            .build()
            .unwrap()
    }

    #[test]
    fn test_eval_rejects_wrong_input_size() {
        let mut net = fixed_linear(&[2, 1]);
        let err = net.eval(&array![1.0]).unwrap_err();
        assert!(matches!(err, NetworkError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_train_rejects_wrong_output_size() {
        let mut net = fixed_linear(&[2, 1]);
        let err = net.train(&array![1.0, 1.0], &array![1.0, 1.0]).unwrap_err();
        assert!(matches!(err, NetworkError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_eval_rejects_nan() {
        let mut net = fixed_linear(&[2, 1]);
        let err = net.eval(&array![f64::NAN, 0.0]).unwrap_err();
        assert!(matches!(err, NetworkError::NonFiniteValue { .. }));
    }

    #[test]
    fn test_deterministic_eval_with_fixed_weights() {
        // Fixed weights, linear activation, no bias: output = sum(input) * 0.5
        let mut net = fixed_linear(&[2, 1]);
        let input = array![1.0, 2.0];
        let first = net.eval(&input).unwrap();
        let second = net.eval(&input).unwrap();
        assert_eq!(first, second);
        assert_relative_eq!(first[0], 1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_output_is_a_copy() {
        let mut net = fixed_linear(&[2, 1]);
        let mut out = net.eval(&array![1.0, 1.0]).unwrap();
        out[0] = 99.0;
        assert_relative_eq!(net.eval(&array![1.0, 1.0]).unwrap()[0], 1.0);
    }

    #[test]
    fn test_bias_reflected_in_shapes() {
        let mut net = NetworkBuilder::new(&[2, 3, 1])
            .weight_initializer(Box::new(Fixed(0.1)))
            .build()
            .unwrap();
        net.init_network();
        let state = net.state().unwrap();

        // Non-output layers carry one extra bias node
        assert_eq!(state.activation_nodes[0].len(), 3);
        assert_eq!(state.activation_nodes[1].len(), 4);
        assert_eq!(state.activation_nodes[2].len(), 1);
        assert_eq!(state.weights[0].dim(), (3, 3));
        assert_eq!(state.weights[1].dim(), (4, 1));

        // Bias nodes hold a constant 1.0
        assert_eq!(state.activation_nodes[0][2], 1.0);
        assert_eq!(state.activation_nodes[1][3], 1.0);
    }

    #[test]
    fn test_single_train_step_reduces_error() {
        // structure [1, 1], linear, w = 0.5, input 1.0, target 2.0, lr 0.1:
        // error before = 0.5 * (2 - 0.5)^2 = 1.125
        let mut net = fixed_linear(&[1, 1]);
        let input = array![1.0];
        let target = array![2.0];

        let error_before = net.train(&input, &target).unwrap();
        assert_relative_eq!(error_before, 1.125, epsilon = 1e-12);

        // After dw = 0.1 * 1.5 * 1.0 the weight is 0.65
        let error_after = net.train(&input, &target).unwrap();
        assert!(error_after < error_before);
        assert_relative_eq!(error_after, 0.5 * (2.0 - 0.65_f64).powi(2), epsilon = 1e-12);
    }

    #[test]
    fn test_attached_gradient_descent_matches_builtin_step() {
        // Same setup as the built-in rule test. The optimizer receives
        // g = -delta * a = -1.5, so SGD at the same rate takes the identical
        // first step: w = 0.5 + 0.1 * 1.5 = 0.65.
        let mut net = NetworkBuilder::new(&[1, 1])
            .weight_initializer(Box::new(Fixed(0.5)))
            .activation(Box::new(Linear))
            .disable_bias()
            .optimizer(Box::new(GradientDescent::new(0.1)))
            .build()
            .unwrap();
        let input = array![1.0];
        let target = array![2.0];

        let error_before = net.train(&input, &target).unwrap();
        assert_relative_eq!(error_before, 1.125, epsilon = 1e-12);
        assert_relative_eq!(net.weights()[0][[0, 0]], 0.65, epsilon = 1e-12);

        let error_after = net.train(&input, &target).unwrap();
        assert!(error_after < error_before);
    }

    #[test]
    fn test_attached_adam_drives_error_down() {
        let mut net = NetworkBuilder::new(&[1, 1])
            .weight_initializer(Box::new(Fixed(0.5)))
            .activation(Box::new(Linear))
            .disable_bias()
            .optimizer(Box::new(Adam::new(0.1)))
            .build()
            .unwrap();
        let input = array![1.0];
        let target = array![2.0];

        let mut error = net.train(&input, &target).unwrap();
        for _ in 0..500 {
            error = net.train(&input, &target).unwrap();
        }
        assert!(error < 0.01);
    }

    #[test]
    fn test_momentum_reuses_last_change() {
        let mut net = NetworkBuilder::new(&[1, 1])
            .weight_initializer(Box::new(Fixed(0.5)))
            .activation(Box::new(Linear))
            .disable_bias()
            .learning_rate(0.1)
            .momentum(0.5)
            .build()
            .unwrap();
        let input = array![1.0];
        let target = array![2.0];

        net.train(&input, &target).unwrap();
        // First change: 0.1 * 1.5 = 0.15, weight 0.65.
        // Second: 0.1 * 1.35 + 0.5 * 0.15 = 0.21, weight 0.86.
        net.train(&input, &target).unwrap();
        let state = net.state().unwrap();
        assert_relative_eq!(state.weights[0][[0, 0]], 0.86, epsilon = 1e-12);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut original = NetworkBuilder::new(&[2, 3, 1])
            .activation(Box::new(Sigmoid))
            .build()
            .unwrap();
        original.init_network();
        let state = original.state().unwrap();

        let mut restored = NetworkBuilder::new(&[2, 3, 1])
            .activation(Box::new(Sigmoid))
            .build()
            .unwrap();
        restored.restore_weights(state.weights).unwrap();

        let input = array![0.3, -0.7];
        assert_eq!(
            original.eval(&input).unwrap(),
            restored.eval(&input).unwrap()
        );
    }

    #[test]
    fn test_restore_rejects_wrong_shape() {
        let mut net = fixed_linear(&[2, 1]);
        let err = net
            .restore_weights(vec![Array2::zeros((3, 1))])
            .unwrap_err();
        assert!(matches!(err, NetworkError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_state_requires_initialization() {
        let net = fixed_linear(&[2, 1]);
        assert!(matches!(net.state(), Err(NetworkError::NotInitialized)));
    }

    #[test]
    fn test_state_serializes_for_external_consumers() {
        let mut net = fixed_linear(&[2, 1]);
        net.init_network();
        let state = net.state().unwrap();

        let json = serde_json::to_string(&state).unwrap();
        let back: NetworkState = serde_json::from_str(&json).unwrap();
        assert_eq!(back.structure, state.structure);
        assert_eq!(back.weights, state.weights);
    }

    #[test]
    fn test_num_parameters() {
        let mut net = NetworkBuilder::new(&[2, 3, 1]).build().unwrap();
        net.init_network();
        // (2 + bias) * 3 + (3 + bias) * 1
        assert_eq!(net.num_parameters(), 13);
    }
}
