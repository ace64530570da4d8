//! Training loop coordination
//!
//! The [`Trainer`] drives epochs over a set of training records: validation
//! split, per-epoch shuffling, sequential per-example weight updates,
//! early stopping and per-epoch callbacks. Examples always update the
//! weights one at a time; `batch_size` only groups them for accounting.

use log::{debug, info};
use ndarray::Array1;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::{NetworkError, Result};
use crate::nn::Network;
use crate::regularization::{EarlyStopping, RegularizationPipeline};
use crate::validation::validate_training_data;

/// One input/output example
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingRecord {
    pub input: Array1<f64>,
    pub output: Array1<f64>,
}

impl TrainingRecord {
    pub fn new(input: Array1<f64>, output: Array1<f64>) -> Self {
        Self { input, output }
    }
}

/// Trainer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainerConfig {
    /// Number of passes over the training data
    pub epochs: usize,
    /// Accounting batch size; updates stay per-example either way
    pub batch_size: Option<usize>,
    /// Fraction of records held out for validation, in [0, 1)
    pub validation_split: f64,
    /// Reshuffle the training partition every epoch
    pub shuffle: bool,
    /// Stop after this many non-improving epochs
    pub early_stopping_patience: Option<usize>,
    /// Minimum loss improvement that resets the patience counter
    pub early_stopping_min_delta: f64,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            epochs: 100,
            batch_size: None,
            validation_split: 0.0,
            shuffle: true,
            early_stopping_patience: None,
            early_stopping_min_delta: 0.001,
        }
    }
}

/// Errors and metadata for a single epoch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochResult {
    pub epoch: usize,
    pub training_error: f64,
    pub validation_error: Option<f64>,
}

/// Outcome of a full training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    pub history: Vec<EpochResult>,
    pub final_error: f64,
    pub epochs_trained: usize,
}

/// Evaluation metrics over a dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Mean squared error over all output components
    pub mse: f64,
    /// Argmax classification accuracy, present when targets are one-hot
    pub accuracy: Option<f64>,
}

/// Epoch-loop coordinator around a borrowed [`Network`]
pub struct Trainer<'a> {
    network: &'a mut Network,
    config: TrainerConfig,
    pipeline: Option<RegularizationPipeline>,
    on_epoch_end: Option<Box<dyn FnMut(usize, &EpochResult) + 'a>>,
}

impl<'a> Trainer<'a> {
    pub fn new(network: &'a mut Network, config: TrainerConfig) -> Self {
        Self {
            network,
            config,
            pipeline: None,
            on_epoch_end: None,
        }
    }

    /// Wrap the network's signals with a regularization pipeline: inputs run
    /// through the forward path, the input-layer error signal through the
    /// backward path, and weight penalties add to both the reported training
    /// error and the weight update.
    pub fn with_pipeline(mut self, pipeline: RegularizationPipeline) -> Self {
        self.pipeline = Some(pipeline);
        self
    }

    /// Invoke a callback after every epoch with `(epoch_index, result)`
    pub fn on_epoch_end<F>(mut self, callback: F) -> Self
    where
        F: FnMut(usize, &EpochResult) + 'a,
    {
        self.on_epoch_end = Some(Box::new(callback));
        self
    }

    fn validate_config(&self) -> Result<()> {
        if !self.config.validation_split.is_finite()
            || !(0.0..1.0).contains(&self.config.validation_split)
        {
            return Err(NetworkError::InvalidParameter {
                name: "validation_split",
                value: self.config.validation_split,
            });
        }
        if self.config.batch_size == Some(0) {
            return Err(NetworkError::InvalidParameter {
                name: "batch_size",
                value: 0.0,
            });
        }
        if !self.config.early_stopping_min_delta.is_finite()
            || self.config.early_stopping_min_delta < 0.0
        {
            return Err(NetworkError::InvalidParameter {
                name: "early_stopping_min_delta",
                value: self.config.early_stopping_min_delta,
            });
        }
        Ok(())
    }

    /// Run the configured number of epochs over `records`.
    ///
    /// The monitored error (validation when a split is configured, training
    /// otherwise) drives early stopping and becomes the report's
    /// `final_error`. With `epochs: 0` the history stays empty and
    /// `final_error` is the untouched network's error on the monitored set.
    pub fn train(&mut self, records: &[TrainingRecord]) -> Result<TrainingReport> {
        self.validate_config()?;
        validate_training_data(records, self.network.input_size(), self.network.output_size())?;

        let mut rng = rand::thread_rng();
        let mut indices: Vec<usize> = (0..records.len()).collect();
        if self.config.shuffle {
            indices.shuffle(&mut rng);
        }

        // Single split up front; the validation partition is never trained on
        let val_len = (records.len() as f64 * self.config.validation_split) as usize;
        let train_len = records.len() - val_len;
        let (train_indices, val_indices) = indices.split_at(train_len);
        let mut train_indices = train_indices.to_vec();

        let mut stopper = match self.config.early_stopping_patience {
            Some(patience) => Some(EarlyStopping::new(
                patience,
                self.config.early_stopping_min_delta,
            )?),
            None => None,
        };

        let mut history: Vec<EpochResult> = Vec::with_capacity(self.config.epochs);
        let mut final_error = 0.0;

        for epoch in 0..self.config.epochs {
            if self.config.shuffle {
                train_indices.shuffle(&mut rng);
            }

            let training_error = self.run_epoch(records, &train_indices)?;
            let validation_error = if val_indices.is_empty() {
                None
            } else {
                Some(self.dataset_error(records, val_indices)?)
            };

            let result = EpochResult {
                epoch,
                training_error,
                validation_error,
            };
            debug!(
                "epoch {}: training error {:.6}{}",
                epoch,
                training_error,
                match validation_error {
                    Some(v) => format!(", validation error {:.6}", v),
                    None => String::new(),
                }
            );

            final_error = validation_error.unwrap_or(training_error);
            if let Some(cb) = self.on_epoch_end.as_mut() {
                cb(epoch, &result);
            }
            history.push(result);

            if let Some(stopper) = stopper.as_mut() {
                if stopper.check(final_error) {
                    info!("early stopping at epoch {}", epoch);
                    break;
                }
            }
        }

        if history.is_empty() {
            final_error = if val_indices.is_empty() {
                self.dataset_error(records, &train_indices)?
            } else {
                self.dataset_error(records, val_indices)?
            };
        }

        Ok(TrainingReport {
            epochs_trained: history.len(),
            final_error,
            history,
        })
    }

    /// One pass over the training partition with per-example updates
    fn run_epoch(&mut self, records: &[TrainingRecord], train_indices: &[usize]) -> Result<f64> {
        if train_indices.is_empty() {
            return Ok(0.0);
        }

        let batch = self.config.batch_size.unwrap_or(train_indices.len());
        let mut total_error = 0.0;

        for chunk in train_indices.chunks(batch) {
            for &idx in chunk {
                let record = &records[idx];
                let input = match self.pipeline.as_mut() {
                    Some(pipeline) => pipeline.apply_forward(&record.input, true),
                    None => record.input.clone(),
                };
                total_error += self.network.train(&input, &record.output)?;

                if let Some(pipeline) = self.pipeline.as_mut() {
                    // Close the forward/backward pair so per-pass state such
                    // as dropout masks is consumed once per example
                    if let Some(gradient) = self.network.input_gradient() {
                        pipeline.apply_backward(gradient);
                    }
                    self.network
                        .apply_penalty_gradients(|w| pipeline.penalty_gradient(w));
                }
            }
        }

        let mut epoch_error = total_error / train_indices.len() as f64;
        if let Some(pipeline) = self.pipeline.as_ref() {
            epoch_error += pipeline.penalty(self.network.weights());
        }
        Ok(epoch_error)
    }

    /// Mean per-example squared error without weight updates
    fn dataset_error(&mut self, records: &[TrainingRecord], indices: &[usize]) -> Result<f64> {
        if indices.is_empty() {
            return Ok(0.0);
        }

        let mut total = 0.0;
        for &idx in indices {
            let record = &records[idx];
            let input = match self.pipeline.as_mut() {
                Some(pipeline) => pipeline.apply_forward(&record.input, false),
                None => record.input.clone(),
            };
            let output = self.network.eval(&input)?;
            total += 0.5
                * record
                    .output
                    .iter()
                    .zip(output.iter())
                    .map(|(e, a)| (e - a).powi(2))
                    .sum::<f64>();
        }
        Ok(total / indices.len() as f64)
    }

    /// Mean squared error plus, for one-hot targets, argmax accuracy.
    ///
    /// Inputs pass through the pipeline in inference mode, matching the
    /// validation path.
    pub fn evaluate(&mut self, records: &[TrainingRecord]) -> Result<EvaluationReport> {
        validate_training_data(records, self.network.input_size(), self.network.output_size())?;
        if records.is_empty() {
            return Ok(EvaluationReport {
                mse: 0.0,
                accuracy: None,
            });
        }

        let mut squared_sum = 0.0;
        let mut components = 0usize;
        let mut correct = 0usize;
        let one_hot = records.iter().all(|r| looks_one_hot(&r.output));

        for record in records {
            let input = match self.pipeline.as_mut() {
                Some(pipeline) => pipeline.apply_forward(&record.input, false),
                None => record.input.clone(),
            };
            let output = self.network.eval(&input)?;
            squared_sum += record
                .output
                .iter()
                .zip(output.iter())
                .map(|(e, a)| (e - a).powi(2))
                .sum::<f64>();
            components += output.len();

            if one_hot && argmax(&output) == argmax(&record.output) {
                correct += 1;
            }
        }

        Ok(EvaluationReport {
            mse: squared_sum / components as f64,
            accuracy: if one_hot && !records.is_empty() {
                Some(correct as f64 / records.len() as f64)
            } else {
                None
            },
        })
    }
}

/// A target looks one-hot when every value is 0 or 1 and they sum to 1
fn looks_one_hot(target: &Array1<f64>) -> bool {
    target.iter().all(|&v| v == 0.0 || v == 1.0) && (target.sum() - 1.0).abs() < 1e-12
}

fn argmax(values: &Array1<f64>) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}
