//! Early stopping on a stagnating loss
//!
//! `check` records a new best whenever the loss improves by more than
//! `min_delta`; otherwise a stagnation counter advances. Once the counter
//! reaches `patience`, `stopped` latches true.

use crate::error::{NetworkError, Result};

/// Patience-based training stopper
pub struct EarlyStopping {
    patience: usize,
    min_delta: f64,
    best_loss: f64,
    counter: usize,
    stopped: bool,
}

impl EarlyStopping {
    pub fn new(patience: usize, min_delta: f64) -> Result<Self> {
        if patience == 0 {
            return Err(NetworkError::InvalidParameter {
                name: "patience",
                value: 0.0,
            });
        }
        if !min_delta.is_finite() || min_delta < 0.0 {
            return Err(NetworkError::InvalidParameter {
                name: "min_delta",
                value: min_delta,
            });
        }
        Ok(Self {
            patience,
            min_delta,
            best_loss: f64::INFINITY,
            counter: 0,
            stopped: false,
        })
    }

    /// Record a loss observation; returns whether training should stop
    pub fn check(&mut self, loss: f64) -> bool {
        if loss < self.best_loss - self.min_delta {
            self.best_loss = loss;
            self.counter = 0;
        } else {
            self.counter += 1;
            if self.counter >= self.patience {
                self.stopped = true;
            }
        }
        self.stopped
    }

    pub fn stopped(&self) -> bool {
        self.stopped
    }

    pub fn best_loss(&self) -> f64 {
        self.best_loss
    }

    /// Forget all observations, allowing reuse for a new training run
    pub fn reset(&mut self) {
        self.best_loss = f64::INFINITY;
        self.counter = 0;
        self.stopped = false;
    }
}
