//! Error types for the training engine
//!
//! Configuration problems (bad layer structure, bad hyperparameters) and
//! validation problems (malformed vectors or records) are kept in a single
//! enum so callers can match on the failure class.

use thiserror::Error;

/// Errors raised by network construction, validation and training
#[derive(Error, Debug)]
pub enum NetworkError {
    /// Layer structure is malformed (fewer than two layers, or a zero-size layer)
    #[error("Invalid network structure: {0}")]
    InvalidStructure(String),

    /// A hyperparameter is outside its valid range
    #[error("Invalid value {value} for parameter `{name}`")]
    InvalidParameter { name: &'static str, value: f64 },

    /// Vector length does not match the expected layer size
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// A vector element is NaN or infinite
    #[error("Non-finite value {value} at index {index}")]
    NonFiniteValue { index: usize, value: f64 },

    /// A training record failed validation; the index identifies the record
    #[error("Invalid training record at index {index}: {source}")]
    InvalidRecord {
        index: usize,
        #[source]
        source: Box<NetworkError>,
    },

    /// Operation requires an initialized network
    #[error("Network has not been initialized yet")]
    NotInitialized,
}

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, NetworkError>;
