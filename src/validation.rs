//! Input and structure validation
//!
//! All checks run before any numeric work so that invalid data never reaches
//! the math. Failures are raised immediately; nothing is repaired or retried.

use ndarray::Array1;

use crate::error::{NetworkError, Result};
use crate::training::TrainingRecord;

/// Validate a layer structure: at least two layers, every size positive.
pub fn validate_structure(structure: &[usize]) -> Result<()> {
    if structure.len() < 2 {
        return Err(NetworkError::InvalidStructure(format!(
            "need at least 2 layers, got {}",
            structure.len()
        )));
    }
    if let Some(pos) = structure.iter().position(|&s| s == 0) {
        return Err(NetworkError::InvalidStructure(format!(
            "layer {} has size 0",
            pos
        )));
    }
    Ok(())
}

/// Validate a vector against an expected length and reject NaN/infinite values.
pub fn validate_vector(vector: &Array1<f64>, expected: usize) -> Result<()> {
    if vector.len() != expected {
        return Err(NetworkError::DimensionMismatch {
            expected,
            got: vector.len(),
        });
    }
    for (index, &value) in vector.iter().enumerate() {
        if !value.is_finite() {
            return Err(NetworkError::NonFiniteValue { index, value });
        }
    }
    Ok(())
}

/// Validate a full training set against the network's input/output sizes.
///
/// The first malformed record aborts validation; its position is carried in
/// the returned error.
pub fn validate_training_data(
    records: &[TrainingRecord],
    input_size: usize,
    output_size: usize,
) -> Result<()> {
    for (index, record) in records.iter().enumerate() {
        validate_vector(&record.input, input_size)
            .and_then(|_| validate_vector(&record.output, output_size))
            .map_err(|source| NetworkError::InvalidRecord {
                index,
                source: Box::new(source),
            })?;
    }
    Ok(())
}
