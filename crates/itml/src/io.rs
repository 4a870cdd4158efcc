//! Reading and writing learned metrics.

use std::path::Path;

use mahalanobis::Mahalanobis;
use ndarray::Array2;

use crate::{ItmlError, LearnedMetric, Result};

/// Writes the matrix of a metric to a `.npy` file.
///
/// # Errors
///
/// * If the file cannot be written.
pub fn write_npy<P: AsRef<Path>>(path: P, metric: &Mahalanobis) -> Result<()> {
    ndarray_npy::write_npy(path, metric.matrix()).map_err(|e| ItmlError::Io(e.to_string()))
}

/// Reads a metric from a `.npy` file holding a square, symmetric matrix.
///
/// # Errors
///
/// * If the file cannot be read as a 2d array of `f64`.
/// * If the matrix is not a valid metric.
pub fn read_npy<P: AsRef<Path>>(path: P) -> Result<Mahalanobis> {
    let matrix: Array2<f64> = ndarray_npy::read_npy(path).map_err(|e| ItmlError::Io(e.to_string()))?;
    Mahalanobis::new(matrix).map_err(ItmlError::InvalidMetric)
}

impl LearnedMetric {
    /// Encodes the learned metric and its summary with `bitcode`.
    ///
    /// # Errors
    ///
    /// * If serialization fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bitcode::serialize(self).map_err(|e| ItmlError::Io(e.to_string()))
    }

    /// Decodes a learned metric encoded with [`LearnedMetric::to_bytes`].
    ///
    /// # Errors
    ///
    /// * If deserialization fails.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        bitcode::deserialize(bytes).map_err(|e| ItmlError::Io(e.to_string()))
    }

    /// Writes the learned matrix to a `.npy` file.
    ///
    /// # Errors
    ///
    /// * If the file cannot be written.
    pub fn write_npy<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        write_npy(path, &self.metric)
    }
}
