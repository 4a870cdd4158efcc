//! Error types for metric learning.

use thiserror::Error;

/// Result type alias for metric-learning operations.
pub type Result<T> = std::result::Result<T, ItmlError>;

/// Errors that can occur while learning a metric.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ItmlError {
    /// The patterns cannot produce both similarity and dissimilarity
    /// constraints: fewer than two distinct patterns, or a single class.
    #[error("insufficient constraints: {0}")]
    InsufficientConstraints(String),

    /// Invalid configuration parameter.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid input patterns or labels.
    #[error("invalid patterns: {0}")]
    InvalidPatterns(String),

    /// Dimension mismatch between patterns and a metric.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Actual dimension.
        actual: usize,
    },

    /// A matrix that cannot be used as a Mahalanobis metric.
    #[error("invalid metric: {0}")]
    InvalidMetric(String),

    /// The projection exhausted its iteration or time budget.
    #[error("no convergence after {iterations} iterations (last relative change {convergence:e})")]
    ConvergenceTimeout {
        /// Iterations performed before giving up.
        iterations: usize,
        /// The relative change in the multipliers at the last completed cycle.
        convergence: f64,
    },

    /// The projection was cancelled through its `CancelToken`.
    #[error("cancelled after {iterations} iterations")]
    Cancelled {
        /// Iterations performed before the cancellation was observed.
        iterations: usize,
    },

    /// Reading or writing a learned metric failed.
    #[cfg(feature = "disk-io")]
    #[error("i/o error: {0}")]
    Io(String),
}
