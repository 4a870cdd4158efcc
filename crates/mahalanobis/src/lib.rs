#![doc = include_str!("../README.md")]

pub mod metric;
pub mod quadratic;
pub mod vectors;

pub use metric::{Mahalanobis, Metric};

/// The version of the crate.
pub const VERSION: &str = "0.1.0";
