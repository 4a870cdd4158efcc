//! The `Metric` trait and the `Mahalanobis` metric.

use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::quadratic;

/// The `Metric` trait is used by consumers of a learned distance.
///
/// # Type Parameters
///
/// - `I`: The type of the items.
pub trait Metric<I> {
    /// Call the metric on two items.
    fn distance(&self, a: &I, b: &I) -> f64;

    /// The name of the metric.
    fn name(&self) -> &str;

    /// Whether the metric provides an identity among the items.
    ///
    /// Identity is defined as `d(a, b) = 0` if and only if `a = b`.
    fn has_identity(&self) -> bool;

    /// Whether the metric only produces non-negative values.
    fn has_non_negativity(&self) -> bool;

    /// Whether the metric is symmetric.
    fn has_symmetry(&self) -> bool;

    /// Whether the metric satisfies the triangle inequality.
    fn obeys_triangle_inequality(&self) -> bool;

    /// Whether the metric is expensive to compute.
    ///
    /// We say that a metric is expensive if it costs more than linear time in
    /// the size of the items to compute the distance between two items.
    fn is_expensive(&self) -> bool;

    /// Whether an item is equal to another item. Items can only be equal if the
    /// metric provides an identity.
    fn is_equal(&self, a: &I, b: &I) -> bool {
        self.has_identity() && self.distance(a, b) == 0.0
    }
}

/// A Mahalanobis metric parametrized by a square, symmetric matrix.
///
/// The matrix is assumed, but not checked, to be positive semi-definite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mahalanobis {
    /// The D x D matrix of the bilinear form.
    matrix: Array2<f64>,
}

impl Mahalanobis {
    /// The identity metric, i.e. the Euclidean distance, in `dim` dimensions.
    #[must_use]
    pub fn identity(dim: usize) -> Self {
        Self {
            matrix: Array2::eye(dim),
        }
    }

    /// Creates a new `Mahalanobis` metric from a matrix.
    ///
    /// # Errors
    ///
    /// * If the matrix is empty.
    /// * If the matrix is not square.
    /// * If the matrix contains non-finite values.
    /// * If the matrix is not symmetric.
    pub fn new(matrix: Array2<f64>) -> Result<Self, String> {
        let (rows, cols) = matrix.dim();
        if rows == 0 {
            return Err("The matrix is empty.".to_string());
        }
        if rows != cols {
            return Err(format!("The matrix is not square: {rows} x {cols}"));
        }
        if matrix.iter().any(|v| !v.is_finite()) {
            return Err("The matrix contains non-finite values.".to_string());
        }

        let scale = matrix.iter().fold(1_f64, |acc, v| acc.max(v.abs()));
        let tolerance = 1e-9 * scale;
        for i in 0..rows {
            for j in (i + 1)..cols {
                let (a, b) = (matrix[[i, j]], matrix[[j, i]]);
                if (a - b).abs() > tolerance {
                    return Err(format!("The matrix is not symmetric at ({i}, {j}): {a} vs {b}"));
                }
            }
        }

        Ok(Self { matrix })
    }

    /// The underlying matrix.
    #[must_use]
    pub const fn matrix(&self) -> &Array2<f64> {
        &self.matrix
    }

    /// Consumes the metric and returns the underlying matrix.
    #[must_use]
    pub fn into_matrix(self) -> Array2<f64> {
        self.matrix
    }

    /// The dimensionality of the vectors this metric applies to.
    #[must_use]
    pub fn dimensionality(&self) -> usize {
        self.matrix.nrows()
    }

    /// The squared distance `(x - y)ᵗ M (x - y)`.
    ///
    /// # Panics
    ///
    /// * If the vectors do not match the dimensionality of the metric.
    #[must_use]
    pub fn distance_sq(&self, x: &[f64], y: &[f64]) -> f64 {
        quadratic::distance_between(self.matrix.view(), ArrayView1::from(x), ArrayView1::from(y))
    }

    /// The squared distance `dᵗ M d` for a precomputed delta.
    #[must_use]
    pub fn distance_delta(&self, d: ArrayView1<f64>) -> f64 {
        quadratic::distance(self.matrix.view(), d)
    }
}

impl<I: AsRef<[f64]>> Metric<I> for Mahalanobis {
    fn distance(&self, a: &I, b: &I) -> f64 {
        quadratic::distance_between_sqrt(
            self.matrix.view(),
            ArrayView1::from(a.as_ref()),
            ArrayView1::from(b.as_ref()),
        )
    }

    fn name(&self) -> &str {
        "mahalanobis"
    }

    fn has_identity(&self) -> bool {
        // A PSD matrix with a null space maps distinct items to zero distance.
        false
    }

    fn has_non_negativity(&self) -> bool {
        true
    }

    fn has_symmetry(&self) -> bool {
        true
    }

    fn obeys_triangle_inequality(&self) -> bool {
        true
    }

    fn is_expensive(&self) -> bool {
        // Quadratic in the dimensionality.
        true
    }
}
