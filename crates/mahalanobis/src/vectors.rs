//! Helpers for dense real vectors.
//!
//! The quadratic forms in [`crate::quadratic`] work on delta vectors. These
//! functions build and inspect those deltas.
//!
//! # Potentially unexpected behaviors
//!
//! Vectors of differing dimensionality will cause a panic from `ndarray`
//! broadcasting in [`difference`].

use ndarray::{Array1, ArrayView1};

/// Element-wise difference `x - y` of two vectors.
///
/// # Panics
///
/// * If `x` and `y` have different lengths.
///
/// # Examples
///
/// ```
/// use mahalanobis::vectors::difference;
/// use ndarray::{array, ArrayView1};
///
/// let x = [3.0, 4.0];
/// let y = [1.0, 1.0];
///
/// let d = difference(ArrayView1::from(&x[..]), ArrayView1::from(&y[..]));
/// assert_eq!(d, array![2.0, 3.0]);
/// ```
#[must_use]
pub fn difference(x: ArrayView1<f64>, y: ArrayView1<f64>) -> Array1<f64> {
    &x - &y
}

/// The L2-norm of a vector.
#[must_use]
pub fn l2_norm(d: ArrayView1<f64>) -> f64 {
    d.dot(&d).sqrt()
}

/// Whether a vector is zero up to machine precision, i.e. `‖d‖₂ ≤ ε`.
///
/// Pairs of patterns whose delta is negligible carry no information about
/// the metric and are rejected when sampling constraints.
#[must_use]
pub fn is_negligible(d: ArrayView1<f64>) -> bool {
    l2_norm(d) <= f64::EPSILON
}
