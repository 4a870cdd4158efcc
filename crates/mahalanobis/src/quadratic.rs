//! Quadratic-form distances parametrized by a square matrix.
//!
//! For a matrix `M` and a delta vector `d`, the distance is `dᵗ M d`. When `M`
//! is positive semi-definite this is the squared Mahalanobis distance. None of
//! these functions check that `M` is symmetric or PSD; see
//! [`Mahalanobis`](crate::Mahalanobis) for a validated wrapper.
//!
//! # Panics
//!
//! All functions panic if the shapes of the matrix and the vectors do not
//! agree.

use ndarray::{ArrayView1, ArrayView2};

use crate::vectors::difference;

/// The quadratic form `dᵗ M d` for a precomputed delta vector `d`.
///
/// # Examples
///
/// ```
/// use mahalanobis::quadratic::distance;
/// use ndarray::array;
///
/// let m = array![[2.0, 1.0], [1.0, 2.0]];
/// let d = array![1.0, -1.0];
///
/// // 2 - 1 - 1 + 2
/// assert!((distance(m.view(), d.view()) - 2.0).abs() <= f64::EPSILON);
/// ```
#[must_use]
pub fn distance(m: ArrayView2<f64>, d: ArrayView1<f64>) -> f64 {
    d.dot(&m.dot(&d))
}

/// The quadratic form of the delta `x - y`.
#[must_use]
pub fn distance_between(m: ArrayView2<f64>, x: ArrayView1<f64>, y: ArrayView1<f64>) -> f64 {
    distance(m, difference(x, y).view())
}

/// The square root of [`distance`].
///
/// Negative values, which can only come from round-off or a matrix that is
/// not PSD, are clamped to zero before taking the root.
#[must_use]
pub fn distance_sqrt(m: ArrayView2<f64>, d: ArrayView1<f64>) -> f64 {
    distance(m, d).max(0.0).sqrt()
}

/// The square root of [`distance_between`].
#[must_use]
pub fn distance_between_sqrt(m: ArrayView2<f64>, x: ArrayView1<f64>, y: ArrayView1<f64>) -> f64 {
    distance_between(m, x, y).max(0.0).sqrt()
}

/// The trace form `tr(Δᵗ M Δ)` for a `D x V` matrix of deltas.
///
/// Each column of `Δ` is one view of the same pattern pair, so this is the
/// sum of [`distance`] over the columns.
///
/// # Examples
///
/// ```
/// use mahalanobis::quadratic::trace_form;
/// use ndarray::array;
///
/// let m = array![[1.0, 0.0], [0.0, 3.0]];
/// let delta = array![[1.0, 0.0], [0.0, 1.0]];
///
/// assert!((trace_form(m.view(), delta.view()) - 4.0).abs() <= f64::EPSILON);
/// ```
#[must_use]
pub fn trace_form(m: ArrayView2<f64>, delta: ArrayView2<f64>) -> f64 {
    let md = m.dot(&delta);
    (&delta * &md).sum()
}

/// The trace form of the delta `x - y` between two matrix-valued patterns.
#[must_use]
pub fn trace_form_between(m: ArrayView2<f64>, x: ArrayView2<f64>, y: ArrayView2<f64>) -> f64 {
    trace_form(m, (&x - &y).view())
}
