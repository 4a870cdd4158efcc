//! The per-constraint state of a projection.

use mahalanobis::quadratic;
use ndarray::{Array2, ArrayView1, ArrayView2, Zip};

use crate::constraints::{Constraint, Sign};

/// A constraint together with its dual variable and working bound.
#[derive(Debug, Clone)]
pub(crate) struct Record<'a> {
    /// The constraint.
    constraint: &'a Constraint,
    /// The Lagrange multiplier, initially zero.
    lambda: f64,
    /// The working bound, initially the constraint's bound.
    b_hat: f64,
}

impl<'a> Record<'a> {
    /// Creates the initial state for a constraint.
    pub(crate) const fn new(constraint: &'a Constraint) -> Self {
        Self {
            constraint,
            lambda: 0.0,
            b_hat: constraint.bound(),
        }
    }

    /// The Lagrange multiplier.
    pub(crate) const fn lambda(&self) -> f64 {
        self.lambda
    }

    /// The working bound.
    pub(crate) const fn b_hat(&self) -> f64 {
        self.b_hat
    }

    /// The delta vector of the constraint.
    pub(crate) fn delta(&self) -> ArrayView1<f64> {
        self.constraint.delta()
    }

    /// The squared distance of the constrained pair under `m`.
    pub(crate) fn distance(&self, m: ArrayView2<f64>) -> f64 {
        quadratic::distance(m, self.delta())
    }

    /// Projects `a` onto this constraint, given the squared distance `p` of
    /// the pair.
    ///
    /// The multiplier moves by `alpha`, the working bound follows with the
    /// slack `gamma`, and `a` receives the rank-1 correction
    /// `beta · (A d)(A d)ᵗ`, which keeps it exactly symmetric.
    ///
    /// Returns `false`, leaving everything untouched, if `p` or the working
    /// bound is not a positive finite number, or if the step would produce a
    /// non-finite correction.
    pub(crate) fn project(&mut self, a: &mut Array2<f64>, p: f64, gamma: f64, gamma_proj: f64) -> bool {
        if !(is_positive(p) && is_positive(self.b_hat)) {
            return false;
        }

        let y = self.constraint.sign().value();
        let alpha = self.lambda.min(y * gamma_proj * (1.0 / p - 1.0 / self.b_hat));
        let beta = y * alpha / (1.0 - y * alpha * p);
        let b_hat = 1.0 / (1.0 / self.b_hat + y * (alpha / gamma));
        if !(beta.is_finite() && b_hat.is_finite()) {
            return false;
        }

        self.lambda -= alpha;
        self.b_hat = b_hat;

        if beta.abs() > 0.0 {
            // A d dᵗ A = (A d)(A d)ᵗ for symmetric A.
            let ad = a.dot(&self.delta());
            Zip::indexed(a.view_mut()).for_each(|(i, j), v| *v += beta * (ad[i] * ad[j]));
        }

        true
    }

    /// The key of the constraint.
    pub(crate) const fn key(&self) -> (usize, usize) {
        self.constraint.key()
    }

    /// The sign of the constraint.
    pub(crate) const fn sign(&self) -> Sign {
        self.constraint.sign()
    }
}

/// Whether a value is finite and larger than machine epsilon.
fn is_positive(v: f64) -> bool {
    v.is_finite() && v > f64::EPSILON
}
