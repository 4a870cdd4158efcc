//! Pairwise similarity and dissimilarity constraints, and a best-effort
//! sampler that draws them from labeled patterns.

use std::collections::HashMap;

use mahalanobis::{vectors, Mahalanobis};
use ndarray::{Array1, ArrayView1};
use rand::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{Bounds, ItmlError, LabeledPatterns, Result};

/// The maximum number of draws per sampling iteration.
pub const MAX_DRAWS: usize = 20;

/// Whether a constrained pair should be pulled together or pushed apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sign {
    /// A same-class pair whose distance should fall below the lower bound.
    Similar,
    /// A different-class pair whose distance should rise above the upper
    /// bound.
    Dissimilar,
}

impl Sign {
    /// `+1` for `Similar` and `-1` for `Dissimilar`.
    #[must_use]
    pub const fn value(self) -> f64 {
        match self {
            Self::Similar => 1.0,
            Self::Dissimilar => -1.0,
        }
    }
}

/// A constraint on the learned distance between two patterns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    /// The ids of the two patterns, with `key.0 < key.1`.
    key: (usize, usize),
    /// Whether the pair is similar or dissimilar.
    sign: Sign,
    /// The target bound on the squared distance.
    bound: f64,
    /// The delta `x_i - x_j` in the direction of the key.
    delta: Array1<f64>,
}

impl Constraint {
    /// Creates a new `Constraint` between the patterns with ids `i < j`.
    ///
    /// # Errors
    ///
    /// * If `i >= j`.
    /// * If the bound is not finite.
    pub fn new(i: usize, j: usize, sign: Sign, bound: f64, delta: Array1<f64>) -> Result<Self> {
        if i >= j {
            return Err(ItmlError::InvalidPatterns(format!(
                "Constraint keys must be ordered, got ({i}, {j})."
            )));
        }
        if !bound.is_finite() {
            return Err(ItmlError::InvalidConfig(format!(
                "Constraint bound must be finite, got {bound}."
            )));
        }
        Ok(Self {
            key: (i, j),
            sign,
            bound,
            delta,
        })
    }

    /// The ordered pair of pattern ids.
    #[must_use]
    pub const fn key(&self) -> (usize, usize) {
        self.key
    }

    /// The sign of the constraint.
    #[must_use]
    pub const fn sign(&self) -> Sign {
        self.sign
    }

    /// The target bound on the squared distance.
    #[must_use]
    pub const fn bound(&self) -> f64 {
        self.bound
    }

    /// The delta vector of the pair.
    #[must_use]
    pub fn delta(&self) -> ArrayView1<f64> {
        self.delta.view()
    }

    /// Whether the squared distance under `metric` is on the correct side of
    /// the bound.
    #[must_use]
    pub fn is_satisfied(&self, metric: &Mahalanobis) -> bool {
        let p = metric.distance_delta(self.delta());
        match self.sign {
            Sign::Similar => p <= self.bound,
            Sign::Dissimilar => p >= self.bound,
        }
    }
}

/// An ordered collection of constraints with unique keys.
///
/// The insertion order is the order in which the projector visits the
/// constraints.
#[derive(Debug, Clone, Default)]
pub struct ConstraintSet {
    /// The constraints, in visiting order.
    constraints: Vec<Constraint>,
    /// The position of each key in `constraints`.
    index: HashMap<(usize, usize), usize>,
}

impl ConstraintSet {
    /// Creates an empty `ConstraintSet`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a constraint unless its key is already present.
    ///
    /// Returns whether the constraint was added.
    pub fn push(&mut self, constraint: Constraint) -> bool {
        if self.index.contains_key(&constraint.key) {
            false
        } else {
            self.index.insert(constraint.key, self.constraints.len());
            self.constraints.push(constraint);
            true
        }
    }

    /// The number of constraints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    /// Whether there are no constraints.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Whether a constraint with the given key exists.
    #[must_use]
    pub fn contains(&self, key: (usize, usize)) -> bool {
        self.index.contains_key(&key)
    }

    /// The constraint with the given key.
    #[must_use]
    pub fn get(&self, key: (usize, usize)) -> Option<&Constraint> {
        self.index.get(&key).map(|&i| &self.constraints[i])
    }

    /// The constraints in visiting order.
    pub fn iter(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter()
    }

    /// The keys in visiting order.
    #[must_use]
    pub fn keys(&self) -> Vec<(usize, usize)> {
        self.constraints.iter().map(Constraint::key).collect()
    }

    /// The constraints as a slice, in visiting order.
    #[must_use]
    pub fn as_slice(&self) -> &[Constraint] {
        &self.constraints
    }

    /// The number of similarity constraints.
    #[must_use]
    pub fn num_similar(&self) -> usize {
        self.constraints.iter().filter(|c| c.sign == Sign::Similar).count()
    }

    /// The number of dissimilarity constraints.
    #[must_use]
    pub fn num_dissimilar(&self) -> usize {
        self.len() - self.num_similar()
    }

    /// The fraction of constraints satisfied under `metric`.
    ///
    /// Returns `1` for an empty set.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn satisfied_fraction(&self, metric: &Mahalanobis) -> f64 {
        if self.is_empty() {
            return 1.0;
        }
        let satisfied = self.constraints.par_iter().filter(|c| c.is_satisfied(metric)).count();
        satisfied as f64 / self.len() as f64
    }
}

/// Samples unique pairwise constraints from labeled patterns.
///
/// The sampler makes `const_factor · n · (n - 1)` attempts. Each attempt
/// draws up to [`MAX_DRAWS`] pairs of positions: a pair of a pattern with
/// itself or with a negligible delta is redrawn, and a pair whose key is
/// already present ends the attempt. The first acceptable pair becomes a
/// constraint: same labels give a `Similar` constraint bounded by
/// `bounds.lower`, different labels a `Dissimilar` constraint bounded by
/// `bounds.upper`.
///
/// This is best-effort. Falling short of the target is not an error, and
/// sampling stops once all `n · (n - 1) / 2` pairs are present.
///
/// # Arguments
///
/// - `patterns`: The labeled patterns.
/// - `bounds`: The target bounds from [`estimate_bounds`](crate::estimate_bounds).
/// - `const_factor`: Scales the number of attempts.
/// - `rng`: The source of randomness.
pub fn sample_constraints<L: PartialEq, R: Rng>(
    patterns: &LabeledPatterns<L>,
    bounds: &Bounds,
    const_factor: usize,
    rng: &mut R,
) -> ConstraintSet {
    let n = patterns.cardinality();
    let target = const_factor.saturating_mul(n).saturating_mul(n.saturating_sub(1));
    let max_unique = n.saturating_mul(n.saturating_sub(1)) / 2;

    let mut set = ConstraintSet::new();
    for _ in 0..target {
        if set.len() >= max_unique {
            break;
        }

        for _ in 0..MAX_DRAWS {
            let (a, b) = (rng.gen_range(0..n), rng.gen_range(0..n));
            if a == b {
                continue;
            }

            // Positions follow ascending ids.
            let (a, b) = (a.min(b), a.max(b));
            let delta = vectors::difference(patterns.vector_at(a), patterns.vector_at(b));
            if vectors::is_negligible(delta.view()) {
                continue;
            }

            let key = (patterns.id_at(a), patterns.id_at(b));
            if set.contains(key) {
                break;
            }

            let (sign, bound) = if patterns.label_at(a) == patterns.label_at(b) {
                (Sign::Similar, bounds.lower)
            } else {
                (Sign::Dissimilar, bounds.upper)
            };
            set.push(Constraint {
                key,
                sign,
                bound,
                delta,
            });
            break;
        }
    }

    ftlog::info!(
        "Sampled {} constraints ({} similar, {} dissimilar) in at most {target} attempts.",
        set.len(),
        set.num_similar(),
        set.num_dissimilar()
    );

    set
}
