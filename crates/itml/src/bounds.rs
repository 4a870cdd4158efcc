//! Estimating the target bounds of the similarity and dissimilarity
//! constraints from the spread of distances under a seed metric.

use mahalanobis::{quadratic, Mahalanobis};
use rand::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{utils, ItmlError, LabeledPatterns, Result};

/// How a bound is read off the sampled distances.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PercentileMethod {
    /// The empirical percentile by the nearest-rank method.
    #[default]
    NearestRank,
    /// The center of the `⌊p⌋`-th bin of a 100-bin histogram over the range
    /// of sampled distances.
    HistogramCenters,
}

/// Parameters for [`estimate_bounds`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundsParams {
    /// The percentile, in `[0, 100]`, used for the lower bound.
    pub lower_percentile: f64,
    /// The percentile, in `[0, 100]`, used for the upper bound.
    pub upper_percentile: f64,
    /// The number of random pairs to sample.
    pub num_samples: usize,
    /// How the percentiles are computed.
    pub method: PercentileMethod,
}

impl Default for BoundsParams {
    fn default() -> Self {
        Self {
            lower_percentile: 5.0,
            upper_percentile: 95.0,
            num_samples: 2000,
            method: PercentileMethod::default(),
        }
    }
}

impl BoundsParams {
    /// Sets the lower and upper percentiles.
    #[must_use]
    pub const fn with_percentiles(mut self, lower: f64, upper: f64) -> Self {
        self.lower_percentile = lower;
        self.upper_percentile = upper;
        self
    }

    /// Sets the number of random pairs to sample.
    #[must_use]
    pub const fn with_num_samples(mut self, num_samples: usize) -> Self {
        self.num_samples = num_samples;
        self
    }

    /// Sets the method used to compute the percentiles.
    #[must_use]
    pub const fn with_method(mut self, method: PercentileMethod) -> Self {
        self.method = method;
        self
    }

    /// Checks the parameters.
    ///
    /// # Errors
    ///
    /// * If either percentile is outside `[0, 100]`.
    /// * If `num_samples` is zero.
    pub fn validate(&self) -> Result<()> {
        for (name, p) in [("lower", self.lower_percentile), ("upper", self.upper_percentile)] {
            if !(0.0..=100.0).contains(&p) {
                return Err(ItmlError::InvalidConfig(format!(
                    "The {name} percentile must be in [0, 100], got {p}."
                )));
            }
        }
        if self.num_samples == 0 {
            return Err(ItmlError::InvalidConfig(
                "The number of bound samples must be positive.".to_string(),
            ));
        }
        Ok(())
    }
}

/// The target bounds on the squared distances of constrained pairs.
///
/// Same-class pairs should end up closer than `lower`; different-class pairs
/// farther than `upper`. Nothing forces `lower < upper`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// The bound for similarity constraints.
    pub lower: f64,
    /// The bound for dissimilarity constraints.
    pub upper: f64,
}

impl Bounds {
    /// Creates new `Bounds`.
    #[must_use]
    pub const fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// Whether `lower < upper`.
    #[must_use]
    pub fn is_ordered(&self) -> bool {
        self.lower < self.upper
    }
}

/// Estimates the constraint bounds from random pairs of patterns.
///
/// Pairs of positions are drawn uniformly with replacement. A draw that pairs
/// a pattern with itself is redrawn, since its distance is always zero. The
/// squared distances `dᵗ A0 d` under the seed metric form an empirical
/// distribution from which the two percentiles are read.
///
/// The pairs are drawn sequentially and the distances computed in parallel,
/// so the result depends only on the state of `rng`.
///
/// # Arguments
///
/// - `patterns`: The labeled patterns. Labels are not used.
/// - `seed`: The seed metric `A0`.
/// - `params`: The percentiles, sample count and percentile method.
/// - `rng`: The source of randomness.
///
/// # Errors
///
/// * If the parameters are invalid.
/// * If there are fewer than two patterns.
/// * If the dimensionality of `seed` does not match the patterns.
pub fn estimate_bounds<L: Sync, R: Rng>(
    patterns: &LabeledPatterns<L>,
    seed: &Mahalanobis,
    params: &BoundsParams,
    rng: &mut R,
) -> Result<Bounds> {
    params.validate()?;

    let n = patterns.cardinality();
    if n < 2 {
        return Err(ItmlError::InsufficientConstraints(format!(
            "Need at least 2 patterns to estimate bounds, got {n}."
        )));
    }
    if seed.dimensionality() != patterns.dimensionality() {
        return Err(ItmlError::DimensionMismatch {
            expected: patterns.dimensionality(),
            actual: seed.dimensionality(),
        });
    }

    let pairs = (0..params.num_samples)
        .map(|_| draw_distinct_pair(n, rng))
        .collect::<Vec<_>>();

    let matrix = seed.matrix().view();
    let mut distances = pairs
        .par_iter()
        .map(|&(i, j)| quadratic::distance_between(matrix, patterns.vector_at(i), patterns.vector_at(j)))
        .collect::<Vec<_>>();

    let (lower, upper) = match params.method {
        PercentileMethod::NearestRank => {
            utils::sort_ascending(&mut distances);
            (
                utils::nearest_rank(&distances, params.lower_percentile),
                utils::nearest_rank(&distances, params.upper_percentile),
            )
        }
        PercentileMethod::HistogramCenters => (
            utils::histogram_center(&distances, params.lower_percentile),
            utils::histogram_center(&distances, params.upper_percentile),
        ),
    };
    let (lower, upper) = lower
        .zip(upper)
        .ok_or_else(|| ItmlError::InvalidConfig("No distances were sampled.".to_string()))?;

    ftlog::debug!(
        "Estimated bounds from {} pairs: lower {lower:.6e} (p{}), upper {upper:.6e} (p{})",
        distances.len(),
        params.lower_percentile,
        params.upper_percentile
    );

    Ok(Bounds::new(lower, upper))
}

/// Draws a pair of distinct positions in `0..n`.
///
/// `n` must be at least 2.
fn draw_distinct_pair<R: Rng>(n: usize, rng: &mut R) -> (usize, usize) {
    let i = rng.gen_range(0..n);
    loop {
        let j = rng.gen_range(0..n);
        if j != i {
            return (i, j);
        }
    }
}
