//! The full metric-learning pipeline: bounds, constraints, projection.

use mahalanobis::Mahalanobis;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    estimate_bounds, project, psd, sample_constraints, Bounds, BoundsParams, Budget, ItmlError, LabeledPatterns,
    ProjectionParams, ProjectionReport, Result,
};

/// The configuration of an [`Itml`] learner.
///
/// Built once with the `with_*` methods and then handed to [`Itml::new`],
/// after which it cannot change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ItmlConfig {
    /// Scales the number of attempts made by the constraint sampler.
    pub const_factor: usize,
    /// Parameters of the bound estimation.
    pub bounds: BoundsParams,
    /// Parameters of the projection.
    pub projection: ProjectionParams,
    /// The seed for the random number generator. `None` uses entropy.
    pub seed: Option<u64>,
    /// Whether to clip negative eigenvalues of the learned matrix.
    pub clip_negative_eigenvalues: bool,
}

impl Default for ItmlConfig {
    fn default() -> Self {
        Self {
            const_factor: 20,
            bounds: BoundsParams::default(),
            projection: ProjectionParams::default(),
            seed: None,
            clip_negative_eigenvalues: false,
        }
    }
}

impl ItmlConfig {
    /// Sets the factor scaling the number of sampling attempts.
    #[must_use]
    pub const fn with_const_factor(mut self, const_factor: usize) -> Self {
        self.const_factor = const_factor;
        self
    }

    /// Sets the parameters of the bound estimation.
    #[must_use]
    pub const fn with_bounds(mut self, bounds: BoundsParams) -> Self {
        self.bounds = bounds;
        self
    }

    /// Sets the parameters of the projection.
    #[must_use]
    pub const fn with_projection(mut self, projection: ProjectionParams) -> Self {
        self.projection = projection;
        self
    }

    /// Sets the slack `γ` of the projection.
    #[must_use]
    pub const fn with_slack(mut self, slack: f64) -> Self {
        self.projection.slack = slack;
        self
    }

    /// Sets the tolerance `ε` of the projection.
    #[must_use]
    pub const fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.projection.tolerance = tolerance;
        self
    }

    /// Sets the maximum number of projection iterations.
    #[must_use]
    pub const fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.projection.max_iterations = max_iterations;
        self
    }

    /// Sets the seed for the random number generator.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets whether to clip negative eigenvalues of the learned matrix.
    #[must_use]
    pub const fn with_clip_negative_eigenvalues(mut self, clip: bool) -> Self {
        self.clip_negative_eigenvalues = clip;
        self
    }

    /// Checks the configuration.
    ///
    /// # Errors
    ///
    /// * If `const_factor` is zero.
    /// * If the bound or projection parameters are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.const_factor == 0 {
            return Err(ItmlError::InvalidConfig(
                "The constraint factor must be positive.".to_string(),
            ));
        }
        self.bounds.validate()?;
        self.projection.validate()
    }
}

/// A metric learned by [`Itml`], with a summary of how it was learned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnedMetric {
    /// The learned metric.
    pub metric: Mahalanobis,
    /// The estimated constraint bounds.
    pub bounds: Bounds,
    /// The number of sampled constraints.
    pub num_constraints: usize,
    /// The number of similarity constraints.
    pub num_similar: usize,
    /// The number of dissimilarity constraints.
    pub num_dissimilar: usize,
    /// The fraction of constraints satisfied by the learned metric.
    pub satisfied_fraction: f64,
    /// A summary of the projection.
    pub report: ProjectionReport,
}

impl LearnedMetric {
    /// The squared learned distance between two vectors.
    ///
    /// # Panics
    ///
    /// * If the vectors do not match the dimensionality of the metric.
    #[must_use]
    pub fn distance_sq(&self, x: &[f64], y: &[f64]) -> f64 {
        self.metric.distance_sq(x, y)
    }

    /// The learned distance between two vectors.
    ///
    /// # Panics
    ///
    /// * If the vectors do not match the dimensionality of the metric.
    #[must_use]
    pub fn distance(&self, x: &[f64], y: &[f64]) -> f64 {
        self.distance_sq(x, y).max(0.0).sqrt()
    }
}

/// Information-Theoretic Metric Learning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Itml {
    /// The configuration.
    config: ItmlConfig,
}

impl Itml {
    /// Creates a new learner.
    ///
    /// # Errors
    ///
    /// * If the configuration is invalid.
    pub fn new(config: ItmlConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration of the learner.
    #[must_use]
    pub const fn config(&self) -> &ItmlConfig {
        &self.config
    }

    /// Learns a metric starting from the identity.
    ///
    /// # Errors
    ///
    /// See [`Itml::fit_with_budget`].
    pub fn fit<L: PartialEq + Sync>(&self, patterns: &LabeledPatterns<L>) -> Result<LearnedMetric> {
        let seed = Mahalanobis::identity(patterns.dimensionality());
        self.fit_with_budget(patterns, &seed, &Budget::unbounded())
    }

    /// Learns a metric starting from the given seed metric.
    ///
    /// # Errors
    ///
    /// See [`Itml::fit_with_budget`].
    pub fn fit_with_seed<L: PartialEq + Sync>(
        &self,
        patterns: &LabeledPatterns<L>,
        seed: &Mahalanobis,
    ) -> Result<LearnedMetric> {
        self.fit_with_budget(patterns, seed, &Budget::unbounded())
    }

    /// Learns a metric starting from the given seed metric, within the given
    /// budget.
    ///
    /// The bounds are estimated under the seed, constraints are sampled with
    /// those bounds, and the projector learns the metric from the
    /// constraints. The same seed for the random number generator and the
    /// same inputs always give the same metric.
    ///
    /// # Errors
    ///
    /// * `InsufficientConstraints` if there are fewer than two distinct
    ///   patterns or only one class.
    /// * `DimensionMismatch` if the seed does not match the patterns.
    /// * `ConvergenceTimeout` or `Cancelled` from the projection.
    /// * `InvalidMetric` if the learned matrix is not finite.
    pub fn fit_with_budget<L: PartialEq + Sync>(
        &self,
        patterns: &LabeledPatterns<L>,
        seed: &Mahalanobis,
        budget: &Budget,
    ) -> Result<LearnedMetric> {
        patterns.check_sufficient()?;
        if seed.dimensionality() != patterns.dimensionality() {
            return Err(ItmlError::DimensionMismatch {
                expected: patterns.dimensionality(),
                actual: seed.dimensionality(),
            });
        }

        let mut rng = self
            .config
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);

        let bounds = estimate_bounds(patterns, seed, &self.config.bounds, &mut rng)?;
        if !bounds.is_ordered() {
            ftlog::warn!(
                "The lower bound {:e} is not below the upper bound {:e}.",
                bounds.lower,
                bounds.upper
            );
        }

        let constraints = sample_constraints(patterns, &bounds, self.config.const_factor, &mut rng);
        let projection = project(&constraints, seed, &self.config.projection, budget)?;

        let matrix = if self.config.clip_negative_eigenvalues {
            psd::clip_to_psd(&projection.matrix)
        } else {
            projection.matrix
        };
        let metric = Mahalanobis::new(matrix).map_err(ItmlError::InvalidMetric)?;
        let satisfied_fraction = constraints.satisfied_fraction(&metric);

        ftlog::info!(
            "Learned a {}-dimensional metric satisfying {:.2}% of {} constraints.",
            metric.dimensionality(),
            100.0 * satisfied_fraction,
            constraints.len()
        );

        Ok(LearnedMetric {
            metric,
            bounds,
            num_constraints: constraints.len(),
            num_similar: constraints.num_similar(),
            num_dissimilar: constraints.num_dissimilar(),
            satisfied_fraction,
            report: projection.report,
        })
    }
}
