//! The online Bregman projector at the heart of ITML.
//!
//! The projector cycles through an ordered list of constraints. Each visit
//! moves the constraint's Lagrange multiplier, relaxes its working bound by
//! the slack, and applies a rank-1 correction to the metric matrix. At the
//! end of every cycle the relative change of the multipliers is compared
//! against the tolerance.

mod budget;
mod record;

use mahalanobis::Mahalanobis;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub use budget::{Budget, CancelToken};
use record::Record;

use crate::{utils, ConstraintSet, ItmlError, Result};

/// The matrix against which the squared distance of a pair is evaluated in
/// the update rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceReference {
    /// The seed matrix `A0`, for every iteration.
    #[default]
    Seed,
    /// The evolving matrix `A`.
    Current,
}

/// How the cursor returns to the start of the list after a full cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CursorWrap {
    /// `idx ← idx mod (K - 1) + 1`: after the first cycle, the constraint at
    /// index 0 is never visited again.
    #[default]
    SkipFirst,
    /// `idx ← (idx + 1) mod K`: every constraint is visited in every cycle.
    Full,
}

impl CursorWrap {
    /// The cursor position after `idx` in a list of `k` constraints.
    ///
    /// A list of one constraint always stays at position 0.
    #[must_use]
    pub const fn next(self, idx: usize, k: usize) -> usize {
        if k <= 1 {
            return 0;
        }
        match self {
            Self::SkipFirst => idx % (k - 1) + 1,
            Self::Full => (idx + 1) % k,
        }
    }
}

/// Parameters for [`project`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionParams {
    /// The slack `γ` trading bound satisfaction for stability.
    pub slack: f64,
    /// The tolerance `ε` on the relative change of the multipliers.
    pub tolerance: f64,
    /// The maximum number of iterations, i.e. single-constraint projections.
    pub max_iterations: usize,
    /// The matrix used for pair distances in the update rule.
    pub distance_reference: DistanceReference,
    /// How the cursor wraps around.
    pub cursor_wrap: CursorWrap,
}

impl Default for ProjectionParams {
    fn default() -> Self {
        Self {
            slack: 1e-4,
            tolerance: 1e-10,
            max_iterations: usize::MAX,
            distance_reference: DistanceReference::default(),
            cursor_wrap: CursorWrap::default(),
        }
    }
}

impl ProjectionParams {
    /// Sets the slack `γ`.
    #[must_use]
    pub const fn with_slack(mut self, slack: f64) -> Self {
        self.slack = slack;
        self
    }

    /// Sets the tolerance `ε`.
    #[must_use]
    pub const fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the maximum number of iterations.
    #[must_use]
    pub const fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the matrix used for pair distances in the update rule.
    #[must_use]
    pub const fn with_distance_reference(mut self, distance_reference: DistanceReference) -> Self {
        self.distance_reference = distance_reference;
        self
    }

    /// Sets how the cursor wraps around.
    #[must_use]
    pub const fn with_cursor_wrap(mut self, cursor_wrap: CursorWrap) -> Self {
        self.cursor_wrap = cursor_wrap;
        self
    }

    /// Checks the parameters.
    ///
    /// # Errors
    ///
    /// * If the slack is not a positive finite number.
    /// * If the tolerance is negative or not finite.
    /// * If `max_iterations` is zero.
    pub fn validate(&self) -> Result<()> {
        if !(self.slack.is_finite() && self.slack > 0.0) {
            Err(ItmlError::InvalidConfig(format!(
                "The slack must be positive and finite, got {}.",
                self.slack
            )))
        } else if !(self.tolerance.is_finite() && self.tolerance >= 0.0) {
            Err(ItmlError::InvalidConfig(format!(
                "The tolerance must be non-negative and finite, got {}.",
                self.tolerance
            )))
        } else if self.max_iterations == 0 {
            Err(ItmlError::InvalidConfig(
                "The maximum number of iterations must be positive.".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

/// Why a projection stopped successfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// The relative change of the multipliers fell below the tolerance.
    Converged,
    /// All multipliers stayed at zero through a full cycle.
    NoActiveConstraints,
    /// There were no constraints; the seed was returned unchanged.
    NoConstraints,
}

/// A summary of a projection run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionReport {
    /// The number of single-constraint projections performed.
    pub iterations: usize,
    /// The number of completed cycles.
    pub cycles: usize,
    /// The relative change of the multipliers at the last completed cycle.
    pub convergence: f64,
    /// The number of steps skipped for degenerate distances or bounds.
    pub skipped_steps: usize,
    /// Why the run stopped.
    pub termination: Termination,
}

/// The result of a successful projection.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    /// The learned matrix.
    pub matrix: Array2<f64>,
    /// A summary of the run.
    pub report: ProjectionReport,
}

/// Learns a metric matrix from constraints by online Bregman projections.
///
/// Starting from a copy of `seed`, each iteration visits the constraint under
/// the cursor with sign `y`, delta `d`, multiplier `λ` and working bound `b̂`:
///
/// 1. `p = dᵗ A0 d` (or `dᵗ A d` with [`DistanceReference::Current`]),
/// 2. `α = min(λ, y · γ/(γ + 1) · (1/p - 1/b̂))`,
/// 3. `λ ← λ - α`,
/// 4. `β = y α / (1 - y α p)`,
/// 5. `b̂ ← 1 / (1/b̂ + y α / γ)`,
/// 6. `A ← A + β · A d dᵗ A`.
///
/// Steps where `p` or `b̂` is not a positive finite number are skipped and
/// logged. When the cursor is at the last constraint, the relative change
/// `‖λ - λ_old‖ / (‖λ‖ + ‖λ_old‖)` is compared against the tolerance and
/// `λ_old` is refreshed.
///
/// An empty constraint set returns the seed unchanged.
///
/// # Errors
///
/// * If the parameters are invalid.
/// * If a constraint does not match the dimensionality of `seed`.
/// * `ConvergenceTimeout` if `max_iterations` iterations pass, or the time
///   limit of `budget` expires, without convergence.
/// * `Cancelled` if the token of `budget` is set.
pub fn project(
    constraints: &ConstraintSet,
    seed: &Mahalanobis,
    params: &ProjectionParams,
    budget: &Budget,
) -> Result<Projection> {
    params.validate()?;

    let dim = seed.dimensionality();
    if let Some(c) = constraints.iter().find(|c| c.delta().len() != dim) {
        return Err(ItmlError::DimensionMismatch {
            expected: dim,
            actual: c.delta().len(),
        });
    }

    if constraints.is_empty() {
        ftlog::info!("No constraints to project onto; returning the seed metric.");
        return Ok(Projection {
            matrix: seed.matrix().clone(),
            report: ProjectionReport {
                iterations: 0,
                cycles: 0,
                convergence: 0.0,
                skipped_steps: 0,
                termination: Termination::NoConstraints,
            },
        });
    }

    let seed_matrix = seed.matrix().view();
    let mut a = seed.matrix().clone();
    let mut records = constraints.iter().map(Record::new).collect::<Vec<_>>();
    let k = records.len();
    let mut lambda_old = vec![0.0; k];

    let gamma = params.slack;
    let gamma_proj = gamma / (gamma + 1.0);
    let deadline = budget.deadline();

    ftlog::info!(
        "Projecting onto {k} constraints with slack {gamma:e}, tolerance {:e}.",
        params.tolerance
    );

    let mut idx = 0;
    let mut iterations = 0;
    let mut cycles = 0;
    let mut skipped_steps = 0;
    let mut convergence = f64::INFINITY;

    loop {
        if budget.is_cancelled() {
            ftlog::warn!("Projection cancelled after {iterations} iterations.");
            return Err(ItmlError::Cancelled { iterations });
        }

        let record = &mut records[idx];
        let p = match params.distance_reference {
            DistanceReference::Seed => record.distance(seed_matrix),
            DistanceReference::Current => record.distance(a.view()),
        };
        if !record.project(&mut a, p, gamma, gamma_proj) {
            skipped_steps += 1;
            ftlog::warn!(
                "Skipped degenerate step at iteration {iterations} for {:?} pair {:?}: distance {p:e}, bound {:e}",
                record.sign(),
                record.key(),
                record.b_hat()
            );
        }
        iterations += 1;

        if idx == k - 1 {
            cycles += 1;

            let norm_sum = utils::l2_norm(records.iter().map(Record::lambda)) + utils::l2_norm(lambda_old.iter().copied());
            if norm_sum < f64::MIN_POSITIVE {
                ftlog::info!("No active constraints after {cycles} cycles ({iterations} iterations).");
                return Ok(Projection {
                    matrix: a,
                    report: ProjectionReport {
                        iterations,
                        cycles,
                        convergence: 0.0,
                        skipped_steps,
                        termination: Termination::NoActiveConstraints,
                    },
                });
            }

            convergence = utils::l2_norm(records.iter().zip(&lambda_old).map(|(r, &old)| r.lambda() - old)) / norm_sum;
            ftlog::debug!("Cycle {cycles}, iteration {iterations}: relative change {convergence:.6e}");

            if convergence < params.tolerance {
                ftlog::info!("Converged after {cycles} cycles ({iterations} iterations).");
                return Ok(Projection {
                    matrix: a,
                    report: ProjectionReport {
                        iterations,
                        cycles,
                        convergence,
                        skipped_steps,
                        termination: Termination::Converged,
                    },
                });
            }

            lambda_old
                .iter_mut()
                .zip(&records)
                .for_each(|(old, r)| *old = r.lambda());
        }

        idx = params.cursor_wrap.next(idx, k);

        let out_of_time = deadline.is_some_and(|d| std::time::Instant::now() >= d);
        if iterations >= params.max_iterations || out_of_time {
            ftlog::warn!("No convergence after {iterations} iterations (relative change {convergence:e}).");
            return Err(ItmlError::ConvergenceTimeout {
                iterations,
                convergence,
            });
        }
    }
}
