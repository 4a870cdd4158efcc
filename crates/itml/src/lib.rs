#![doc = include_str!("../README.md")]

mod bounds;
mod constraints;
mod error;
mod learner;
mod patterns;
mod projector;
mod psd;
pub(crate) mod utils;

#[cfg(feature = "disk-io")]
mod io;

pub use bounds::{estimate_bounds, Bounds, BoundsParams, PercentileMethod};
pub use constraints::{sample_constraints, Constraint, ConstraintSet, Sign, MAX_DRAWS};
pub use error::{ItmlError, Result};
#[cfg(feature = "disk-io")]
pub use io::{read_npy, write_npy};
pub use learner::{Itml, ItmlConfig, LearnedMetric};
pub use mahalanobis::{Mahalanobis, Metric};
pub use patterns::LabeledPatterns;
pub use projector::{
    project, Budget, CancelToken, CursorWrap, DistanceReference, Projection, ProjectionParams, ProjectionReport,
    Termination,
};
pub use psd::{clip_to_psd, min_eigenvalue};

/// The current version of the crate.
pub const VERSION: &str = "0.1.0";
