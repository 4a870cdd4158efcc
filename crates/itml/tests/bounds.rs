//! Tests for the bound estimator.

use itml::{estimate_bounds, BoundsParams, ItmlError, LabeledPatterns, Mahalanobis, PercentileMethod};
use rand::prelude::*;
use test_case::test_case;

mod common;

#[test_case(2, 10 ; "2d_10")]
#[test_case(3, 20 ; "3d_20")]
#[test_case(8, 15 ; "8d_15")]
fn ordered_on_tight_clusters(dim: usize, per_class: usize) -> Result<(), ItmlError> {
    let patterns = common::tight_clusters(dim, per_class, 42);
    let seed = Mahalanobis::identity(dim);
    let mut rng = StdRng::seed_from_u64(42);

    let bounds = estimate_bounds(&patterns, &seed, &BoundsParams::default(), &mut rng)?;
    assert!(bounds.is_ordered(), "{bounds:?}");

    // Within-cluster squared distances are below (2 * 0.05)^2 * dim.
    assert!(bounds.lower <= 0.01 * dim as f64, "{bounds:?}");
    // Between-cluster squared distances are at least 9.9^2.
    assert!(bounds.upper >= 98.0, "{bounds:?}");

    Ok(())
}

#[test]
fn two_clusters() -> Result<(), ItmlError> {
    let patterns = common::two_clusters();
    let seed = Mahalanobis::identity(2);
    let mut rng = StdRng::seed_from_u64(0);

    let bounds = estimate_bounds(&patterns, &seed, &BoundsParams::default(), &mut rng)?;

    // A third of the distinct ordered pairs are same-class pairs at 0.02 and
    // a sixth are the farthest pair at 52.02.
    assert!((bounds.lower - 0.02).abs() < 1e-12, "{bounds:?}");
    assert!((bounds.upper - 52.02).abs() < 1e-9, "{bounds:?}");

    Ok(())
}

#[test]
fn deterministic() -> Result<(), ItmlError> {
    let patterns = common::tight_clusters(4, 10, 7);
    let seed = Mahalanobis::identity(4);
    let params = BoundsParams::default().with_percentiles(10.0, 90.0).with_num_samples(500);

    let a = estimate_bounds(&patterns, &seed, &params, &mut StdRng::seed_from_u64(3))?;
    let b = estimate_bounds(&patterns, &seed, &params, &mut StdRng::seed_from_u64(3))?;
    assert_eq!(a, b);

    Ok(())
}

#[test]
fn histogram_centers_within_range() -> Result<(), ItmlError> {
    let patterns = common::tight_clusters(3, 10, 11);
    let seed = Mahalanobis::identity(3);
    let params = BoundsParams::default().with_method(PercentileMethod::HistogramCenters);

    let bounds = estimate_bounds(&patterns, &seed, &params, &mut StdRng::seed_from_u64(11))?;

    let ids = patterns.ids();
    let all = ids
        .iter()
        .flat_map(move |&i| ids.iter().filter(move |&&j| j != i).map(move |&j| (i, j)))
        .map(|(i, j)| {
            patterns
                .delta(i, j)
                .map_or(f64::NAN, |d| seed.distance_delta(d.view()))
        })
        .collect::<Vec<_>>();
    let min = all.iter().copied().fold(f64::INFINITY, f64::min);
    let max = all.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    assert!(bounds.is_ordered(), "{bounds:?}");
    assert!(bounds.lower >= min && bounds.lower <= max, "{bounds:?} vs [{min}, {max}]");
    assert!(bounds.upper >= min && bounds.upper <= max, "{bounds:?} vs [{min}, {max}]");

    Ok(())
}

#[test]
fn seed_metric_scales_bounds() -> Result<(), ItmlError> {
    let patterns = common::two_clusters();
    let params = BoundsParams::default();

    let eye = Mahalanobis::identity(2);
    let doubled = Mahalanobis::new(ndarray::Array2::eye(2) * 2.0).map_err(ItmlError::InvalidMetric)?;

    let a = estimate_bounds(&patterns, &eye, &params, &mut StdRng::seed_from_u64(5))?;
    let b = estimate_bounds(&patterns, &doubled, &params, &mut StdRng::seed_from_u64(5))?;
    assert!((2.0 * a.lower - b.lower).abs() < 1e-12);
    assert!((2.0 * a.upper - b.upper).abs() < 1e-9);

    Ok(())
}

#[test]
fn errors() -> Result<(), ItmlError> {
    let mut rng = StdRng::seed_from_u64(42);
    let patterns = common::two_clusters();

    let bad = BoundsParams::default().with_percentiles(-1.0, 95.0);
    let err = estimate_bounds(&patterns, &Mahalanobis::identity(2), &bad, &mut rng);
    assert!(matches!(err, Err(ItmlError::InvalidConfig(_))));

    let bad = BoundsParams::default().with_percentiles(5.0, 100.5);
    let err = estimate_bounds(&patterns, &Mahalanobis::identity(2), &bad, &mut rng);
    assert!(matches!(err, Err(ItmlError::InvalidConfig(_))));

    let bad = BoundsParams::default().with_num_samples(0);
    let err = estimate_bounds(&patterns, &Mahalanobis::identity(2), &bad, &mut rng);
    assert!(matches!(err, Err(ItmlError::InvalidConfig(_))));

    let err = estimate_bounds(&patterns, &Mahalanobis::identity(3), &BoundsParams::default(), &mut rng);
    assert_eq!(err.err(), Some(ItmlError::DimensionMismatch { expected: 2, actual: 3 }));

    let single = LabeledPatterns::new(vec![vec![1.0, 2.0]], vec![0])?;
    let err = estimate_bounds(&single, &Mahalanobis::identity(2), &BoundsParams::default(), &mut rng);
    assert!(matches!(err, Err(ItmlError::InsufficientConstraints(_))));

    Ok(())
}
