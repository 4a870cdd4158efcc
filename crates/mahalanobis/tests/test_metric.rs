//! Tests for the `Mahalanobis` metric.

use float_cmp::approx_eq;
use mahalanobis::{Mahalanobis, Metric};
use ndarray::{array, Array2};

#[test]
fn creation() -> Result<(), String> {
    let metric = Mahalanobis::new(array![[2.0, 1.0], [1.0, 2.0]])?;
    assert_eq!(metric.dimensionality(), 2);
    assert_eq!(Metric::<Vec<f64>>::name(&metric), "mahalanobis");

    let eye = Mahalanobis::identity(3);
    assert_eq!(eye.matrix(), &Array2::<f64>::eye(3));

    Ok(())
}

#[test]
fn rejects_bad_matrices() {
    assert!(Mahalanobis::new(Array2::zeros((0, 0))).is_err());
    assert!(Mahalanobis::new(Array2::zeros((2, 3))).is_err());
    assert!(Mahalanobis::new(array![[1.0, 0.5], [0.0, 1.0]]).is_err());
    assert!(Mahalanobis::new(array![[1.0, f64::NAN], [f64::NAN, 1.0]]).is_err());

    // Asymmetry below the tolerance is accepted.
    assert!(Mahalanobis::new(array![[1.0, 0.5], [0.5 + 1e-12, 1.0]]).is_ok());
}

#[test]
fn distances() -> Result<(), String> {
    let metric = Mahalanobis::new(array![[4.0, 0.0], [0.0, 1.0]])?;
    let a = vec![1.0, 1.0];
    let b = vec![0.0, 1.0];

    assert!(approx_eq!(f64, metric.distance_sq(&a, &b), 4.0, ulps = 2));
    assert!(approx_eq!(f64, metric.distance(&a, &b), 2.0, ulps = 2));
    assert!(approx_eq!(f64, metric.distance(&b, &a), 2.0, ulps = 2));
    assert_eq!(metric.distance(&a, &a), 0.0);

    let d = array![0.0, 3.0];
    assert!(approx_eq!(f64, metric.distance_delta(d.view()), 9.0, ulps = 2));

    // No identity is claimed, so nothing is ever "equal".
    assert!(!metric.is_equal(&a, &a));

    Ok(())
}

#[test]
fn into_matrix() -> Result<(), String> {
    let matrix = array![[1.0, 0.25], [0.25, 3.0]];
    let metric = Mahalanobis::new(matrix.clone())?;
    assert_eq!(metric.clone().into_matrix(), matrix);
    assert_eq!(metric, Mahalanobis::new(matrix)?);
    Ok(())
}

#[test]
fn as_trait_object() -> Result<(), String> {
    let metric = Mahalanobis::new(array![[1.0, 0.0], [0.0, 9.0]])?;
    let dyn_metric: &dyn Metric<Vec<f64>> = &metric;

    assert_eq!(dyn_metric.name(), "mahalanobis");
    assert!(!dyn_metric.has_identity());
    assert!(dyn_metric.has_non_negativity());
    assert!(dyn_metric.has_symmetry());
    assert!(dyn_metric.obeys_triangle_inequality());
    assert!(dyn_metric.is_expensive());

    let (a, b) = (vec![0.0, 0.0], vec![0.0, 1.0]);
    assert!(approx_eq!(f64, dyn_metric.distance(&a, &b), 3.0, ulps = 2));

    // Slices go through the same implementation.
    assert_eq!(Metric::<&[f64]>::name(&metric), "mahalanobis");

    Ok(())
}
