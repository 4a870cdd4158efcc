//! Utility functions for the crate.

use core::cmp::Ordering;

/// The number of bins used by [`histogram_center`].
pub const NUM_BINS: usize = 100;

/// Sorts the given values in ascending order.
///
/// NAN values are ordered as greater than all other values.
pub fn sort_ascending(values: &mut [f64]) {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or_else(|| nan_last(*a, *b)));
}

/// Orders NAN values after every other value.
fn nan_last(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

/// The `p`-th percentile of the given values by the nearest-rank method.
///
/// The values must already be sorted in ascending order. The rank is
/// `⌈p/100 · n⌉`, clamped to `[1, n]`.
///
/// Returns `None` if the given slice is empty.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn nearest_rank(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let n = sorted.len();
    let rank = (p * n as f64 / 100.0).ceil().max(1.0) as usize;
    Some(sorted[rank.min(n) - 1])
}

/// The center of the `⌊p⌋`-th of [`NUM_BINS`] equal-width histogram bins
/// spanning `[min, max]` of the given values.
///
/// The bin index is clamped to `[1, NUM_BINS]`. The result depends only on the
/// range of the values, not on how they populate the bins.
///
/// Returns `None` if the given slice is empty.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn histogram_center(values: &[f64], p: f64) -> Option<f64> {
    let (min, max) = values.iter().fold(None, |acc: Option<(f64, f64)>, &v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })?;
    let width = (max - min) / NUM_BINS as f64;
    let bin = (p.floor().max(1.0) as usize).min(NUM_BINS);
    Some((bin as f64 - 0.5).mul_add(width, min))
}

/// The L2-norm of the given values.
pub fn l2_norm<I: IntoIterator<Item = f64>>(values: I) -> f64 {
    values.into_iter().map(|v| v * v).sum::<f64>().sqrt()
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;

    #[test]
    fn nearest_rank() {
        let values = (1..=100).map(f64::from).collect::<Vec<_>>();
        assert_eq!(super::nearest_rank(&values, 5.0), Some(5.0));
        assert_eq!(super::nearest_rank(&values, 95.0), Some(95.0));
        assert_eq!(super::nearest_rank(&values, 0.0), Some(1.0));
        assert_eq!(super::nearest_rank(&values, 100.0), Some(100.0));
        assert_eq!(super::nearest_rank(&values[..1], 50.0), Some(1.0));
        assert_eq!(super::nearest_rank(&[], 50.0), None);
    }

    #[test]
    fn histogram_center() {
        let values = [0.0, 100.0, 42.0];
        let c = super::histogram_center(&values, 5.0);
        assert!(c.is_some_and(|c| approx_eq!(f64, c, 4.5, epsilon = 1e-12)));

        let c = super::histogram_center(&values, 95.0);
        assert!(c.is_some_and(|c| approx_eq!(f64, c, 94.5, epsilon = 1e-12)));

        let c = super::histogram_center(&values, 0.0);
        assert!(c.is_some_and(|c| approx_eq!(f64, c, 0.5, epsilon = 1e-12)));

        assert_eq!(super::histogram_center(&[], 50.0), None);
    }

    #[test]
    fn sorting() {
        let mut values = [3.0, f64::NAN, 1.0, 2.0];
        super::sort_ascending(&mut values);
        assert_eq!(&values[..3], &[1.0, 2.0, 3.0]);
        assert!(values[3].is_nan());
    }

    #[test]
    fn norm() {
        assert!(approx_eq!(f64, super::l2_norm([3.0, 4.0]), 5.0, ulps = 2));
        assert_eq!(super::l2_norm(Vec::new()), 0.0);
    }
}
