//! Data generation utilities for testing.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};

use itml::LabeledPatterns;
use rand::prelude::*;

/// Two tight pairs of points along the diagonal, labeled "A" and "B".
pub fn two_clusters() -> LabeledPatterns<String> {
    let patterns = [
        (0, vec![0.0, 0.0]),
        (1, vec![0.1, 0.1]),
        (2, vec![5.0, 5.0]),
        (3, vec![5.1, 5.1]),
    ]
    .into_iter()
    .collect::<BTreeMap<_, _>>();
    let labels = [(0, "A"), (1, "A"), (2, "B"), (3, "B")]
        .into_iter()
        .map(|(id, l)| (id, l.to_string()))
        .collect::<HashMap<_, _>>();

    LabeledPatterns::from_maps(patterns, &labels).unwrap_or_else(|e| unreachable!("{e}"))
}

/// Uniform blobs of `per_class` points within `spread` of each center,
/// labeled by the index of their center.
pub fn blobs<R: Rng>(centers: &[Vec<f64>], per_class: usize, spread: f64, rng: &mut R) -> LabeledPatterns<usize> {
    let (vectors, labels): (Vec<_>, Vec<_>) = centers
        .iter()
        .enumerate()
        .flat_map(|(label, center)| {
            (0..per_class)
                .map(|_| {
                    let v = center
                        .iter()
                        .map(|&c| c + rng.gen_range(-spread..spread))
                        .collect::<Vec<_>>();
                    (v, label)
                })
                .collect::<Vec<_>>()
        })
        .unzip();

    LabeledPatterns::new(vectors, labels).unwrap_or_else(|e| unreachable!("{e}"))
}

/// Three well-separated, tight clusters in `dim` dimensions.
pub fn tight_clusters(dim: usize, per_class: usize, seed: u64) -> LabeledPatterns<usize> {
    let mut rng = StdRng::seed_from_u64(seed);
    let centers = (0..3)
        .map(|c| (0..dim).map(|d| if d == c % dim { 10.0 * (c as f64 + 1.0) } else { 0.0 }).collect())
        .collect::<Vec<_>>();
    blobs(&centers, per_class, 0.05, &mut rng)
}

/// Asserts that a matrix is exactly symmetric.
pub fn assert_symmetric(matrix: &ndarray::Array2<f64>) {
    let (rows, cols) = matrix.dim();
    assert_eq!(rows, cols);
    for i in 0..rows {
        for j in 0..i {
            assert_eq!(matrix[[i, j]], matrix[[j, i]], "asymmetric at ({i}, {j})");
        }
    }
}
