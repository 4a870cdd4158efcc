//! Synthetic labeled data.

use itml::LabeledPatterns;
use rand::prelude::*;

/// Blobs of `per_class` points around `num_classes` centers in `dim`
/// dimensions.
///
/// Center `c` sits at `separation · (c + 1)` on axis `c mod dim`. Each point
/// adds noise uniform in `[-spread, spread)` to every coordinate of its
/// center.
pub fn blobs(
    num_classes: usize,
    per_class: usize,
    dim: usize,
    separation: f64,
    spread: f64,
    seed: u64,
) -> Result<LabeledPatterns<usize>, String> {
    if !(spread.is_finite() && spread > 0.0) {
        return Err(format!("The spread must be positive and finite, got {spread}."));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let (vectors, labels): (Vec<_>, Vec<_>) = (0..num_classes)
        .flat_map(|c| (0..per_class).map(move |_| c))
        .map(|c| {
            #[allow(clippy::cast_precision_loss)]
            let offset = separation * (c + 1) as f64;
            let v = (0..dim)
                .map(|d| (if d == c % dim { offset } else { 0.0 }) + rng.gen_range(-spread..spread))
                .collect::<Vec<_>>();
            (v, c)
        })
        .unzip();

    LabeledPatterns::new(vectors, labels).map_err(|e| e.to_string())
}

/// The mean squared distance of same-class pairs and of different-class
/// pairs under `distance_sq`.
#[allow(clippy::cast_precision_loss)]
pub fn mean_distances<F: Fn(&[f64], &[f64]) -> f64>(
    patterns: &LabeledPatterns<usize>,
    distance_sq: F,
) -> (f64, f64) {
    let ids = patterns.ids();
    let (mut same, mut num_same, mut diff, mut num_diff) = (0.0, 0_usize, 0.0, 0_usize);

    for (k, &i) in ids.iter().enumerate() {
        for &j in &ids[(k + 1)..] {
            let (Some(x), Some(y)) = (patterns.vector(i), patterns.vector(j)) else {
                continue;
            };
            let d = distance_sq(&x.to_vec(), &y.to_vec());
            if patterns.label(i) == patterns.label(j) {
                same += d;
                num_same += 1;
            } else {
                diff += d;
                num_diff += 1;
            }
        }
    }

    (same / num_same.max(1) as f64, diff / num_diff.max(1) as f64)
}
