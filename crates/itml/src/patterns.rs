//! A set of labeled patterns, i.e. the training vectors for metric learning.

use std::collections::{BTreeMap, HashMap};

use ndarray::{Array1, ArrayView1};

use crate::{ItmlError, Result};

/// A set of labeled patterns.
///
/// Each pattern has an integer id, a real vector and a class label. The ids
/// are kept in ascending order and every vector has the same dimensionality.
/// The set is immutable once built.
///
/// # Type Parameters
///
/// - `L`: The type of the class labels.
#[derive(Debug, Clone)]
pub struct LabeledPatterns<L> {
    /// The ids of the patterns, in ascending order.
    ids: Vec<usize>,
    /// The vectors, parallel to `ids`.
    vectors: Vec<Array1<f64>>,
    /// The class labels, parallel to `ids`.
    labels: Vec<L>,
    /// The position of each id in `ids`.
    positions: HashMap<usize, usize>,
    /// The common dimensionality of the vectors.
    dimensionality: usize,
}

impl<L> LabeledPatterns<L> {
    /// Creates a new set of patterns with ids `0..n`.
    ///
    /// # Errors
    ///
    /// * If the vectors are empty.
    /// * If the numbers of vectors and labels differ.
    /// * If the vectors do not share a non-zero dimensionality.
    /// * If any vector contains non-finite values.
    pub fn new(vectors: Vec<Vec<f64>>, labels: Vec<L>) -> Result<Self> {
        if vectors.len() != labels.len() {
            return Err(ItmlError::InvalidPatterns(format!(
                "The number of labels does not match the number of vectors. {} vs {}",
                labels.len(),
                vectors.len()
            )));
        }
        let ids = (0..vectors.len()).collect();
        Self::from_parts(ids, vectors, labels)
    }

    /// Creates a new set of patterns from an id-to-vector map and an
    /// id-to-label map.
    ///
    /// Labels for ids that have no vector are ignored.
    ///
    /// # Errors
    ///
    /// * If any id has no label.
    /// * See [`LabeledPatterns::new`].
    pub fn from_maps(patterns: BTreeMap<usize, Vec<f64>>, labels: &HashMap<usize, L>) -> Result<Self>
    where
        L: Clone,
    {
        let mut ids = Vec::with_capacity(patterns.len());
        let mut vectors = Vec::with_capacity(patterns.len());
        let mut ordered_labels = Vec::with_capacity(patterns.len());
        for (id, vector) in patterns {
            let label = labels
                .get(&id)
                .ok_or_else(|| ItmlError::InvalidPatterns(format!("No label for pattern {id}.")))?;
            ids.push(id);
            vectors.push(vector);
            ordered_labels.push(label.clone());
        }
        Self::from_parts(ids, vectors, ordered_labels)
    }

    /// Validates and assembles the members.
    fn from_parts(ids: Vec<usize>, vectors: Vec<Vec<f64>>, labels: Vec<L>) -> Result<Self> {
        let dimensionality = match vectors.first() {
            None => return Err(ItmlError::InvalidPatterns("The patterns are empty.".to_string())),
            Some(v) if v.is_empty() => {
                return Err(ItmlError::InvalidPatterns("The patterns have no dimensions.".to_string()))
            }
            Some(v) => v.len(),
        };

        for (id, v) in ids.iter().zip(&vectors) {
            if v.len() != dimensionality {
                return Err(ItmlError::DimensionMismatch {
                    expected: dimensionality,
                    actual: v.len(),
                });
            }
            if v.iter().any(|x| !x.is_finite()) {
                return Err(ItmlError::InvalidPatterns(format!(
                    "Pattern {id} contains non-finite values."
                )));
            }
        }

        let positions = ids.iter().enumerate().map(|(p, &id)| (id, p)).collect();
        let vectors = vectors.into_iter().map(Array1::from).collect();

        Ok(Self {
            ids,
            vectors,
            labels,
            positions,
            dimensionality,
        })
    }

    /// The number of patterns.
    #[must_use]
    pub fn cardinality(&self) -> usize {
        self.ids.len()
    }

    /// The common dimensionality of the vectors.
    #[must_use]
    pub const fn dimensionality(&self) -> usize {
        self.dimensionality
    }

    /// The ids of the patterns, in ascending order.
    #[must_use]
    pub fn ids(&self) -> &[usize] {
        &self.ids
    }

    /// The id of the pattern at the given position.
    ///
    /// # Panics
    ///
    /// * If `position` is out of bounds.
    #[must_use]
    pub fn id_at(&self, position: usize) -> usize {
        self.ids[position]
    }

    /// The position of the pattern with the given id.
    #[must_use]
    pub fn position_of(&self, id: usize) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    /// The vector of the pattern with the given id.
    #[must_use]
    pub fn vector(&self, id: usize) -> Option<ArrayView1<f64>> {
        self.position_of(id).map(|p| self.vectors[p].view())
    }

    /// The label of the pattern with the given id.
    #[must_use]
    pub fn label(&self, id: usize) -> Option<&L> {
        self.position_of(id).map(|p| &self.labels[p])
    }

    /// The vector at the given position.
    pub(crate) fn vector_at(&self, position: usize) -> ArrayView1<f64> {
        self.vectors[position].view()
    }

    /// The label at the given position.
    pub(crate) fn label_at(&self, position: usize) -> &L {
        &self.labels[position]
    }

    /// The delta `x_i - x_j` between the patterns with the given ids.
    #[must_use]
    pub fn delta(&self, i: usize, j: usize) -> Option<Array1<f64>> {
        match (self.vector(i), self.vector(j)) {
            (Some(x), Some(y)) => Some(mahalanobis::vectors::difference(x, y)),
            _ => None,
        }
    }
}

impl<L: PartialEq> LabeledPatterns<L> {
    /// The number of distinct class labels.
    #[must_use]
    pub fn num_classes(&self) -> usize {
        let mut distinct: Vec<&L> = Vec::new();
        for label in &self.labels {
            if !distinct.contains(&label) {
                distinct.push(label);
            }
        }
        distinct.len()
    }

    /// Whether at least two of the vectors differ.
    #[must_use]
    pub fn has_distinct_vectors(&self) -> bool {
        self.vectors
            .split_first()
            .is_some_and(|(first, rest)| rest.iter().any(|v| v != first))
    }

    /// Checks that the patterns can produce both kinds of constraints.
    ///
    /// # Errors
    ///
    /// * If there are fewer than two patterns.
    /// * If all the vectors are identical.
    /// * If all the patterns share one class.
    pub fn check_sufficient(&self) -> Result<()> {
        if self.cardinality() < 2 {
            Err(ItmlError::InsufficientConstraints(format!(
                "Need at least 2 patterns, got {}.",
                self.cardinality()
            )))
        } else if !self.has_distinct_vectors() {
            Err(ItmlError::InsufficientConstraints(
                "All patterns have identical vectors.".to_string(),
            ))
        } else if self.num_classes() < 2 {
            Err(ItmlError::InsufficientConstraints(
                "All patterns share one class, so no dissimilar pair exists.".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}
