//! Tests for `LabeledPatterns`.

use std::collections::{BTreeMap, HashMap};

use itml::{ItmlError, LabeledPatterns};
use ndarray::array;

mod common;

#[test]
fn creation() -> Result<(), ItmlError> {
    let patterns = LabeledPatterns::new(vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]], vec!["a", "b", "a"])?;
    assert_eq!(patterns.cardinality(), 3);
    assert_eq!(patterns.dimensionality(), 2);
    assert_eq!(patterns.ids(), &[0, 1, 2]);
    assert_eq!(patterns.num_classes(), 2);
    assert!(patterns.has_distinct_vectors());
    assert_eq!(patterns.label(1), Some(&"b"));
    assert_eq!(patterns.delta(0, 2), Some(array![-4.0, -4.0]));
    assert!(patterns.delta(0, 3).is_none());
    patterns.check_sufficient()
}

#[test]
fn from_maps() -> Result<(), ItmlError> {
    let patterns = common::two_clusters();
    assert_eq!(patterns.ids(), &[0, 1, 2, 3]);
    assert_eq!(patterns.label(2).map(String::as_str), Some("B"));

    // Sparse ids keep their ascending order.
    let vectors = [(10, vec![1.0]), (3, vec![2.0]), (7, vec![3.0])]
        .into_iter()
        .collect::<BTreeMap<_, _>>();
    let labels = [(10, 0), (3, 1), (7, 0), (99, 1)].into_iter().collect::<HashMap<_, _>>();
    let patterns = LabeledPatterns::from_maps(vectors, &labels)?;
    assert_eq!(patterns.ids(), &[3, 7, 10]);
    assert_eq!(patterns.id_at(1), 7);
    assert_eq!(patterns.position_of(10), Some(2));
    assert_eq!(patterns.vector(3).map(|v| v.to_vec()), Some(vec![2.0]));
    assert_eq!(patterns.label(99), None);

    Ok(())
}

#[test]
fn invalid_inputs() {
    let empty = LabeledPatterns::<u8>::new(Vec::new(), Vec::new());
    assert!(matches!(empty, Err(ItmlError::InvalidPatterns(_))));

    let lengths = LabeledPatterns::new(vec![vec![1.0]], vec![0, 1]);
    assert!(matches!(lengths, Err(ItmlError::InvalidPatterns(_))));

    let dims = LabeledPatterns::new(vec![vec![1.0, 2.0], vec![1.0]], vec![0, 1]);
    assert_eq!(
        dims.err(),
        Some(ItmlError::DimensionMismatch { expected: 2, actual: 1 })
    );

    let zero_dim = LabeledPatterns::new(vec![vec![], vec![]], vec![0, 1]);
    assert!(matches!(zero_dim, Err(ItmlError::InvalidPatterns(_))));

    let nan = LabeledPatterns::new(vec![vec![1.0], vec![f64::NAN]], vec![0, 1]);
    assert!(matches!(nan, Err(ItmlError::InvalidPatterns(_))));

    let vectors = [(0, vec![1.0]), (1, vec![2.0])].into_iter().collect::<BTreeMap<_, _>>();
    let labels = [(0, 0)].into_iter().collect::<HashMap<_, _>>();
    let missing = LabeledPatterns::from_maps(vectors, &labels);
    assert!(matches!(missing, Err(ItmlError::InvalidPatterns(_))));
}

#[test]
fn insufficient() -> Result<(), ItmlError> {
    let single = LabeledPatterns::new(vec![vec![1.0, 2.0]], vec![0])?;
    assert!(matches!(single.check_sufficient(), Err(ItmlError::InsufficientConstraints(_))));

    let one_class = LabeledPatterns::new(vec![vec![1.0], vec![2.0], vec![3.0]], vec!["a"; 3])?;
    assert_eq!(one_class.num_classes(), 1);
    assert!(matches!(one_class.check_sufficient(), Err(ItmlError::InsufficientConstraints(_))));

    let identical = LabeledPatterns::new(vec![vec![1.0, 1.0]; 3], vec![0, 1, 2])?;
    assert!(!identical.has_distinct_vectors());
    assert!(matches!(identical.check_sufficient(), Err(ItmlError::InsufficientConstraints(_))));

    Ok(())
}
