//! Projection of a symmetric matrix onto the cone of positive semi-definite
//! matrices.
//!
//! The rank-1 updates of the projector keep the metric PSD in exact
//! arithmetic. Round-off can still leave tiny negative eigenvalues, which
//! [`clip_to_psd`] removes.

use nalgebra::DMatrix;
use ndarray::Array2;

/// Converts a square `ndarray` matrix to `nalgebra`.
fn to_nalgebra(matrix: &Array2<f64>) -> DMatrix<f64> {
    let (rows, cols) = matrix.dim();
    DMatrix::from_fn(rows, cols, |i, j| matrix[[i, j]])
}

/// Sets the negative eigenvalues of a symmetric matrix to zero.
///
/// The matrix is decomposed as `V Λ Vᵗ`, `Λ` is clipped at zero, and the
/// recomposed matrix is symmetrized to remove round-off asymmetry.
///
/// # Panics
///
/// * If the matrix is not square.
#[must_use]
pub fn clip_to_psd(matrix: &Array2<f64>) -> Array2<f64> {
    let mut eigen = to_nalgebra(matrix).symmetric_eigen();
    let clipped = eigen.eigenvalues.iter().filter(|&&l| l < 0.0).count();
    eigen.eigenvalues.iter_mut().for_each(|l| *l = l.max(0.0));
    if clipped > 0 {
        ftlog::debug!("Clipped {clipped} negative eigenvalues.");
    }

    let recomposed = eigen.recompose();
    let (rows, cols) = matrix.dim();
    Array2::from_shape_fn((rows, cols), |(i, j)| 0.5 * (recomposed[(i, j)] + recomposed[(j, i)]))
}

/// The smallest eigenvalue of a symmetric matrix.
///
/// Returns `NAN` for an empty matrix.
///
/// # Panics
///
/// * If the matrix is not square.
#[must_use]
pub fn min_eigenvalue(matrix: &Array2<f64>) -> f64 {
    to_nalgebra(matrix)
        .symmetric_eigenvalues()
        .iter()
        .copied()
        .reduce(f64::min)
        .unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;
    use ndarray::array;

    #[test]
    fn clips_negative_eigenvalues() {
        // Eigenvalues 3 and -1.
        let m = array![[1.0, 2.0], [2.0, 1.0]];
        assert!(approx_eq!(f64, super::min_eigenvalue(&m), -1.0, epsilon = 1e-12));

        let clipped = super::clip_to_psd(&m);
        let expected = array![[1.5, 1.5], [1.5, 1.5]];
        for (a, b) in clipped.iter().zip(expected.iter()) {
            assert!(approx_eq!(f64, *a, *b, epsilon = 1e-12), "{clipped:?}");
        }
        assert!(super::min_eigenvalue(&clipped) > -1e-12);
    }

    #[test]
    fn keeps_psd_matrices() {
        let m = array![[2.0, 0.5, 0.0], [0.5, 1.0, 0.25], [0.0, 0.25, 3.0]];
        let clipped = super::clip_to_psd(&m);
        for (a, b) in clipped.iter().zip(m.iter()) {
            assert!(approx_eq!(f64, *a, *b, epsilon = 1e-12), "{clipped:?}");
        }
    }
}
