//! Dense linear-algebra helpers.
//!
//! Operator tensors are stored as `ndarray` arrays; eigendecompositions are
//! delegated to `nalgebra`. This module converts between the two and hosts
//! the Givens-rotation decomposition used for basis changes.

use nalgebra::DMatrix;
use ndarray::Array2;
use num_complex::Complex64;

use crate::error::{SimError, SimResult};

/// Absolute tolerance used for equality checks on coefficients.
pub const EQ_TOLERANCE: f64 = 1e-8;

/// Copy an `ndarray` matrix into an `nalgebra` one.
pub fn to_dmatrix(m: &Array2<Complex64>) -> DMatrix<Complex64> {
    let (rows, cols) = m.dim();
    DMatrix::from_fn(rows, cols, |i, j| m[[i, j]])
}

/// Copy an `nalgebra` matrix into an `ndarray` one.
pub fn to_array2(m: &DMatrix<Complex64>) -> Array2<Complex64> {
    Array2::from_shape_fn((m.nrows(), m.ncols()), |(i, j)| m[(i, j)])
}

/// Conjugate transpose.
pub fn dagger(m: &Array2<Complex64>) -> Array2<Complex64> {
    m.t().mapv(|z| z.conj())
}

/// `m ⊗ I₂`: expands a spatial-orbital matrix to spin orbitals, with
/// spin-orbital `2p + σ` for spatial orbital `p` and spin `σ`.
pub fn kron_identity2(m: &Array2<Complex64>) -> Array2<Complex64> {
    let (rows, cols) = m.dim();
    Array2::from_shape_fn((2 * rows, 2 * cols), |(i, j)| {
        if i % 2 == j % 2 {
            m[[i / 2, j / 2]]
        } else {
            Complex64::ZERO
        }
    })
}

/// Every second row and column starting at 0 (the spin-up block).
pub fn even_submatrix(m: &Array2<Complex64>) -> Array2<Complex64> {
    let (rows, cols) = m.dim();
    Array2::from_shape_fn((rows.div_ceil(2), cols.div_ceil(2)), |(i, j)| m[[2 * i, 2 * j]])
}

/// Largest `|m[i,j] - conj(m[j,i])|`. Non-square input yields `f64::INFINITY`.
pub fn hermitian_deviation(m: &Array2<Complex64>) -> f64 {
    let (rows, cols) = m.dim();
    if rows != cols {
        return f64::INFINITY;
    }
    let mut deviation: f64 = 0.0;
    for i in 0..rows {
        for j in i..cols {
            deviation = deviation.max((m[[i, j]] - m[[j, i]].conj()).norm());
        }
    }
    deviation
}

/// Check that `m` is square, returning its dimension.
pub fn ensure_square(m: &Array2<Complex64>, context: &'static str) -> SimResult<usize> {
    let (rows, cols) = m.dim();
    if rows != cols {
        return Err(SimError::ShapeMismatch {
            context,
            expected: vec![rows, rows],
            got: vec![rows, cols],
        });
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Givens decomposition
// ---------------------------------------------------------------------------

/// A Givens rotation acting on adjacent columns `i = j - 1` and `j`.
///
/// Its matrix is
///
/// ```text
/// [ cos θ   -e^{iφ} sin θ ]
/// [ sin θ    e^{iφ} cos θ ]
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GivensRotation {
    /// First column.
    pub i: usize,
    /// Second column, `i + 1`.
    pub j: usize,
    /// Rotation angle.
    pub theta: f64,
    /// Phase angle.
    pub phi: f64,
}

impl GivensRotation {
    /// The 2×2 matrix of this rotation, row-major.
    pub fn matrix(&self) -> [[Complex64; 2]; 2] {
        let (sin, cos) = self.theta.sin_cos();
        let phase = Complex64::from_polar(1.0, self.phi);
        [
            [Complex64::new(cos, 0.0), -phase * sin],
            [Complex64::new(sin, 0.0), phase * cos],
        ]
    }
}

/// Result of [`givens_decomposition_square`].
#[derive(Debug, Clone)]
pub struct GivensDecomposition {
    /// Layers of rotations on disjoint column pairs, in application order.
    pub layers: Vec<Vec<GivensRotation>>,
    /// Diagonal left over once the upper triangle is zeroed.
    pub diagonal: Vec<Complex64>,
}

/// Decompose a square unitary into layers of Givens rotations and a diagonal.
///
/// Rotations are applied to columns, zeroing the strict upper triangle in
/// `2(n - 1) - 1` parallel sweeps. With `G_k` the rotations in application
/// order, `U · G_1ᴴ · … · G_Kᴴ = D`.
///
/// # Errors
///
/// [`SimError::ShapeMismatch`] if the input is not square.
pub fn givens_decomposition_square(unitary: &Array2<Complex64>) -> SimResult<GivensDecomposition> {
    let n = ensure_square(unitary, "givens_decomposition_square")?;
    let mut current = unitary.clone();
    let mut layers = Vec::new();

    if n >= 2 {
        for k in 0..(2 * (n - 1) - 1) {
            let (start_row, start_column) = if k < n - 1 {
                (0, n - 1 - k)
            } else {
                (k + 2 - n, k + 3 - n)
            };

            let mut layer = Vec::new();
            for (offset, j) in (start_column..n).step_by(2).enumerate() {
                let i = start_row + offset;
                let left = current[[i, j - 1]].conj();
                let right = current[[i, j]].conj();
                if right.norm() > EQ_TOLERANCE {
                    let rotation = zeroing_rotation(left, right, j);
                    rotate_columns(&mut current, &rotation);
                    layer.push(rotation);
                }
            }
            if !layer.is_empty() {
                layers.push(layer);
            }
        }
    }

    let diagonal = (0..n).map(|i| current[[i, i]]).collect();
    Ok(GivensDecomposition { layers, diagonal })
}

/// The rotation `G` on columns `(j - 1, j)` with `G · [a, b]ᵀ = [r, 0]ᵀ`.
fn zeroing_rotation(a: Complex64, b: Complex64, j: usize) -> GivensRotation {
    let (cosine, sine, phase) = if a.norm() < EQ_TOLERANCE {
        (1.0, 0.0, Complex64::ONE)
    } else if b.norm() < EQ_TOLERANCE {
        (0.0, 1.0, Complex64::ONE)
    } else {
        let denominator = (a.norm_sqr() + b.norm_sqr()).sqrt();
        let phase = (a / a.norm()) * (b / b.norm()).conj();
        (b.norm() / denominator, a.norm() / denominator, phase)
    };

    let (theta, phi) = if a.im.abs() < EQ_TOLERANCE && b.im.abs() < EQ_TOLERANCE {
        // Real inputs: a plain rotation.
        ((-phase.re * cosine).clamp(-1.0, 1.0).asin(), 0.0)
    } else {
        (cosine.clamp(-1.0, 1.0).asin(), (-phase).arg())
    };

    GivensRotation {
        i: j - 1,
        j,
        theta,
        phi,
    }
}

/// `M ← M · Gᴴ` restricted to columns `i` and `j`.
fn rotate_columns(m: &mut Array2<Complex64>, rotation: &GivensRotation) {
    let g = rotation.matrix();
    let (i, j) = (rotation.i, rotation.j);
    for row in 0..m.nrows() {
        let col_i = m[[row, i]];
        let col_j = m[[row, j]];
        m[[row, i]] = g[0][0].conj() * col_i + g[0][1].conj() * col_j;
        m[[row, j]] = g[1][0].conj() * col_i + g[1][1].conj() * col_j;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    /// Rebuild `U = D · G_K · … · G_1` from a decomposition.
    fn reconstruct(decomposition: &GivensDecomposition) -> Array2<Complex64> {
        let n = decomposition.diagonal.len();
        let mut m = Array2::from_diag(&ndarray::Array1::from(decomposition.diagonal.clone()));
        for rotation in decomposition.layers.iter().flatten().rev() {
            let g = rotation.matrix();
            let mut embedded = Array2::<Complex64>::eye(n);
            embedded[[rotation.i, rotation.i]] = g[0][0];
            embedded[[rotation.i, rotation.j]] = g[0][1];
            embedded[[rotation.j, rotation.i]] = g[1][0];
            embedded[[rotation.j, rotation.j]] = g[1][1];
            m = m.dot(&embedded);
        }
        m
    }

    fn assert_close(a: &Array2<Complex64>, b: &Array2<Complex64>) {
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).norm() < 1e-9, "{a:?}\n!=\n{b:?}");
        }
    }

    #[test]
    fn test_kron_identity2() {
        let m = array![[c(1.0, 0.0), c(2.0, 0.0)], [c(3.0, 0.0), c(4.0, 0.0)]];
        let k = kron_identity2(&m);
        assert_eq!(k.dim(), (4, 4));
        assert_eq!(k[[0, 2]], c(2.0, 0.0));
        assert_eq!(k[[1, 3]], c(2.0, 0.0));
        assert_eq!(k[[0, 3]], Complex64::ZERO);
        assert_eq!(even_submatrix(&k), m);
    }

    #[test]
    fn test_hermitian_deviation() {
        let h = array![[c(1.0, 0.0), c(0.0, 1.0)], [c(0.0, -1.0), c(2.0, 0.0)]];
        assert!(hermitian_deviation(&h) < 1e-15);
        let not_h = array![[c(1.0, 0.0), c(0.0, 1.0)], [c(0.0, 1.0), c(2.0, 0.0)]];
        assert!((hermitian_deviation(&not_h) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_givens_real_rotation() {
        let (s, co) = 0.3f64.sin_cos();
        let u = array![[c(co, 0.0), c(-s, 0.0)], [c(s, 0.0), c(co, 0.0)]];
        let decomposition = givens_decomposition_square(&u).unwrap();
        assert_eq!(decomposition.layers.len(), 1);
        assert_close(&reconstruct(&decomposition), &u);
    }

    #[test]
    fn test_givens_complex_unitary() {
        // Product of two complex rotations and a diagonal phase on 3 modes.
        let r1 = GivensRotation { i: 0, j: 1, theta: 0.7, phi: 0.4 };
        let r2 = GivensRotation { i: 1, j: 2, theta: -1.1, phi: 2.0 };
        let mut u = Array2::<Complex64>::eye(3);
        for r in [r1, r2] {
            let g = r.matrix();
            let mut e = Array2::<Complex64>::eye(3);
            e[[r.i, r.i]] = g[0][0];
            e[[r.i, r.j]] = g[0][1];
            e[[r.j, r.i]] = g[1][0];
            e[[r.j, r.j]] = g[1][1];
            u = u.dot(&e);
        }
        u[[2, 2]] *= Complex64::from_polar(1.0, 0.3);
        let decomposition = givens_decomposition_square(&u).unwrap();
        assert_close(&reconstruct(&decomposition), &u);
        for d in &decomposition.diagonal {
            assert!((d.norm() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_givens_permutation_with_zero_left_element() {
        let u = array![[c(0.0, 0.0), c(0.0, 1.0)], [c(1.0, 0.0), c(0.0, 0.0)]];
        let decomposition = givens_decomposition_square(&u).unwrap();
        assert_close(&reconstruct(&decomposition), &u);
    }

    #[test]
    fn test_givens_identity_needs_no_rotations() {
        let u = Array2::<Complex64>::eye(4);
        let decomposition = givens_decomposition_square(&u).unwrap();
        assert!(decomposition.layers.is_empty());
        assert!(decomposition.diagonal.iter().all(|d| (d - Complex64::ONE).norm() < 1e-12));
    }

    #[test]
    fn test_givens_rejects_non_square() {
        let m = Array2::<Complex64>::zeros((2, 3));
        assert!(matches!(
            givens_decomposition_square(&m),
            Err(SimError::ShapeMismatch { .. })
        ));
    }
}
