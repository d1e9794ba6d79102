//! Fermionic interaction operators.
//!
//! An [`InteractionOperator`] represents
//!
//! ```text
//! H = constant + Σ_pq T[p,q] a†_p a_q + Σ_pqrs V[p,q,r,s] a†_p a†_q a_r a_s
//! ```
//!
//! over `n` fermionic modes. In the spin-orbital basis, mode `2p` is the
//! spin-up and `2p + 1` the spin-down copy of spatial orbital `p`.

use ndarray::{Array2, Array4};
use num_complex::Complex64;

use crate::error::{SimError, SimResult};
use crate::linalg::EQ_TOLERANCE;

/// A fermionic Hamiltonian with one- and two-body terms.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionOperator {
    constant: f64,
    one_body: Array2<Complex64>,
    two_body: Array4<Complex64>,
}

impl InteractionOperator {
    /// Create an operator from its coefficient tensors.
    ///
    /// # Errors
    ///
    /// [`SimError::ShapeMismatch`] unless `one_body` is `n×n` and `two_body`
    /// is `n×n×n×n` for the same `n`.
    pub fn new(
        constant: f64,
        one_body: Array2<Complex64>,
        two_body: Array4<Complex64>,
    ) -> SimResult<Self> {
        let (rows, cols) = one_body.dim();
        if rows != cols {
            return Err(SimError::ShapeMismatch {
                context: "one-body tensor",
                expected: vec![rows, rows],
                got: vec![rows, cols],
            });
        }
        if two_body.shape() != [rows; 4] {
            return Err(SimError::ShapeMismatch {
                context: "two-body tensor",
                expected: vec![rows; 4],
                got: two_body.shape().to_vec(),
            });
        }
        Ok(Self {
            constant,
            one_body,
            two_body,
        })
    }

    /// Create an operator from real coefficient tensors.
    pub fn from_real(
        constant: f64,
        one_body: &Array2<f64>,
        two_body: &Array4<f64>,
    ) -> SimResult<Self> {
        Self::new(
            constant,
            one_body.mapv(|x| Complex64::new(x, 0.0)),
            two_body.mapv(|x| Complex64::new(x, 0.0)),
        )
    }

    /// Build the spin-orbital Hamiltonian of a molecule from spatial-orbital
    /// integrals.
    ///
    /// `one_body_integrals[p,q]` is `h_pq`; `two_body_integrals[p,q,r,s]` is
    /// the coefficient of `a†_p a†_q a_r a_s`, i.e. the chemist integral
    /// `(ps|qr)`. Both are duplicated across spin, and the two-body part is
    /// halved so that each pair is counted once.
    pub fn from_spatial_integrals(
        constant: f64,
        one_body_integrals: &Array2<f64>,
        two_body_integrals: &Array4<f64>,
    ) -> SimResult<Self> {
        let (n_orbitals, cols) = one_body_integrals.dim();
        if cols != n_orbitals {
            return Err(SimError::ShapeMismatch {
                context: "one-body integrals",
                expected: vec![n_orbitals, n_orbitals],
                got: vec![n_orbitals, cols],
            });
        }
        if two_body_integrals.shape() != [n_orbitals; 4] {
            return Err(SimError::ShapeMismatch {
                context: "two-body integrals",
                expected: vec![n_orbitals; 4],
                got: two_body_integrals.shape().to_vec(),
            });
        }

        let n = 2 * n_orbitals;
        let mut one_body = Array2::<f64>::zeros((n, n));
        let mut two_body = Array4::<f64>::zeros((n, n, n, n));
        for p in 0..n_orbitals {
            for q in 0..n_orbitals {
                one_body[[2 * p, 2 * q]] = one_body_integrals[[p, q]];
                one_body[[2 * p + 1, 2 * q + 1]] = one_body_integrals[[p, q]];
                for r in 0..n_orbitals {
                    for s in 0..n_orbitals {
                        let value = 0.5 * two_body_integrals[[p, q, r, s]];
                        // Mixed spin
                        two_body[[2 * p, 2 * q + 1, 2 * r + 1, 2 * s]] = value;
                        two_body[[2 * p + 1, 2 * q, 2 * r, 2 * s + 1]] = value;
                        // Same spin
                        two_body[[2 * p, 2 * q, 2 * r, 2 * s]] = value;
                        two_body[[2 * p + 1, 2 * q + 1, 2 * r + 1, 2 * s + 1]] = value;
                    }
                }
            }
        }
        Self::from_real(constant, &one_body, &two_body)
    }

    /// Number of fermionic modes.
    pub fn n_modes(&self) -> usize {
        self.one_body.nrows()
    }

    /// The constant energy shift.
    pub fn constant(&self) -> f64 {
        self.constant
    }

    /// One-body coefficients `T[p,q]`.
    pub fn one_body_tensor(&self) -> &Array2<Complex64> {
        &self.one_body
    }

    /// Two-body coefficients `V[p,q,r,s]`.
    pub fn two_body_tensor(&self) -> &Array4<Complex64> {
        &self.two_body
    }

    /// True if every coefficient has a negligible imaginary part.
    pub fn is_real(&self) -> bool {
        self.one_body
            .iter()
            .chain(self.two_body.iter())
            .all(|z| z.im.abs() < EQ_TOLERANCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_validates_shapes() {
        let err = InteractionOperator::new(
            0.0,
            Array2::zeros((2, 3)),
            Array4::zeros((2, 2, 2, 2)),
        )
        .unwrap_err();
        assert!(matches!(err, SimError::ShapeMismatch { context: "one-body tensor", .. }));

        let err = InteractionOperator::new(
            0.0,
            Array2::zeros((2, 2)),
            Array4::zeros((2, 2, 2, 3)),
        )
        .unwrap_err();
        assert!(matches!(err, SimError::ShapeMismatch { context: "two-body tensor", .. }));
    }

    #[test]
    fn test_is_real() {
        let mut one_body = Array2::<Complex64>::zeros((2, 2));
        one_body[[0, 1]] = Complex64::new(0.5, 0.0);
        let op = InteractionOperator::new(1.0, one_body.clone(), Array4::zeros((2, 2, 2, 2)))
            .unwrap();
        assert!(op.is_real());
        assert_eq!(op.n_modes(), 2);

        one_body[[0, 1]] = Complex64::new(0.5, 0.1);
        let op = InteractionOperator::new(1.0, one_body, Array4::zeros((2, 2, 2, 2))).unwrap();
        assert!(!op.is_real());
    }

    #[test]
    fn test_from_spatial_integrals() {
        let h1 = ndarray::array![[-1.25, 0.0], [0.0, -0.47]];
        let mut h2 = Array4::<f64>::zeros((2, 2, 2, 2));
        h2[[0, 0, 0, 0]] = 0.67;
        h2[[0, 1, 1, 0]] = 0.66;

        let op = InteractionOperator::from_spatial_integrals(0.71, &h1, &h2).unwrap();
        assert_eq!(op.n_modes(), 4);
        assert_eq!(op.constant(), 0.71);
        assert_eq!(op.one_body_tensor()[[1, 1]].re, -1.25);
        assert_eq!(op.one_body_tensor()[[3, 3]].re, -0.47);
        assert_eq!(op.one_body_tensor()[[0, 1]].re, 0.0);
        // Mixed-spin and same-spin copies, halved.
        assert!((op.two_body_tensor()[[0, 1, 1, 0]].re - 0.335).abs() < 1e-12);
        assert!((op.two_body_tensor()[[0, 3, 3, 0]].re - 0.33).abs() < 1e-12);
        assert!((op.two_body_tensor()[[1, 2, 2, 1]].re - 0.33).abs() < 1e-12);
        assert!(op.is_real());
    }
}
