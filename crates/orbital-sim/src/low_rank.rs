//! Low-rank factorization of the two-body interaction.
//!
//! The two-body part of an [`InteractionOperator`] is rewritten in chemist
//! ordering `V = Σ_pqrs W[p,q,r,s] a†_p a_q a†_r a_s` and `W`, flattened to
//! an `n² × n²` real symmetric matrix, is diagonalized:
//!
//! ```text
//! V = Σ_l λ_l (Σ_pq g_l[p,q] a†_p a_q)² + one-body correction
//! ```
//!
//! Terms are ordered by their contribution and truncated once the discarded
//! weight falls below a threshold.

use nalgebra::{DMatrix, SymmetricEigen};
use ndarray::{Array1, Array2, Array4};
use num_complex::Complex64;
use tracing::{debug, warn};

use crate::error::{SimError, SimResult};
use crate::linalg::{
    EQ_TOLERANCE, ensure_square, even_submatrix, hermitian_deviation, kron_identity2, to_array2,
    to_dmatrix,
};
use crate::operator::InteractionOperator;

/// Chemist-ordered two-body coefficients and the one-body correction that
/// reordering introduces.
#[derive(Debug, Clone)]
pub struct ChemistTwoBody {
    /// `W[p,q,r,s]` over spatial orbitals (or all modes without spin).
    pub coefficients: Array4<Complex64>,
    /// Spin-orbital one-body correction, `2n × 2n`.
    pub one_body_correction: Array2<Complex64>,
}

/// Reorder two-body coefficients into chemist ordering.
///
/// `W[p,q,r,s] = V[p,r,s,q]`. With `spin_basis`, the tensor is restricted to
/// the (up, up, down, down) block and indexed by spatial orbital. Moving
/// `a_q` past `a†_r` leaves `-Σ_q W[p,q,q,s] a†_p a_s` behind for each spin,
/// which is returned as a one-body correction.
pub fn get_chemist_two_body_coefficients(
    two_body: &Array4<Complex64>,
    spin_basis: bool,
) -> SimResult<ChemistTwoBody> {
    let shape = two_body.shape();
    let n_modes = shape[0];
    if shape != [n_modes; 4] {
        return Err(SimError::ShapeMismatch {
            context: "two-body tensor",
            expected: vec![n_modes; 4],
            got: shape.to_vec(),
        });
    }

    let (n_orbitals, coefficients) = if spin_basis {
        if n_modes % 2 != 0 {
            return Err(SimError::OddSpinOrbitals(n_modes));
        }
        let n = n_modes / 2;
        let w = Array4::from_shape_fn((n, n, n, n), |(p, q, r, s)| {
            two_body[[2 * p, 2 * r + 1, 2 * s + 1, 2 * q]]
        });
        (n, w)
    } else {
        let w = Array4::from_shape_fn((n_modes, n_modes, n_modes, n_modes), |(p, q, r, s)| {
            two_body[[p, r, s, q]]
        });
        (n_modes, w)
    };

    let mut one_body_correction = Array2::<Complex64>::zeros((2 * n_orbitals, 2 * n_orbitals));
    for p in 0..n_orbitals {
        for s in 0..n_orbitals {
            let contraction: Complex64 = (0..n_orbitals).map(|q| coefficients[[p, q, q, s]]).sum();
            for sigma in 0..2 {
                one_body_correction[[2 * p + sigma, 2 * s + sigma]] -= contraction;
            }
        }
    }

    Ok(ChemistTwoBody {
        coefficients,
        one_body_correction,
    })
}

/// A truncated low-rank factorization of the two-body interaction.
#[derive(Debug, Clone)]
pub struct LowRankDecomposition {
    /// `λ_l` for each retained term, in decreasing order of contribution.
    pub eigenvalues: Vec<f64>,
    /// `g_l ⊗ I₂` for each retained term, Hermitian spin-orbital matrices.
    pub one_body_squares: Vec<Array2<Complex64>>,
    /// One-body correction from reordering into chemist form.
    pub one_body_correction: Array2<Complex64>,
    /// Contribution of the discarded terms.
    pub truncation_value: f64,
}

impl LowRankDecomposition {
    /// Number of retained terms.
    pub fn rank(&self) -> usize {
        self.eigenvalues.len()
    }
}

/// Factor the two-body interaction into a sum of squared one-body operators.
///
/// Each term is weighted by `|λ_l| (Σ_pq |(g_l ⊗ I₂)[p,q]|)²`, the L1 norm
/// taken over the spin-orbital matrix that is returned. Terms are sorted by
/// weight and the shortest prefix whose discarded weight is at most
/// `truncation_threshold` is kept, unless `final_rank` fixes the count.
///
/// # Errors
///
/// - [`SimError::InvalidTwoBodyTensor`] if the flattened chemist tensor is
///   not real symmetric within `1e-8`.
/// - [`SimError::InvalidRank`] if `final_rank` is zero or exceeds `n²`.
/// - [`SimError::OddSpinOrbitals`] for an odd mode count with `spin_basis`.
pub fn low_rank_two_body_decomposition(
    two_body: &Array4<Complex64>,
    truncation_threshold: f64,
    final_rank: Option<usize>,
    spin_basis: bool,
) -> SimResult<LowRankDecomposition> {
    let chemist = get_chemist_two_body_coefficients(two_body, spin_basis)?;
    let n = chemist.coefficients.shape()[0];
    let full_rank = n * n;

    let mut asymmetry = 0.0;
    let mut imaginary_norm = 0.0;
    let interaction = DMatrix::<f64>::from_fn(full_rank, full_rank, |row, col| {
        let w = chemist.coefficients[[row / n, row % n, col / n, col % n]];
        let transposed = chemist.coefficients[[col / n, col % n, row / n, row % n]];
        asymmetry += (w - transposed).norm();
        imaginary_norm += w.im.abs();
        w.re
    });
    if asymmetry > EQ_TOLERANCE || imaginary_norm > EQ_TOLERANCE {
        return Err(SimError::InvalidTwoBodyTensor {
            asymmetry,
            imaginary_norm,
        });
    }
    if let Some(rank) = final_rank {
        if rank == 0 || rank > full_rank {
            return Err(SimError::InvalidRank {
                requested: rank,
                full_rank,
            });
        }
    }

    let eigen = SymmetricEigen::new(interaction);

    let mut terms: Vec<(f64, f64, Array2<Complex64>)> = (0..full_rank)
        .map(|l| {
            let vector = eigen.eigenvectors.column(l);
            let square = kron_identity2(&Array2::from_shape_fn((n, n), |(p, q)| {
                Complex64::new(vector[p * n + q], 0.0)
            }));
            // L1 norm over the spin-orbital matrix.
            let l1_norm: f64 = square.iter().map(|z| z.norm()).sum();
            let lambda = eigen.eigenvalues[l];
            (lambda.abs() * l1_norm * l1_norm, lambda, square)
        })
        .collect();
    terms.sort_by(|a, b| b.0.total_cmp(&a.0));

    let total: f64 = terms.iter().map(|t| t.0).sum();
    let mut kept_weight = 0.0;
    let truncation_errors: Vec<f64> = terms
        .iter()
        .map(|t| {
            kept_weight += t.0;
            total - kept_weight
        })
        .collect();

    let rank = final_rank.unwrap_or_else(|| {
        truncation_errors
            .iter()
            .position(|&e| e <= truncation_threshold)
            .map_or(1, |i| i + 1)
    });
    let Some(&truncation_value) = truncation_errors.get(rank.wrapping_sub(1)) else {
        // Only reachable with zero modes.
        return Err(SimError::InvalidRank {
            requested: rank,
            full_rank,
        });
    };

    if final_rank.is_none() && truncation_value > truncation_threshold {
        warn!(
            truncation_value,
            truncation_threshold, "No rank reaches the truncation threshold, keeping one term"
        );
    }

    debug!(
        n_orbitals = n,
        full_rank,
        rank,
        truncation_value,
        "Low-rank two-body decomposition"
    );

    let (eigenvalues, one_body_squares) = terms
        .into_iter()
        .take(rank)
        .map(|(_, lambda, square)| (lambda, square))
        .unzip();

    Ok(LowRankDecomposition {
        eigenvalues,
        one_body_squares,
        one_body_correction: chemist.one_body_correction,
        truncation_value,
    })
}

/// Diagonalization of a squared one-body operator `(Σ_pq M[p,q] a†_p a_q)²`.
#[derive(Debug, Clone)]
pub struct SquaredOneBodyEvolution {
    /// `d_p d_q` for the eigenvalues `d` of `M`.
    pub density_density_matrix: Array2<f64>,
    /// Unitary mapping the original orbitals onto the eigenbasis of `M`.
    pub basis_change_matrix: Array2<Complex64>,
}

/// Diagonalize a Hermitian one-body matrix so that its square becomes a
/// density-density interaction.
///
/// With `spin_basis`, `one_body_matrix` must be of the form `g ⊗ I₂`; only
/// the spin-up block is diagonalized and the results are expanded back to
/// spin orbitals.
///
/// # Errors
///
/// [`SimError::NonHermitian`] if the matrix is not Hermitian within `1e-8`.
pub fn prepare_one_body_squared_evolution(
    one_body_matrix: &Array2<Complex64>,
    spin_basis: bool,
) -> SimResult<SquaredOneBodyEvolution> {
    ensure_square(one_body_matrix, "one-body square")?;
    let matrix = if spin_basis {
        even_submatrix(one_body_matrix)
    } else {
        one_body_matrix.clone()
    };
    let deviation = hermitian_deviation(&matrix);
    if deviation > EQ_TOLERANCE {
        return Err(SimError::NonHermitian { deviation });
    }

    let eigen = SymmetricEigen::new(to_dmatrix(&matrix));
    let mut eigenvalues = Array1::from_iter(eigen.eigenvalues.iter().copied());
    // Rows of the basis change are the conjugated eigenvectors.
    let mut basis_change_matrix = to_array2(&eigen.eigenvectors).t().mapv(|z| z.conj());

    if spin_basis {
        basis_change_matrix = kron_identity2(&basis_change_matrix);
        eigenvalues = eigenvalues.iter().flat_map(|&d| [d, d]).collect();
    }

    let n = eigenvalues.len();
    let density_density_matrix =
        Array2::from_shape_fn((n, n), |(p, q)| eigenvalues[p] * eigenvalues[q]);

    Ok(SquaredOneBodyEvolution {
        density_density_matrix,
        basis_change_matrix,
    })
}

/// The effective one-body coefficients `T + correction` of a decomposed
/// operator.
pub fn effective_one_body(
    hamiltonian: &InteractionOperator,
    decomposition: &LowRankDecomposition,
) -> SimResult<Array2<Complex64>> {
    let one_body = hamiltonian.one_body_tensor();
    let correction = &decomposition.one_body_correction;
    if one_body.dim() != correction.dim() {
        let (rows, cols) = correction.dim();
        return Err(SimError::ShapeMismatch {
            context: "one-body correction",
            expected: one_body.shape().to_vec(),
            got: vec![rows, cols],
        });
    }
    Ok(one_body + correction)
}
