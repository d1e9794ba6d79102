//! Single-particle basis changes.

use ndarray::Array2;
use num_complex::Complex64;
use orbital_ir::{Gate, Operation, QubitId};

use crate::error::{SimError, SimResult};
use crate::linalg::{GivensDecomposition, ensure_square, givens_decomposition_square};

/// Operations that rotate the modes on `qubits` by the unitary
/// `transformation_matrix`, mapping `a†_p` to `Σ_q U[p,q] a†_q`.
///
/// Only particle-number-conserving transformations (`n × n` for `n`
/// qubits) are supported.
///
/// # Errors
///
/// [`SimError::ShapeMismatch`] unless the matrix is `n × n`.
pub fn bogoliubov_transform(
    qubits: &[QubitId],
    transformation_matrix: &Array2<Complex64>,
) -> SimResult<Vec<Operation>> {
    let n = ensure_square(transformation_matrix, "bogoliubov transform")?;
    if n != qubits.len() {
        return Err(SimError::ShapeMismatch {
            context: "bogoliubov transform",
            expected: vec![qubits.len(), qubits.len()],
            got: vec![n, n],
        });
    }
    let decomposition = givens_decomposition_square(transformation_matrix)?;
    Ok(slater_basis_change(qubits, &decomposition))
}

/// Operations realizing a Givens decomposition on `qubits`.
///
/// `qubits` holds one qubit per row of the decomposed matrix.
pub(crate) fn slater_basis_change(
    qubits: &[QubitId],
    decomposition: &GivensDecomposition,
) -> Vec<Operation> {
    debug_assert_eq!(decomposition.diagonal.len(), qubits.len());

    let mut ops: Vec<Operation> = decomposition
        .diagonal
        .iter()
        .zip(qubits)
        .map(|(d, &q)| Operation::single(Gate::rz(d.arg()), q))
        .collect();

    for layer in decomposition.layers.iter().rev() {
        for rotation in layer {
            let (a, b) = (qubits[rotation.i], qubits[rotation.j]);
            ops.push(Operation::pair(
                Gate::yxxy(2.0 * rotation.theta / std::f64::consts::PI),
                a,
                b,
            ));
            ops.push(Operation::single(Gate::rz(rotation.phi), b));
        }
    }
    ops
}
