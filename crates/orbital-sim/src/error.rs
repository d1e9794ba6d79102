//! Error types for the sim crate.

use thiserror::Error;

/// Errors produced by operator decomposition and Trotter step synthesis.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SimError {
    /// Tensor or matrix dimensions do not agree.
    #[error("Shape mismatch in {context}: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Where the mismatch was detected.
        context: &'static str,
        /// Expected shape.
        expected: Vec<usize>,
        /// Actual shape.
        got: Vec<usize>,
    },

    /// The two-body tensor does not flatten to a real symmetric matrix.
    #[error("Invalid two-body coefficient tensor: asymmetry {asymmetry:.3e}, imaginary norm {imaginary_norm:.3e}")]
    InvalidTwoBodyTensor {
        /// Sum of absolute differences between the array and its transpose.
        asymmetry: f64,
        /// Sum of absolute imaginary parts.
        imaginary_norm: f64,
    },

    /// In the spin-orbital basis the number of modes must be even.
    #[error("Spin-orbital basis requires an even number of modes, got {0}")]
    OddSpinOrbitals(usize),

    /// Requested rank is zero or exceeds the full rank.
    #[error("final_rank must be in 1..={full_rank}, got {requested}")]
    InvalidRank {
        /// The requested rank.
        requested: usize,
        /// Largest possible rank.
        full_rank: usize,
    },

    /// A matrix that must be Hermitian is not.
    #[error("Matrix is not Hermitian (max deviation {deviation:.3e})")]
    NonHermitian {
        /// Largest `|M[i,j] - conj(M[j,i])|`.
        deviation: f64,
    },

    /// A controlled Trotter step was used without a control qubit.
    #[error("Controlled Trotter step requires a control qubit")]
    MissingControlQubit,

    /// The qubit register is empty.
    #[error("Qubit register is empty")]
    EmptyRegister,

    /// Register size does not match the number of modes.
    #[error("Register has {got} qubits but the Hamiltonian acts on {expected} modes")]
    RegisterSizeMismatch {
        /// Number of modes in the Hamiltonian.
        expected: usize,
        /// Number of qubits supplied.
        got: usize,
    },

    /// Circuit builder returned an error.
    #[error("Circuit IR error: {0}")]
    Ir(#[from] orbital_ir::IrError),

    /// n_steps must be ≥ 1.
    #[error("n_steps must be at least 1, got {0}")]
    InvalidSteps(usize),
}

/// Result type for simulation synthesis operations.
pub type SimResult<T> = Result<T, SimError>;
