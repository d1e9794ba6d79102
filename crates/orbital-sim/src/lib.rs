//! `orbital-sim`: Trotter circuits for molecular interaction Hamiltonians.
//!
//! Converts an [`InteractionOperator`] into `orbital_ir` operations that
//! approximate `exp(-i H t)` using the **low-rank** strategy: the two-body
//! interaction is factored into squared one-body operators, each simulated
//! in its own eigenbasis with Givens rotations and a swap network of
//! density-density phases.
//!
//! Both plain and controlled (phase-estimation) steps are available.
//!
//! # Quick start
//!
//! ```rust
//! use ndarray::{Array2, Array4};
//! use orbital_ir::QubitId;
//! use orbital_sim::trotter::{LOW_RANK, TrotterAlgorithm, TrotterEvolution};
//! use orbital_sim::InteractionOperator;
//!
//! // Two spin-orbitals with a hopping term.
//! let mut one_body = Array2::<f64>::zeros((2, 2));
//! one_body[[0, 1]] = -1.0;
//! one_body[[1, 0]] = -1.0;
//! let h = InteractionOperator::from_real(0.0, &one_body, &Array4::zeros((2, 2, 2, 2))).unwrap();
//!
//! let step = LOW_RANK.asymmetric(&h).unwrap().expect("real Hamiltonian");
//! let circuit = TrotterEvolution::new(&step, QubitId::range(2), 1.0, 4)
//!     .circuit()
//!     .unwrap();
//! assert_eq!(circuit.num_qubits(), 2);
//! assert!(!circuit.is_empty());
//! ```

pub mod error;
pub mod linalg;
pub mod low_rank;
pub mod operator;
pub mod primitives;
pub mod trotter;

pub use error::{SimError, SimResult};
pub use low_rank::{
    LowRankDecomposition, low_rank_two_body_decomposition, prepare_one_body_squared_evolution,
};
pub use operator::InteractionOperator;
pub use trotter::{
    GroupKind, LowRankTrotterAlgorithm, LowRankTrotterStep, OpGroup, StepVariant,
    TrotterAlgorithm, TrotterEvolution, TrotterStep,
};
