//! Trotter algorithms for interaction Hamiltonians.
//!
//! A [`TrotterAlgorithm`] turns a Hamiltonian into [`TrotterStep`]s. A step
//! emits the operations of one time slice as [`OpGroup`]s, reports how it
//! permutes the qubit ordering, and emits any cleanup once all slices have
//! been applied. [`TrotterEvolution`] drives a step over a full evolution.

mod evolution;
mod low_rank;

pub use evolution::TrotterEvolution;
pub use low_rank::{LOW_RANK, LowRankTrotterAlgorithm, LowRankTrotterStep, TrotterStepOps};

use orbital_ir::{Operation, QubitId};
use serde::{Deserialize, Serialize};

use crate::error::SimResult;
use crate::operator::InteractionOperator;

/// What a group of emitted operations implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupKind {
    /// Fermionic swap network carrying the off-diagonal one-body terms.
    OneBodyNetwork,
    /// Z rotation for one diagonal one-body term.
    OneBodyDiagonal,
    /// Basis change into the eigenbasis of the next two-body term.
    BasisChange,
    /// Swap network carrying the off-diagonal density-density terms.
    TwoBodyNetwork,
    /// Z rotation for one diagonal density-density term.
    TwoBodyDiagonal,
    /// Basis change back out of the last two-body eigenbasis.
    BasisUndo,
    /// Global phase from the constant term, on the control qubit.
    ConstantPhase,
    /// Fermionic swap network emitted for cleanup.
    FermionicSwaps,
    /// Plain swap network emitted for cleanup.
    QubitSwaps,
}

/// A batch of operations emitted together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpGroup {
    /// What the operations implement.
    pub kind: GroupKind,
    /// The operations, in application order.
    pub operations: Vec<Operation>,
}

impl OpGroup {
    /// Create a group.
    pub fn new(kind: GroupKind, operations: Vec<Operation>) -> Self {
        Self { kind, operations }
    }

    /// Number of operations in the group.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// True if the group has no operations.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

/// Which form of step to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepVariant {
    /// Plain time evolution.
    Asymmetric,
    /// Time evolution controlled on an ancilla qubit, for phase estimation.
    ControlledAsymmetric,
}

impl StepVariant {
    /// True for [`StepVariant::ControlledAsymmetric`].
    pub fn is_controlled(self) -> bool {
        matches!(self, StepVariant::ControlledAsymmetric)
    }
}

/// One slice of a Trotterized evolution.
pub trait TrotterStep {
    /// Operations to apply once before the first step.
    fn prepare(
        &self,
        _qubits: &[QubitId],
        _control_qubit: Option<QubitId>,
    ) -> SimResult<Vec<OpGroup>> {
        Ok(Vec::new())
    }

    /// Operations approximating evolution for `time` on `qubits`.
    fn trotter_step<'a>(
        &'a self,
        qubits: &[QubitId],
        time: f64,
        control_qubit: Option<QubitId>,
    ) -> SimResult<Box<dyn Iterator<Item = OpGroup> + 'a>>;

    /// The qubit ordering after one step.
    fn step_qubit_permutation(
        &self,
        qubits: &[QubitId],
        control_qubit: Option<QubitId>,
    ) -> (Vec<QubitId>, Option<QubitId>);

    /// Operations to apply after `n_steps` steps.
    fn finish(
        &self,
        qubits: &[QubitId],
        n_steps: usize,
        control_qubit: Option<QubitId>,
        omit_final_swaps: bool,
    ) -> SimResult<Vec<OpGroup>>;
}

/// A strategy for building Trotter steps from a Hamiltonian.
///
/// `Ok(None)` means the algorithm does not apply to the Hamiltonian.
pub trait TrotterAlgorithm {
    /// The step type produced.
    type Step: TrotterStep;

    /// A step for plain time evolution.
    fn asymmetric(&self, hamiltonian: &InteractionOperator) -> SimResult<Option<Self::Step>>;

    /// A step for time evolution controlled on an ancilla.
    fn controlled_asymmetric(
        &self,
        hamiltonian: &InteractionOperator,
    ) -> SimResult<Option<Self::Step>>;
}
