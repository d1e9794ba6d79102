//! Trotter steps from a low-rank factorization of the two-body interaction.
//!
//! The two-body interaction is written as `Σ_j λ_j (Σ_pq g_jpq a†_p a_q)²`.
//! Each squared term is diagonal in the eigenbasis of `g_j`, so a step
//! rotates into that basis with Givens rotations, applies the
//! density-density phases with a swap network, and moves on to the next
//! term's basis. The one-body part is simulated first, with a fermionic
//! swap network.
//!
//! Every swap network reverses the qubit ordering. A step with `J` terms
//! therefore leaves the ordering reversed when `J` is even and unchanged
//! when it is odd.

use std::iter::FusedIterator;

use ndarray::Array2;
use num_complex::Complex64;
use orbital_ir::{Gate, IrError, Operation, QubitId};
use tracing::{debug, trace};

use super::{GroupKind, OpGroup, StepVariant, TrotterAlgorithm, TrotterStep};
use crate::error::{SimError, SimResult};
use crate::linalg::{GivensDecomposition, dagger, givens_decomposition_square};
use crate::low_rank::{
    LowRankDecomposition, effective_one_body, low_rank_two_body_decomposition,
    prepare_one_body_squared_evolution,
};
use crate::operator::InteractionOperator;
use crate::primitives::{slater_basis_change, swap_network, swap_network_permutation};

/// Default truncation threshold on the discarded two-body weight.
pub const DEFAULT_TRUNCATION_THRESHOLD: f64 = 1e-8;

/// The low-rank algorithm with default settings.
pub static LOW_RANK: LowRankTrotterAlgorithm = LowRankTrotterAlgorithm::new();

// ---------------------------------------------------------------------------
// Algorithm
// ---------------------------------------------------------------------------

/// Builds [`LowRankTrotterStep`]s for interaction operators with real
/// coefficients.
///
/// The number of retained terms `J` is either fixed with
/// [`with_final_rank`](Self::with_final_rank) or chosen as the smallest `J`
/// whose discarded weight `Σ_{l ≥ J} |λ_l| (Σ_pq |(g_l ⊗ I₂)_pq|)²` is at
/// most the truncation threshold. The norm runs over the spin-orbital matrix
/// `g_l ⊗ I₂`, so it is four times the spatial one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LowRankTrotterAlgorithm {
    truncation_threshold: f64,
    final_rank: Option<usize>,
    spin_basis: bool,
}

impl LowRankTrotterAlgorithm {
    /// Threshold `1e-8`, no fixed rank, spin-orbital basis.
    pub const fn new() -> Self {
        Self {
            truncation_threshold: DEFAULT_TRUNCATION_THRESHOLD,
            final_rank: None,
            spin_basis: true,
        }
    }

    /// Set the truncation threshold.
    #[must_use]
    pub fn with_truncation_threshold(mut self, threshold: f64) -> Self {
        self.truncation_threshold = threshold;
        self
    }

    /// Keep exactly `rank` terms.
    #[must_use]
    pub fn with_final_rank(mut self, rank: usize) -> Self {
        self.final_rank = Some(rank);
        self
    }

    /// Whether the Hamiltonian is in the spin-orbital basis.
    #[must_use]
    pub fn with_spin_basis(mut self, spin_basis: bool) -> Self {
        self.spin_basis = spin_basis;
        self
    }

    /// The truncation threshold.
    pub fn truncation_threshold(&self) -> f64 {
        self.truncation_threshold
    }

    /// The fixed rank, if any.
    pub fn final_rank(&self) -> Option<usize> {
        self.final_rank
    }

    /// Whether the Hamiltonian is in the spin-orbital basis.
    pub fn spin_basis(&self) -> bool {
        self.spin_basis
    }

    fn build(
        &self,
        hamiltonian: &InteractionOperator,
        variant: StepVariant,
    ) -> SimResult<Option<LowRankTrotterStep>> {
        if !hamiltonian.is_real() {
            debug!(?variant, "Low-rank step skipped: Hamiltonian has complex coefficients");
            return Ok(None);
        }
        LowRankTrotterStep::new(
            hamiltonian,
            self.truncation_threshold,
            self.final_rank,
            self.spin_basis,
            variant,
        )
        .map(Some)
    }
}

impl Default for LowRankTrotterAlgorithm {
    fn default() -> Self {
        Self::new()
    }
}

impl TrotterAlgorithm for LowRankTrotterAlgorithm {
    type Step = LowRankTrotterStep;

    fn asymmetric(&self, hamiltonian: &InteractionOperator) -> SimResult<Option<Self::Step>> {
        self.build(hamiltonian, StepVariant::Asymmetric)
    }

    fn controlled_asymmetric(
        &self,
        hamiltonian: &InteractionOperator,
    ) -> SimResult<Option<Self::Step>> {
        self.build(hamiltonian, StepVariant::ControlledAsymmetric)
    }
}

// ---------------------------------------------------------------------------
// Step
// ---------------------------------------------------------------------------

/// A low-rank Trotter step, with its decomposition computed once.
#[derive(Debug, Clone)]
pub struct LowRankTrotterStep {
    variant: StepVariant,
    constant: f64,
    eigenvalues: Vec<f64>,
    one_body_coefficients: Array2<Complex64>,
    scaled_density_density_matrices: Vec<Array2<f64>>,
    basis_change_matrices: Vec<Array2<Complex64>>,
    /// Givens decompositions of `B_{j-1} B_jᴴ` for each term `j`, then of
    /// `B_{J-1}` to return to the original basis.
    basis_rotations: Vec<GivensDecomposition>,
    truncation_value: f64,
}

impl LowRankTrotterStep {
    /// Decompose `hamiltonian` and prepare every retained term.
    ///
    /// # Errors
    ///
    /// Any error from the decomposition or term preparation, and
    /// [`SimError::ShapeMismatch`] if the one-body correction does not match
    /// the one-body tensor.
    pub fn new(
        hamiltonian: &InteractionOperator,
        truncation_threshold: f64,
        final_rank: Option<usize>,
        spin_basis: bool,
        variant: StepVariant,
    ) -> SimResult<Self> {
        let decomposition = low_rank_two_body_decomposition(
            hamiltonian.two_body_tensor(),
            truncation_threshold,
            final_rank,
            spin_basis,
        )?;
        Self::from_decomposition(hamiltonian, decomposition, variant)
    }

    /// Build a step from a precomputed decomposition.
    ///
    /// # Errors
    ///
    /// - [`SimError::ShapeMismatch`] if the one-body correction or a one-body
    ///   square does not match the one-body tensor.
    /// - [`SimError::NonHermitian`] if a one-body square is not Hermitian.
    pub fn from_decomposition(
        hamiltonian: &InteractionOperator,
        decomposition: LowRankDecomposition,
        variant: StepVariant,
    ) -> SimResult<Self> {
        let one_body_coefficients = effective_one_body(hamiltonian, &decomposition)?;
        let n_modes = one_body_coefficients.nrows();

        let mut scaled_density_density_matrices = Vec::with_capacity(decomposition.rank());
        let mut basis_change_matrices = Vec::with_capacity(decomposition.rank());
        for (lambda, square) in decomposition
            .eigenvalues
            .iter()
            .zip(&decomposition.one_body_squares)
        {
            // Squares are always spin-orbital matrices, whatever the basis of the input.
            let evolution = prepare_one_body_squared_evolution(square, true)?;
            if evolution.basis_change_matrix.dim() != (n_modes, n_modes) {
                let (rows, cols) = evolution.basis_change_matrix.dim();
                return Err(SimError::ShapeMismatch {
                    context: "one-body square",
                    expected: vec![n_modes, n_modes],
                    got: vec![rows, cols],
                });
            }
            scaled_density_density_matrices
                .push(evolution.density_density_matrix.mapv(|x| lambda * x));
            basis_change_matrices.push(evolution.basis_change_matrix);
        }

        let mut basis_rotations = Vec::with_capacity(basis_change_matrices.len() + 1);
        let mut prior: Option<&Array2<Complex64>> = None;
        for basis in &basis_change_matrices {
            let undo = dagger(basis);
            let merged = match prior {
                Some(prior) => prior.dot(&undo),
                None => undo,
            };
            basis_rotations.push(givens_decomposition_square(&merged)?);
            prior = Some(basis);
        }
        let last = match prior {
            Some(prior) => prior.clone(),
            None => Array2::eye(n_modes),
        };
        basis_rotations.push(givens_decomposition_square(&last)?);

        debug!(
            ?variant,
            n_modes,
            n_terms = decomposition.eigenvalues.len(),
            truncation_value = decomposition.truncation_value,
            "Prepared low-rank Trotter step"
        );

        Ok(Self {
            variant,
            constant: hamiltonian.constant(),
            eigenvalues: decomposition.eigenvalues,
            one_body_coefficients,
            scaled_density_density_matrices,
            basis_change_matrices,
            basis_rotations,
            truncation_value: decomposition.truncation_value,
        })
    }

    /// Which variant this step emits.
    pub fn variant(&self) -> StepVariant {
        self.variant
    }

    /// Number of fermionic modes.
    pub fn n_modes(&self) -> usize {
        self.one_body_coefficients.nrows()
    }

    /// Number of retained two-body terms `J`.
    pub fn n_terms(&self) -> usize {
        self.eigenvalues.len()
    }

    /// Eigenvalues `λ_j` of the retained terms.
    pub fn eigenvalues(&self) -> &[f64] {
        &self.eigenvalues
    }

    /// One-body tensor plus the chemist-ordering correction.
    pub fn one_body_coefficients(&self) -> &Array2<Complex64> {
        &self.one_body_coefficients
    }

    /// `λ_j d_p d_q` for each term.
    pub fn scaled_density_density_matrices(&self) -> &[Array2<f64>] {
        &self.scaled_density_density_matrices
    }

    /// Basis change into each term's eigenbasis.
    pub fn basis_change_matrices(&self) -> &[Array2<Complex64>] {
        &self.basis_change_matrices
    }

    /// The Hamiltonian's constant term.
    pub fn constant(&self) -> f64 {
        self.constant
    }

    /// Weight of the discarded two-body terms.
    pub fn truncation_value(&self) -> f64 {
        self.truncation_value
    }

    /// Lazily emit one step of evolution for `time`.
    ///
    /// The controlled variant needs `control_qubit`; the plain variant
    /// ignores it.
    ///
    /// # Errors
    ///
    /// - [`SimError::EmptyRegister`] or [`SimError::RegisterSizeMismatch`]
    ///   if `qubits` does not have one qubit per mode.
    /// - [`SimError::Ir`] with [`IrError::DuplicateQubit`] if a qubit is
    ///   repeated or the control is part of the register.
    /// - [`SimError::MissingControlQubit`] for the controlled variant without
    ///   a control qubit.
    pub fn step_ops(
        &self,
        qubits: &[QubitId],
        time: f64,
        control_qubit: Option<QubitId>,
    ) -> SimResult<TrotterStepOps<'_>> {
        let control = self.check_register(qubits, control_qubit)?;
        trace!(
            n_qubits = qubits.len(),
            time,
            controlled = control.is_some(),
            "Emitting low-rank Trotter step"
        );
        Ok(TrotterStepOps {
            step: self,
            qubits: qubits.to_vec(),
            time,
            control,
            stage: Stage::OneBodyNetwork,
        })
    }

    /// Validate the register, returning the control qubit to use.
    fn check_register(
        &self,
        qubits: &[QubitId],
        control_qubit: Option<QubitId>,
    ) -> SimResult<Option<QubitId>> {
        if qubits.is_empty() {
            return Err(SimError::EmptyRegister);
        }
        if qubits.len() != self.n_modes() {
            return Err(SimError::RegisterSizeMismatch {
                expected: self.n_modes(),
                got: qubits.len(),
            });
        }
        for (i, q) in qubits.iter().enumerate() {
            if qubits[..i].contains(q) {
                return Err(IrError::DuplicateQubit {
                    qubit: *q,
                    gate_name: None,
                }
                .into());
            }
        }
        self.check_control(control_qubit)?;
        match control_qubit {
            Some(c) if self.variant.is_controlled() => {
                if qubits.contains(&c) {
                    return Err(IrError::DuplicateQubit {
                        qubit: c,
                        gate_name: None,
                    }
                    .into());
                }
                Ok(Some(c))
            }
            _ => Ok(None),
        }
    }

    fn check_control(&self, control_qubit: Option<QubitId>) -> SimResult<()> {
        if self.variant.is_controlled() && control_qubit.is_none() {
            return Err(SimError::MissingControlQubit);
        }
        Ok(())
    }
}

impl TrotterStep for LowRankTrotterStep {
    fn trotter_step<'a>(
        &'a self,
        qubits: &[QubitId],
        time: f64,
        control_qubit: Option<QubitId>,
    ) -> SimResult<Box<dyn Iterator<Item = OpGroup> + 'a>> {
        Ok(Box::new(self.step_ops(qubits, time, control_qubit)?))
    }

    fn step_qubit_permutation(
        &self,
        qubits: &[QubitId],
        control_qubit: Option<QubitId>,
    ) -> (Vec<QubitId>, Option<QubitId>) {
        let mut permuted = qubits.to_vec();
        if self.n_terms() % 2 == 0 {
            permuted.reverse();
        }
        let control = if self.variant.is_controlled() {
            control_qubit
        } else {
            None
        };
        (permuted, control)
    }

    fn finish(
        &self,
        qubits: &[QubitId],
        n_steps: usize,
        control_qubit: Option<QubitId>,
        omit_final_swaps: bool,
    ) -> SimResult<Vec<OpGroup>> {
        self.check_control(control_qubit)?;
        if omit_final_swaps || n_steps % 2 == 0 {
            return Ok(Vec::new());
        }
        let mut groups = vec![OpGroup::new(
            GroupKind::FermionicSwaps,
            swap_network_permutation(qubits, true),
        )];
        if self.n_terms() % 2 == 0 {
            groups.push(OpGroup::new(
                GroupKind::QubitSwaps,
                swap_network_permutation(qubits, false),
            ));
        }
        Ok(groups)
    }
}

// ---------------------------------------------------------------------------
// Emission
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    OneBodyNetwork,
    OneBodyDiagonal(usize),
    BasisChange(usize),
    TwoBodyNetwork(usize),
    TwoBodyDiagonal { term: usize, mode: usize },
    BasisUndo,
    ConstantPhase,
    Done,
}

/// The operation groups of one low-rank Trotter step, produced on demand.
///
/// Created by [`LowRankTrotterStep::step_ops`]. Groups come in this order:
///
/// 1. [`GroupKind::OneBodyNetwork`], then one [`GroupKind::OneBodyDiagonal`]
///    per mode.
/// 2. For each two-body term: [`GroupKind::BasisChange`],
///    [`GroupKind::TwoBodyNetwork`], then one [`GroupKind::TwoBodyDiagonal`]
///    per mode.
/// 3. [`GroupKind::BasisUndo`].
/// 4. For the controlled variant, [`GroupKind::ConstantPhase`].
#[derive(Debug)]
pub struct TrotterStepOps<'a> {
    step: &'a LowRankTrotterStep,
    qubits: Vec<QubitId>,
    time: f64,
    control: Option<QubitId>,
    stage: Stage,
}

impl TrotterStepOps<'_> {
    /// Current logical-to-physical ordering.
    pub fn qubits(&self) -> &[QubitId] {
        &self.qubits
    }

    /// `Rz` on `qubit`, or a phase conditioned on the control.
    fn z_rotation(&self, rads: f64, qubit: QubitId) -> Operation {
        match self.control {
            Some(c) => Operation::pair(Gate::cphase(rads), c, qubit),
            None => Operation::single(Gate::rz(rads), qubit),
        }
    }

    fn one_body_network(&self) -> Vec<Operation> {
        let (coefficients, time, control) =
            (&self.step.one_body_coefficients, self.time, self.control);
        swap_network(&self.qubits, true, false, |p, q, a, b| {
            let duration = coefficients[[p, q]].re * time;
            Some(match control {
                Some(c) => Operation::controlled(Gate::controlled_xxyy(duration), c, a, b),
                None => Operation::pair(Gate::xxyy(duration), a, b),
            })
        })
    }

    fn two_body_network(&self, term: usize) -> Vec<Operation> {
        let (coefficients, time, control) = (
            &self.step.scaled_density_density_matrices[term],
            self.time,
            self.control,
        );
        swap_network(&self.qubits, false, false, |p, q, a, b| {
            let rads = -2.0 * coefficients[[p, q]] * time;
            Some(match control {
                Some(c) => Operation::controlled(Gate::ccphase(rads), c, a, b),
                None => Operation::pair(Gate::cphase(rads), a, b),
            })
        })
    }

    /// Leaves the basis of the previous term and enters that of `term`.
    /// `term == n_terms` returns to the original basis.
    fn basis_change(&self, term: usize) -> Vec<Operation> {
        slater_basis_change(&self.qubits, &self.step.basis_rotations[term])
    }
}

impl Iterator for TrotterStepOps<'_> {
    type Item = OpGroup;

    fn next(&mut self) -> Option<OpGroup> {
        let step = self.step;
        let n = self.qubits.len();
        loop {
            match self.stage {
                Stage::OneBodyNetwork => {
                    let ops = self.one_body_network();
                    self.qubits.reverse();
                    self.stage = Stage::OneBodyDiagonal(0);
                    return Some(OpGroup::new(GroupKind::OneBodyNetwork, ops));
                }
                Stage::OneBodyDiagonal(p) if p < n => {
                    let rads = -step.one_body_coefficients[[p, p]].re * self.time;
                    let op = self.z_rotation(rads, self.qubits[p]);
                    self.stage = Stage::OneBodyDiagonal(p + 1);
                    return Some(OpGroup::new(GroupKind::OneBodyDiagonal, vec![op]));
                }
                Stage::OneBodyDiagonal(_) => self.stage = Stage::BasisChange(0),
                Stage::BasisChange(term) if term < step.n_terms() => {
                    let ops = self.basis_change(term);
                    self.stage = Stage::TwoBodyNetwork(term);
                    return Some(OpGroup::new(GroupKind::BasisChange, ops));
                }
                Stage::BasisChange(_) => self.stage = Stage::BasisUndo,
                Stage::TwoBodyNetwork(term) => {
                    let ops = self.two_body_network(term);
                    self.qubits.reverse();
                    self.stage = Stage::TwoBodyDiagonal { term, mode: 0 };
                    return Some(OpGroup::new(GroupKind::TwoBodyNetwork, ops));
                }
                Stage::TwoBodyDiagonal { term, mode } if mode < n => {
                    let rads = -step.scaled_density_density_matrices[term][[mode, mode]] * self.time;
                    let op = self.z_rotation(rads, self.qubits[mode]);
                    self.stage = Stage::TwoBodyDiagonal {
                        term,
                        mode: mode + 1,
                    };
                    return Some(OpGroup::new(GroupKind::TwoBodyDiagonal, vec![op]));
                }
                Stage::TwoBodyDiagonal { term, .. } => self.stage = Stage::BasisChange(term + 1),
                Stage::BasisUndo => {
                    let ops = self.basis_change(step.n_terms());
                    self.stage = if self.control.is_some() {
                        Stage::ConstantPhase
                    } else {
                        Stage::Done
                    };
                    return Some(OpGroup::new(GroupKind::BasisUndo, ops));
                }
                Stage::ConstantPhase => {
                    self.stage = Stage::Done;
                    let control = self.control?;
                    let op = Operation::single(Gate::rz(-step.constant * self.time), control);
                    return Some(OpGroup::new(GroupKind::ConstantPhase, vec![op]));
                }
                Stage::Done => return None,
            }
        }
    }
}

impl FusedIterator for TrotterStepOps<'_> {}
