//! Multi-step Trotter evolution.
//!
//! Repeats a [`TrotterStep`] `n_steps` times at `time / n_steps`, threading
//! the qubit ordering each step leaves behind into the next, then appends the
//! step's cleanup.

use orbital_ir::{Circuit, QubitId};
use tracing::debug;

use super::{OpGroup, TrotterStep};
use crate::error::{SimError, SimResult};

/// Trotterized time evolution driven by a single step type.
pub struct TrotterEvolution<'a, S: TrotterStep> {
    step: &'a S,
    qubits: Vec<QubitId>,
    /// Total evolution time t.
    time: f64,
    /// Number of Trotter steps (repetitions).
    n_steps: usize,
    control_qubit: Option<QubitId>,
    omit_final_swaps: bool,
}

impl<'a, S: TrotterStep> TrotterEvolution<'a, S> {
    /// Evolve `qubits` for total time `time` in `n_steps` slices.
    pub fn new(step: &'a S, qubits: impl Into<Vec<QubitId>>, time: f64, n_steps: usize) -> Self {
        Self {
            step,
            qubits: qubits.into(),
            time,
            n_steps,
            control_qubit: None,
            omit_final_swaps: false,
        }
    }

    /// Control the evolution on `qubit`.
    #[must_use]
    pub fn with_control_qubit(mut self, qubit: QubitId) -> Self {
        self.control_qubit = Some(qubit);
        self
    }

    /// Leave the qubit ordering as the last step left it.
    #[must_use]
    pub fn omit_final_swaps(mut self, omit: bool) -> Self {
        self.omit_final_swaps = omit;
        self
    }

    /// All operation groups of the evolution, in order.
    pub fn ops(&self) -> SimResult<Vec<OpGroup>> {
        self.validate()?;
        let step_time = self.time / self.n_steps as f64;
        debug!(
            n_steps = self.n_steps,
            n_qubits = self.qubits.len(),
            step_time,
            controlled = self.control_qubit.is_some(),
            "Synthesising Trotter evolution"
        );

        let mut groups = self.step.prepare(&self.qubits, self.control_qubit)?;
        let mut qubits = self.qubits.clone();
        let mut control = self.control_qubit;
        for _ in 0..self.n_steps {
            groups.extend(self.step.trotter_step(&qubits, step_time, control)?);
            (qubits, control) = self.step.step_qubit_permutation(&qubits, control);
        }
        groups.extend(self.step.finish(&qubits, self.n_steps, control, self.omit_final_swaps)?);
        Ok(groups)
    }

    /// The evolution as a circuit over the register and control qubit.
    pub fn circuit(&self) -> SimResult<Circuit> {
        let groups = self.ops()?;
        let mut circuit = Circuit::with_qubits(
            "trotter",
            self.qubits.iter().copied().chain(self.control_qubit),
        );
        circuit.extend(groups.into_iter().flat_map(|g| g.operations))?;
        Ok(circuit)
    }

    fn validate(&self) -> SimResult<()> {
        if self.qubits.is_empty() {
            return Err(SimError::EmptyRegister);
        }
        if self.n_steps == 0 {
            return Err(SimError::InvalidSteps(0));
        }
        Ok(())
    }
}
