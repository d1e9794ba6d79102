//! High-level circuit builder API.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::gate::Gate;
use crate::operation::Operation;
use crate::qubit::QubitId;

/// A quantum circuit.
///
/// An ordered list of operations over a fixed set of registered qubits.
/// Operations are validated against the register when appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    /// Name of the circuit.
    name: String,
    /// Qubits in the circuit, in registration order.
    qubits: Vec<QubitId>,
    /// Operations in application order.
    operations: Vec<Operation>,
}

impl Circuit {
    /// Create a new empty circuit.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            qubits: vec![],
            operations: vec![],
        }
    }

    /// Create a circuit over the given qubits.
    ///
    /// Repeated qubits are registered once.
    pub fn with_qubits(name: impl Into<String>, qubits: impl IntoIterator<Item = QubitId>) -> Self {
        let mut circuit = Self::new(name);
        for q in qubits {
            circuit.add_qubit(q);
        }
        circuit
    }

    /// Create a circuit over the line register `q0 .. q{n-1}`.
    pub fn line(name: impl Into<String>, num_qubits: u32) -> Self {
        Self::with_qubits(name, QubitId::range(num_qubits))
    }

    /// Register a qubit. Returns `false` if it was already present.
    pub fn add_qubit(&mut self, qubit: QubitId) -> bool {
        if self.qubits.contains(&qubit) {
            return false;
        }
        self.qubits.push(qubit);
        true
    }

    // =========================================================================
    // Appending operations
    // =========================================================================

    /// Append an operation.
    pub fn append(&mut self, operation: Operation) -> IrResult<&mut Self> {
        for &qubit in &operation.qubits {
            if !self.qubits.contains(&qubit) {
                return Err(IrError::QubitNotFound {
                    qubit,
                    gate_name: Some(operation.name().to_string()),
                });
            }
        }
        self.operations.push(operation);
        Ok(self)
    }

    /// Append every operation of an iterator, stopping at the first error.
    pub fn extend(&mut self, operations: impl IntoIterator<Item = Operation>) -> IrResult<&mut Self> {
        for op in operations {
            self.append(op)?;
        }
        Ok(self)
    }

    /// Apply a gate to the given qubits.
    pub fn gate(
        &mut self,
        gate: Gate,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        self.append(Operation::new(gate, qubits)?)
    }

    /// Apply a Z rotation by `rads` radians.
    pub fn rz(&mut self, rads: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate(Gate::rz(rads), [qubit])
    }

    /// Apply a phase of `rads` radians on `|11⟩`.
    pub fn cphase(&mut self, rads: f64, a: QubitId, b: QubitId) -> IrResult<&mut Self> {
        self.gate(Gate::cphase(rads), [a, b])
    }

    /// Apply XXYY evolution for `duration`.
    pub fn xxyy(&mut self, duration: f64, a: QubitId, b: QubitId) -> IrResult<&mut Self> {
        self.gate(Gate::xxyy(duration), [a, b])
    }

    /// Apply a SWAP gate.
    pub fn swap(&mut self, a: QubitId, b: QubitId) -> IrResult<&mut Self> {
        self.gate(Gate::Swap, [a, b])
    }

    /// Apply a fermionic SWAP gate.
    pub fn fswap(&mut self, a: QubitId, b: QubitId) -> IrResult<&mut Self> {
        self.gate(Gate::FSwap, [a, b])
    }

    // =========================================================================
    // Transformations
    // =========================================================================

    /// Remove rotations whose exponent is within `tolerance` of zero.
    ///
    /// Returns the number of operations removed.
    pub fn drop_negligible(&mut self, tolerance: f64) -> usize {
        let before = self.operations.len();
        self.operations.retain(|op| !op.gate.is_negligible(tolerance));
        before - self.operations.len()
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the circuit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.qubits.len()
    }

    /// Get the qubits in the circuit.
    pub fn qubits(&self) -> &[QubitId] {
        &self.qubits
    }

    /// Get the operations in application order.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Number of operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// True if the circuit has no operations.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Get the circuit depth.
    ///
    /// Operations are packed greedily into the earliest moment after the last
    /// operation on any of their qubits.
    pub fn depth(&self) -> usize {
        let mut level: FxHashMap<QubitId, usize> = FxHashMap::default();
        let mut depth = 0;
        for op in &self.operations {
            let moment = op
                .qubits
                .iter()
                .map(|q| level.get(q).copied().unwrap_or(0))
                .max()
                .unwrap_or(0)
                + 1;
            for &q in &op.qubits {
                level.insert(q, moment);
            }
            depth = depth.max(moment);
        }
        depth
    }

    /// Count operations by gate name.
    pub fn count_ops(&self) -> FxHashMap<&'static str, usize> {
        let mut counts = FxHashMap::default();
        for op in &self.operations {
            *counts.entry(op.name()).or_insert(0) += 1;
        }
        counts
    }

    /// Qubits that appear in at least one operation.
    pub fn active_qubits(&self) -> FxHashSet<QubitId> {
        self.operations
            .iter()
            .flat_map(|op| op.qubits.iter().copied())
            .collect()
    }
}
