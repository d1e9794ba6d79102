//! Gate operations: a gate together with the qubits it acts on.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::gate::Gate;
use crate::qubit::QubitId;

/// A gate applied to specific qubits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// The gate.
    pub gate: Gate,
    /// Qubits the gate operates on, control first for controlled gates.
    pub qubits: Vec<QubitId>,
}

impl Operation {
    /// Create an operation, checking the qubit count and that the qubits are
    /// distinct.
    pub fn new(gate: Gate, qubits: impl IntoIterator<Item = QubitId>) -> IrResult<Self> {
        let qubits: Vec<QubitId> = qubits.into_iter().collect();
        if qubits.len() != gate.num_qubits() as usize {
            return Err(IrError::QubitCountMismatch {
                gate_name: gate.name().to_string(),
                expected: gate.num_qubits(),
                got: qubits.len() as u32,
            });
        }
        for (i, q) in qubits.iter().enumerate() {
            if qubits[..i].contains(q) {
                return Err(IrError::DuplicateQubit {
                    qubit: *q,
                    gate_name: Some(gate.name().to_string()),
                });
            }
        }
        Ok(Self { gate, qubits })
    }

    /// Create a single-qubit operation.
    pub fn single(gate: Gate, qubit: QubitId) -> Self {
        debug_assert_eq!(gate.num_qubits(), 1, "{} is not a 1-qubit gate", gate.name());
        Self {
            gate,
            qubits: vec![qubit],
        }
    }

    /// Create a two-qubit operation. The qubits must be distinct.
    pub fn pair(gate: Gate, a: QubitId, b: QubitId) -> Self {
        debug_assert_eq!(gate.num_qubits(), 2, "{} is not a 2-qubit gate", gate.name());
        Self {
            gate,
            qubits: vec![a, b],
        }
    }

    /// Create a controlled two-qubit operation. The qubits must be distinct.
    pub fn controlled(gate: Gate, control: QubitId, a: QubitId, b: QubitId) -> Self {
        debug_assert_eq!(gate.num_qubits(), 3, "{} is not a 3-qubit gate", gate.name());
        Self {
            gate,
            qubits: vec![control, a, b],
        }
    }

    /// Name of the underlying gate.
    pub fn name(&self) -> &'static str {
        self.gate.name()
    }

    /// True if this operation acts on `qubit`.
    pub fn acts_on(&self, qubit: QubitId) -> bool {
        self.qubits.contains(&qubit)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.gate.name())?;
        if let Some(t) = self.gate.half_turns() {
            write!(f, "^{t}")?;
        }
        let qubits: Vec<String> = self.qubits.iter().map(ToString::to_string).collect();
        write!(f, "({})", qubits.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_validates_arity() {
        let err = Operation::new(Gate::FSwap, [QubitId(0)]).unwrap_err();
        assert!(matches!(
            err,
            IrError::QubitCountMismatch {
                expected: 2,
                got: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_new_rejects_duplicates() {
        let err = Operation::new(Gate::CcPhase(0.5), [QubitId(0), QubitId(1), QubitId(0)])
            .unwrap_err();
        assert!(matches!(err, IrError::DuplicateQubit { qubit: QubitId(0), .. }));
    }

    #[test]
    fn test_display() {
        let op = Gate::Yxxy(0.5).on([QubitId(1), QubitId(2)]).unwrap();
        assert_eq!(op.to_string(), "yxxy^0.5(q1, q2)");
        assert_eq!(Operation::pair(Gate::Swap, QubitId(0), QubitId(1)).to_string(), "swap(q0, q1)");
    }

    #[test]
    fn test_constructors() {
        let op = Operation::controlled(Gate::CcPhase(1.0), QubitId(4), QubitId(0), QubitId(1));
        assert_eq!(op.qubits, vec![QubitId(4), QubitId(0), QubitId(1)]);
        assert!(op.acts_on(QubitId(4)));
        assert!(!op.acts_on(QubitId(2)));
    }
}
