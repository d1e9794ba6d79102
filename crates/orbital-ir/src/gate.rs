//! Quantum gate types.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::angle::{AngleSpec, half_turns_from_duration, half_turns_from_rads};
use crate::error::IrResult;
use crate::operation::Operation;
use crate::qubit::QubitId;

/// The fermionic simulation gate set.
///
/// Rotation gates carry their exponent in half turns. Controlled gates take
/// the control as their first qubit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Gate {
    // Single-qubit gates
    /// Rotation around Z, `Z^t`.
    Rz(f64),

    // Two-qubit gates
    /// Phase `e^{iπt}` on `|11⟩`, `CZ^t`.
    CPhase(f64),
    /// `exp(-i π t (XX + YY) / 4)`, hopping between the two modes.
    Xxyy(f64),
    /// `exp(-i π t (YX - XY) / 4)`, a real Givens rotation.
    Yxxy(f64),
    /// SWAP gate.
    Swap,
    /// Fermionic SWAP: SWAP followed by CZ.
    FSwap,

    // Three-qubit gates
    /// Phase `e^{iπt}` on `|111⟩`, `CCZ^t`.
    CcPhase(f64),
    /// [`Gate::Xxyy`] controlled on the first qubit.
    ControlledXxyy(f64),
}

impl Gate {
    /// Z rotation by `rads` radians.
    pub fn rz(rads: f64) -> Self {
        Gate::Rz(half_turns_from_rads(rads))
    }

    /// Phase of `rads` radians on `|11⟩`.
    pub fn cphase(rads: f64) -> Self {
        Gate::CPhase(half_turns_from_rads(rads))
    }

    /// Phase of `rads` radians on `|111⟩`.
    pub fn ccphase(rads: f64) -> Self {
        Gate::CcPhase(half_turns_from_rads(rads))
    }

    /// XXYY evolution for the given duration.
    pub fn xxyy(duration: f64) -> Self {
        Gate::Xxyy(half_turns_from_duration(duration))
    }

    /// Controlled XXYY evolution for the given duration.
    pub fn controlled_xxyy(duration: f64) -> Self {
        Gate::ControlledXxyy(half_turns_from_duration(duration))
    }

    /// Givens rotation `YXXY^t`.
    pub fn yxxy(half_turns: f64) -> Self {
        Gate::Yxxy(half_turns)
    }

    /// Get the name of this gate.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Gate::Rz(_) => "rz",
            Gate::CPhase(_) => "cphase",
            Gate::Xxyy(_) => "xxyy",
            Gate::Yxxy(_) => "yxxy",
            Gate::Swap => "swap",
            Gate::FSwap => "fswap",
            Gate::CcPhase(_) => "ccphase",
            Gate::ControlledXxyy(_) => "cxxyy",
        }
    }

    /// Get the number of qubits this gate operates on.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            Gate::Rz(_) => 1,
            Gate::CPhase(_) | Gate::Xxyy(_) | Gate::Yxxy(_) | Gate::Swap | Gate::FSwap => 2,
            Gate::CcPhase(_) | Gate::ControlledXxyy(_) => 3,
        }
    }

    /// The exponent in half turns, or `None` for the fixed permutation gates.
    pub fn half_turns(&self) -> Option<f64> {
        match *self {
            Gate::Rz(t)
            | Gate::CPhase(t)
            | Gate::Xxyy(t)
            | Gate::Yxxy(t)
            | Gate::CcPhase(t)
            | Gate::ControlledXxyy(t) => Some(t),
            Gate::Swap | Gate::FSwap => None,
        }
    }

    /// The exponent in radians.
    pub fn rads(&self) -> Option<f64> {
        self.half_turns().map(|t| t * PI)
    }

    /// True for SWAP and FSWAP.
    pub fn is_permutation(&self) -> bool {
        matches!(self, Gate::Swap | Gate::FSwap)
    }

    /// True if this gate carries a control qubit.
    pub fn is_controlled(&self) -> bool {
        matches!(self, Gate::CcPhase(_) | Gate::ControlledXxyy(_))
    }

    /// True if the exponent is within `tolerance` of zero.
    ///
    /// Permutation gates are never negligible.
    pub fn is_negligible(&self, tolerance: f64) -> bool {
        self.half_turns().is_some_and(|t| t.abs() <= tolerance)
    }

    /// Replace the exponent using an angle specification.
    ///
    /// The current exponent is used when `spec` is empty. Permutation gates
    /// are returned unchanged.
    pub fn with_angle(self, spec: &AngleSpec) -> IrResult<Self> {
        let Some(current) = self.half_turns() else {
            return Ok(self);
        };
        let t = spec.to_half_turns(current)?;
        Ok(match self {
            Gate::Rz(_) => Gate::Rz(t),
            Gate::CPhase(_) => Gate::CPhase(t),
            Gate::Xxyy(_) => Gate::Xxyy(t),
            Gate::Yxxy(_) => Gate::Yxxy(t),
            Gate::CcPhase(_) => Gate::CcPhase(t),
            Gate::ControlledXxyy(_) => Gate::ControlledXxyy(t),
            Gate::Swap | Gate::FSwap => self,
        })
    }

    /// Apply this gate to `qubits`, validating arity and distinctness.
    pub fn on(self, qubits: impl IntoIterator<Item = QubitId>) -> IrResult<Operation> {
        Operation::new(self, qubits)
    }
}
