//! Orbital circuit representation
//!
//! This crate provides the gate set and circuit containers used by the
//! fermionic simulation algorithms in `orbital-sim`. It is deliberately
//! small: circuits are flat, ordered lists of [`Operation`]s, and every
//! rotation stores its angle as an exponent in half turns.
//!
//! # Core Components
//!
//! - **Qubits**: [`QubitId`] for addressing qubits
//! - **Gates**: [`Gate`] for the fermionic gate set (XXYY, YXXY, controlled
//!   phases, fermionic swap, ...)
//! - **Angles**: [`AngleSpec`] and [`chosen_angle_to_half_turns`] for
//!   converting radians, degrees and durations into half turns
//! - **Operations**: [`Operation`] combining a gate with its qubits
//! - **Circuit**: [`Circuit`] builder API
//!
//! # Example
//!
//! ```rust
//! use orbital_ir::{Circuit, Gate, QubitId};
//!
//! let mut circuit = Circuit::line("hopping", 2);
//! circuit
//!     .xxyy(0.25, QubitId(0), QubitId(1))
//!     .unwrap()
//!     .fswap(QubitId(0), QubitId(1))
//!     .unwrap();
//!
//! assert_eq!(circuit.len(), 2);
//! assert_eq!(circuit.depth(), 2);
//! assert_eq!(circuit.operations()[1].gate, Gate::FSwap);
//! ```
//!
//! # Supported Gates
//!
//! | Gate | Qubits | Description |
//! |------|--------|-------------|
//! | `Rz` | 1 | Rotation around Z |
//! | `CPhase` | 2 | Phase on `|11⟩` (a power of CZ) |
//! | `CcPhase` | 3 | Phase on `|111⟩` (a power of CCZ) |
//! | `Xxyy` | 2 | `exp(-i π t (XX + YY) / 4)` |
//! | `ControlledXxyy` | 3 | `Xxyy` controlled on the first qubit |
//! | `Yxxy` | 2 | `exp(-i π t (YX - XY) / 4)`, a real Givens rotation |
//! | `Swap` | 2 | SWAP |
//! | `FSwap` | 2 | Fermionic SWAP |

pub mod angle;
pub mod circuit;
pub mod error;
pub mod gate;
pub mod operation;
pub mod qubit;

pub use angle::{AngleSpec, chosen_angle_to_half_turns};
pub use circuit::Circuit;
pub use error::{IrError, IrResult};
pub use gate::Gate;
pub use operation::Operation;
pub use qubit::QubitId;
