//! Qubit identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a qubit.
///
/// Simulation algorithms work on an ordered `&[QubitId]`; the position of a
/// qubit in that slice is its logical index and may change from step to
/// step, while the id itself never does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QubitId(pub u32);

impl QubitId {
    /// `n` consecutive qubits starting at 0, the usual line register.
    pub fn range(n: u32) -> Vec<QubitId> {
        (0..n).map(QubitId).collect()
    }
}

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

impl From<u32> for QubitId {
    fn from(id: u32) -> Self {
        QubitId(id)
    }
}

impl From<usize> for QubitId {
    fn from(id: usize) -> Self {
        QubitId(u32::try_from(id).expect("QubitId overflow: exceeds u32::MAX"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qubit_display() {
        assert_eq!(format!("{}", QubitId(3)), "q3");
    }

    #[test]
    fn test_qubit_range() {
        assert_eq!(QubitId::range(3), vec![QubitId(0), QubitId(1), QubitId(2)]);
        assert!(QubitId::range(0).is_empty());
    }

    #[test]
    fn test_qubit_from_usize() {
        assert_eq!(QubitId::from(7usize), QubitId(7));
    }
}
