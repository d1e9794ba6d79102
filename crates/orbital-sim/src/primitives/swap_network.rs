//! Swap networks.

use orbital_ir::{Gate, Operation, QubitId};

/// Emit a swap network over `qubits`.
///
/// The network has `n` layers; layer `k` swaps the adjacent positions
/// `(i, i + 1)` for `i ≡ k + offset (mod 2)`. Every pair of modes becomes
/// adjacent exactly once, and the network leaves the modes in reversed
/// order.
///
/// Before each swap, `pair_op(p, q, a, b)` may contribute operations, where
/// `p` and `q` are the original positions of the modes currently on
/// physical qubits `a` and `b`.
///
/// Swaps are [`Gate::FSwap`] when `fermionic`, otherwise [`Gate::Swap`].
pub fn swap_network<F, I>(
    qubits: &[QubitId],
    fermionic: bool,
    offset: bool,
    mut pair_op: F,
) -> Vec<Operation>
where
    F: FnMut(usize, usize, QubitId, QubitId) -> I,
    I: IntoIterator<Item = Operation>,
{
    let n = qubits.len();
    let swap = if fermionic { Gate::FSwap } else { Gate::Swap };
    let mut order: Vec<usize> = (0..n).collect();
    let mut ops = Vec::with_capacity(n * n.saturating_sub(1));

    for layer in 0..n {
        let lowest = (layer + usize::from(offset)) % 2;
        for i in (lowest..n.saturating_sub(1)).step_by(2) {
            let j = i + 1;
            ops.extend(pair_op(order[i], order[j], qubits[i], qubits[j]));
            ops.push(Operation::pair(swap, qubits[i], qubits[j]));
            order.swap(i, j);
        }
    }
    ops
}

/// A swap network with no interactions, a pure reversal of the modes.
pub fn swap_network_permutation(qubits: &[QubitId], fermionic: bool) -> Vec<Operation> {
    swap_network(qubits, fermionic, false, |_, _, _, _| None::<Operation>)
}
