//! Property-based tests for circuits and angle conversion.

use std::f64::consts::PI;

use orbital_ir::{AngleSpec, Circuit, Gate, QubitId, chosen_angle_to_half_turns};
use proptest::prelude::*;

/// Gate operations that can be applied to a circuit.
#[derive(Debug, Clone)]
enum GateOp {
    Rz(u32, f64),
    CPhase(u32, u32, f64),
    Xxyy(u32, u32, f64),
    FSwap(u32, u32),
}

impl GateOp {
    fn apply(self, circuit: &mut Circuit) {
        // Operations on a repeated qubit are rejected and skipped.
        let _ = match self {
            GateOp::Rz(q, rads) => circuit.rz(rads, QubitId(q)),
            GateOp::CPhase(a, b, rads) => circuit.cphase(rads, QubitId(a), QubitId(b)),
            GateOp::Xxyy(a, b, duration) => circuit.xxyy(duration, QubitId(a), QubitId(b)),
            GateOp::FSwap(a, b) => circuit.fswap(QubitId(a), QubitId(b)),
        };
    }
}

fn arb_gate_op(num_qubits: u32) -> impl Strategy<Value = GateOp> {
    let q = 0..num_qubits;
    let angle = -PI..PI;
    prop_oneof![
        (q.clone(), angle.clone()).prop_map(|(q, a)| GateOp::Rz(q, a)),
        (q.clone(), q.clone(), angle.clone()).prop_map(|(a, b, t)| GateOp::CPhase(a, b, t)),
        (q.clone(), q.clone(), angle).prop_map(|(a, b, t)| GateOp::Xxyy(a, b, t)),
        (q.clone(), q).prop_map(|(a, b)| GateOp::FSwap(a, b)),
    ]
}

fn arb_circuit() -> impl Strategy<Value = Circuit> {
    (2_u32..=6).prop_flat_map(|num_qubits| {
        prop::collection::vec(arb_gate_op(num_qubits), 0..=20).prop_map(move |ops| {
            let mut circuit = Circuit::line("test", num_qubits);
            for op in ops {
                op.apply(&mut circuit);
            }
            circuit
        })
    })
}

proptest! {
    #[test]
    fn depth_bounded_by_length(circuit in arb_circuit()) {
        prop_assert!(circuit.depth() <= circuit.len());
        if !circuit.is_empty() {
            prop_assert!(circuit.depth() >= 1);
        }
    }

    #[test]
    fn operations_stay_on_register(circuit in arb_circuit()) {
        for q in circuit.active_qubits() {
            prop_assert!(circuit.qubits().contains(&q));
        }
        for op in circuit.operations() {
            let mut qubits = op.qubits.clone();
            qubits.dedup();
            prop_assert_eq!(qubits.len(), op.qubits.len());
        }
    }

    #[test]
    fn json_roundtrip(circuit in arb_circuit()) {
        let json = serde_json::to_string(&circuit).unwrap();
        let back: Circuit = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back.qubits(), circuit.qubits());
        prop_assert_eq!(back.len(), circuit.len());
        for (a, b) in back.operations().iter().zip(circuit.operations()) {
            prop_assert_eq!(a.name(), b.name());
            prop_assert_eq!(&a.qubits, &b.qubits);
            let (ta, tb) = (a.gate.half_turns().unwrap_or(0.0), b.gate.half_turns().unwrap_or(0.0));
            prop_assert!((ta - tb).abs() < 1e-12);
        }
    }

    #[test]
    fn drop_negligible_keeps_permutations(circuit in arb_circuit()) {
        let swaps_before = circuit.count_ops().get("fswap").copied().unwrap_or(0);
        let mut pruned = circuit.clone();
        let removed = pruned.drop_negligible(1e-9);
        prop_assert_eq!(pruned.len() + removed, circuit.len());
        prop_assert_eq!(pruned.count_ops().get("fswap").copied().unwrap_or(0), swaps_before);
    }

    #[test]
    fn angle_units_agree(rads in -10.0f64..10.0) {
        let from_rads = chosen_angle_to_half_turns(&AngleSpec::new().rads(rads), 0.0).unwrap();
        let from_degs =
            chosen_angle_to_half_turns(&AngleSpec::new().degs(rads.to_degrees()), 0.0).unwrap();
        prop_assert!((from_rads - from_degs).abs() < 1e-9);
        prop_assert!((Gate::rz(rads).rads().unwrap() - rads).abs() < 1e-9);
        // A duration d is an angle of 2d radians.
        let from_duration =
            chosen_angle_to_half_turns(&AngleSpec::new().duration(rads / 2.0), 0.0).unwrap();
        prop_assert!((from_duration - from_rads).abs() < 1e-9);
    }
}
