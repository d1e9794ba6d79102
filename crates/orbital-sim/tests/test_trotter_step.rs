//! Tests for low-rank Trotter step emission.

use ndarray::{Array2, Array4, array};
use num_complex::Complex64;
use orbital_ir::{Gate, QubitId};
use orbital_sim::low_rank::{LowRankDecomposition, low_rank_two_body_decomposition};
use orbital_sim::trotter::LOW_RANK;
use orbital_sim::{
    GroupKind, InteractionOperator, LowRankTrotterStep, SimError, StepVariant, TrotterAlgorithm,
    TrotterStep,
};
use proptest::prelude::*;

/// Two spin-orbitals (one spatial orbital) with hopping and a constant.
fn two_mode_hamiltonian(constant: f64) -> InteractionOperator {
    let one_body = array![[0.3, -0.8], [-0.8, 0.1]];
    InteractionOperator::from_real(constant, &one_body, &Array4::zeros((2, 2, 2, 2))).unwrap()
}

/// A two-mode step with `n_terms` identical density-density terms.
fn step_with_terms(n_terms: usize, variant: StepVariant, constant: f64) -> LowRankTrotterStep {
    let decomposition = LowRankDecomposition {
        eigenvalues: (0..n_terms).map(|j| 0.25 + 0.1 * j as f64).collect(),
        one_body_squares: vec![Array2::<Complex64>::eye(2); n_terms],
        one_body_correction: Array2::zeros((2, 2)),
        truncation_value: 0.0,
    };
    LowRankTrotterStep::from_decomposition(&two_mode_hamiltonian(constant), decomposition, variant)
        .unwrap()
}

/// Route `RUST_LOG` output of the decomposition through the test harness.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn kinds(step: &LowRankTrotterStep, control: Option<QubitId>) -> Vec<GroupKind> {
    step.step_ops(&QubitId::range(2), 1.0, control)
        .unwrap()
        .map(|g| g.kind)
        .collect()
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

#[test]
fn complex_hamiltonian_is_not_supported() {
    let mut one_body = Array2::<Complex64>::zeros((2, 2));
    one_body[[0, 1]] = Complex64::new(0.0, 1.0);
    one_body[[1, 0]] = Complex64::new(0.0, -1.0);
    let h = InteractionOperator::new(0.0, one_body, Array4::zeros((2, 2, 2, 2))).unwrap();
    assert!(LOW_RANK.asymmetric(&h).unwrap().is_none());
    assert!(LOW_RANK.controlled_asymmetric(&h).unwrap().is_none());
}

#[test]
fn decomposition_errors_propagate() {
    let h = two_mode_hamiltonian(0.0);
    let algorithm = LOW_RANK.with_final_rank(7);
    assert!(matches!(
        algorithm.asymmetric(&h),
        Err(SimError::InvalidRank { requested: 7, full_rank: 1 })
    ));
}

#[test]
fn spatial_basis_correction_does_not_fit_one_body_tensor() {
    let h = two_mode_hamiltonian(0.0);
    let algorithm = LOW_RANK.with_spin_basis(false);
    assert!(matches!(
        algorithm.asymmetric(&h),
        Err(SimError::ShapeMismatch { context: "one-body correction", .. })
    ));
}

#[test]
fn effective_one_body_is_tensor_plus_correction() {
    let eri = Array4::from_shape_fn((2, 2, 2, 2), |(p, q, r, s)| {
        let g = array![[0.9, 0.2], [0.2, 0.4]];
        0.5 * g[[p, q]] * g[[r, s]]
    });
    let physicist = Array4::from_shape_fn((2, 2, 2, 2), |(p, q, r, s)| eri[[p, s, q, r]]);
    let h = InteractionOperator::from_spatial_integrals(
        0.2,
        &array![[-1.0, 0.05], [0.05, -0.5]],
        &physicist,
    )
    .unwrap();

    let decomposition =
        low_rank_two_body_decomposition(h.two_body_tensor(), 1e-8, None, true).unwrap();
    let step = LOW_RANK.asymmetric(&h).unwrap().unwrap();
    assert_eq!(step.n_terms(), 1);
    assert_eq!(step.constant(), 0.2);
    let expected = h.one_body_tensor() + &decomposition.one_body_correction;
    assert_eq!(step.one_body_coefficients(), &expected);
}

// ---------------------------------------------------------------------------
// Emission
// ---------------------------------------------------------------------------

#[test]
fn two_modes_one_term_emits_eight_groups() {
    let step = step_with_terms(1, StepVariant::Asymmetric, 0.0);
    assert_eq!(
        kinds(&step, None),
        vec![
            GroupKind::OneBodyNetwork,
            GroupKind::OneBodyDiagonal,
            GroupKind::OneBodyDiagonal,
            GroupKind::BasisChange,
            GroupKind::TwoBodyNetwork,
            GroupKind::TwoBodyDiagonal,
            GroupKind::TwoBodyDiagonal,
            GroupKind::BasisUndo,
        ]
    );
}

#[test]
fn one_body_angles_follow_coefficients() {
    let step = step_with_terms(1, StepVariant::Asymmetric, 0.0);
    let groups: Vec<_> = step
        .step_ops(&QubitId::range(2), 0.5, None)
        .unwrap()
        .collect();

    let network = &groups[0].operations;
    assert_eq!(network.len(), 2);
    // XXYY(duration = T[0,1] · t), then FSWAP.
    let expected = Gate::xxyy(-0.8 * 0.5);
    assert_eq!(network[0].gate, expected);
    assert_eq!(network[0].qubits, vec![QubitId(0), QubitId(1)]);
    assert_eq!(network[1].gate, Gate::FSwap);

    // Ordering is reversed after the network: T[0,0] lands on q1.
    let first = &groups[1].operations[0];
    assert_eq!(first.qubits, vec![QubitId(1)]);
    assert!((first.gate.rads().unwrap() + 0.3 * 0.5).abs() < 1e-12);
    let second = &groups[2].operations[0];
    assert_eq!(second.qubits, vec![QubitId(0)]);
    assert!((second.gate.rads().unwrap() + 0.1 * 0.5).abs() < 1e-12);
}

#[test]
fn two_body_angles_follow_scaled_density_density() {
    let step = step_with_terms(1, StepVariant::Asymmetric, 0.0);
    let v = step.scaled_density_density_matrices()[0].clone();
    let groups: Vec<_> = step
        .step_ops(&QubitId::range(2), 2.0, None)
        .unwrap()
        .collect();

    let network = &groups[4].operations;
    assert_eq!(network[0].name(), "cphase");
    assert!((network[0].gate.rads().unwrap() + 2.0 * v[[0, 1]] * 2.0).abs() < 1e-12);
    assert_eq!(network[1].gate, Gate::Swap);
    assert!((groups[5].operations[0].gate.rads().unwrap() + v[[0, 0]] * 2.0).abs() < 1e-12);
}

#[test]
fn controlled_step_conditions_every_rotation() {
    let control = QubitId(9);
    let step = step_with_terms(1, StepVariant::ControlledAsymmetric, 1.5);
    let groups: Vec<_> = step
        .step_ops(&QubitId::range(2), 1.0, Some(control))
        .unwrap()
        .collect();
    assert_eq!(groups.len(), 9);

    assert_eq!(groups[0].operations[0].name(), "cxxyy");
    assert_eq!(groups[0].operations[0].qubits[0], control);
    assert_eq!(groups[1].operations[0].name(), "cphase");
    assert_eq!(groups[1].operations[0].qubits, vec![control, QubitId(1)]);
    assert_eq!(groups[4].operations[0].name(), "ccphase");

    // Basis changes are never controlled.
    for group in groups.iter().filter(|g| {
        matches!(g.kind, GroupKind::BasisChange | GroupKind::BasisUndo)
    }) {
        assert!(group.operations.iter().all(|op| !op.acts_on(control)));
    }
}

#[test]
fn controlled_constant_phase_independent_of_rank() {
    let control = QubitId(5);
    for n_terms in 1..5 {
        let step = step_with_terms(n_terms, StepVariant::ControlledAsymmetric, 0.75);
        let last = step
            .step_ops(&QubitId::range(2), 0.4, Some(control))
            .unwrap()
            .last()
            .unwrap();
        assert_eq!(last.kind, GroupKind::ConstantPhase);
        assert_eq!(last.operations.len(), 1);
        assert_eq!(last.operations[0].qubits, vec![control]);
        assert_eq!(last.operations[0].name(), "rz");
        assert!((last.operations[0].gate.rads().unwrap() + 0.75 * 0.4).abs() < 1e-12);
    }
}

#[test]
fn controlled_step_without_control_fails_eagerly() {
    let step = step_with_terms(1, StepVariant::ControlledAsymmetric, 0.0);
    assert!(matches!(
        step.step_ops(&QubitId::range(2), 1.0, None),
        Err(SimError::MissingControlQubit)
    ));
    assert!(matches!(
        step.trotter_step(&QubitId::range(2), 1.0, None),
        Err(SimError::MissingControlQubit)
    ));
    assert!(matches!(
        step.finish(&QubitId::range(2), 1, None, false),
        Err(SimError::MissingControlQubit)
    ));
}

#[test]
fn molecular_step_group_count() {
    init_tracing();
    let s = std::f64::consts::FRAC_1_SQRT_2;
    let factors = [
        (0.6, array![[1.0, 0.0], [0.0, 0.0]]),
        (0.2, array![[0.0, s], [s, 0.0]]),
    ];
    let eri = Array4::from_shape_fn((2, 2, 2, 2), |(p, q, r, s)| {
        factors
            .iter()
            .map(|(lambda, g)| lambda * g[[p, q]] * g[[r, s]])
            .sum::<f64>()
    });
    let physicist = Array4::from_shape_fn((2, 2, 2, 2), |(p, q, r, s)| eri[[p, s, q, r]]);
    let h = InteractionOperator::from_spatial_integrals(
        0.0,
        &array![[-1.25, 0.0], [0.0, -0.47]],
        &physicist,
    )
    .unwrap();

    let step = LOW_RANK.asymmetric(&h).unwrap().unwrap();
    assert_eq!(step.n_terms(), 2);
    let groups: Vec<_> = step
        .step_ops(&QubitId::range(4), 0.1, None)
        .unwrap()
        .collect();
    // Network and 4 diagonals, 2 × (basis, network, 4 diagonals), undo.
    assert_eq!(groups.len(), 1 + 4 + 2 * 6 + 1);

    // A four-mode network visits all six pairs.
    let hopping = groups[0]
        .operations
        .iter()
        .filter(|op| op.name() == "xxyy")
        .count();
    assert_eq!(hopping, 6);
}

// ---------------------------------------------------------------------------
// Permutation and cleanup
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn permutation_parity(n_terms in 1usize..7) {
        let step = step_with_terms(n_terms, StepVariant::Asymmetric, 0.0);
        let qubits = QubitId::range(2);
        let (permuted, control) = step.step_qubit_permutation(&qubits, Some(QubitId(4)));
        prop_assert_eq!(control, None);
        if n_terms % 2 == 1 {
            prop_assert_eq!(&permuted, &qubits);
        } else {
            prop_assert_eq!(permuted.clone(), vec![QubitId(1), QubitId(0)]);
        }

        // The emitted step leaves the register in the reported ordering.
        let mut ops = step.step_ops(&qubits, 1.0, None).unwrap();
        for _ in ops.by_ref() {}
        prop_assert_eq!(ops.qubits(), permuted.as_slice());
    }

    #[test]
    fn controlled_permutation_keeps_control(n_terms in 1usize..7) {
        let step = step_with_terms(n_terms, StepVariant::ControlledAsymmetric, 0.0);
        let (_, control) = step.step_qubit_permutation(&QubitId::range(2), Some(QubitId(4)));
        prop_assert_eq!(control, Some(QubitId(4)));
    }
}

#[test]
fn finish_pass_counts() {
    let qubits = QubitId::range(2);
    let cases = [
        (1, 1, vec![GroupKind::FermionicSwaps]),
        (1, 2, vec![]),
        (2, 1, vec![GroupKind::FermionicSwaps, GroupKind::QubitSwaps]),
        (2, 2, vec![]),
    ];
    for (n_terms, n_steps, expected) in cases {
        let step = step_with_terms(n_terms, StepVariant::Asymmetric, 0.0);
        let groups = step.finish(&qubits, n_steps, None, false).unwrap();
        let kinds: Vec<_> = groups.iter().map(|g| g.kind).collect();
        assert_eq!(kinds, expected, "J={n_terms}, n_steps={n_steps}");
        for group in &groups {
            assert!(group.operations.iter().all(|op| op.gate.is_permutation()));
        }
    }
}

#[test]
fn finish_can_be_skipped() {
    for n_terms in 1..=2 {
        let step = step_with_terms(n_terms, StepVariant::Asymmetric, 0.0);
        assert!(step.finish(&QubitId::range(2), 1, None, true).unwrap().is_empty());
    }
}

#[test]
fn controlled_finish_passes_swaps_only() {
    let step = step_with_terms(2, StepVariant::ControlledAsymmetric, 0.0);
    let groups = step
        .finish(&QubitId::range(2), 3, Some(QubitId(2)), false)
        .unwrap();
    assert_eq!(groups.len(), 2);
    assert!(
        groups
            .iter()
            .flat_map(|g| &g.operations)
            .all(|op| !op.acts_on(QubitId(2)))
    );
}
