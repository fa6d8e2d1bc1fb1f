//! Scenario 6 (spec §8): flipping one bit of any GarbledRow makes the
//! Evaluator fail with `GarbledTableCorrupt` at that gate.

use std::collections::HashMap;

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use sfe_core::circuit::{Circuit, CircuitDescription};
use sfe_core::error::GcError;
use sfe_core::evaluator::evaluate;
use sfe_core::garbler::garble;

fn and_circuit() -> Circuit {
    let mut gates = HashMap::new();
    gates.insert("out".to_string(), ("AND".to_string(), vec!["x0".into(), "y0".into()]));
    Circuit::load(CircuitDescription {
        inputs: vec!["x0".into(), "y0".into()],
        outputs: vec!["out".into()],
        gates,
    })
    .unwrap()
}

#[test]
fn flipping_every_row_byte_of_the_and_gate_is_detected() {
    let circuit = and_circuit();
    let mut rng = ChaCha20Rng::seed_from_u64(600);
    let garbled = garble(&circuit, 64, &mut rng).unwrap();

    let x0_idx = garbled.wire_index.index_of("x0").unwrap();
    let y0_idx = garbled.wire_index.index_of("y0").unwrap();
    let out_idx = garbled.wire_index.index_of("out").unwrap();

    let mut input_labels = HashMap::new();
    input_labels.insert(x0_idx, garbled.labels.get("x0").unwrap().label_for(true).clone());
    input_labels.insert(y0_idx, garbled.labels.get("y0").unwrap().label_for(true).clone());

    // Baseline: an untouched table evaluates without error.
    evaluate(&garbled.gates, &input_labels, &[out_idx]).unwrap();

    let row_count = garbled.gates[out_idx].as_ref().unwrap().rows.len();
    for row_idx in 0..row_count {
        let mut corrupted = garbled.gates.clone();
        let gate = corrupted[out_idx].as_mut().unwrap();
        gate.rows[row_idx][0] ^= 0x01;

        let err = evaluate(&corrupted, &input_labels, &[out_idx]).unwrap_err();
        assert!(
            matches!(err, GcError::GarbledTableCorrupt { gate } if gate == out_idx)
                || matches!(err, GcError::AmbiguousGate { gate } if gate == out_idx),
            "row {row_idx}: expected a gate-{out_idx} failure, got {err:?}"
        );
    }
}
