//! Scenario 4 (spec §8): `NOT(CONST-1) -> 0`, `NOT(NOT(x0)) -> x0`.

use std::collections::HashMap;

use sfe_integration_tests::{not_and_const_circuit, run_protocol};

#[test]
fn not_of_const_one_is_zero_and_double_not_is_identity() {
    for x0 in [false, true] {
        let mut garbler_inputs = HashMap::new();
        garbler_inputs.insert("x0".to_string(), x0);
        let evaluator_inputs = HashMap::new();

        let outputs = run_protocol(
            not_and_const_circuit(),
            garbler_inputs,
            evaluator_inputs,
            64,
            256,
            30 + x0 as u64,
            40 + x0 as u64,
        )
        .unwrap();

        assert_eq!(outputs["zero"], false);
        assert_eq!(outputs["identity"], x0);
    }
}
