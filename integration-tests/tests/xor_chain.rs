//! Scenario 3 (spec §8): 16-wide XOR chain computing parity(X XOR Y).

use std::collections::HashMap;

use sfe_integration_tests::{run_protocol, xor_chain_circuit};

#[test]
fn parity_of_sixteen_bit_xor_chain_matches_direct_computation() {
    const WIDTH: usize = 16;
    let circuit_desc = xor_chain_circuit(WIDTH);

    let patterns: &[(u32, u32)] = &[(0, 0), (0xFFFF, 0), (0, 0xFFFF), (0xAAAA, 0x5555), (0x1234, 0x8421)];

    for &(x, y) in patterns {
        let mut garbler_inputs = HashMap::new();
        let mut evaluator_inputs = HashMap::new();
        let mut expected_parity = false;
        for i in 0..WIDTH {
            let xb = (x >> i) & 1 != 0;
            let yb = (y >> i) & 1 != 0;
            garbler_inputs.insert(format!("x{i}"), xb);
            evaluator_inputs.insert(format!("y{i}"), yb);
            expected_parity ^= xb ^ yb;
        }

        let outputs = run_protocol(
            circuit_desc.clone(),
            garbler_inputs,
            evaluator_inputs,
            64,
            256,
            x as u64,
            y as u64 + 1,
        )
        .unwrap();

        let only_output = outputs.values().next().copied().unwrap();
        assert_eq!(only_output, expected_parity, "x={x:#06x} y={y:#06x}");
    }
}
