//! Shared circuit fixtures and the plaintext oracle evaluator used by the
//! end-to-end protocol tests under `tests/`.

use std::collections::HashMap;

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use sfe_core::circuit::CircuitDescription;
use sfe_core::error::Result;
use sfe_core::party::{channel_pair, run_evaluator, run_garbler, PartyChannel};

pub mod plain_evaluator;

/// Run the full two-party protocol in-process over real channels and OT,
/// splitting `circuit_desc.inputs` between `garbler_inputs` and
/// `evaluator_inputs` (every input wire must appear in exactly one of the
/// two maps). Returns the Evaluator's decoded output bits.
pub fn run_protocol(
    circuit_desc: CircuitDescription,
    garbler_inputs: HashMap<String, bool>,
    evaluator_inputs: HashMap<String, bool>,
    security_bits: u32,
    rsa_bits: u32,
    garbler_seed: u64,
    evaluator_seed: u64,
) -> Result<HashMap<String, bool>> {
    let evaluator_wires: Vec<String> = circuit_desc
        .inputs
        .iter()
        .filter(|w| !garbler_inputs.contains_key(w.as_str()))
        .cloned()
        .collect();

    let (garbler_main, evaluator_main) = channel_pair();
    let mut garbler_ot_channels: Vec<(String, PartyChannel)> = Vec::with_capacity(evaluator_wires.len());
    let mut evaluator_ot_channels: Vec<(String, PartyChannel)> = Vec::with_capacity(evaluator_wires.len());
    for wire in &evaluator_wires {
        let (sender_end, chooser_end) = channel_pair();
        garbler_ot_channels.push((wire.clone(), sender_end));
        evaluator_ot_channels.push((wire.clone(), chooser_end));
    }

    std::thread::scope(|scope| {
        let garbler_handle = scope.spawn(move || {
            let mut rng = ChaCha20Rng::seed_from_u64(garbler_seed);
            run_garbler(
                circuit_desc,
                &garbler_inputs,
                security_bits,
                rsa_bits,
                &garbler_main,
                &garbler_ot_channels,
                &mut rng,
            )
        });

        let evaluator_handle = scope.spawn(move || {
            let mut rng = ChaCha20Rng::seed_from_u64(evaluator_seed);
            run_evaluator(&evaluator_inputs, rsa_bits, &evaluator_main, &evaluator_ot_channels, &mut rng)
        });

        let garbler_result = garbler_handle.join().expect("garbler thread should not panic");
        let evaluator_result = evaluator_handle.join().expect("evaluator thread should not panic");

        garbler_result?;
        evaluator_result
    })
}

fn gate(kind: &str, inputs: &[&str]) -> (String, Vec<String>) {
    (kind.to_string(), inputs.iter().map(|s| s.to_string()).collect())
}

/// `out = AND(x0, y0)` (spec §8 scenario 1).
pub fn and_gate_circuit() -> CircuitDescription {
    let mut gates = HashMap::new();
    gates.insert("out".to_string(), gate("AND", &["x0", "y0"]));
    CircuitDescription {
        inputs: vec!["x0".into(), "y0".into()],
        outputs: vec!["out".into()],
        gates,
    }
}

/// 2-bit ripple-carry adder: `s0 = x0 XOR y0`, `c0 = x0 AND y0`,
/// `s1 = x1 XOR y1 XOR c0`, `carry = (x1 AND y1) OR (c0 AND (x1 XOR y1))`
/// (spec §8 scenario 2).
pub fn two_bit_adder_circuit() -> CircuitDescription {
    let mut gates = HashMap::new();
    gates.insert("s0".to_string(), gate("XOR", &["x0", "y0"]));
    gates.insert("c0".to_string(), gate("AND", &["x0", "y0"]));
    gates.insert("x1_xor_y1".to_string(), gate("XOR", &["x1", "y1"]));
    gates.insert("s1".to_string(), gate("XOR", &["x1_xor_y1", "c0"]));
    gates.insert("x1_and_y1".to_string(), gate("AND", &["x1", "y1"]));
    gates.insert("carry_propagate".to_string(), gate("AND", &["c0", "x1_xor_y1"]));
    gates.insert("carry".to_string(), gate("OR", &["x1_and_y1", "carry_propagate"]));
    CircuitDescription {
        inputs: vec!["x0".into(), "x1".into(), "y0".into(), "y1".into()],
        outputs: vec!["s0".into(), "s1".into(), "carry".into()],
        gates,
    }
}

/// 16-wide parity circuit: `out = XOR(x0..15 XOR y0..15)`, a depth-16
/// chain of XOR gates (spec §8 scenario 3).
pub fn xor_chain_circuit(width: usize) -> CircuitDescription {
    let mut gates = HashMap::new();
    let mut inputs = Vec::with_capacity(width * 2);
    for i in 0..width {
        inputs.push(format!("x{i}"));
        inputs.push(format!("y{i}"));
    }

    let mut acc = "bitxor0".to_string();
    gates.insert(acc.clone(), gate("XOR", &["x0", "y0"]));
    for i in 1..width {
        let xi = format!("bitxor{i}");
        let xname = format!("x{i}");
        let yname = format!("y{i}");
        gates.insert(xi.clone(), gate("XOR", &[xname.as_str(), yname.as_str()]));
        let next = format!("chain{i}");
        gates.insert(next.clone(), gate("XOR", &[acc.as_str(), xi.as_str()]));
        acc = next;
    }

    CircuitDescription { inputs, outputs: vec![acc], gates }
}

/// `zero = NOT(CONST-1)`, `identity = NOT(NOT(x0))` (spec §8 scenario 4).
pub fn not_and_const_circuit() -> CircuitDescription {
    let mut gates = HashMap::new();
    gates.insert("one".to_string(), ("CONST-1".to_string(), vec![]));
    gates.insert("zero".to_string(), gate("NOT", &["one"]));
    gates.insert("not_x0".to_string(), gate("NOT", &["x0"]));
    gates.insert("identity".to_string(), gate("NOT", &["not_x0"]));
    CircuitDescription {
        inputs: vec!["x0".into()],
        outputs: vec!["zero".into(), "identity".into()],
        gates,
    }
}
