//! Per-gate trial decryption and output decoding (spec §4.3).

use std::collections::HashMap;

use num_bigint::BigUint;

use crate::aead::{self, derive_row_key};
use crate::bigint::encode_be;
use crate::circuit::GarbledGate;
use crate::error::{GcError, Result};

/// Evaluate a garbled circuit (spec §4.3 contract).
///
/// `gates` is one slot per WireIndex position (`None` for primary-input
/// wires, matching [`crate::garbler::garble`]'s output); `input_labels`
/// maps every primary-input wire's index to the label the Evaluator holds
/// for it (his own inputs transferred by OT, the Garbler's sent directly).
/// Returns the evaluated label at each index in `primary_output_indices`,
/// in that order.
pub fn evaluate(
    gates: &[Option<GarbledGate>],
    input_labels: &HashMap<usize, BigUint>,
    primary_output_indices: &[usize],
) -> Result<Vec<BigUint>> {
    let n = gates.len();
    let mut current: Vec<Option<BigUint>> = vec![None; n];

    for i in 0..n {
        match &gates[i] {
            None => {
                let label = input_labels.get(&i).ok_or(GcError::MissingInputLabel { wire_index: i })?;
                current[i] = Some(label.clone());
            }
            Some(gate) => {
                let input_label_bytes: Vec<Vec<u8>> = gate
                    .input_indices
                    .iter()
                    .map(|&j| {
                        let label = current[j]
                            .as_ref()
                            .expect("inputs are evaluated before their dependents by WireIndex order");
                        encode_be(label)
                    })
                    .collect();
                let key_refs: Vec<&[u8]> = input_label_bytes.iter().map(Vec::as_slice).collect();
                let row_key = derive_row_key(&key_refs);

                let mut decoded: Option<BigUint> = None;
                let mut matches = 0u32;
                for row in &gate.rows {
                    if let Some(plaintext) = aead::open(&row_key, row) {
                        matches += 1;
                        decoded = Some(crate::bigint::decode_be(&plaintext));
                    }
                }

                match matches {
                    0 => return Err(GcError::GarbledTableCorrupt { gate: i }),
                    1 => current[i] = decoded,
                    _ => return Err(GcError::AmbiguousGate { gate: i }),
                }
            }
        }
    }

    primary_output_indices
        .iter()
        .map(|&i| {
            current[i]
                .clone()
                .ok_or(GcError::MissingInputLabel { wire_index: i })
        })
        .collect()
}

/// Map each primary-output wire's evaluated label to the plaintext bit it
/// represents via the Garbler-supplied `(L0, L1)` decode pair.
pub fn decode_bit(label: &BigUint, zero: &BigUint, one: &BigUint) -> Result<bool> {
    if label == zero {
        Ok(false)
    } else if label == one {
        Ok(true)
    } else {
        Err(GcError::GarbledTableCorrupt { gate: usize::MAX })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::{Circuit, CircuitDescription};
    use crate::garbler::garble;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

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

    fn run_and(x: bool, y: bool) -> bool {
        let circuit = and_circuit();
        let mut rng = ChaCha20Rng::seed_from_u64(if x { 1 } else { 2 } + if y { 10 } else { 20 });
        let garbled = garble(&circuit, 64, &mut rng).unwrap();

        let x0_idx = garbled.wire_index.index_of("x0").unwrap();
        let y0_idx = garbled.wire_index.index_of("y0").unwrap();
        let out_idx = garbled.wire_index.index_of("out").unwrap();

        let x_label = garbled.labels.get("x0").unwrap().label_for(x).clone();
        let y_label = garbled.labels.get("y0").unwrap().label_for(y).clone();

        let mut input_labels = HashMap::new();
        input_labels.insert(x0_idx, x_label);
        input_labels.insert(y0_idx, y_label);

        let results = evaluate(&garbled.gates, &input_labels, &[out_idx]).unwrap();
        let out_pair = garbled.labels.get("out").unwrap();
        decode_bit(&results[0], &out_pair.zero, &out_pair.one).unwrap()
    }

    #[test]
    fn evaluates_every_and_truth_table_row() {
        assert_eq!(run_and(false, false), false);
        assert_eq!(run_and(false, true), false);
        assert_eq!(run_and(true, false), false);
        assert_eq!(run_and(true, true), true);
    }

    #[test]
    fn missing_input_label_is_reported() {
        let circuit = and_circuit();
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        let garbled = garble(&circuit, 64, &mut rng).unwrap();
        let out_idx = garbled.wire_index.index_of("out").unwrap();

        let input_labels = HashMap::new(); // neither x0 nor y0 supplied
        let err = evaluate(&garbled.gates, &input_labels, &[out_idx]).unwrap_err();
        assert!(matches!(err, GcError::MissingInputLabel { .. }));
    }

    #[test]
    fn corrupted_row_is_detected() {
        let circuit = and_circuit();
        let mut rng = ChaCha20Rng::seed_from_u64(6);
        let mut garbled = garble(&circuit, 64, &mut rng).unwrap();

        let out_idx = garbled.wire_index.index_of("out").unwrap();
        let gate = garbled.gates[out_idx].as_mut().unwrap();
        for row in &mut gate.rows {
            row[0] ^= 0xFF; // corrupt every row so none authenticate
        }

        let x0_idx = garbled.wire_index.index_of("x0").unwrap();
        let y0_idx = garbled.wire_index.index_of("y0").unwrap();
        let mut input_labels = HashMap::new();
        input_labels.insert(x0_idx, garbled.labels.get("x0").unwrap().label_for(true).clone());
        input_labels.insert(y0_idx, garbled.labels.get("y0").unwrap().label_for(true).clone());

        let err = evaluate(&garbled.gates, &input_labels, &[out_idx]).unwrap_err();
        assert!(matches!(err, GcError::GarbledTableCorrupt { gate } if gate == out_idx));
    }

    #[test]
    fn decode_bit_matches_the_correct_label() {
        let zero = BigUint::from(1u32);
        let one = BigUint::from(2u32);
        let other = BigUint::from(3u32);
        assert_eq!(decode_bit(&zero, &zero, &one).unwrap(), false);
        assert_eq!(decode_bit(&one, &zero, &one).unwrap(), true);
        assert!(decode_bit(&other, &zero, &one).is_err());
    }
}
