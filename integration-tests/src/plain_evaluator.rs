//! Plaintext oracle evaluator: computes a circuit's output bits directly,
//! with no garbling or OT involved, so the garbled-circuit protocol's
//! result can be checked against ground truth in end-to-end tests.

use std::collections::HashMap;

use sfe_core::circuit::Circuit;
use sfe_core::error::{GcError, Result};

/// Evaluate `circuit` in plaintext against `inputs` (every primary-input
/// wire name mapped to its bit), returning every primary-output wire's
/// bit.
pub fn evaluate_plain(circuit: &Circuit, inputs: &HashMap<String, bool>) -> Result<HashMap<String, bool>> {
    let order = circuit.topological_order()?;
    let mut current: HashMap<&str, bool> = HashMap::with_capacity(order.len());

    for wire in &order {
        if circuit.is_primary_input(wire) {
            let bit = *inputs
                .get(wire.as_str())
                .ok_or_else(|| GcError::MissingInputLabel { wire_index: 0 })?;
            current.insert(wire.as_str(), bit);
        } else {
            let gate = circuit
                .gate(wire)
                .ok_or_else(|| GcError::CircuitInvalid(format!("wire {wire} has no producing gate")))?;
            let bits: Vec<bool> = gate
                .inputs
                .iter()
                .map(|w| {
                    *current
                        .get(w.as_str())
                        .expect("inputs are evaluated before their dependents by topological order")
                })
                .collect();
            current.insert(wire.as_str(), gate.kind.eval(&bits));
        }
    }

    Ok(circuit
        .outputs
        .iter()
        .map(|w| (w.clone(), current[w.as_str()]))
        .collect())
}
