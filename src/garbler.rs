//! Label allocation, truth-table encoding, and row shuffling (spec §4.2).

use std::collections::HashMap;

use num_bigint::BigUint;
use num_traits::One;
use rand::Rng;

use crate::aead::{self, derive_row_key};
use crate::bigint::{encode_be, rand_int_range};
use crate::circuit::{Circuit, GarbledGate, WireIndex};
use crate::error::{GcError, Result};

/// A wire's two labels: `zero` encodes logical 0, `one` encodes logical 1.
/// Invariant (overwhelming probability, not enforced): `zero != one`.
#[derive(Debug, Clone)]
pub struct LabelPair {
    /// Label for logical 0.
    pub zero: BigUint,
    /// Label for logical 1.
    pub one: BigUint,
}

impl LabelPair {
    /// The label corresponding to `bit`.
    pub fn label_for(&self, bit: bool) -> &BigUint {
        if bit { &self.one } else { &self.zero }
    }
}

/// Every wire's [`LabelPair`], keyed by wire name. Lives only in the
/// Garbler's memory; per spec §4.2/§5 at most one label per wire ever
/// leaves the process, directly (primary input) or via OT.
#[derive(Debug, Clone, Default)]
pub struct LabelMap(HashMap<String, LabelPair>);

impl LabelMap {
    /// The label pair for `wire`, if known.
    pub fn get(&self, wire: &str) -> Option<&LabelPair> {
        self.0.get(wire)
    }

    fn insert(&mut self, wire: String, pair: LabelPair) {
        self.0.insert(wire, pair);
    }
}

/// The three outputs of one garbling run (spec §4.2 contract).
#[derive(Debug)]
pub struct GarblingResult {
    /// One slot per [`WireIndex`] position: `Some` for every non-input
    /// wire's garbled table, `None` for primary-input wires (which have
    /// no gate and therefore no table).
    pub gates: Vec<Option<GarbledGate>>,
    /// Every wire's label pair.
    pub labels: LabelMap,
    /// The WireIndex this garbling was computed against.
    pub wire_index: WireIndex,
}

/// Garble `circuit` under security parameter `security_bits` (spec §4.2).
///
/// Draws two uniform labels per wire from `[1, 2^security_bits - 1]`, then
/// for every non-input wire builds its garbled table: one AEAD-sealed row
/// per input-bit combination, keyed by SHA3-256 of the concatenated input
/// labels, followed by an unbiased Fisher-Yates shuffle of that gate's
/// rows. All randomness — labels, nonces, and the shuffle — is drawn from
/// the single `rng` the caller supplies (Design Note: one CSPRNG per
/// process, never reseeded per sub-operation).
pub fn garble(
    circuit: &Circuit,
    security_bits: u32,
    rng: &mut impl Rng,
) -> Result<GarblingResult> {
    let wire_index = circuit.wire_index()?;
    let one = BigUint::one();
    let max_label = (&one << security_bits) - &one;

    let mut labels = LabelMap::default();
    for wire in wire_index.iter() {
        let zero = rand_int_range(rng, &one, &max_label);
        let one_label = rand_int_range(rng, &one, &max_label);
        labels.insert(wire.to_string(), LabelPair { zero, one: one_label });
    }

    let mut gates: Vec<Option<GarbledGate>> = Vec::with_capacity(wire_index.len());
    for i in 0..wire_index.len() {
        let wire = wire_index
            .name_of(i)
            .ok_or_else(|| GcError::CircuitInvalid(format!("no wire at index {i}")))?;

        if circuit.is_primary_input(wire) {
            gates.push(None);
            continue;
        }

        let gate = circuit
            .gate(wire)
            .ok_or_else(|| GcError::CircuitInvalid(format!("wire {wire} has no producing gate")))?;
        let arity = gate.kind.arity();

        let input_indices: Vec<usize> = gate
            .inputs
            .iter()
            .map(|w| {
                wire_index
                    .index_of(w)
                    .ok_or_else(|| GcError::CircuitInvalid(format!("unindexed input wire {w}")))
            })
            .collect::<Result<_>>()?;

        let input_pairs: Vec<&LabelPair> = gate
            .inputs
            .iter()
            .map(|w| {
                labels
                    .get(w)
                    .expect("every wire receives a label pair before its dependents are garbled")
            })
            .collect();
        let output_pair = labels
            .get(wire)
            .expect("every wire receives a label pair before its dependents are garbled");

        let mut rows = Vec::with_capacity(1usize << arity);
        for combination in 0..(1usize << arity) {
            let bits: Vec<bool> = (0..arity).map(|bit_pos| (combination >> bit_pos) & 1 == 1).collect();
            let output_bit = gate.kind.eval(&bits);

            let input_label_bytes: Vec<Vec<u8>> = input_pairs
                .iter()
                .zip(bits.iter())
                .map(|(pair, &bit)| encode_be(pair.label_for(bit)))
                .collect();
            let key_refs: Vec<&[u8]> = input_label_bytes.iter().map(Vec::as_slice).collect();
            let row_key = derive_row_key(&key_refs);

            let plaintext = encode_be(output_pair.label_for(output_bit));
            rows.push(aead::seal(&row_key, &plaintext, rng));
        }

        fisher_yates_shuffle(&mut rows, rng);
        gates.push(Some(GarbledGate { rows, input_indices }));
    }

    Ok(GarblingResult { gates, labels, wire_index })
}

/// Unbiased in-place Fisher-Yates shuffle drawing from `rng`.
fn fisher_yates_shuffle<T>(items: &mut [T], rng: &mut impl Rng) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}
