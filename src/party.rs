//! End-to-end two-party orchestration (spec §4.5, §5): the Garbler and
//! Evaluator coroutines, driven over typed channels, composing the
//! circuit model, garbler, evaluator, and OT sub-protocol.
//!
//! Each Evaluator input wire gets its own dedicated channel pair for its
//! OT sub-protocol, spawned as an independent worker thread (spec §5: "no
//! shared mutable structures across OT invocations, so they parallelise
//! trivially"). The main channel pair carries everything else: the
//! circuit, the garbled tables, the Garbler's own input labels, and the
//! decode table.

use std::collections::HashMap;

use crossbeam_channel::{unbounded, Receiver, Sender};
use num_bigint::BigUint;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::circuit::{Circuit, CircuitDescription};
use crate::error::{GcError, Result};
use crate::evaluator::{decode_bit, evaluate};
use crate::garbler::garble;
use crate::ot;
use crate::protocol::{decode_int, encode_int, Message};

/// One end of a bidirectional typed channel carrying [`Message`] values.
#[derive(Debug, Clone)]
pub struct PartyChannel {
    /// Outgoing half.
    pub tx: Sender<Message>,
    /// Incoming half.
    pub rx: Receiver<Message>,
}

/// Build one pair of connected [`PartyChannel`]s: whatever the first end
/// sends, the second end receives, and vice versa.
pub fn channel_pair() -> (PartyChannel, PartyChannel) {
    let (tx_a, rx_a) = unbounded();
    let (tx_b, rx_b) = unbounded();
    (PartyChannel { tx: tx_a, rx: rx_b }, PartyChannel { tx: tx_b, rx: rx_a })
}

fn send(channel: &PartyChannel, message: Message) -> Result<()> {
    channel.tx.send(message).map_err(|_| GcError::ChannelClosed)
}

fn recv(channel: &PartyChannel) -> Result<Message> {
    channel.rx.recv().map_err(|_| GcError::ChannelClosed)
}

/// Draw a fresh 32-byte seed from `rng` and build an independent CSPRNG
/// from it. Used to hand each OT worker thread its own RNG instance while
/// keeping every draw traceable back to one root cryptographic source,
/// per spec §9's "one CSPRNG per process" design note.
fn derive_child_rng(rng: &mut impl Rng) -> ChaCha20Rng {
    let mut seed = [0u8; 32];
    rng.fill(&mut seed);
    ChaCha20Rng::from_seed(seed)
}

fn ot_send_over_channel(
    channel: &PartyChannel,
    wire_index: usize,
    m0: &BigUint,
    m1: &BigUint,
    rsa_bits: u32,
    rng: &mut impl Rng,
) -> Result<()> {
    ot::send(
        m0,
        m1,
        rsa_bits,
        rng,
        |setup| {
            send(
                channel,
                Message::OtSetup {
                    wire_index,
                    e: encode_int(&setup.public.e),
                    n: encode_int(&setup.public.n),
                },
            )
        },
        |x0, x1| {
            send(channel, Message::OtX { wire_index, x0: encode_int(x0), x1: encode_int(x1) })
        },
        || match recv(channel)? {
            Message::OtV { v, .. } => Ok(decode_int(&v)),
            _ => Err(GcError::ChannelClosed),
        },
        |m0_prime, m1_prime| {
            send(
                channel,
                Message::OtM {
                    wire_index,
                    m0_prime: encode_int(m0_prime),
                    m1_prime: encode_int(m1_prime),
                },
            )
        },
    )
}

fn ot_choose_over_channel(
    channel: &PartyChannel,
    wire_index: usize,
    choice: bool,
    rsa_bits: u32,
    rng: &mut impl Rng,
) -> Result<BigUint> {
    ot::choose(
        choice,
        rsa_bits,
        rng,
        || match recv(channel)? {
            Message::OtSetup { e, n, .. } => Ok(ot::OtSetup {
                public: crate::rsa::RsaPublicKey { e: decode_int(&e), n: decode_int(&n) },
            }),
            _ => Err(GcError::ChannelClosed),
        },
        || match recv(channel)? {
            Message::OtX { x0, x1, .. } => Ok((decode_int(&x0), decode_int(&x1))),
            _ => Err(GcError::ChannelClosed),
        },
        |v| send(channel, Message::OtV { wire_index, v: encode_int(v) }),
        || match recv(channel)? {
            Message::OtM { m0_prime, m1_prime, .. } => {
                Ok((decode_int(&m0_prime), decode_int(&m1_prime)))
            }
            _ => Err(GcError::ChannelClosed),
        },
    )
}

/// Run the Garbler's side of the protocol (spec §4.5 "Garbler").
///
/// `garbler_inputs` holds the Garbler's own bit for each of his input
/// wires. `ot_channels` must list, in an order both parties agree on, one
/// dedicated [`PartyChannel`] per Evaluator input wire (every wire in
/// `circuit_desc.inputs` not present in `garbler_inputs`).
pub fn run_garbler(
    circuit_desc: CircuitDescription,
    garbler_inputs: &HashMap<String, bool>,
    security_bits: u32,
    rsa_bits: u32,
    main: &PartyChannel,
    ot_channels: &[(String, PartyChannel)],
    rng: &mut impl Rng,
) -> Result<()> {
    let circuit = Circuit::load(circuit_desc.clone())?;
    send(main, Message::Circuit(circuit_desc))?;

    let garbled = garble(&circuit, security_bits, rng)?;

    send(
        main,
        Message::Garbled {
            gates: garbled.gates.clone(),
            wire_order: garbled.wire_index.iter().map(str::to_string).collect(),
        },
    )?;

    for (wire, &bit) in garbler_inputs {
        let wire_index = garbled
            .wire_index
            .index_of(wire)
            .ok_or_else(|| GcError::CircuitInvalid(format!("unknown Garbler input wire {wire}")))?;
        let label = garbled
            .labels
            .get(wire)
            .ok_or_else(|| GcError::CircuitInvalid(format!("no label for wire {wire}")))?
            .label_for(bit);
        send(main, Message::GLabel { wire_index, label: encode_int(label) })?;
    }

    let mut ot_jobs = Vec::with_capacity(ot_channels.len());
    for (wire, channel) in ot_channels {
        let pair = garbled
            .labels
            .get(wire)
            .ok_or_else(|| GcError::CircuitInvalid(format!("no label for wire {wire}")))?;
        let wire_index = garbled
            .wire_index
            .index_of(wire)
            .ok_or_else(|| GcError::CircuitInvalid(format!("unknown Evaluator input wire {wire}")))?;
        ot_jobs.push((channel, wire_index, pair.zero.clone(), pair.one.clone(), derive_child_rng(rng)));
    }

    std::thread::scope(|scope| -> Result<()> {
        let handles: Vec<_> = ot_jobs
            .into_iter()
            .map(|(channel, wire_index, m0, m1, mut child_rng)| {
                scope.spawn(move || ot_send_over_channel(channel, wire_index, &m0, &m1, rsa_bits, &mut child_rng))
            })
            .collect();
        for handle in handles {
            handle.join().map_err(|_| GcError::CryptoPrimitiveFailure("OT sender thread panicked".into()))??;
        }
        Ok(())
    })?;

    let mut pairs = Vec::with_capacity(circuit.outputs.len());
    for output in &circuit.outputs {
        let pair = garbled
            .labels
            .get(output)
            .ok_or_else(|| GcError::CircuitInvalid(format!("no label for output wire {output}")))?;
        pairs.push((encode_int(&pair.zero), encode_int(&pair.one)));
    }
    send(main, Message::Decode { pairs })?;

    Ok(())
}

/// Run the Evaluator's side of the protocol (spec §4.5 "Evaluator").
/// Returns the decoded output bits, keyed by primary-output wire name.
pub fn run_evaluator(
    evaluator_inputs: &HashMap<String, bool>,
    rsa_bits: u32,
    main: &PartyChannel,
    ot_channels: &[(String, PartyChannel)],
    rng: &mut impl Rng,
) -> Result<HashMap<String, bool>> {
    let circuit_desc = match recv(main)? {
        Message::Circuit(desc) => desc,
        _ => return Err(GcError::ChannelClosed),
    };
    let circuit = Circuit::load(circuit_desc)?;

    let (gates, wire_order) = match recv(main)? {
        Message::Garbled { gates, wire_order } => (gates, wire_order),
        _ => return Err(GcError::ChannelClosed),
    };
    let wire_index = crate::circuit::WireIndex::new(wire_order);

    let mut input_labels: HashMap<usize, BigUint> = HashMap::new();

    let garbler_wire_count = circuit
        .inputs
        .iter()
        .filter(|w| !evaluator_inputs.contains_key(w.as_str()))
        .count();
    for _ in 0..garbler_wire_count {
        match recv(main)? {
            Message::GLabel { wire_index: idx, label } => {
                input_labels.insert(idx, decode_int(&label));
            }
            _ => return Err(GcError::ChannelClosed),
        }
    }

    let mut ot_jobs = Vec::with_capacity(ot_channels.len());
    for (wire, channel) in ot_channels {
        let choice = *evaluator_inputs
            .get(wire)
            .ok_or_else(|| GcError::CircuitInvalid(format!("no choice bit supplied for wire {wire}")))?;
        let idx = wire_index
            .index_of(wire)
            .ok_or_else(|| GcError::CircuitInvalid(format!("unknown Evaluator input wire {wire}")))?;
        ot_jobs.push((channel, idx, choice, derive_child_rng(rng)));
    }

    let ot_results: Vec<(usize, BigUint)> = std::thread::scope(|scope| -> Result<Vec<(usize, BigUint)>> {
        let handles: Vec<_> = ot_jobs
            .into_iter()
            .map(|(channel, idx, choice, mut child_rng)| {
                scope.spawn(move || {
                    ot_choose_over_channel(channel, idx, choice, rsa_bits, &mut child_rng)
                        .map(|label| (idx, label))
                })
            })
            .collect();
        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            results.push(
                handle
                    .join()
                    .map_err(|_| GcError::CryptoPrimitiveFailure("OT chooser thread panicked".into()))??,
            );
        }
        Ok(results)
    })?;
    for (idx, label) in ot_results {
        input_labels.insert(idx, label);
    }

    let output_indices: Vec<usize> = circuit
        .outputs
        .iter()
        .map(|w| {
            wire_index
                .index_of(w)
                .ok_or_else(|| GcError::CircuitInvalid(format!("unknown output wire {w}")))
        })
        .collect::<Result<_>>()?;

    let evaluated = evaluate(&gates, &input_labels, &output_indices)?;

    let pairs = match recv(main)? {
        Message::Decode { pairs } => pairs,
        _ => return Err(GcError::ChannelClosed),
    };
    if pairs.len() != circuit.outputs.len() {
        return Err(GcError::CircuitInvalid("decode table size mismatch".into()));
    }

    let mut result = HashMap::with_capacity(circuit.outputs.len());
    for (output, (label, (zero, one))) in circuit.outputs.iter().zip(evaluated.iter().zip(pairs.iter())) {
        let bit = decode_bit(label, &decode_int(zero), &decode_int(one))?;
        result.insert(output.clone(), bit);
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn and_circuit_description() -> CircuitDescription {
        let mut gates = HashMap::new();
        gates.insert("out".to_string(), ("AND".to_string(), vec!["x0".into(), "y0".into()]));
        CircuitDescription {
            inputs: vec!["x0".into(), "y0".into()],
            outputs: vec!["out".into()],
            gates,
        }
    }

    fn run_protocol(x: bool, y: bool) -> bool {
        let (garbler_main, evaluator_main) = channel_pair();
        let (garbler_ot, evaluator_ot) = channel_pair();

        let mut garbler_inputs = HashMap::new();
        garbler_inputs.insert("x0".to_string(), x);
        let mut evaluator_inputs = HashMap::new();
        evaluator_inputs.insert("y0".to_string(), y);

        let garbler_ot_channels = vec![("y0".to_string(), garbler_ot)];
        let evaluator_ot_channels = vec![("y0".to_string(), evaluator_ot)];

        std::thread::scope(|scope| {
            let circuit_desc = and_circuit_description();
            let garbler_handle = scope.spawn(move || {
                let mut rng = rand_chacha::ChaCha20Rng::seed_from_u64(777);
                run_garbler(
                    circuit_desc,
                    &garbler_inputs,
                    64,
                    256,
                    &garbler_main,
                    &garbler_ot_channels,
                    &mut rng,
                )
            });

            let evaluator_handle = scope.spawn(move || {
                let mut rng = rand_chacha::ChaCha20Rng::seed_from_u64(778);
                run_evaluator(&evaluator_inputs, 256, &evaluator_main, &evaluator_ot_channels, &mut rng)
            });

            garbler_handle.join().unwrap().unwrap();
            let outputs = evaluator_handle.join().unwrap().unwrap();
            outputs["out"]
        })
    }

    #[test]
    fn end_to_end_and_gate_over_channels_and_ot() {
        assert_eq!(run_protocol(false, false), false);
        assert_eq!(run_protocol(true, false), false);
        assert_eq!(run_protocol(false, true), false);
        assert_eq!(run_protocol(true, true), true);
    }
}
