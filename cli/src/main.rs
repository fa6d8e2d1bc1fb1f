use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use sfe_core::circuit::CircuitDescription;
use sfe_core::constants::{MIN_RSA_MODULUS_BITS, MIN_SECURITY_BITS};
use sfe_core::error::GcError;
use sfe_core::party::{channel_pair, run_evaluator, run_garbler, PartyChannel};

/// Run both parties of a garbled-circuit evaluation in one process, for
/// demonstration and manual testing of `sfe-core`.
#[derive(Parser, Debug)]
#[command(name = "sfe")]
#[command(about = "Run a two-party garbled-circuit evaluation in-process")]
#[command(version)]
struct Args {
    /// Path to a JSON circuit description (`inputs`, `outputs`, `gates`).
    #[arg(short = 'c', long = "circuit")]
    circuit: PathBuf,

    /// Garbler's input bits, as `wire=0` or `wire=1`, comma-separated.
    #[arg(long = "garbler-input", value_delimiter = ',')]
    garbler_input: Vec<String>,

    /// Evaluator's input bits, as `wire=0` or `wire=1`, comma-separated.
    #[arg(long = "evaluator-input", value_delimiter = ',')]
    evaluator_input: Vec<String>,

    /// Wire-label security parameter in bits.
    #[arg(long = "security-bits", default_value_t = MIN_SECURITY_BITS)]
    security_bits: u32,

    /// RSA modulus size in bits, used by the oblivious-transfer sub-protocol.
    #[arg(long = "rsa-bits", default_value_t = MIN_RSA_MODULUS_BITS)]
    rsa_bits: u32,
}

fn parse_bit_assignments(entries: &[String]) -> Result<HashMap<String, bool>> {
    let mut map = HashMap::with_capacity(entries.len());
    for entry in entries {
        let (wire, bit) = entry
            .split_once('=')
            .with_context(|| format!("expected wire=0|1, got {entry:?}"))?;
        let bit = match bit {
            "0" => false,
            "1" => true,
            other => anyhow::bail!("input bit must be 0 or 1, got {other:?} for wire {wire}"),
        };
        map.insert(wire.to_string(), bit);
    }
    Ok(map)
}

fn exit_code_for(err: &GcError) -> u8 {
    match err {
        GcError::CircuitInvalid(_) => 4,
        GcError::Io(_) | GcError::Serialization(_) => 1,
        GcError::MessageOutOfRange
        | GcError::GarbledTableCorrupt { .. }
        | GcError::AmbiguousGate { .. }
        | GcError::CryptoPrimitiveFailure(_)
        | GcError::PrimeGenExhausted
        | GcError::NotInvertible(_) => 3,
        GcError::MissingInputLabel { .. }
        | GcError::ChannelClosed
        | GcError::Timeout
        | GcError::PeerAborted { .. } => 2,
    }
}

fn run(args: &Args) -> std::result::Result<HashMap<String, bool>, GcError> {
    let raw = std::fs::read_to_string(&args.circuit)?;
    let circuit_desc: CircuitDescription = serde_json::from_str(&raw)?;

    let garbler_inputs =
        parse_bit_assignments(&args.garbler_input).map_err(|e| GcError::CircuitInvalid(e.to_string()))?;
    let evaluator_inputs = parse_bit_assignments(&args.evaluator_input)
        .map_err(|e| GcError::CircuitInvalid(e.to_string()))?;

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

    let security_bits = args.security_bits;
    let rsa_bits = args.rsa_bits;

    std::thread::scope(|scope| {
        let garbler_handle = scope.spawn(move || {
            let mut rng = ChaCha20Rng::from_os_rng();
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
            let mut rng = ChaCha20Rng::from_os_rng();
            run_evaluator(&evaluator_inputs, rsa_bits, &evaluator_main, &evaluator_ot_channels, &mut rng)
        });

        let garbler_result = garbler_handle.join().unwrap_or(Err(GcError::CryptoPrimitiveFailure(
            "Garbler thread panicked".into(),
        )));
        let evaluator_result = evaluator_handle.join().unwrap_or(Err(GcError::CryptoPrimitiveFailure(
            "Evaluator thread panicked".into(),
        )));

        garbler_result?;
        evaluator_result
    })
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(outputs) => {
            let json = serde_json::to_string_pretty(&outputs).expect("bool map always serializes");
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("sfe: {err}");
            ExitCode::from(exit_code_for(&err))
        }
    }
}
