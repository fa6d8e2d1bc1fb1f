//! Typed messages exchanged between the two parties (spec §6), one
//! variant per wire-protocol tag. Parties exchange these over the two
//! typed channels `crate::party` sets up; framing/length-prefixing is the
//! transport's concern, not this module's — `serde`/`bincode` already
//! give every variant an unambiguous byte encoding.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::circuit::{CircuitDescription, GarbledGate};

/// Big-endian-encoded integer, carried as owned bytes over the wire
/// (spec §6: "All integers are big-endian unsigned...").
pub type WireInt = Vec<u8>;

/// One message of the Garbler<->Evaluator wire protocol (spec §6 table).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Message {
    /// `CIRCUIT`: the pre-parsed circuit description.
    Circuit(CircuitDescription),

    /// `GARBLED`: the full garbled-gate array, one slot per WireIndex
    /// position (`None` for primary inputs), plus the WireIndex itself
    /// (wire names in topological order, so the Evaluator can rebuild the
    /// name<->index bijection).
    Garbled {
        /// Garbled gates, indexed by WireIndex position.
        gates: Vec<Option<GarbledGate>>,
        /// Wire names in WireIndex (topological) order.
        wire_order: Vec<String>,
    },

    /// `G-LABEL`: the Garbler's own input-wire label for one wire.
    GLabel {
        /// WireIndex position of the input wire.
        wire_index: usize,
        /// The label matching the Garbler's bit for that wire.
        label: WireInt,
    },

    /// `OT-SETUP`: the OT Sender's RSA public key for one OT invocation.
    OtSetup {
        /// Which Evaluator input wire this OT invocation transfers.
        wire_index: usize,
        /// Public exponent `e`.
        e: WireInt,
        /// Modulus `N`.
        n: WireInt,
    },

    /// `OT-X`: the Sender's two random blinding values.
    OtX {
        /// Which Evaluator input wire this OT invocation transfers.
        wire_index: usize,
        /// `x0`.
        x0: WireInt,
        /// `x1`.
        x1: WireInt,
    },

    /// `OT-V`: the Chooser's blinded value.
    OtV {
        /// Which Evaluator input wire this OT invocation transfers.
        wire_index: usize,
        /// `v`.
        v: WireInt,
    },

    /// `OT-M`: the Sender's two masked messages.
    OtM {
        /// Which Evaluator input wire this OT invocation transfers.
        wire_index: usize,
        /// `m0'`.
        m0_prime: WireInt,
        /// `m1'`.
        m1_prime: WireInt,
    },

    /// `DECODE`: for each primary output wire, its `(L0, L1)` pair.
    Decode {
        /// Ordered to match the circuit's `outputs` list.
        pairs: Vec<(WireInt, WireInt)>,
    },

    /// `OUTPUT`: for each primary output wire, the Evaluator's decoded
    /// label (optional reverse-direction message, spec §6).
    Output {
        /// Ordered to match the circuit's `outputs` list.
        labels: Vec<WireInt>,
    },

    /// `ABORT`: a party is tearing the protocol down.
    Abort {
        /// 1-byte reason code (spec §6); mirrors a [`crate::error::GcError`]
        /// variant without leaking its payload.
        reason_code: u8,
    },
}

/// Abort reason codes carried by [`Message::Abort`] (spec §7: "no label,
/// no input bit, no RSA secret is ever included in diagnostics" — hence a
/// bare code, never the error's formatted text).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AbortReason {
    /// `GcError::CircuitInvalid`.
    CircuitInvalid = 1,
    /// `GcError::MessageOutOfRange`.
    MessageOutOfRange = 2,
    /// `GcError::GarbledTableCorrupt`.
    GarbledTableCorrupt = 3,
    /// `GcError::AmbiguousGate`.
    AmbiguousGate = 4,
    /// `GcError::MissingInputLabel`.
    MissingInputLabel = 5,
    /// `GcError::Timeout`.
    Timeout = 6,
    /// `GcError::CryptoPrimitiveFailure` or `GcError::PrimeGenExhausted`
    /// or `GcError::NotInvertible`.
    CryptoFailure = 7,
    /// Any other fatal error (I/O, serialization, channel closed).
    Other = 255,
}

impl crate::error::GcError {
    /// Map this error to the abort reason code sent to the peer.
    pub fn abort_reason(&self) -> AbortReason {
        use crate::error::GcError::*;
        match self {
            CircuitInvalid(_) => AbortReason::CircuitInvalid,
            MessageOutOfRange => AbortReason::MessageOutOfRange,
            GarbledTableCorrupt { .. } => AbortReason::GarbledTableCorrupt,
            AmbiguousGate { .. } => AbortReason::AmbiguousGate,
            MissingInputLabel { .. } => AbortReason::MissingInputLabel,
            Timeout => AbortReason::Timeout,
            CryptoPrimitiveFailure(_) | PrimeGenExhausted | NotInvertible(_) => {
                AbortReason::CryptoFailure
            }
            ChannelClosed | PeerAborted { .. } | Io(_) | Serialization(_) => AbortReason::Other,
        }
    }
}

/// Encode a [`BigUint`] as a [`WireInt`] for inclusion in a [`Message`].
pub fn encode_int(x: &BigUint) -> WireInt {
    crate::bigint::encode_be(x)
}

/// Decode a [`WireInt`] back into a [`BigUint`].
pub fn decode_int(bytes: &WireInt) -> BigUint {
    crate::bigint::decode_be(bytes)
}
