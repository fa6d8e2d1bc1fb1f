//! Error kinds propagated by the secure function evaluation core (spec §7).
//!
//! No error is swallowed except the evaluator's expected per-row AEAD
//! failure, which is consumed locally inside the trial-decryption loop
//! (§4.3) and never surfaces as a [`GcError`]. Every other failure
//! propagates to the party orchestration layer, which signals the peer
//! with `Message::Abort` and tears the protocol down. Diagnostics never
//! include a label, input bit, or RSA secret.

use thiserror::Error;

/// The error type for every fallible operation in this crate.
#[derive(Error, Debug)]
pub enum GcError {
    /// The circuit description failed validation: an unknown gate kind, an
    /// arity mismatch, a dependency cycle, or a dangling wire reference.
    #[error("circuit invalid: {0}")]
    CircuitInvalid(String),

    /// An oblivious-transfer message was `>= N`, the RSA modulus. The
    /// protocol must abort rather than silently reduce or pad it.
    #[error("OT message out of range for modulus N")]
    MessageOutOfRange,

    /// No garbled row authenticated for a gate during evaluation.
    #[error("garbled table corrupt at gate {gate}")]
    GarbledTableCorrupt {
        /// WireIndex of the gate whose table failed to decrypt.
        gate: usize,
    },

    /// More than one garbled row authenticated for a gate (overwhelmingly
    /// improbable; indicates an RNG or label-collision defect).
    #[error("ambiguous garbled table at gate {gate}")]
    AmbiguousGate {
        /// WireIndex of the affected gate.
        gate: usize,
    },

    /// The evaluator's `input-labels` map did not cover every primary-input
    /// wire index exactly once.
    #[error("missing input label for wire index {wire_index}")]
    MissingInputLabel {
        /// WireIndex that had no entry in the input-labels map.
        wire_index: usize,
    },

    /// A channel between the two parties was closed before the protocol
    /// completed.
    #[error("channel closed unexpectedly")]
    ChannelClosed,

    /// A party did not respond within the expected number of protocol
    /// steps.
    #[error("timed out waiting for peer")]
    Timeout,

    /// The peer sent an explicit `Message::Abort`.
    #[error("peer aborted the protocol (reason code {reason_code})")]
    PeerAborted {
        /// The 1-byte reason code carried by the `Abort` message.
        reason_code: u8,
    },

    /// A cryptographic primitive (RNG, prime generation, modular inverse)
    /// failed.
    #[error("cryptographic primitive failure: {0}")]
    CryptoPrimitiveFailure(String),

    /// The RNG-backed prime generator could not produce a prime in a
    /// bounded number of attempts.
    #[error("prime generation exhausted its attempt budget")]
    PrimeGenExhausted,

    /// `mod_inverse(a, m)` was asked for an `a` not invertible modulo `m`
    /// (i.e. gcd(a, m) != 1).
    #[error("{0} has no inverse modulo the given modulus")]
    NotInvertible(String),

    /// An I/O error surfaced while loading a circuit description or
    /// writing a result (CLI / test-fixture boundary only).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A circuit description or protocol message failed to (de)serialize.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GcError>;

impl From<serde_json::Error> for GcError {
    fn from(err: serde_json::Error) -> Self {
        GcError::Serialization(err.to_string())
    }
}
