//! Scoped AES-GCM wrapper: `aead-seal`/`aead-open` with random nonces
//! (spec §2 "AEAD wrapper", §6 primitive contracts).
//!
//! A sealed [`GarbledRow`](crate::circuit::GarbledRow) is the ciphertext
//! (tag included) followed by its 12-byte nonce, exactly as spec §3/§4.2
//! describe it; callers never see the nonce as a separate value.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use rand::RngCore;
use sha3::{Digest, Sha3_256};

use crate::constants::AEAD_NONCE_LEN;

/// Derive a row's AES-256 key as SHA3-256 of its input labels' big-endian
/// byte encodings, concatenated in input order (spec §4.2 step 4, §4.3).
/// The Garbler and the Evaluator must call this with byte-identical
/// encodings of the same labels or every row will fail to authenticate.
pub fn derive_row_key(label_byte_encodings: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha3_256::new();
    for encoding in label_byte_encodings {
        hasher.update(encoding);
    }
    hasher.finalize().into()
}

/// Seal `plaintext` under `key` with a fresh random nonce drawn from
/// `rng`, returning `ciphertext-with-tag ∥ nonce` as a single buffer.
///
/// `rng` is threaded through explicitly (rather than using an OS RNG
/// internally) so that all randomness in one garbling run — label
/// generation, row shuffling, and nonce generation alike — comes from
/// the single seeded CSPRNG the caller owns.
pub fn seal(key: &[u8; 32], plaintext: &[u8], rng: &mut impl RngCore) -> Vec<u8> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    let mut nonce_bytes = [0u8; AEAD_NONCE_LEN];
    rng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    // AES-256-GCM with a 32-byte key and a never-reused random nonce does
    // not fail to encrypt; a fallible path here would only mask a logic
    // bug, so the crate treats this as infallible.
    let mut row = cipher
        .encrypt(nonce, plaintext)
        .expect("AES-256-GCM encryption with a valid key/nonce cannot fail");
    row.extend_from_slice(&nonce_bytes);
    row
}

/// Attempt to open a `ciphertext-with-tag ∥ nonce` row under `key`.
/// Returns `None` on authentication failure or a malformed (too-short)
/// row — both are the *expected* outcome for every row but the one
/// matching the evaluator's current input labels (spec §4.3).
pub fn open(key: &[u8; 32], row: &[u8]) -> Option<Vec<u8>> {
    if row.len() < AEAD_NONCE_LEN {
        return None;
    }
    let (ciphertext, nonce_bytes) = row.split_at(row.len() - AEAD_NONCE_LEN);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    let nonce = Nonce::from_slice(nonce_bytes);
    cipher.decrypt(nonce, ciphertext).ok()
}
