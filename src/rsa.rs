//! Textbook RSA key generation and modular exponentiation (spec §2
//! "TextbookRSA"), used exclusively by the oblivious-transfer
//! sub-protocol in [`crate::ot`].
//!
//! This is deliberately *not* a general-purpose RSA API: `encrypt`/
//! `decrypt` perform raw `m^e mod N` / `c^d mod N` with no padding and no
//! semantic-security argument of their own. That is safe here only
//! because OT encrypts uniformly random group elements, never caller
//! data (Design Note, Open Question on RSA blinding) — so the functions
//! stay crate-private.

use num_bigint::BigUint;
use num_traits::One;
use rand::RngCore;

use crate::bigint::{mod_inverse, zeroize_biguint_best_effort};
use crate::constants::{MILLER_RABIN_ROUNDS, RSA_PUBLIC_EXPONENT};
use crate::error::Result;
use crate::primegen::generate_prime;

/// Public RSA parameters `(e, N)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsaPublicKey {
    /// Public exponent.
    pub e: BigUint,
    /// Modulus.
    pub n: BigUint,
}

/// Private RSA parameters `(d, N)`. Owned exclusively by the OT Sender
/// for the duration of one protocol run; zeroised on drop.
#[derive(Debug)]
pub struct RsaPrivateKey {
    /// Private exponent.
    pub d: BigUint,
    /// Modulus (duplicated here so the private key is self-contained).
    pub n: BigUint,
}

impl Drop for RsaPrivateKey {
    fn drop(&mut self) {
        zeroize_biguint_best_effort(&mut self.d);
        zeroize_biguint_best_effort(&mut self.n);
    }
}

/// A freshly generated RSA key triple `(e, d, N)`.
#[derive(Debug)]
pub struct RsaKeyPair {
    /// Public half of the key.
    pub public: RsaPublicKey,
    /// Private half of the key.
    pub private: RsaPrivateKey,
}

/// Generate a fresh textbook-RSA key pair with an `modulus_bits`-bit
/// modulus and `e = 65537` (spec §4.4: `|N| >= 2048` bits).
pub fn generate_keypair(modulus_bits: u32, rng: &mut impl RngCore) -> Result<RsaKeyPair> {
    let e = BigUint::from(RSA_PUBLIC_EXPONENT);
    let half = modulus_bits / 2;

    loop {
        let p = generate_prime(half, MILLER_RABIN_ROUNDS, rng)?;
        let q = generate_prime(modulus_bits - half, MILLER_RABIN_ROUNDS, rng)?;
        if p == q {
            continue;
        }
        let n = &p * &q;
        let one = BigUint::one();
        let phi = (&p - &one) * (&q - &one);

        if let Ok(d) = mod_inverse(&e, &phi) {
            return Ok(RsaKeyPair {
                public: RsaPublicKey { e: e.clone(), n: n.clone() },
                private: RsaPrivateKey { d, n },
            });
        }
        // e was not invertible mod phi (extremely unlikely for e = 65537
        // and random primes of this size) - draw fresh primes and retry.
    }
}

/// `m^e mod N`. Crate-private: see module docs for why this must not be
/// exposed as a general encryption primitive.
pub(crate) fn modexp_public(m: &BigUint, pk: &RsaPublicKey) -> BigUint {
    m.modpow(&pk.e, &pk.n)
}

/// `c^d mod N`. Crate-private, see module docs.
pub(crate) fn modexp_private(c: &BigUint, sk: &RsaPrivateKey) -> BigUint {
    c.modpow(&sk.d, &sk.n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn encrypt_decrypt_round_trip_is_identity() {
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        let keypair = generate_keypair(256, &mut rng).unwrap();
        let m = BigUint::from(424242u64);
        assert!(m < keypair.private.n);

        let c = modexp_public(&m, &keypair.public);
        let recovered = modexp_private(&c, &keypair.private);
        assert_eq!(recovered, m);
    }

    #[test]
    fn modulus_has_requested_bit_length() {
        let mut rng = ChaCha20Rng::seed_from_u64(8);
        let keypair = generate_keypair(256, &mut rng).unwrap();
        assert_eq!(keypair.private.n.bits() as u32, 256);
    }
}
