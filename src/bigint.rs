//! Thin adapter over the arbitrary-precision integer and CSPRNG
//! primitives the rest of the crate is built on (spec §2, "BigInt / RNG
//! adapter", and the `prime`/`mod-inverse`/`rand-int` contracts of §6).
//!
//! Every other module reaches big integers and randomness through this
//! module rather than calling `num_bigint`/`rand` directly, so the choice
//! of backing crate stays in one place.

use num_bigint::{BigInt, BigUint, RandBigInt, Sign};
use rand::RngCore;
use zeroize::Zeroize;

use crate::error::{GcError, Result};

/// Overwrite the one copy of `x` reachable through this binding with zero
/// bytes before it is replaced. `BigUint`'s backing allocation is still
/// freed by the global allocator without a guaranteed wipe, so this is
/// best-effort, matching [`crate::rsa::RsaPrivateKey`]'s `Drop` impl.
pub(crate) fn zeroize_biguint_best_effort(x: &mut BigUint) {
    let mut bytes = x.to_bytes_le();
    bytes.zeroize();
    *x = BigUint::from(0u32);
}

/// Draw a uniform integer in `[lo, hi]` (inclusive on both ends, matching
/// the `rand-int(lo, hi)` contract of spec §6) using the given CSPRNG.
pub fn rand_int_range(rng: &mut impl RngCore, lo: &BigUint, hi_inclusive: &BigUint) -> BigUint {
    debug_assert!(lo <= hi_inclusive, "rand_int_range: empty range");
    let hi_exclusive = hi_inclusive + BigUint::from(1u32);
    rng.gen_biguint_range(lo, &hi_exclusive)
}

/// Draw a uniform integer in `[0, 2^bits)`.
pub fn rand_bits(rng: &mut impl RngCore, bits: u64) -> BigUint {
    rng.gen_biguint(bits)
}

/// Big-endian unsigned encoding of `x`, without leading zero bytes
/// (spec §4.2: "WITHOUT leading zero bytes"). `BigUint::to_bytes_be`
/// already produces the minimal representation for every value except
/// zero, which is excluded from the label domain (`[1, 2^k - 1]`).
pub fn encode_be(x: &BigUint) -> Vec<u8> {
    x.to_bytes_be()
}

/// Parse a big-endian unsigned encoding back into a [`BigUint`].
pub fn decode_be(bytes: &[u8]) -> BigUint {
    BigUint::from_bytes_be(bytes)
}

/// Fixed-length big-endian encoding, left-padded with zero bytes to
/// `len`. Used where the wire protocol pins a fixed-width field (e.g. RSA
/// values serialized as `ceil(|N|/8)` bytes, spec §4.4).
pub fn encode_be_fixed(x: &BigUint, len: usize) -> Vec<u8> {
    let raw = x.to_bytes_be();
    debug_assert!(raw.len() <= len, "value does not fit in {len} bytes");
    let mut out = vec![0u8; len - raw.len().min(len)];
    out.extend_from_slice(&raw);
    out
}

/// Modular inverse of `a` modulo `m`: returns `a^-1 mod m` such that
/// `(a * a^-1) mod m == 1`, or [`GcError::NotInvertible`] when
/// `gcd(a, m) != 1` (spec §6, `mod-inverse`).
pub fn mod_inverse(a: &BigUint, m: &BigUint) -> Result<BigUint> {
    let (gcd, x, _y) = extended_gcd(&BigInt::from(a.clone()), &BigInt::from(m.clone()));
    if gcd != BigInt::from(1) {
        return Err(GcError::NotInvertible(format!(
            "gcd(a, m) = {gcd} != 1, no modular inverse exists"
        )));
    }
    let m_signed = BigInt::from(m.clone());
    let mut result = x % &m_signed;
    if result.sign() == Sign::Minus {
        result += &m_signed;
    }
    result
        .to_biguint()
        .ok_or_else(|| GcError::NotInvertible("inverse reduction produced a negative value".into()))
}

/// Iterative extended Euclidean algorithm: returns `(gcd, x, y)` such
/// that `a*x + b*y == gcd`.
fn extended_gcd(a: &BigInt, b: &BigInt) -> (BigInt, BigInt, BigInt) {
    let (mut old_r, mut r) = (a.clone(), b.clone());
    let (mut old_s, mut s) = (BigInt::from(1), BigInt::from(0));
    let (mut old_t, mut t) = (BigInt::from(0), BigInt::from(1));

    while r != BigInt::from(0) {
        let quotient = &old_r / &r;
        let new_r = &old_r - &quotient * &r;
        old_r = std::mem::replace(&mut r, new_r);

        let new_s = &old_s - &quotient * &s;
        old_s = std::mem::replace(&mut s, new_s);

        let new_t = &old_t - &quotient * &t;
        old_t = std::mem::replace(&mut t, new_t);
    }

    (old_r, old_s, old_t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn encode_decode_round_trip() {
        let x = BigUint::from(123456789u64);
        let bytes = encode_be(&x);
        assert_eq!(bytes[0] != 0, true, "no leading zero byte");
        assert_eq!(decode_be(&bytes), x);
    }

    #[test]
    fn mod_inverse_matches_definition() {
        let a = BigUint::from(17u32);
        let m = BigUint::from(3120u32);
        let inv = mod_inverse(&a, &m).unwrap();
        assert_eq!((&a * &inv) % &m, BigUint::from(1u32));
    }

    #[test]
    fn mod_inverse_rejects_non_coprime() {
        let a = BigUint::from(6u32);
        let m = BigUint::from(9u32);
        assert!(mod_inverse(&a, &m).is_err());
    }

    #[test]
    fn rand_int_range_stays_in_bounds() {
        let mut rng = ChaCha20Rng::seed_from_u64(42);
        let lo = BigUint::from(1u32);
        let hi = BigUint::from(1000u32);
        for _ in 0..100 {
            let v = rand_int_range(&mut rng, &lo, &hi);
            assert!(v >= lo && v <= hi);
        }
    }
}
