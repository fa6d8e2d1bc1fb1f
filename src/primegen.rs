//! Probable-prime generation via small-prime sieving plus Miller-Rabin
//! (spec §2 "PrimeGen", §6 `prime(n)`).
//!
//! The Miller-Rabin witness loop here repeatedly halves the odd part of
//! `n - 1` while it is even, accumulating the power of two each time
//! (Design Note: the Go source this was distilled from only halves once,
//! which under-counts `r` for any `n` whose predecessor has more than one
//! factor of two and silently weakens the test).

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::RngCore;

use crate::bigint::rand_int_range;
use crate::error::{GcError, Result};

const SMALL_PRIMES: &[u64] = &[
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
    101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151, 157, 163, 167, 173, 179, 181, 191, 193,
    197, 199, 211, 223, 227, 229,
];

/// Upper bound on prime-generation attempts before giving up with
/// [`GcError::PrimeGenExhausted`]. Only reachable if the CSPRNG itself is
/// failing, since probable primes of cryptographic sizes are dense.
const MAX_ATTEMPTS: u32 = 100_000;

/// Miller-Rabin probabilistic primality test with `rounds` independent
/// witnesses. Returns `true` if `n` is probably prime (false-positive
/// probability `<= 4^-rounds`).
pub fn is_probable_prime(n: &BigUint, rounds: u32, rng: &mut impl RngCore) -> bool {
    let two = BigUint::from(2u32);
    let three = BigUint::from(3u32);
    if n == &two || n == &three {
        return true;
    }
    if n < &two || n.is_even() {
        return false;
    }

    let one = BigUint::one();
    let n_minus_1 = n - &one;

    // Decompose n - 1 = 2^r * s with s odd, repeatedly halving.
    let mut s = n_minus_1.clone();
    let mut r: u32 = 0;
    while s.is_even() {
        s >>= 1u32;
        r += 1;
    }

    let lower = BigUint::from(2u32);
    let upper = n - &two;

    'witness: for _ in 0..rounds {
        let a = rand_int_range(rng, &lower, &upper);
        let mut x = a.modpow(&s, n);
        if x == one || x == n_minus_1 {
            continue 'witness;
        }
        for _ in 0..r.saturating_sub(1) {
            x = x.modpow(&two, n);
            if x == n_minus_1 {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

/// Quick rejection: is `n` divisible by one of the first fifty primes?
/// Skips the far more expensive Miller-Rabin test for the common case of
/// an obviously-composite candidate.
fn divisible_by_small_prime(n: &BigUint) -> bool {
    for &p in SMALL_PRIMES {
        let p_big = BigUint::from(p);
        if n == &p_big {
            return false;
        }
        if (n % &p_big).is_zero() {
            return true;
        }
    }
    false
}

/// Generate an `n`-bit probable prime: a random odd integer in
/// `[2^(n-1), 2^n - 1]` that survives small-prime sieving and
/// [`MILLER_RABIN_ROUNDS`](crate::constants::MILLER_RABIN_ROUNDS) rounds of
/// Miller-Rabin.
///
/// Fails with [`GcError::PrimeGenExhausted`] only if the CSPRNG keeps
/// producing composites for [`MAX_ATTEMPTS`] consecutive draws, which in
/// practice only happens if the RNG itself is broken.
pub fn generate_prime(bits: u32, rounds: u32, rng: &mut impl RngCore) -> Result<BigUint> {
    assert!(bits >= 2, "prime generation requires at least 2 bits");
    let one = BigUint::one();
    let min = &one << (bits - 1);
    let max = (&one << bits) - &one;

    for _ in 0..MAX_ATTEMPTS {
        let mut candidate = rand_int_range(rng, &min, &max);
        candidate |= &one; // force odd
        if divisible_by_small_prime(&candidate) {
            continue;
        }
        if is_probable_prime(&candidate, rounds, rng) {
            return Ok(candidate);
        }
    }
    Err(GcError::PrimeGenExhausted)
}
