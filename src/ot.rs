//! EGL (Even-Goldreich-Lempel) RSA-based 1-of-2 oblivious transfer (spec
//! §4.4). Two roles, `Sender` and `Chooser`, each driving their half of
//! the six-message exchange over one OT channel pair. Used once per
//! Evaluator input wire by [`crate::party`].

use num_bigint::BigUint;
use rand::Rng;
use zeroize::Zeroize;

use crate::bigint::{encode_be_fixed, rand_bits, zeroize_biguint_best_effort};
use crate::error::{GcError, Result};
use crate::rsa::{self, generate_keypair, RsaPublicKey};

/// One message exchanged during an OT run, already split from its
/// envelope. The party orchestration layer (spec §6 OT-SETUP/OT-X/OT-V/
/// OT-M tags) is responsible for framing these as wire messages; this
/// module only computes their contents.
pub struct OtSetup {
    /// Sender's RSA public key.
    pub public: RsaPublicKey,
}

/// Run the Sender's half of one OT invocation (spec §4.4 steps 1, 2-3,
/// 6-7). `m0`/`m1` are the two messages (for this crate: wire labels);
/// both must be strictly less than the freshly generated modulus or this
/// fails with [`GcError::MessageOutOfRange`] rather than silently
/// reducing them, per spec §9's open question.
///
/// `recv_v` is called once to obtain the Chooser's blinded value `v`
/// (spec step 5); it is a callback rather than a channel type so this
/// module stays agnostic of the concrete transport.
pub fn send(
    m0: &BigUint,
    m1: &BigUint,
    rsa_bits: u32,
    rng: &mut impl Rng,
    send_setup: impl FnOnce(&OtSetup) -> Result<()>,
    send_x: impl FnOnce(&BigUint, &BigUint) -> Result<()>,
    recv_v: impl FnOnce() -> Result<BigUint>,
    send_m: impl FnOnce(&BigUint, &BigUint) -> Result<()>,
) -> Result<()> {
    let keypair = generate_keypair(rsa_bits, rng)
        .map_err(|e| GcError::CryptoPrimitiveFailure(format!("OT RSA keygen failed: {e}")))?;
    let n = &keypair.public.n;

    if m0 >= n || m1 >= n {
        return Err(GcError::MessageOutOfRange);
    }

    send_setup(&OtSetup { public: keypair.public.clone() })?;

    let modulus_bits = n.bits();
    let x0 = rand_bits(rng, modulus_bits);
    let x1 = rand_bits(rng, modulus_bits);
    send_x(&x0, &x1)?;

    let v = recv_v()?;

    let d0 = modular_difference(&v, &x0, n);
    let d1 = modular_difference(&v, &x1, n);
    let root0 = rsa::modexp_private(&d0, &keypair.private);
    let root1 = rsa::modexp_private(&d1, &keypair.private);

    let m0_prime = (m0 + &root0) % n;
    let m1_prime = (m1 + &root1) % n;

    send_m(&m0_prime, &m1_prime)
}

/// Run the Chooser's half of one OT invocation (spec §4.4 steps 4, 5, 8).
/// Returns `m_choice`. `k` and `choice` are zeroised before returning.
pub fn choose(
    choice: bool,
    rsa_bits: u32,
    rng: &mut impl Rng,
    recv_setup: impl FnOnce() -> Result<OtSetup>,
    recv_x: impl FnOnce() -> Result<(BigUint, BigUint)>,
    send_v: impl FnOnce(&BigUint) -> Result<()>,
    recv_m: impl FnOnce() -> Result<(BigUint, BigUint)>,
) -> Result<BigUint> {
    let setup = recv_setup()?;
    let (x0, x1) = recv_x()?;
    let n = &setup.public.n;

    let mut k = {
        let modulus_bits = n.bits();
        loop {
            let candidate = rand_bits(rng, modulus_bits.max(rsa_bits as u64));
            if candidate < *n {
                break candidate;
            }
        }
    };

    let x_choice = if choice { &x1 } else { &x0 };
    let k_e = rsa::modexp_public(&k, &setup.public);
    let v = (x_choice + &k_e) % n;
    send_v(&v)?;

    let (m0_prime, m1_prime) = recv_m()?;
    let m_prime_choice = if choice { &m1_prime } else { &m0_prime };

    let result = modular_difference(m_prime_choice, &k, n);

    zeroize_biguint_best_effort(&mut k);
    let mut choice_byte: u8 = if choice { 1 } else { 0 };
    choice_byte.zeroize();

    Ok(result)
}

/// `(a - b) mod n`, always returning a value in `[0, n)` (num-bigint's
/// unsigned subtraction panics on underflow, so this adds `n` back in
/// first when `a < b`).
fn modular_difference(a: &BigUint, b: &BigUint, n: &BigUint) -> BigUint {
    if a >= b {
        (a - b) % n
    } else {
        (n - (b - a) % n) % n
    }
}

/// Encode an OT protocol value as a fixed-width big-endian byte string of
/// length `ceil(modulus_bits / 8)`, per spec §4.4's wire format.
pub fn encode_ot_value(x: &BigUint, modulus_bits: u64) -> Vec<u8> {
    let len = modulus_bits.div_ceil(8) as usize;
    encode_be_fixed(x, len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;
    use std::sync::mpsc;

    /// Run one OT end-to-end in-process over plain mpsc channels, purely
    /// to exercise `send`/`choose` against each other without involving
    /// the party-orchestration transport.
    fn run_ot(m0: u64, m1: u64, choice: bool, rsa_bits: u32) -> BigUint {
        let (setup_tx, setup_rx) = mpsc::channel::<OtSetup>();
        let (x_tx, x_rx) = mpsc::channel::<(BigUint, BigUint)>();
        let (v_tx, v_rx) = mpsc::channel::<BigUint>();
        let (m_tx, m_rx) = mpsc::channel::<(BigUint, BigUint)>();

        let sender_rng_seed = 900;
        let chooser_rng_seed = 901;

        std::thread::scope(|scope| {
            let m0 = BigUint::from(m0);
            let m1 = BigUint::from(m1);
            scope.spawn(move || {
                let mut rng = ChaCha20Rng::seed_from_u64(sender_rng_seed);
                send(
                    &m0,
                    &m1,
                    rsa_bits,
                    &mut rng,
                    |setup| {
                        setup_tx.send(OtSetup { public: setup.public.clone() }).unwrap();
                        Ok(())
                    },
                    |x0, x1| {
                        x_tx.send((x0.clone(), x1.clone())).unwrap();
                        Ok(())
                    },
                    || Ok(v_rx.recv().unwrap()),
                    |m0p, m1p| {
                        m_tx.send((m0p.clone(), m1p.clone())).unwrap();
                        Ok(())
                    },
                )
                .unwrap();
            });

            let handle = scope.spawn(move || {
                let mut rng = ChaCha20Rng::seed_from_u64(chooser_rng_seed);
                choose(
                    choice,
                    rsa_bits,
                    &mut rng,
                    || Ok(setup_rx.recv().unwrap()),
                    || Ok(x_rx.recv().unwrap()),
                    |v| {
                        v_tx.send(v.clone()).unwrap();
                        Ok(())
                    },
                    || Ok(m_rx.recv().unwrap()),
                )
                .unwrap()
            });

            handle.join().unwrap()
        })
    }

    #[test]
    fn chooser_recovers_m0_when_choice_is_zero() {
        let recovered = run_ot(7, 42, false, 256);
        assert_eq!(recovered, BigUint::from(7u64));
    }

    #[test]
    fn chooser_recovers_m1_when_choice_is_one() {
        let recovered = run_ot(7, 42, true, 256);
        assert_eq!(recovered, BigUint::from(42u64));
    }

    #[test]
    fn sender_rejects_message_out_of_range() {
        let mut rng = ChaCha20Rng::seed_from_u64(902);
        let oversized = (BigUint::from(1u32) << 300u32) + BigUint::from(1u32);
        let result = send(
            &oversized,
            &BigUint::from(1u32),
            256,
            &mut rng,
            |_| Ok(()),
            |_, _| Ok(()),
            || Ok(BigUint::from(0u32)),
            |_, _| Ok(()),
        );
        assert!(matches!(result, Err(GcError::MessageOutOfRange)));
    }

    #[test]
    fn modular_difference_never_underflows() {
        let n = BigUint::from(97u32);
        let a = BigUint::from(3u32);
        let b = BigUint::from(50u32);
        let d = modular_difference(&a, &b, &n);
        assert_eq!((&d + &b) % &n, a);
    }
}
