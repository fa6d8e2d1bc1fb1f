//! Scenario 5 (spec §8): OT-only, Sender (7, 42), Chooser bit 1 -> 42,
//! then bit 0 -> 7. Exercises the public `sfe_core::ot` API end-to-end
//! rather than as a sub-step of a full protocol run.

use std::sync::mpsc;

use num_bigint::BigUint;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use sfe_core::ot::{self, OtSetup};

fn run_ot(m0: u64, m1: u64, choice: bool) -> BigUint {
    let (setup_tx, setup_rx) = mpsc::channel::<OtSetup>();
    let (x_tx, x_rx) = mpsc::channel::<(BigUint, BigUint)>();
    let (v_tx, v_rx) = mpsc::channel::<BigUint>();
    let (m_tx, m_rx) = mpsc::channel::<(BigUint, BigUint)>();

    std::thread::scope(|scope| {
        let m0 = BigUint::from(m0);
        let m1 = BigUint::from(m1);
        scope.spawn(move || {
            let mut rng = ChaCha20Rng::seed_from_u64(501);
            ot::send(
                &m0,
                &m1,
                256,
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
            let mut rng = ChaCha20Rng::seed_from_u64(502);
            ot::choose(
                choice,
                256,
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
fn chooser_recovers_the_chosen_message_only() {
    assert_eq!(run_ot(7, 42, true), BigUint::from(42u64));
    assert_eq!(run_ot(7, 42, false), BigUint::from(7u64));
}
