//! End-to-end behaviour of the public token API.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use cryptex::{generate_key, Clock, Cryptex, CryptexError, MultiCryptex, TokenParts};

const TEST_DATA: &[u8] = b"Test data";

/// Clock that only moves when told to.
#[derive(Default)]
struct ManualClock(AtomicU64);

impl ManualClock {
    fn at(now: u64) -> Arc<Self> {
        Arc::new(Self(AtomicU64::new(now)))
    }

    fn advance(&self, secs: u64) {
        self.0.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_unix(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

#[test]
fn example_payload_round_trip() {
    let cryptex = Cryptex::new(&generate_key()).unwrap();
    let token = cryptex.encrypt(TEST_DATA, None).unwrap();
    assert_eq!(cryptex.decrypt(&token).unwrap(), b"Test data".to_vec());
}

#[test]
fn round_trip_various_payloads() {
    let cryptex = Cryptex::new(&generate_key()).unwrap();
    let big = vec![0x5Au8; 64 * 1024];
    let payloads: [&[u8]; 4] = [b"", b"x", "héllo wörld".as_bytes(), &big];
    for payload in payloads {
        let token = cryptex.encrypt(payload, Some(60)).unwrap();
        assert_eq!(cryptex.decrypt(&token).unwrap(), payload);
    }
}

#[test]
fn ttl_expires_after_clock_advances() {
    let clock = ManualClock::at(1_700_000_000);
    let cryptex = Cryptex::new(&generate_key())
        .unwrap()
        .with_clock(clock.clone());

    let token = cryptex.encrypt(TEST_DATA, Some(5)).unwrap();
    assert_eq!(cryptex.decrypt(&token).unwrap(), TEST_DATA);

    clock.advance(6);
    assert_eq!(
        cryptex.decrypt(&token),
        Err(CryptexError::TokenExpired { seconds_past: 1 })
    );
}

#[test]
fn untimed_token_survives_any_clock() {
    let clock = ManualClock::at(1_700_000_000);
    let cryptex = Cryptex::new(&generate_key())
        .unwrap()
        .with_clock(clock.clone());

    let token = cryptex.encrypt(TEST_DATA, None).unwrap();
    clock.advance(100 * 365 * 24 * 3_600);
    assert_eq!(cryptex.decrypt(&token).unwrap(), TEST_DATA);
}

#[test]
fn expiry_is_readable_but_not_trusted_before_verification() {
    let clock = ManualClock::at(1_000);
    let cryptex = Cryptex::new(&generate_key())
        .unwrap()
        .with_clock(clock.clone());
    let token = cryptex.encrypt(TEST_DATA, Some(30)).unwrap();

    let parts = TokenParts::from_text(&token).unwrap();
    assert_eq!(parts.expiry(), Some(1_030));
    assert_eq!(parts.ciphertext.len(), TEST_DATA.len());

    let decoded = cryptex.decrypt_token(&token).unwrap();
    assert_eq!(decoded.expiry, Some(1_030));
}

#[test]
fn same_input_gives_different_tokens() {
    let cryptex = Cryptex::new(&generate_key()).unwrap();
    let a = cryptex.encrypt(TEST_DATA, None).unwrap();
    let b = cryptex.encrypt(TEST_DATA, None).unwrap();
    assert_ne!(a, b);
}

#[test]
fn rotation_accepts_tokens_from_retired_key() {
    let k_new = generate_key();
    let k_old = generate_key();
    let token = Cryptex::new(&k_old).unwrap().encrypt(TEST_DATA, None).unwrap();

    let ring = MultiCryptex::new([&k_new, &k_old]).unwrap();
    assert_eq!(ring.decrypt(&token).unwrap(), TEST_DATA);
}

#[test]
fn ring_rejects_foreign_key() {
    let ring = MultiCryptex::new([generate_key(), generate_key()]).unwrap();
    let token = Cryptex::new(&generate_key())
        .unwrap()
        .encrypt(TEST_DATA, None)
        .unwrap();
    assert_eq!(ring.decrypt(&token), Err(CryptexError::NoValidKey));
}

#[test]
fn ring_ttl_expiry_surfaces_as_expired() {
    let clock = ManualClock::at(5_000);
    let ring = MultiCryptex::new([generate_key(), generate_key()])
        .unwrap()
        .with_clock(clock.clone());

    let token = ring.encrypt(TEST_DATA, Some(5)).unwrap();
    assert_eq!(ring.decrypt(&token).unwrap(), TEST_DATA);

    clock.advance(6);
    assert!(matches!(
        ring.decrypt(&token),
        Err(CryptexError::TokenExpired { .. })
    ));
}

#[test]
fn codec_is_shareable_across_threads() {
    let cryptex = Arc::new(Cryptex::new(&generate_key()).unwrap());
    let handles: Vec<_> = (0..4u8)
        .map(|i| {
            let cryptex = Arc::clone(&cryptex);
            std::thread::spawn(move || {
                let payload = vec![i; 16];
                let token = cryptex.encrypt(&payload, None).unwrap();
                assert_eq!(cryptex.decrypt(&token).unwrap(), payload);
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
}
