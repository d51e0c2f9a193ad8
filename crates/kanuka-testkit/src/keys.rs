//! Process-wide pool of RSA keypairs.
//!
//! Generating a 2048-bit key takes long enough that every test doing it
//! from scratch would dominate the suite. The pool is filled once, lazily,
//! and shared by every test in the process.

use std::sync::OnceLock;

use kanuka_core::{PrivateKey, PublicKey, DEFAULT_KEY_BITS};

/// Number of distinct keypairs available.
pub const POOL_SIZE: usize = 4;

fn pool() -> &'static [PrivateKey] {
    static POOL: OnceLock<Vec<PrivateKey>> = OnceLock::new();
    POOL.get_or_init(|| {
        (0..POOL_SIZE)
            .map(|_| PrivateKey::generate(DEFAULT_KEY_BITS).expect("RSA key generation failed"))
            .collect()
    })
}

/// The pooled keypair at `index` (wraps around).
pub fn keypair(index: usize) -> &'static PrivateKey {
    &pool()[index % POOL_SIZE]
}

pub fn public_key(index: usize) -> PublicKey {
    keypair(index).public_key()
}

/// A 1024-bit key, below the accepted minimum.
pub fn weak_public_key() -> PublicKey {
    static WEAK: OnceLock<PublicKey> = OnceLock::new();
    WEAK.get_or_init(|| {
        PrivateKey::generate(1024)
            .expect("RSA key generation failed")
            .public_key()
    })
    .clone()
}
