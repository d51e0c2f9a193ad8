//! Envelope cipher.
//!
//! A grant is the project's 32-byte symmetric key encrypted under one
//! identity's RSA public key with OAEP (SHA-256). OAEP padding is
//! randomized, so sealing the same key twice never yields the same bytes.

use rsa::Oaep;
use sha2::Sha256;

use crate::codec::{PrivateKey, PublicKey};
use crate::error::{CoreError, Result};
use crate::types::SymmetricKey;

fn padding() -> Oaep {
    Oaep::new::<Sha256>()
}

/// Encrypt the project key for the holder of `recipient`'s private key.
pub fn seal(key: &SymmetricKey, recipient: &PublicKey) -> Result<Vec<u8>> {
    recipient
        .as_rsa()
        .encrypt(&mut rand::thread_rng(), padding(), key.as_bytes())
        .map_err(|e| CoreError::EncryptFailed(e.to_string()))
}

/// Recover the project key from a grant.
///
/// Any padding or length mismatch yields [`CoreError::DecryptFailed`]
/// without further detail.
pub fn open(ciphertext: &[u8], key: &PrivateKey) -> Result<SymmetricKey> {
    let plaintext = zeroize::Zeroizing::new(
        key.as_rsa()
            .decrypt(padding(), ciphertext)
            .map_err(|_| CoreError::DecryptFailed)?,
    );
    SymmetricKey::from_slice(&plaintext).map_err(|_| CoreError::DecryptFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::DEFAULT_KEY_BITS;
    use proptest::prelude::*;
    use std::sync::OnceLock;

    fn keys() -> &'static (PrivateKey, PrivateKey) {
        static KEYS: OnceLock<(PrivateKey, PrivateKey)> = OnceLock::new();
        KEYS.get_or_init(|| {
            (
                PrivateKey::generate(DEFAULT_KEY_BITS).unwrap(),
                PrivateKey::generate(DEFAULT_KEY_BITS).unwrap(),
            )
        })
    }

    #[test]
    fn test_seal_open_roundtrip() {
        let (alice, _) = keys();
        let key = SymmetricKey::generate();

        let grant = seal(&key, &alice.public_key()).unwrap();
        let opened = open(&grant, alice).unwrap();

        assert_eq!(opened.as_bytes(), key.as_bytes());
        assert_eq!(grant.len(), 256);
    }

    #[test]
    fn test_sealing_twice_differs() {
        let (alice, _) = keys();
        let key = SymmetricKey::generate();

        let a = seal(&key, &alice.public_key()).unwrap();
        let b = seal(&key, &alice.public_key()).unwrap();

        assert_ne!(a, b);
        assert_eq!(open(&a, alice).unwrap(), open(&b, alice).unwrap());
    }

    #[test]
    fn test_sealing_for_different_recipients_differs() {
        let (alice, bob) = keys();
        let key = SymmetricKey::generate();

        let for_alice = seal(&key, &alice.public_key()).unwrap();
        let for_bob = seal(&key, &bob.public_key()).unwrap();

        assert_ne!(for_alice, for_bob);
    }

    #[test]
    fn test_wrong_private_key_fails() {
        let (alice, bob) = keys();
        let grant = seal(&SymmetricKey::generate(), &alice.public_key()).unwrap();

        assert!(matches!(open(&grant, bob), Err(CoreError::DecryptFailed)));
    }

    #[test]
    fn test_corrupted_ciphertext_fails() {
        let (alice, _) = keys();
        let mut grant = seal(&SymmetricKey::generate(), &alice.public_key()).unwrap();
        grant[17] ^= 0x01;

        assert!(matches!(open(&grant, alice), Err(CoreError::DecryptFailed)));
        assert!(matches!(open(&grant[..100], alice), Err(CoreError::DecryptFailed)));
        assert!(matches!(open(&[], alice), Err(CoreError::DecryptFailed)));
    }

    #[test]
    fn test_non_key_plaintext_rejected() {
        let (alice, _) = keys();
        let sixteen = alice
            .public_key()
            .as_rsa()
            .encrypt(&mut rand::thread_rng(), padding(), &[7u8; 16])
            .unwrap();

        assert!(matches!(open(&sixteen, alice), Err(CoreError::DecryptFailed)));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_open_recovers_sealed_key(bytes in any::<[u8; 32]>()) {
            let (alice, _) = keys();
            let key = SymmetricKey::from_bytes(bytes);

            let grant = seal(&key, &alice.public_key()).unwrap();

            let opened = open(&grant, alice).unwrap();
            prop_assert_eq!(opened.as_bytes(), &bytes);
        }
    }
}
