//! # Cryptographic Operations
//!
//! Hybrid encryption of text: every message gets a fresh AES-256-GCM session
//! key and nonce, and only the session key is encrypted with RSA.
//!
//! ## Algorithm
//!
//! - **Bulk cipher**: AES-256-GCM, 32-byte key, 12-byte nonce, 16-byte tag
//! - **Key wrapping**: RSA-OAEP with SHA-256 (MGF1-SHA-256, empty label)
//! - **Randomness**: OS random number generator, per call
//!
//! ## Payload Format
//!
//! ```text
//! v1:RSA-AES256-GCM:<base64 wrapped key>:<base64 nonce>:<base64 ciphertext+tag>
//! ```
//!
//! Exactly five colon-delimited fields. Version and algorithm are compared
//! literally; anything else is unreadable, never coerced. Base64 uses the
//! standard alphabet with padding, which never contains a colon.
//!
//! ## Failure Reporting
//!
//! A wrapped key that does not unwrap and a ciphertext whose tag does not
//! verify both surface as [`NoteCryptError::DecryptionFailed`], with no detail
//! about which layer rejected it. Shape and tag problems are detected before
//! the private key is ever loaded.
//!
//! ## Unit Tests
//!
//! Run crypto module tests:
//! ```bash
//! cargo test crypto::
//! ```

use crate::config::Config;
use crate::error::{NoteCryptError, Result};
use crate::key::KeyStore;
use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::RngCore;
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use std::fmt;
use std::str::FromStr;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

pub const KEY_SIZE: usize = 32; // 256 bits
pub const NONCE_SIZE: usize = 12; // 96 bits for GCM
pub const TAG_SIZE: usize = 16;

pub const FORMAT_VERSION: &str = "v1";
pub const ALGORITHM: &str = "RSA-AES256-GCM";

const FIELD_COUNT: usize = 5;

/// One-time AES-256-GCM key, wiped on drop
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SessionKey {
    key: [u8; KEY_SIZE],
}

impl SessionKey {
    /// Generate a new random key
    pub fn generate() -> Self {
        let mut key = [0u8; KEY_SIZE];
        OsRng.fill_bytes(&mut key);
        Self { key }
    }

    /// Create a key from existing bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != KEY_SIZE {
            return None;
        }
        let mut key = [0u8; KEY_SIZE];
        key.copy_from_slice(bytes);
        Some(Self { key })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.key
    }

    /// Encrypt under a fresh random nonce, returning `(nonce, ciphertext+tag)`
    pub fn seal(&self, plaintext: &[u8]) -> Result<([u8; NONCE_SIZE], Vec<u8>)> {
        let cipher = Aes256Gcm::new_from_slice(&self.key)
            .map_err(|e| NoteCryptError::EncryptionFailed(e.to_string()))?;

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext)
            .map_err(|_| NoteCryptError::EncryptionFailed("AES-GCM encryption error".into()))?;

        Ok((nonce_bytes, ciphertext))
    }

    /// Decrypt and authenticate
    pub fn open(&self, nonce: &[u8; NONCE_SIZE], ciphertext: &[u8]) -> Result<Vec<u8>> {
        let cipher =
            Aes256Gcm::new_from_slice(&self.key).map_err(|_| NoteCryptError::DecryptionFailed)?;

        cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| NoteCryptError::DecryptionFailed)
    }
}

/// Structured form of the five-field payload string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedPayload {
    pub wrapped_key: Vec<u8>,
    pub nonce: [u8; NONCE_SIZE],
    pub ciphertext: Vec<u8>,
}

impl EncryptedPayload {
    /// `v1:RSA-AES256-GCM:`, the prefix of every payload
    pub fn prefix() -> String {
        format!("{FORMAT_VERSION}:{ALGORITHM}:")
    }
}

impl fmt::Display for EncryptedPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{FORMAT_VERSION}:{ALGORITHM}:{}:{}:{}",
            STANDARD.encode(&self.wrapped_key),
            STANDARD.encode(self.nonce),
            STANDARD.encode(&self.ciphertext)
        )
    }
}

impl FromStr for EncryptedPayload {
    type Err = NoteCryptError;

    fn from_str(s: &str) -> Result<Self> {
        let fields: Vec<&str> = s.split(':').collect();
        if fields.len() != FIELD_COUNT {
            return Err(NoteCryptError::InvalidPayloadFormat(format!(
                "expected {FIELD_COUNT} colon-delimited fields, found {}",
                fields.len()
            )));
        }

        let (version, algorithm) = (fields[0], fields[1]);
        if version != FORMAT_VERSION || algorithm != ALGORITHM {
            return Err(NoteCryptError::UnsupportedPayloadVersion(format!(
                "{version}:{algorithm}"
            )));
        }

        let decode = |name: &str, field: &str| {
            STANDARD
                .decode(field)
                .map_err(|_| NoteCryptError::InvalidPayloadFormat(format!("{name} is not valid base64")))
        };

        let wrapped_key = decode("wrapped key", fields[2])?;
        let nonce_bytes = decode("nonce", fields[3])?;
        let ciphertext = decode("ciphertext", fields[4])?;

        let nonce: [u8; NONCE_SIZE] = nonce_bytes.as_slice().try_into().map_err(|_| {
            NoteCryptError::InvalidPayloadFormat(format!(
                "nonce must be {NONCE_SIZE} bytes, found {}",
                nonce_bytes.len()
            ))
        })?;

        if wrapped_key.is_empty() {
            return Err(NoteCryptError::InvalidPayloadFormat("wrapped key is empty".into()));
        }
        if ciphertext.len() < TAG_SIZE {
            return Err(NoteCryptError::InvalidPayloadFormat(
                "ciphertext is shorter than the authentication tag".into(),
            ));
        }

        Ok(Self {
            wrapped_key,
            nonce,
            ciphertext,
        })
    }
}

/// Encrypts strings for the key pair held by a [`KeyStore`]
#[derive(Debug, Clone)]
pub struct HybridCipher {
    keys: KeyStore,
}

impl HybridCipher {
    pub fn new(keys: KeyStore) -> Self {
        Self { keys }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(KeyStore::from_config(config))
    }

    pub fn key_store(&self) -> &KeyStore {
        &self.keys
    }

    /// Encrypt `plaintext` under the stored public key
    pub fn encrypt(&self, plaintext: &str) -> Result<EncryptedPayload> {
        let public = self
            .keys
            .load_public()
            .map_err(|e| NoteCryptError::EncryptionFailed(e.to_string()))?;
        Self::encrypt_for(&public, plaintext)
    }

    /// Encrypt for an explicit public key
    pub fn encrypt_for(public: &RsaPublicKey, plaintext: &str) -> Result<EncryptedPayload> {
        let session = SessionKey::generate();
        let (nonce, ciphertext) = session.seal(plaintext.as_bytes())?;

        let wrapped_key = public
            .encrypt(&mut OsRng, Oaep::new::<Sha256>(), session.as_bytes())
            .map_err(|e| NoteCryptError::EncryptionFailed(format!("key wrapping failed: {e}")))?;

        Ok(EncryptedPayload {
            wrapped_key,
            nonce,
            ciphertext,
        })
    }

    /// Parse and decrypt a payload string
    pub fn decrypt(&self, payload: &str, passphrase: Option<&str>) -> Result<String> {
        // Shape is validated before the private key is touched
        let payload: EncryptedPayload = payload.parse()?;
        self.decrypt_payload(&payload, passphrase)
    }

    pub fn decrypt_payload(
        &self,
        payload: &EncryptedPayload,
        passphrase: Option<&str>,
    ) -> Result<String> {
        let private = self.keys.load_private(passphrase)?;
        Self::decrypt_with(&private, payload)
    }

    /// Decrypt with an already loaded private key
    pub fn decrypt_with(private: &RsaPrivateKey, payload: &EncryptedPayload) -> Result<String> {
        let unwrapped = Zeroizing::new(
            private
                .decrypt(Oaep::new::<Sha256>(), &payload.wrapped_key)
                .map_err(|_| NoteCryptError::DecryptionFailed)?,
        );
        let session = SessionKey::from_bytes(&unwrapped).ok_or(NoteCryptError::DecryptionFailed)?;

        let plaintext = session.open(&payload.nonce, &payload.ciphertext)?;
        String::from_utf8(plaintext).map_err(|_| NoteCryptError::DecryptionFailed)
    }

    /// Syntactic check for the payload prefix; not a cryptographic verification
    pub fn is_encrypted(text: &str) -> bool {
        text.starts_with(&EncryptedPayload::prefix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::fixtures::{primary_pair, rotated_pair, store_with_keys};
    use tempfile::TempDir;

    fn cipher_in(temp: &TempDir) -> HybridCipher {
        HybridCipher::new(store_with_keys(temp.path(), None))
    }

    #[test]
    fn test_session_seal_open() {
        let key = SessionKey::generate();
        let plaintext = b"Hello, World!";

        let (nonce, ciphertext) = key.seal(plaintext).unwrap();
        assert_ne!(plaintext.as_slice(), &ciphertext[..]);
        assert_eq!(ciphertext.len(), plaintext.len() + TAG_SIZE);

        let decrypted = key.open(&nonce, &ciphertext).unwrap();
        assert_eq!(plaintext.as_slice(), &decrypted[..]);
    }

    #[test]
    fn test_session_key_from_invalid_length() {
        assert!(SessionKey::from_bytes(&[0x42u8; KEY_SIZE - 1]).is_none());
        assert!(SessionKey::from_bytes(&[0x42u8; KEY_SIZE + 1]).is_none());
        assert!(SessionKey::from_bytes(&[0x42u8; KEY_SIZE]).is_some());
    }

    #[test]
    fn test_session_wrong_key_fails() {
        let key1 = SessionKey::generate();
        let key2 = SessionKey::generate();
        let (nonce, ciphertext) = key1.seal(b"Secret message").unwrap();
        assert!(matches!(
            key2.open(&nonce, &ciphertext),
            Err(NoteCryptError::DecryptionFailed)
        ));
    }

    #[test]
    fn test_round_trip() {
        let temp = TempDir::new().unwrap();
        let cipher = cipher_in(&temp);

        let payload = cipher.encrypt("my bank PIN is 0000").unwrap();
        let text = payload.to_string();
        assert!(HybridCipher::is_encrypted(&text));
        assert_eq!(cipher.decrypt(&text, None).unwrap(), "my bank PIN is 0000");
    }

    #[test]
    fn test_round_trip_edge_plaintexts() {
        let temp = TempDir::new().unwrap();
        let cipher = cipher_in(&temp);

        let large = "lorem ipsum dolor sit amet\n".repeat(120_000); // ~3MB
        for plaintext in ["", "Hello, 世界! 🔐🦀", "a:b:c:d:e", large.as_str()] {
            let text = cipher.encrypt(plaintext).unwrap().to_string();
            assert_eq!(cipher.decrypt(&text, None).unwrap(), plaintext);
        }
    }

    #[test]
    fn test_fresh_key_and_nonce_per_call() {
        let temp = TempDir::new().unwrap();
        let cipher = cipher_in(&temp);

        let a = cipher.encrypt("same plaintext").unwrap();
        let b = cipher.encrypt("same plaintext").unwrap();
        assert_ne!(a.nonce, b.nonce);
        assert_ne!(a.wrapped_key, b.wrapped_key);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn test_wire_format_fields() {
        let (_, public) = primary_pair();
        let text = HybridCipher::encrypt_for(public, "x").unwrap().to_string();

        let fields: Vec<&str> = text.split(':').collect();
        assert_eq!(fields.len(), 5);
        assert_eq!(fields[0], "v1");
        assert_eq!(fields[1], "RSA-AES256-GCM");
        assert_eq!(STANDARD.decode(fields[2]).unwrap().len(), 256); // 2048-bit modulus
        assert_eq!(STANDARD.decode(fields[3]).unwrap().len(), NONCE_SIZE);
        assert_eq!(STANDARD.decode(fields[4]).unwrap().len(), 1 + TAG_SIZE);
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let (private, public) = primary_pair();
        let payload = HybridCipher::encrypt_for(public, "Secret message").unwrap();

        for i in 0..payload.ciphertext.len() {
            let mut tampered = payload.clone();
            tampered.ciphertext[i] ^= 0x01;
            assert!(matches!(
                HybridCipher::decrypt_with(private, &tampered),
                Err(NoteCryptError::DecryptionFailed)
            ));
        }
    }

    #[test]
    fn test_tampered_wrapped_key_fails() {
        let (private, public) = primary_pair();
        let payload = HybridCipher::encrypt_for(public, "Secret message").unwrap();

        for i in [0, 1, 100, payload.wrapped_key.len() - 1] {
            let mut tampered = payload.clone();
            tampered.wrapped_key[i] ^= 0x80;
            assert!(matches!(
                HybridCipher::decrypt_with(private, &tampered),
                Err(NoteCryptError::DecryptionFailed)
            ));
        }
    }

    #[test]
    fn test_tampered_nonce_fails() {
        let (private, public) = primary_pair();
        let mut payload = HybridCipher::encrypt_for(public, "Secret message").unwrap();
        payload.nonce[0] ^= 0xFF;
        assert!(matches!(
            HybridCipher::decrypt_with(private, &payload),
            Err(NoteCryptError::DecryptionFailed)
        ));
    }

    #[test]
    fn test_tampered_string_through_parse() {
        let temp = TempDir::new().unwrap();
        let cipher = cipher_in(&temp);
        let payload = cipher.encrypt("Secret message").unwrap();

        let mut tampered = payload.clone();
        let last = tampered.ciphertext.len() - 1;
        tampered.ciphertext[last] ^= 0x01;

        assert!(matches!(
            cipher.decrypt(&tampered.to_string(), None),
            Err(NoteCryptError::DecryptionFailed)
        ));
    }

    #[test]
    fn test_wrong_field_count_rejected() {
        for input in [
            "",
            "v1",
            "v1:RSA-AES256-GCM",
            "v1:RSA-AES256-GCM:a:b",
            "v1:RSA-AES256-GCM:a:b:c:d",
            "not an encrypted payload at all",
        ] {
            assert!(
                matches!(
                    input.parse::<EncryptedPayload>(),
                    Err(NoteCryptError::InvalidPayloadFormat(_))
                ),
                "accepted {input:?}"
            );
        }
    }

    #[test]
    fn test_mismatched_tags_rejected() {
        let (_, public) = primary_pair();
        let good = HybridCipher::encrypt_for(public, "x").unwrap().to_string();
        let tail = good.splitn(3, ':').nth(2).unwrap();

        for head in ["v2:RSA-AES256-GCM", "V1:RSA-AES256-GCM", "v1:RSA-AES128-GCM", "v1.0:RSA-AES256-GCM"] {
            let input = format!("{head}:{tail}");
            assert!(matches!(
                input.parse::<EncryptedPayload>(),
                Err(NoteCryptError::UnsupportedPayloadVersion(_))
            ));
        }
    }

    #[test]
    fn test_format_errors_never_reach_key_store() {
        // No keys on disk: a key lookup would surface KeyNotFound instead
        let temp = TempDir::new().unwrap();
        let cipher = HybridCipher::new(KeyStore::new(temp.path()));

        assert!(matches!(
            cipher.decrypt("v1:RSA-AES256-GCM:only-four", None),
            Err(NoteCryptError::InvalidPayloadFormat(_))
        ));
        assert!(matches!(
            cipher.decrypt("v9:RSA-AES256-GCM:a:b:c", None),
            Err(NoteCryptError::UnsupportedPayloadVersion(_))
        ));
        assert!(matches!(
            cipher.decrypt("v1:RSA-AES256-GCM:!!:AAAA:AAAA", None),
            Err(NoteCryptError::InvalidPayloadFormat(_))
        ));
    }

    #[test]
    fn test_bad_nonce_length_rejected() {
        let (_, public) = primary_pair();
        let payload = HybridCipher::encrypt_for(public, "x").unwrap();
        let input = format!(
            "v1:RSA-AES256-GCM:{}:{}:{}",
            STANDARD.encode(&payload.wrapped_key),
            STANDARD.encode([0u8; 8]),
            STANDARD.encode(&payload.ciphertext)
        );
        assert!(matches!(
            input.parse::<EncryptedPayload>(),
            Err(NoteCryptError::InvalidPayloadFormat(_))
        ));
    }

    #[test]
    fn test_encrypt_without_keys_fails() {
        let temp = TempDir::new().unwrap();
        let cipher = HybridCipher::new(KeyStore::new(temp.path()));
        match cipher.encrypt("secret").unwrap_err() {
            NoteCryptError::EncryptionFailed(msg) => assert!(msg.contains("Key not found")),
            other => panic!("expected EncryptionFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_passphrase_needed_for_decrypt() {
        let temp = TempDir::new().unwrap();
        let cipher = HybridCipher::new(store_with_keys(temp.path(), Some("hunter22")));

        // Encryption only needs the public key
        let text = cipher.encrypt("behind a passphrase").unwrap().to_string();

        assert!(matches!(
            cipher.decrypt(&text, None),
            Err(NoteCryptError::PassphraseRequired)
        ));
        assert!(matches!(
            cipher.decrypt(&text, Some("hunter2")),
            Err(NoteCryptError::WrongPassphrase)
        ));
        assert_eq!(cipher.decrypt(&text, Some("hunter22")).unwrap(), "behind a passphrase");
    }

    #[test]
    fn test_key_rotation_makes_old_payloads_undecryptable() {
        let temp = TempDir::new().unwrap();
        let cipher = cipher_in(&temp);
        let old = cipher.encrypt("written under pair A").unwrap().to_string();

        let (private_b, public_b) = rotated_pair();
        cipher.key_store().persist(private_b, public_b, None).unwrap();

        assert!(matches!(
            cipher.decrypt(&old, None),
            Err(NoteCryptError::DecryptionFailed)
        ));
    }

    #[test]
    fn test_is_encrypted() {
        assert!(HybridCipher::is_encrypted("v1:RSA-AES256-GCM:abc"));
        assert!(!HybridCipher::is_encrypted("v1:RSA-AES256-GCMabc"));
        assert!(!HybridCipher::is_encrypted("plain text"));
        assert!(!HybridCipher::is_encrypted(" v1:RSA-AES256-GCM:abc"));
    }
}
