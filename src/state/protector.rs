//! DataProtector - purpose-scoped protect / unprotect.
//!
//! The default `AesGcmProtector` derives one sub-key per purpose with
//! HMAC-SHA256 over the master key, so two logical stores never share a key.
//! Output layout: `nonce (12 bytes) || ciphertext+tag`.

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::error::ProtectError;

type HmacSha256 = Hmac<Sha256>;

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;
const MIN_KEY_LEN: usize = 32;

/// Encryption provider offering purpose-scoped protect / unprotect.
pub trait DataProtector: Send + Sync {
    fn protect(&self, purpose: &str, plaintext: &[u8]) -> Result<Vec<u8>, ProtectError>;

    fn unprotect(&self, purpose: &str, protected: &[u8]) -> Result<Vec<u8>, ProtectError>;
}

/// AES-256-GCM protector with HMAC-SHA256 per-purpose key derivation.
#[derive(Clone)]
pub struct AesGcmProtector {
    master: Vec<u8>,
}

impl std::fmt::Debug for AesGcmProtector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AesGcmProtector").finish_non_exhaustive()
    }
}

impl AesGcmProtector {
    /// Create a protector from raw master key bytes (at least 32 bytes).
    pub fn new(master: &[u8]) -> Result<Self, ProtectError> {
        if master.len() < MIN_KEY_LEN {
            return Err(ProtectError::InvalidKey(format!(
                "master key must be at least {} bytes, got {}",
                MIN_KEY_LEN,
                master.len()
            )));
        }
        Ok(Self {
            master: master.to_vec(),
        })
    }

    /// Create a protector from a standard-base64 master key.
    pub fn from_base64(encoded: &str) -> Result<Self, ProtectError> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| ProtectError::InvalidKey(e.to_string()))?;
        Self::new(&bytes)
    }

    /// Create a protector with a fresh random key. Tokens do not survive a restart.
    pub fn ephemeral() -> Self {
        let key: [u8; MIN_KEY_LEN] = rand::random();
        Self { master: key.to_vec() }
    }

    fn cipher(&self, purpose: &str) -> Result<Aes256Gcm, ProtectError> {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(&self.master)
            .map_err(|e| ProtectError::InvalidKey(e.to_string()))?;
        mac.update(b"swapped-state:");
        mac.update(purpose.as_bytes());
        let derived = mac.finalize().into_bytes();
        <Aes256Gcm as KeyInit>::new_from_slice(&derived)
            .map_err(|e| ProtectError::InvalidKey(e.to_string()))
    }
}

impl DataProtector for AesGcmProtector {
    fn protect(&self, purpose: &str, plaintext: &[u8]) -> Result<Vec<u8>, ProtectError> {
        let cipher = self.cipher(purpose)?;
        let nonce: [u8; NONCE_LEN] = rand::random();
        let ciphertext = cipher
            .encrypt(
                Nonce::from_slice(&nonce),
                Payload {
                    msg: plaintext,
                    aad: purpose.as_bytes(),
                },
            )
            .map_err(|_| ProtectError::Encrypt)?;

        let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }

    fn unprotect(&self, purpose: &str, protected: &[u8]) -> Result<Vec<u8>, ProtectError> {
        if protected.len() < NONCE_LEN + TAG_LEN {
            return Err(ProtectError::Malformed);
        }
        let (nonce, ciphertext) = protected.split_at(NONCE_LEN);
        let cipher = self.cipher(purpose)?;
        cipher
            .decrypt(
                Nonce::from_slice(nonce),
                Payload {
                    msg: ciphertext,
                    aad: purpose.as_bytes(),
                },
            )
            .map_err(|_| ProtectError::Decrypt)
    }
}
