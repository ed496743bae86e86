// [libs/core/crypto-engine/src/envelope.rs]
/*!
 * Sobre cifrado AES-256-GCM, versionado de llave (spec S3 EnvelopeEncryption
 * Service, S6 "Encrypted envelope format": {version, iv, authTag, ciphertext}).
 */

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

const NONCE_LEN_BYTES: usize = 12;
const TAG_LEN_BYTES: usize = 16;

#[derive(Error, Debug)]
pub enum EnvelopeError {
    #[error("ENCRYPTION_FAILURE: aead cipher rejected the plaintext")]
    EncryptFailed,
    #[error("DECRYPTION_FAILURE: authentication tag mismatch or corrupt ciphertext")]
    DecryptFailed,
    #[error("UNKNOWN_KEY_VERSION: no key registered for version {0}")]
    UnknownKeyVersion(u32),
    #[error("MALFORMED_ENVELOPE: {0}")]
    Malformed(String),
}

/// Sobre cifrado sobre el cable, formato fijado en spec S6.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedEnvelope {
    pub version: u32,
    pub iv: String,
    pub auth_tag: String,
    pub ciphertext: String,
}

/// Conjunto de llaves de 256 bits indexadas por version. `current` es la
/// version usada para *nuevo* cifrado; versiones anteriores permanecen
/// disponibles para descifrar sobres ya emitidos (rotacion sin invalidar
/// el historial de auditoria).
#[derive(Clone)]
pub struct KeyRing {
    keys: HashMap<u32, [u8; 32]>,
    current: u32,
}

impl KeyRing {
    pub fn new(current_version: u32, current_key: [u8; 32]) -> Self {
        let mut keys = HashMap::new();
        keys.insert(current_version, current_key);
        Self { keys, current: current_version }
    }

    /// Registra una version de llave adicional (p.ej. la version previa a
    /// una rotacion, mantenida para descifrar sobres antiguos).
    pub fn with_key(mut self, version: u32, key: [u8; 32]) -> Self {
        self.keys.insert(version, key);
        self
    }

    pub fn current_version(&self) -> u32 {
        self.current
    }

    fn key_for(&self, version: u32) -> Result<&[u8; 32], EnvelopeError> {
        self.keys.get(&version).ok_or(EnvelopeError::UnknownKeyVersion(version))
    }
}

/// Servicio de cifrado de sobre. Opaco respecto al contenido: cifra y
/// descifra blobs de bytes arbitrarios (snapshots de auditoria serializados).
pub struct EnvelopeEncryption {
    keys: KeyRing,
}

impl EnvelopeEncryption {
    pub fn new(keys: KeyRing) -> Self {
        Self { keys }
    }

    pub fn encrypt(&self, plaintext: &[u8]) -> Result<EncryptedEnvelope, EnvelopeError> {
        let version = self.keys.current_version();
        let key_bytes = self.keys.key_for(version)?;

        let mut nonce_bytes = [0u8; NONCE_LEN_BYTES];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);

        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key_bytes));
        let nonce = Nonce::from_slice(&nonce_bytes);

        let sealed = cipher
            .encrypt(nonce, plaintext)
            .map_err(|_| EnvelopeError::EncryptFailed)?;

        if sealed.len() < TAG_LEN_BYTES {
            return Err(EnvelopeError::EncryptFailed);
        }
        let split_at = sealed.len() - TAG_LEN_BYTES;
        let (ciphertext, auth_tag) = sealed.split_at(split_at);

        Ok(EncryptedEnvelope {
            version,
            iv: BASE64.encode(nonce_bytes),
            auth_tag: BASE64.encode(auth_tag),
            ciphertext: BASE64.encode(ciphertext),
        })
    }

    pub fn decrypt(&self, envelope: &EncryptedEnvelope) -> Result<Vec<u8>, EnvelopeError> {
        let key_bytes = self.keys.key_for(envelope.version)?;

        let nonce_bytes = BASE64
            .decode(&envelope.iv)
            .map_err(|e| EnvelopeError::Malformed(format!("iv: {e}")))?;
        let auth_tag = BASE64
            .decode(&envelope.auth_tag)
            .map_err(|e| EnvelopeError::Malformed(format!("authTag: {e}")))?;
        let ciphertext = BASE64
            .decode(&envelope.ciphertext)
            .map_err(|e| EnvelopeError::Malformed(format!("ciphertext: {e}")))?;

        if nonce_bytes.len() != NONCE_LEN_BYTES {
            return Err(EnvelopeError::Malformed("iv must be 96 bits".into()));
        }

        let mut sealed = ciphertext;
        sealed.extend_from_slice(&auth_tag);

        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key_bytes));
        let nonce = Nonce::from_slice(&nonce_bytes);

        cipher
            .decrypt(nonce, sealed.as_ref())
            .map_err(|_| EnvelopeError::DecryptFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> EnvelopeEncryption {
        EnvelopeEncryption::new(KeyRing::new(1, [7u8; 32]))
    }

    #[test]
    fn round_trips_arbitrary_bytes() {
        let engine = engine();
        let plaintext = b"audit-snapshot-blob".to_vec();
        let envelope = engine.encrypt(&plaintext).unwrap();
        let decrypted = engine.decrypt(&envelope).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn rejects_tampered_ciphertext() {
        let engine = engine();
        let mut envelope = engine.encrypt(b"hello").unwrap();
        let mut raw = BASE64.decode(&envelope.ciphertext).unwrap();
        raw[0] ^= 0xFF;
        envelope.ciphertext = BASE64.encode(raw);
        assert!(engine.decrypt(&envelope).is_err());
    }

    #[test]
    fn decrypts_against_prior_key_version_after_rotation() {
        let old_key = [1u8; 32];
        let new_key = [2u8; 32];
        let old_ring = KeyRing::new(1, old_key);
        let old_engine = EnvelopeEncryption::new(old_ring);
        let envelope = old_engine.encrypt(b"pre-rotation").unwrap();

        let rotated_ring = KeyRing::new(2, new_key).with_key(1, old_key);
        let rotated_engine = EnvelopeEncryption::new(rotated_ring);
        let decrypted = rotated_engine.decrypt(&envelope).unwrap();
        assert_eq!(decrypted, b"pre-rotation");
    }

    #[test]
    fn unknown_key_version_is_reported_distinctly() {
        let engine = engine();
        let mut envelope = engine.encrypt(b"hello").unwrap();
        envelope.version = 99;
        match engine.decrypt(&envelope) {
            Err(EnvelopeError::UnknownKeyVersion(99)) => {}
            other => panic!("expected UnknownKeyVersion(99), got {other:?}"),
        }
    }
}
