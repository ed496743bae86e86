// [libs/core/crypto-engine/src/lib.rs]
/*!
 * =================================================================
 * APARATO: ENVELOPE ENCRYPTION ENGINE (V1.0 - GATE PIPELINE GOLD)
 * CLASIFICACIÓN: CORE SECURITY (ESTRATO L1)
 * RESPONSABILIDAD: CIFRADO AUTENTICADO DE SOBRES CON VERSIONADO DE LLAVE
 *
 * VISION HIPER-HOLÍSTICA:
 * Cifra los snapshots de auditoria (spec S6 "encrypted envelope format")
 * con AES-256-GCM. Cada sobre lleva su version de llave para permitir
 * rotacion sin invalidar snapshots ya escritos: el descifrado busca la
 * llave por version, nunca asume "la llave actual".
 * =================================================================
 */

pub mod envelope;
pub mod hashing;
pub mod signing;

pub use envelope::{EncryptedEnvelope, EnvelopeEncryption, EnvelopeError, KeyRing};
pub use hashing::sha256_hex;
pub use signing::{hmac_sha256, verify_hmac_sha256};
