// [libs/core/crypto-engine/src/hashing.rs]
//! SHA-256 digests used for audit input/output hashes (spec S3 ResponseAudit
//! `inputHash`/`outputHash`, S8 property 8: "64 hex chars, never truncated").

use sha2::{Digest, Sha256};

/// Full 64-character lowercase hex SHA-256 digest. Never truncate this —
/// audit records are compared byte-for-byte against upstream evidence.
pub fn sha256_hex(data: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data.as_bytes());
    hex::encode(hasher.finalize())
}
