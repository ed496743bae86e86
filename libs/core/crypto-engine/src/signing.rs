// [libs/core/crypto-engine/src/signing.rs]
//! HMAC-SHA256 signing used by the acknowledgment token protocol (spec S4.3:
//! `mac = HMAC(secret, canonical_fields)`, verified "constant-time... with
//! current + previous secret versions").

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Computes the hex-encoded HMAC-SHA256 MAC over `message` under `secret`.
pub fn hmac_sha256(secret: &[u8], message: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts keys of any length");
    mac.update(message);
    hex::encode(mac.finalize().into_bytes())
}

/// Constant-time comparison of a candidate MAC against the expected value.
/// Both sides are compared as bytes, not characters, so timing does not
/// leak which hex digit first diverged.
pub fn verify_hmac_sha256(secret: &[u8], message: &[u8], candidate_hex: &str) -> bool {
    let expected = hmac_sha256(secret, message);
    let (Ok(expected_bytes), Ok(candidate_bytes)) = (hex::decode(&expected), hex::decode(candidate_hex)) else {
        return false;
    };
    expected_bytes.ct_eq(&candidate_bytes).into()
}
