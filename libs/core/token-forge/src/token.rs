// [libs/core/token-forge/src/token.rs]
//! Ack token lifecycle: issuance on a Shield soft veto, validation on the
//! resubmitted request (spec S3 AckToken, S4.3, S8 property 3).

use chrono::{DateTime, Duration, Utc};
use novaos_crypto_engine::{hmac_sha256, sha256_hex, verify_hmac_sha256};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

use crate::nonce_store::NonceStore;

/// Hard ceiling from spec S3: "TTL ≤ 30 min".
pub const MAX_ACK_TOKEN_TTL: Duration = Duration::minutes(30);

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AckToken {
    pub request_id: String,
    pub user_id: String,
    pub message_hash: String,
    pub reason: String,
    pub audit_id: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub nonce: String,
    pub mac: String,
}

impl AckToken {
    fn canonical_fields(
        request_id: &str,
        user_id: &str,
        message_hash: &str,
        reason: &str,
        audit_id: &str,
        issued_at: &DateTime<Utc>,
        expires_at: &DateTime<Utc>,
        nonce: &str,
    ) -> String {
        [
            request_id,
            user_id,
            message_hash,
            reason,
            audit_id,
            &issued_at.to_rfc3339(),
            &expires_at.to_rfc3339(),
            nonce,
        ]
        .join("\u{0}")
    }

    /// Tamper-evident, URL-safe encoding of the whole token for transport.
    pub fn encode(&self) -> String {
        let json = serde_json::to_vec(self).expect("AckToken always serializes");
        base64::Engine::encode(&base64::engine::general_purpose::URL_SAFE_NO_PAD, json)
    }

    pub fn decode(encoded: &str) -> Result<Self, AckValidationError> {
        let bytes = base64::Engine::decode(&base64::engine::general_purpose::URL_SAFE_NO_PAD, encoded)
            .map_err(|_| AckValidationError::Malformed)?;
        serde_json::from_slice(&bytes).map_err(|_| AckValidationError::Malformed)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AckValidationError {
    #[error("invalid_mac")]
    InvalidMac,
    #[error("expired")]
    Expired,
    #[error("message_mismatch")]
    MessageMismatch,
    #[error("phrase_mismatch")]
    PhraseMismatch,
    #[error("nonce_reused")]
    NonceReused,
    #[error("malformed_token")]
    Malformed,
}

pub struct IssueAckTokenInput<'a> {
    pub request_id: &'a str,
    pub user_id: &'a str,
    pub user_message: &'a str,
    pub reason: &'a str,
    pub audit_id: &'a str,
    pub ttl: Duration,
}

pub struct ValidateAckInput<'a> {
    pub requesting_user_id: &'a str,
    pub current_message: &'a str,
    pub provided_ack_text: &'a str,
    pub required_text: &'a str,
    pub now: DateTime<Utc>,
}

/// Signs and verifies [`AckToken`]s. Holds the current signing secret plus
/// any still-valid previous secret versions (spec S4.3: "verify ... MAC
/// match with current + previous secret versions").
pub struct TokenForge {
    secrets_newest_first: Vec<Vec<u8>>,
    nonce_store: Arc<dyn NonceStore>,
}

impl TokenForge {
    /// `secrets_newest_first[0]` is used to sign new tokens; every entry is
    /// tried (in order) when verifying a MAC.
    pub fn new(secrets_newest_first: Vec<Vec<u8>>, nonce_store: Arc<dyn NonceStore>) -> Self {
        assert!(!secrets_newest_first.is_empty(), "token forge requires at least one secret");
        Self { secrets_newest_first, nonce_store }
    }

    pub fn issue(&self, input: IssueAckTokenInput<'_>) -> AckToken {
        let ttl = input.ttl.min(MAX_ACK_TOKEN_TTL);
        let issued_at = Utc::now();
        let expires_at = issued_at + ttl;
        let message_hash = sha256_hex(input.user_message);

        let mut nonce_bytes = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let nonce = hex::encode(nonce_bytes);

        let canonical = AckToken::canonical_fields(
            input.request_id,
            input.user_id,
            &message_hash,
            input.reason,
            input.audit_id,
            &issued_at,
            &expires_at,
            &nonce,
        );
        let mac = hmac_sha256(&self.secrets_newest_first[0], canonical.as_bytes());

        AckToken {
            request_id: input.request_id.to_string(),
            user_id: input.user_id.to_string(),
            message_hash,
            reason: input.reason.to_string(),
            audit_id: input.audit_id.to_string(),
            issued_at,
            expires_at,
            nonce,
            mac,
        }
    }

    /// Validates a previously-issued token against the resubmitted request.
    /// Checks run in the order spec S4.3 lists them; the nonce is reserved
    /// only once every other check has passed, so a failed validation never
    /// burns the nonce.
    pub async fn validate(&self, token: &AckToken, input: ValidateAckInput<'_>) -> Result<(), AckValidationError> {
        if token.user_id != input.requesting_user_id {
            return Err(AckValidationError::InvalidMac);
        }

        let canonical = AckToken::canonical_fields(
            &token.request_id,
            &token.user_id,
            &token.message_hash,
            &token.reason,
            &token.audit_id,
            &token.issued_at,
            &token.expires_at,
            &token.nonce,
        );
        let mac_ok = self
            .secrets_newest_first
            .iter()
            .any(|secret| verify_hmac_sha256(secret, canonical.as_bytes(), &token.mac));
        if !mac_ok {
            return Err(AckValidationError::InvalidMac);
        }

        if input.now > token.expires_at {
            return Err(AckValidationError::Expired);
        }

        if sha256_hex(input.current_message) != token.message_hash {
            return Err(AckValidationError::MessageMismatch);
        }

        if normalize_phrase(input.provided_ack_text) != normalize_phrase(input.required_text) {
            return Err(AckValidationError::PhraseMismatch);
        }

        let remaining_life_ms = (token.expires_at - input.now).num_milliseconds().max(0) as u64;
        if !self.nonce_store.reserve(&token.nonce, remaining_life_ms).await {
            return Err(AckValidationError::NonceReused);
        }

        Ok(())
    }
}

/// Unicode NFKC normalization + case fold + trim, per spec S4.3 (d).
fn normalize_phrase(text: &str) -> String {
    text.nfkc().collect::<String>().trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nonce_store::InMemoryNonceStore;

    fn forge() -> TokenForge {
        TokenForge::new(vec![b"current-secret".to_vec()], Arc::new(InMemoryNonceStore::default()))
    }

    fn base_issue<'a>(request_id: &'a str, user_id: &'a str, message: &'a str) -> IssueAckTokenInput<'a> {
        IssueAckTokenInput {
            request_id,
            user_id,
            user_message: message,
            reason: "reckless_decision",
            audit_id: "audit-1",
            ttl: Duration::minutes(10),
        }
    }

    #[tokio::test]
    async fn valid_resubmission_succeeds() {
        let forge = forge();
        let token = forge.issue(base_issue("req-1", "user-1", "I want to YOLO my savings"));
        let result = forge
            .validate(
                &token,
                ValidateAckInput {
                    requesting_user_id: "user-1",
                    current_message: "I want to YOLO my savings",
                    provided_ack_text: "  I Understand The Risk  ",
                    required_text: "i understand the risk",
                    now: Utc::now(),
                },
            )
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn altered_message_is_rejected() {
        let forge = forge();
        let token = forge.issue(base_issue("req-1", "user-1", "original message"));
        let result = forge
            .validate(
                &token,
                ValidateAckInput {
                    requesting_user_id: "user-1",
                    current_message: "a different message",
                    provided_ack_text: "i understand the risk",
                    required_text: "i understand the risk",
                    now: Utc::now(),
                },
            )
            .await;
        assert_eq!(result, Err(AckValidationError::MessageMismatch));
    }

    #[tokio::test]
    async fn altered_phrase_is_rejected() {
        let forge = forge();
        let token = forge.issue(base_issue("req-1", "user-1", "original message"));
        let result = forge
            .validate(
                &token,
                ValidateAckInput {
                    requesting_user_id: "user-1",
                    current_message: "original message",
                    provided_ack_text: "nope",
                    required_text: "i understand the risk",
                    now: Utc::now(),
                },
            )
            .await;
        assert_eq!(result, Err(AckValidationError::PhraseMismatch));
    }

    #[tokio::test]
    async fn replayed_token_is_rejected_on_second_use() {
        let forge = forge();
        let token = forge.issue(base_issue("req-1", "user-1", "original message"));
        let make_input = || ValidateAckInput {
            requesting_user_id: "user-1",
            current_message: "original message",
            provided_ack_text: "i understand the risk",
            required_text: "i understand the risk",
            now: Utc::now(),
        };
        assert!(forge.validate(&token, make_input()).await.is_ok());
        assert_eq!(forge.validate(&token, make_input()).await, Err(AckValidationError::NonceReused));
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let forge = forge();
        let token = forge.issue(IssueAckTokenInput {
            ttl: Duration::seconds(-1),
            ..base_issue("req-1", "user-1", "original message")
        });
        let result = forge
            .validate(
                &token,
                ValidateAckInput {
                    requesting_user_id: "user-1",
                    current_message: "original message",
                    provided_ack_text: "i understand the risk",
                    required_text: "i understand the risk",
                    now: Utc::now(),
                },
            )
            .await;
        assert_eq!(result, Err(AckValidationError::Expired));
    }

    #[tokio::test]
    async fn tampered_mac_is_rejected() {
        let forge = forge();
        let mut token = forge.issue(base_issue("req-1", "user-1", "original message"));
        token.reason = "harm_risk".to_string();
        let result = forge
            .validate(
                &token,
                ValidateAckInput {
                    requesting_user_id: "user-1",
                    current_message: "original message",
                    provided_ack_text: "i understand the risk",
                    required_text: "i understand the risk",
                    now: Utc::now(),
                },
            )
            .await;
        assert_eq!(result, Err(AckValidationError::InvalidMac));
    }

    #[test]
    fn ttl_is_capped_at_thirty_minutes() {
        let forge = forge();
        let token = forge.issue(IssueAckTokenInput {
            ttl: Duration::hours(5),
            ..base_issue("req-1", "user-1", "msg")
        });
        assert!(token.expires_at - token.issued_at <= MAX_ACK_TOKEN_TTL);
    }
}
