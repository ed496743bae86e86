// [libs/domain/models/src/wire.rs]
//! Upstream request/response envelope and streaming event shapes (spec S6).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pipeline::Stance;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    Success,
    AwaitAck,
    Stopped,
    Degraded,
    Redirect,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AckRequired {
    pub token: String,
    pub required_text: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    pub request_id: String,
    pub total_time_ms: u64,
    pub regenerations: Option<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub status: ResponseStatus,
    pub response: Option<String>,
    pub stance: Option<Stance>,
    pub redirect: Option<Stance>,
    pub ack_required: Option<AckRequired>,
    pub stopped_reason: Option<String>,
    pub metadata: ResponseMetadata,
}

/// Streaming variant events (spec S6).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum StreamEvent {
    Meta { request_id: String },
    Thinking { note: String },
    Token { text: String },
    Done { metadata: ResponseMetadata },
    Error { error: crate::errors::ApiError },
}
