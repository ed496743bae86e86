// [libs/infra/live-data/src/time.rs]
//! `time_fetcher` (spec S4.5). `entity_hint` is an IANA time zone name,
//! e.g. "Europe/Paris"; absent hints default to UTC.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use novaos_evidence::{CapabilityProvider, SelectorInput};
use novaos_models::{CapabilityName, ProviderResult};
use novaos_secure_transport::SecureTransport;

use crate::errors::LiveDataError;
use crate::fetch::fetch_json;

const DEFAULT_ZONE: &str = "Etc/UTC";

pub struct TimeFetcher {
    transport: Arc<SecureTransport>,
}

impl TimeFetcher {
    pub fn new(transport: Arc<SecureTransport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl CapabilityProvider for TimeFetcher {
    fn name(&self) -> CapabilityName {
        CapabilityName::TimeFetcher
    }

    async fn execute(&self, input: &SelectorInput) -> Result<Option<ProviderResult>, String> {
        let zone = input.entity_hint.as_deref().unwrap_or(DEFAULT_ZONE).to_string();
        let url = format!("http://worldtimeapi.org/api/timezone/{zone}");
        let rate_limit_key = format!("live-data:time:{zone}");

        let payload = fetch_json(&self.transport, &url, &rate_limit_key).await.map_err(|e| e.to_string())?;
        let unixtime = payload.get("unixtime").and_then(|v| v.as_i64()).ok_or(LiveDataError::MissingField("unixtime")).map_err(|e| e.to_string())?;
        let datetime = payload.get("datetime").and_then(|v| v.as_str()).unwrap_or_default().to_string();

        Ok(Some(ProviderResult {
            capability: CapabilityName::TimeFetcher,
            category: "time".to_string(),
            entity: Some(zone),
            value: unixtime as f64,
            unit: Some("unix_seconds".to_string()),
            display: datetime,
            fetched_at: Utc::now(),
            citation: url,
        }))
    }
}
