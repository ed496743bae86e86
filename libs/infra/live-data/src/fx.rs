// [libs/infra/live-data/src/fx.rs]
//! `fx_fetcher` (spec S4.5). `entity_hint` is `"BASE/QUOTE"`, e.g.
//! "USD/EUR"; absent or malformed hints default to "USD/EUR".

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use novaos_evidence::{CapabilityProvider, SelectorInput};
use novaos_models::{CapabilityName, ProviderResult};
use novaos_secure_transport::SecureTransport;

use crate::errors::LiveDataError;
use crate::fetch::fetch_json;

const DEFAULT_PAIR: (&str, &str) = ("USD", "EUR");

fn parse_pair(hint: Option<&str>) -> (String, String) {
    hint.and_then(|h| h.split_once('/'))
        .map(|(base, quote)| (base.trim().to_uppercase(), quote.trim().to_uppercase()))
        .filter(|(base, quote)| !base.is_empty() && !quote.is_empty())
        .unwrap_or_else(|| (DEFAULT_PAIR.0.to_string(), DEFAULT_PAIR.1.to_string()))
}

pub struct FxFetcher {
    transport: Arc<SecureTransport>,
}

impl FxFetcher {
    pub fn new(transport: Arc<SecureTransport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl CapabilityProvider for FxFetcher {
    fn name(&self) -> CapabilityName {
        CapabilityName::FxFetcher
    }

    async fn execute(&self, input: &SelectorInput) -> Result<Option<ProviderResult>, String> {
        let (base, quote) = parse_pair(input.entity_hint.as_deref());
        let url = format!("https://api.exchangerate.host/latest?base={base}&symbols={quote}");
        let rate_limit_key = format!("live-data:fx:{base}{quote}");

        let payload = fetch_json(&self.transport, &url, &rate_limit_key).await.map_err(|e| e.to_string())?;
        let rate = payload
            .get("rates")
            .and_then(|v| v.get(quote.as_str()))
            .and_then(|v| v.as_f64())
            .ok_or(LiveDataError::MissingField("rates"))
            .map_err(|e| e.to_string())?;

        Ok(Some(ProviderResult {
            capability: CapabilityName::FxFetcher,
            category: "fx".to_string(),
            entity: Some(format!("{base}/{quote}")),
            value: rate,
            unit: Some(quote.clone()),
            display: format!("1 {base} = {rate:.4} {quote}"),
            fetched_at: Utc::now(),
            citation: url,
        }))
    }
}
