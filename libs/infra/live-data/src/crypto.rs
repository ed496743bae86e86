// [libs/infra/live-data/src/crypto.rs]
//! `crypto_fetcher` (spec S4.5). `entity_hint` is a lower-case CoinGecko
//! asset id, e.g. "bitcoin"; absent hints default to "bitcoin".

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use novaos_evidence::{CapabilityProvider, SelectorInput};
use novaos_models::{CapabilityName, ProviderResult};
use novaos_secure_transport::SecureTransport;

use crate::errors::LiveDataError;
use crate::fetch::fetch_json;

const DEFAULT_ASSET: &str = "bitcoin";

pub struct CryptoFetcher {
    transport: Arc<SecureTransport>,
}

impl CryptoFetcher {
    pub fn new(transport: Arc<SecureTransport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl CapabilityProvider for CryptoFetcher {
    fn name(&self) -> CapabilityName {
        CapabilityName::CryptoFetcher
    }

    async fn execute(&self, input: &SelectorInput) -> Result<Option<ProviderResult>, String> {
        let asset = input.entity_hint.as_deref().unwrap_or(DEFAULT_ASSET).to_lowercase();
        let url = format!("https://api.coingecko.com/api/v3/simple/price?ids={asset}&vs_currencies=usd");
        let rate_limit_key = format!("live-data:crypto:{asset}");

        let payload = fetch_json(&self.transport, &url, &rate_limit_key).await.map_err(|e| e.to_string())?;
        let price = payload
            .get(asset.as_str())
            .and_then(|v| v.get("usd"))
            .and_then(|v| v.as_f64())
            .ok_or(LiveDataError::MissingField("usd"))
            .map_err(|e| e.to_string())?;

        Ok(Some(ProviderResult {
            capability: CapabilityName::CryptoFetcher,
            category: "crypto".to_string(),
            entity: Some(asset),
            value: price,
            unit: Some("usd".to_string()),
            display: format!("{price:.2} USD"),
            fetched_at: Utc::now(),
            citation: url,
        }))
    }
}
