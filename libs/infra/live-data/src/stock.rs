// [libs/infra/live-data/src/stock.rs]
//! `stock_fetcher` (spec S4.5). `entity_hint` is a ticker symbol, e.g.
//! "AAPL"; absent hints fall back to a fixed default rather than failing
//! the whole capability for lack of a symbol.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use novaos_evidence::{CapabilityProvider, SelectorInput};
use novaos_models::{CapabilityName, ProviderResult};
use novaos_secure_transport::SecureTransport;

use crate::errors::LiveDataError;
use crate::fetch::fetch_json;

const DEFAULT_SYMBOL: &str = "AAPL";

pub struct StockFetcher {
    transport: Arc<SecureTransport>,
}

impl StockFetcher {
    pub fn new(transport: Arc<SecureTransport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl CapabilityProvider for StockFetcher {
    fn name(&self) -> CapabilityName {
        CapabilityName::StockFetcher
    }

    async fn execute(&self, input: &SelectorInput) -> Result<Option<ProviderResult>, String> {
        let symbol = input.entity_hint.as_deref().unwrap_or(DEFAULT_SYMBOL).to_uppercase();
        let url = format!("https://query.example-finance.test/v1/quote?symbol={symbol}");
        let rate_limit_key = format!("live-data:stock:{symbol}");

        let payload = fetch_json(&self.transport, &url, &rate_limit_key).await.map_err(|e| e.to_string())?;
        let price = payload.get("price").and_then(|v| v.as_f64()).ok_or(LiveDataError::MissingField("price")).map_err(|e| e.to_string())?;
        let change_percent = payload.get("changePercent").and_then(|v| v.as_f64()).unwrap_or(0.0);

        Ok(Some(ProviderResult {
            capability: CapabilityName::StockFetcher,
            category: "stock".to_string(),
            entity: Some(symbol),
            value: price,
            unit: Some("usd".to_string()),
            display: format!("{price:.2} ({change_percent:+.2}%)"),
            fetched_at: Utc::now(),
            citation: url,
        }))
    }
}
