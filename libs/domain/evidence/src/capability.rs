// [libs/domain/evidence/src/capability.rs]
//! Capability registry, deterministic fallback selection, and parallel
//! execution (spec S4.5). `CapabilityProvider` is the seam the concrete
//! fetchers (SSRF Guard + Secure Transport behind each one) plug into —
//! this crate never knows whether a call actually left the process.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use novaos_models::{CapabilityName, ProviderResult};
use thiserror::Error;

#[derive(Debug, Clone, Copy)]
pub struct CapabilityDescriptor {
    pub name: CapabilityName,
    pub description: &'static str,
}

pub const CAPABILITY_REGISTRY: [CapabilityDescriptor; 6] = [
    CapabilityDescriptor { name: CapabilityName::StockFetcher, description: "Fetches a live equity quote for a ticker symbol." },
    CapabilityDescriptor { name: CapabilityName::WeatherFetcher, description: "Fetches current weather conditions for a location." },
    CapabilityDescriptor { name: CapabilityName::CryptoFetcher, description: "Fetches a live price for a cryptocurrency." },
    CapabilityDescriptor { name: CapabilityName::FxFetcher, description: "Fetches a live currency exchange rate." },
    CapabilityDescriptor { name: CapabilityName::TimeFetcher, description: "Fetches the current time in a named time zone." },
    CapabilityDescriptor { name: CapabilityName::WebSearcher, description: "Performs a web search for recent information." },
];

#[derive(Debug, Clone)]
pub struct SelectorInput {
    pub normalized_message: String,
    pub entity_hint: Option<String>,
}

#[derive(Debug, Error)]
pub enum CapabilityError {
    #[error("capability {0:?} timed out")]
    Timeout(CapabilityName),
    #[error("capability {0:?} failed: {1}")]
    ProviderFailed(CapabilityName, String),
}

#[async_trait]
pub trait CapabilityProvider: Send + Sync {
    fn name(&self) -> CapabilityName;
    async fn execute(&self, input: &SelectorInput) -> Result<Option<ProviderResult>, String>;
}

/// Deterministic keyword match (spec S4.5's fallback path, used "when the
/// LLM is unavailable" — the primary, LLM-driven selector belongs to
/// `cognition`, not here). Dedupes by construction: each keyword group can
/// only push its capability once.
pub fn keyword_fallback_select(normalized_message: &str) -> Vec<CapabilityName> {
    const STOCK_KEYWORDS: &[&str] = &["stock", "share price", "ticker", "nasdaq", "nyse"];
    const CRYPTO_KEYWORDS: &[&str] = &["bitcoin", "btc", "ethereum", "eth", "crypto", "token price"];
    const FX_KEYWORDS: &[&str] = &["exchange rate", "currency", "usd to", "eur to", "forex"];
    const WEATHER_KEYWORDS: &[&str] = &["weather", "forecast", "temperature", "rain", "snow"];
    const TIME_KEYWORDS: &[&str] = &["what time is it", "current time", "time zone", "timezone"];
    const SEARCH_KEYWORDS: &[&str] = &["search for", "look up", "latest news", "recent news"];

    let message = normalized_message.to_lowercase();
    let groups: [(&[&str], CapabilityName); 6] = [
        (STOCK_KEYWORDS, CapabilityName::StockFetcher),
        (CRYPTO_KEYWORDS, CapabilityName::CryptoFetcher),
        (FX_KEYWORDS, CapabilityName::FxFetcher),
        (WEATHER_KEYWORDS, CapabilityName::WeatherFetcher),
        (TIME_KEYWORDS, CapabilityName::TimeFetcher),
        (SEARCH_KEYWORDS, CapabilityName::WebSearcher),
    ];

    groups.into_iter().filter(|(keywords, _)| keywords.iter().any(|k| message.contains(k))).map(|(_, name)| name).collect()
}

/// Runs every selected capability concurrently under its own
/// `per_capability_timeout`. Partial success is acceptable (spec S4.5):
/// a timed-out or failing provider contributes to `errors`, it never
/// aborts the others.
pub async fn execute_capabilities(
    providers: &[Arc<dyn CapabilityProvider>],
    selected: &[CapabilityName],
    input: &SelectorInput,
    per_capability_timeout: Duration,
) -> (Vec<ProviderResult>, Vec<CapabilityError>) {
    let calls = providers.iter().filter(|provider| selected.contains(&provider.name())).map(|provider| {
        let provider = Arc::clone(provider);
        let input = input.clone();
        async move {
            let name = provider.name();
            match tokio::time::timeout(per_capability_timeout, provider.execute(&input)).await {
                Ok(Ok(Some(result))) => Ok(result),
                Ok(Ok(None)) => Err(CapabilityError::ProviderFailed(name, "no data available".to_string())),
                Ok(Err(reason)) => Err(CapabilityError::ProviderFailed(name, reason)),
                Err(_) => Err(CapabilityError::Timeout(name)),
            }
        }
    });

    let outcomes = futures::future::join_all(calls).await;
    let mut results = Vec::new();
    let mut errors = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(result) => results.push(result),
            Err(error) => errors.push(error),
        }
    }
    (results, errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    struct FlakyProvider {
        name: CapabilityName,
        delay: Duration,
        outcome: Result<Option<ProviderResult>, String>,
    }

    #[async_trait]
    impl CapabilityProvider for FlakyProvider {
        fn name(&self) -> CapabilityName {
            self.name
        }

        async fn execute(&self, _input: &SelectorInput) -> Result<Option<ProviderResult>, String> {
            tokio::time::sleep(self.delay).await;
            self.outcome.clone()
        }
    }

    fn sample_result(name: CapabilityName) -> ProviderResult {
        ProviderResult {
            capability: name,
            category: "stock".to_string(),
            entity: Some("AAPL".to_string()),
            value: 178.50,
            unit: Some("usd".to_string()),
            display: "178.50 (+1.31%)".to_string(),
            fetched_at: Utc::now(),
            citation: "https://example.test/AAPL".to_string(),
        }
    }

    #[test]
    fn keyword_match_selects_stock_and_crypto_together() {
        let selected = keyword_fallback_select("what's the stock price and also the bitcoin price?");
        assert!(selected.contains(&CapabilityName::StockFetcher));
        assert!(selected.contains(&CapabilityName::CryptoFetcher));
        assert!(!selected.contains(&CapabilityName::WeatherFetcher));
    }

    #[test]
    fn no_keyword_match_selects_nothing() {
        assert!(keyword_fallback_select("tell me a joke").is_empty());
    }

    #[tokio::test]
    async fn timeout_and_success_are_both_reported_without_blocking_each_other() {
        let providers: Vec<Arc<dyn CapabilityProvider>> = vec![
            Arc::new(FlakyProvider { name: CapabilityName::StockFetcher, delay: Duration::from_millis(5), outcome: Ok(Some(sample_result(CapabilityName::StockFetcher))) }),
            Arc::new(FlakyProvider { name: CapabilityName::CryptoFetcher, delay: Duration::from_millis(200), outcome: Ok(Some(sample_result(CapabilityName::CryptoFetcher))) }),
        ];
        let input = SelectorInput { normalized_message: "stock and crypto".to_string(), entity_hint: None };
        let (results, errors) = execute_capabilities(
            &providers,
            &[CapabilityName::StockFetcher, CapabilityName::CryptoFetcher],
            &input,
            Duration::from_millis(20),
        )
        .await;

        assert_eq!(results.len(), 1);
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], CapabilityError::Timeout(CapabilityName::CryptoFetcher)));
    }
}
