// [libs/infra/live-data/src/web_search.rs]
//! `web_searcher` (spec S4.5). Unlike the other five fetchers this one has
//! no natural numeric quantity to report; `value` is fixed at 0.0 and the
//! summary text carries the payload. `entity_hint` overrides the search
//! query when present, otherwise the normalized message itself is used.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use novaos_evidence::{CapabilityProvider, SelectorInput};
use novaos_models::{CapabilityName, ProviderResult};
use novaos_secure_transport::SecureTransport;

use crate::fetch::fetch_json;

const NO_SUMMARY: &str = "No summary available.";

pub struct WebSearcher {
    transport: Arc<SecureTransport>,
}

impl WebSearcher {
    pub fn new(transport: Arc<SecureTransport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl CapabilityProvider for WebSearcher {
    fn name(&self) -> CapabilityName {
        CapabilityName::WebSearcher
    }

    async fn execute(&self, input: &SelectorInput) -> Result<Option<ProviderResult>, String> {
        let query = input.entity_hint.clone().unwrap_or_else(|| input.normalized_message.clone());
        let url = format!("https://api.duckduckgo.com/?q={}&format=json", urlencode(&query));
        let rate_limit_key = format!("live-data:web-search:{query}");

        let payload = fetch_json(&self.transport, &url, &rate_limit_key).await.map_err(|e| e.to_string())?;
        let summary = payload.get("AbstractText").and_then(|v| v.as_str()).filter(|s| !s.is_empty()).unwrap_or(NO_SUMMARY).to_string();
        let source = payload.get("AbstractURL").and_then(|v| v.as_str()).map(|s| s.to_string()).unwrap_or_else(|| url.clone());

        Ok(Some(ProviderResult {
            capability: CapabilityName::WebSearcher,
            category: "web_search".to_string(),
            entity: Some(query),
            value: 0.0,
            unit: None,
            display: summary,
            fetched_at: Utc::now(),
            citation: source,
        }))
    }
}

fn urlencode(query: &str) -> String {
    query.chars().map(|c| if c.is_ascii_alphanumeric() { c.to_string() } else { format!("%{:02X}", c as u32) }).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::transport_with_json_response;

    #[tokio::test]
    async fn falls_back_to_the_normalized_message_when_no_hint_is_given() {
        let transport = transport_with_json_response("api.duckduckgo.com", r#"{"AbstractText":"Rust is a systems language.","AbstractURL":"https://en.example.test/Rust"}"#);
        let searcher = WebSearcher::new(Arc::new(transport));
        let input = SelectorInput { normalized_message: "what is rust".to_string(), entity_hint: None };

        let result = searcher.execute(&input).await.unwrap().unwrap();
        assert_eq!(result.entity.as_deref(), Some("what is rust"));
        assert_eq!(result.display, "Rust is a systems language.");
        assert_eq!(result.citation, "https://en.example.test/Rust");
    }

    #[tokio::test]
    async fn empty_abstract_falls_back_to_the_no_summary_marker() {
        let transport = transport_with_json_response("api.duckduckgo.com", r#"{"AbstractText":""}"#);
        let searcher = WebSearcher::new(Arc::new(transport));
        let input = SelectorInput { normalized_message: "obscure query".to_string(), entity_hint: None };

        let result = searcher.execute(&input).await.unwrap().unwrap();
        assert_eq!(result.display, NO_SUMMARY);
    }
}
