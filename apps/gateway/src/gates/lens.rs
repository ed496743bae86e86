// [apps/gateway/src/gates/lens.rs]
//! Lens gate (spec S4.1 step 3): decide whether live data is needed at all
//! and, if so, exactly which categories — the one decision Capability then
//! spends its whole run acting on rather than re-deriving. Selection
//! mirrors the Intent classifier's own `live_data` hints when present and
//! falls back to the same deterministic keyword match Capability used to
//! run on its own, plus each selected category's freshness window so
//! downstream staleness checks don't need their own copy of the policy.

use novaos_evidence::{keyword_fallback_select, FreshnessPolicy};
use novaos_gate_strategy::GateHandler;
use novaos_models::{CapabilityName, GateId, GateResult, PipelineState, RequestContext};

use async_trait::async_trait;

fn category_of(name: CapabilityName) -> &'static str {
    match name {
        CapabilityName::StockFetcher => "stock",
        CapabilityName::CryptoFetcher => "crypto",
        CapabilityName::FxFetcher => "fx",
        CapabilityName::WeatherFetcher => "weather",
        CapabilityName::TimeFetcher => "time",
        CapabilityName::WebSearcher => "web_search",
    }
}

fn capability_token(name: CapabilityName) -> &'static str {
    match name {
        CapabilityName::StockFetcher => "stock_fetcher",
        CapabilityName::CryptoFetcher => "crypto_fetcher",
        CapabilityName::FxFetcher => "fx_fetcher",
        CapabilityName::WeatherFetcher => "weather_fetcher",
        CapabilityName::TimeFetcher => "time_fetcher",
        CapabilityName::WebSearcher => "web_searcher",
    }
}

fn hinted_capabilities(state: &PipelineState) -> Option<Vec<CapabilityName>> {
    let hints = state.intent.as_ref()?.get("live_data")?.as_array()?;
    let names: Vec<CapabilityName> = hints
        .iter()
        .filter_map(|hint| hint.as_str())
        .filter_map(|hint| match hint {
            "stock_fetcher" => Some(CapabilityName::StockFetcher),
            "crypto_fetcher" => Some(CapabilityName::CryptoFetcher),
            "fx_fetcher" => Some(CapabilityName::FxFetcher),
            "weather_fetcher" => Some(CapabilityName::WeatherFetcher),
            "time_fetcher" => Some(CapabilityName::TimeFetcher),
            "web_searcher" => Some(CapabilityName::WebSearcher),
            _ => None,
        })
        .collect();
    Some(names)
}

pub struct LensGate {
    freshness: FreshnessPolicy,
}

impl LensGate {
    pub fn new() -> Self {
        Self { freshness: FreshnessPolicy::default() }
    }
}

impl Default for LensGate {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GateHandler for LensGate {
    fn gate_id(&self) -> GateId {
        GateId::Lens
    }

    async fn run(&self, _ctx: &RequestContext, state: &PipelineState, _regeneration_hint: Option<&str>) -> GateResult<PipelineState> {
        let topic = state
            .intent
            .as_ref()
            .and_then(|intent| intent.get("topic"))
            .and_then(|topic| topic.as_str())
            .unwrap_or("general");

        let selected = hinted_capabilities(state).filter(|hints| !hints.is_empty()).unwrap_or_else(|| keyword_fallback_select(&state.normalized_message));

        let capabilities: Vec<&str> = selected.iter().map(|name| capability_token(*name)).collect();
        let required_categories: Vec<&str> = selected.iter().map(|name| category_of(*name)).collect();
        let freshness_max_age_secs: serde_json::Map<String, serde_json::Value> = selected
            .iter()
            .map(|name| {
                let category = category_of(*name);
                (category.to_string(), serde_json::Value::from(self.freshness.max_age_secs(category)))
            })
            .collect();

        let lens_result = serde_json::json!({
            "topic": topic,
            "capabilities": capabilities,
            "required_categories": required_categories,
            "freshness_max_age_secs": serde_json::Value::Object(freshness_max_age_secs),
        });

        GateResult::pass(GateId::Lens, state.with_lens_result(lens_result), 0)
    }
}
