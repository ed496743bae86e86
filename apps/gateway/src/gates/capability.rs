// [apps/gateway/src/gates/capability.rs]
//! Capability gate (spec S4.1 step 5, S4.5). Runs the fetchers Lens already
//! selected (`state.lens_result`) concurrently and assembles the resulting
//! `EvidencePack` — this gate owns execution and evidence assembly, not
//! selection. Skipped entirely under `Stance::Sword`: task management
//! never needs live external data, and running fetchers on that path
//! would just cost latency for evidence nothing downstream reads.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use novaos_evidence::{execute_capabilities, keyword_fallback_select, CapabilityProvider, EvidenceBuilder, SelectorInput};
use novaos_gate_strategy::GateHandler;
use novaos_models::{CapabilityName, EvidencePack, GateId, GateResult, PipelineState, RequestContext, Stance};

/// Only reached by the keyword-fallback path below; the Lens-driven path
/// gets its categories straight from `lens_result`.
fn capability_token_category(name: CapabilityName) -> &'static str {
    match name {
        CapabilityName::StockFetcher => "stock",
        CapabilityName::CryptoFetcher => "crypto",
        CapabilityName::FxFetcher => "fx",
        CapabilityName::WeatherFetcher => "weather",
        CapabilityName::TimeFetcher => "time",
        CapabilityName::WebSearcher => "web_search",
    }
}

fn capability_from_token(token: &str) -> Option<CapabilityName> {
    match token {
        "stock_fetcher" => Some(CapabilityName::StockFetcher),
        "crypto_fetcher" => Some(CapabilityName::CryptoFetcher),
        "fx_fetcher" => Some(CapabilityName::FxFetcher),
        "weather_fetcher" => Some(CapabilityName::WeatherFetcher),
        "time_fetcher" => Some(CapabilityName::TimeFetcher),
        "web_searcher" => Some(CapabilityName::WebSearcher),
        _ => None,
    }
}

/// Reads the selection Lens already made. Returns `None` when `lens_result`
/// is missing or unparseable so the caller can fall back to its own
/// keyword match rather than silently skipping every fetcher — Lens is
/// expected to always have run first, but a gate must never trust that
/// blindly.
fn lens_selection(state: &PipelineState) -> Option<(Vec<CapabilityName>, Vec<String>)> {
    let lens_result = state.lens_result.as_ref()?;
    let capabilities: Vec<CapabilityName> = lens_result.get("capabilities")?.as_array()?.iter().filter_map(|v| v.as_str()).filter_map(capability_from_token).collect();
    let required_categories: Vec<String> = lens_result.get("required_categories")?.as_array()?.iter().filter_map(|v| v.as_str()).map(str::to_string).collect();
    Some((capabilities, required_categories))
}

pub struct CapabilityGate {
    providers: Vec<Arc<dyn CapabilityProvider>>,
    builder: EvidenceBuilder,
    per_capability_timeout: Duration,
}

impl CapabilityGate {
    pub fn new(providers: Vec<Arc<dyn CapabilityProvider>>, builder: EvidenceBuilder, per_capability_timeout: Duration) -> Self {
        Self { providers, builder, per_capability_timeout }
    }
}

#[async_trait]
impl GateHandler for CapabilityGate {
    fn gate_id(&self) -> GateId {
        GateId::Capability
    }

    async fn run(&self, _ctx: &RequestContext, state: &PipelineState, _regeneration_hint: Option<&str>) -> GateResult<PipelineState> {
        if state.stance == Stance::Sword {
            let pack = EvidencePack::empty(novaos_models::ConstraintLevel::QualitativeOnly);
            return GateResult::pass(GateId::Capability, state.with_evidence_pack(pack), 0);
        }

        let (selected, required_categories) = match lens_selection(state) {
            Some(selection) => selection,
            None => {
                tracing::warn!("lens_result missing or unparseable, falling back to keyword selection");
                let fallback = keyword_fallback_select(&state.normalized_message);
                let categories = fallback.iter().map(|name| capability_token_category(*name).to_string()).collect();
                (fallback, categories)
            }
        };

        if selected.is_empty() {
            let pack = self.builder.assemble(Vec::new(), &[], &[], true, Utc::now());
            return GateResult::pass(GateId::Capability, state.with_evidence_pack(pack), 0);
        }

        let input = SelectorInput { normalized_message: state.normalized_message.clone(), entity_hint: None };
        let (results, errors) = execute_capabilities(&self.providers, &selected, &input, self.per_capability_timeout).await;

        for error in &errors {
            tracing::warn!(error = %error, "capability fetch failed or timed out");
        }

        let pack = self.builder.assemble(results, &errors, &required_categories, false, Utc::now());
        GateResult::pass(GateId::Capability, state.with_evidence_pack(pack), 0)
    }
}
