// [libs/domain/models/src/evidence.rs]
//! Evidence pack assembly output (spec S3 EvidencePack, S4.5) — the curated,
//! time-stamped live-data context injected into the Model gate's prompt.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextItem {
    pub id: String,
    pub category: String,
    pub content: String,
    pub entity: Option<String>,
    pub fetched_at: DateTime<Utc>,
    pub is_stale: bool,
    pub citation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumericToken {
    pub value: f64,
    pub unit: Option<String>,
    pub category: String,
    pub entity: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

/// Governs how numerics may appear in the Model gate's output (spec S4.5,
/// S8 property 6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintLevel {
    QuoteEvidenceOnly,
    ForbidNumericClaims,
    QualitativeOnly,
}

/// Named capability plugins (spec S4.5). `Hash`/`Eq` so a selection can be
/// deduplicated with a `HashSet` the way the spec's selection step requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityName {
    StockFetcher,
    WeatherFetcher,
    CryptoFetcher,
    FxFetcher,
    TimeFetcher,
    WebSearcher,
}

/// What a capability provider hands back after a successful fetch (spec
/// component 6, "typed `ProviderResult`") — raw enough that the builder
/// still has to format it, extract its numeric token, and judge staleness.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderResult {
    pub capability: CapabilityName,
    pub category: String,
    pub entity: Option<String>,
    pub value: f64,
    pub unit: Option<String>,
    pub display: String,
    pub fetched_at: DateTime<Utc>,
    pub citation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidencePack {
    pub context_items: Vec<ContextItem>,
    /// Keyed by a stable token key (e.g. `"stock.AAPL.price"`) so the
    /// numeric-quote check (spec S8 property 6) can do an O(1) membership
    /// test against the literal the Model gate actually emitted.
    pub numeric_tokens: HashMap<String, NumericToken>,
    pub formatted_context: String,
    pub system_prompt_additions: String,
    pub required_citations: HashSet<String>,
    pub freshness_warnings: Vec<String>,
    pub constraint_level: ConstraintLevel,
    pub is_complete: bool,
    pub incomplete_reason: Option<String>,
}

impl EvidencePack {
    pub fn empty(constraint_level: ConstraintLevel) -> Self {
        Self {
            context_items: Vec::new(),
            numeric_tokens: HashMap::new(),
            formatted_context: String::new(),
            system_prompt_additions: String::new(),
            required_citations: HashSet::new(),
            freshness_warnings: Vec::new(),
            constraint_level,
            is_complete: true,
            incomplete_reason: None,
        }
    }

    /// Spec S8 property 6: every numeric literal in the final reply must be
    /// a member of `numericTokens` when `constraintLevel = quote_evidence_only`.
    pub fn permits_numeric_literal(&self, literal: f64) -> bool {
        if self.constraint_level != ConstraintLevel::QuoteEvidenceOnly {
            return self.constraint_level != ConstraintLevel::ForbidNumericClaims;
        }
        self.numeric_tokens.values().any(|token| (token.value - literal).abs() < f64::EPSILON)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_evidence_only_rejects_literals_outside_the_pack() {
        let mut pack = EvidencePack::empty(ConstraintLevel::QuoteEvidenceOnly);
        pack.numeric_tokens.insert(
            "stock.AAPL.price".into(),
            NumericToken { value: 178.50, unit: None, category: "stock".into(), entity: Some("AAPL".into()), fetched_at: Utc::now() },
        );
        assert!(pack.permits_numeric_literal(178.50));
        assert!(!pack.permits_numeric_literal(999.0));
    }

    #[test]
    fn forbid_numeric_claims_rejects_every_literal() {
        let pack = EvidencePack::empty(ConstraintLevel::ForbidNumericClaims);
        assert!(!pack.permits_numeric_literal(1.0));
    }
}
