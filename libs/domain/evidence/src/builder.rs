// [libs/domain/evidence/src/builder.rs]
//! Assembles raw `ProviderResult`s into the `EvidencePack` the Model gate
//! consumes (spec S4.5 components 3-6): formatted context, numeric token
//! extraction, staleness, citations, and the four-way constraint level.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use novaos_models::{ConstraintLevel, ContextItem, EvidencePack, NumericToken, ProviderResult};

use crate::capability::CapabilityError;
use crate::freshness::FreshnessPolicy;

pub struct EvidenceBuilder {
    freshness: FreshnessPolicy,
}

impl EvidenceBuilder {
    pub fn new(freshness: FreshnessPolicy) -> Self {
        Self { freshness }
    }

    /// `required_categories` is the set of categories the selection step
    /// decided the query needed. `query_is_qualitative` is true when no
    /// capability was selected at all (the query needed no live data).
    pub fn assemble(
        &self,
        results: Vec<ProviderResult>,
        errors: &[CapabilityError],
        required_categories: &[String],
        query_is_qualitative: bool,
        now: DateTime<Utc>,
    ) -> EvidencePack {
        let mut context_items = Vec::with_capacity(results.len());
        let mut numeric_tokens = HashMap::new();
        let mut required_citations = HashSet::new();
        let mut freshness_warnings = Vec::new();
        let mut formatted_blocks = Vec::new();
        let mut succeeded_categories = HashSet::new();

        for result in results {
            let is_stale = self.freshness.is_stale(&result.category, result.fetched_at, now);
            if is_stale {
                freshness_warnings.push(format!("{} data is stale (fetched {})", result.category, result.fetched_at.to_rfc3339()));
            }
            succeeded_categories.insert(result.category.clone());
            required_citations.insert(result.citation.clone());

            let token_key = match &result.entity {
                Some(entity) => format!("{}.{}.value", result.category, entity),
                None => format!("{}.value", result.category),
            };
            numeric_tokens.insert(
                token_key,
                NumericToken {
                    value: result.value,
                    unit: result.unit.clone(),
                    category: result.category.clone(),
                    entity: result.entity.clone(),
                    fetched_at: result.fetched_at,
                },
            );

            let label = result.entity.clone().unwrap_or_else(|| result.category.clone());
            formatted_blocks.push(format!("{}: {}", label, result.display));

            context_items.push(ContextItem {
                id: format!("{}-{}", result.category, result.entity.clone().unwrap_or_default()),
                category: result.category.clone(),
                content: result.display.clone(),
                entity: result.entity.clone(),
                fetched_at: result.fetched_at,
                is_stale,
                citation: result.citation.clone(),
            });
        }

        let missing: Vec<String> = required_categories.iter().filter(|c| !succeeded_categories.contains(*c)).cloned().collect();
        let some_succeeded = !succeeded_categories.is_empty();
        let needed_live_data = !required_categories.is_empty();

        let constraint_level = if query_is_qualitative {
            ConstraintLevel::QualitativeOnly
        } else if some_succeeded {
            // Whether fully or partially satisfied, anything we did fetch
            // must still be quoted verbatim rather than estimated.
            ConstraintLevel::QuoteEvidenceOnly
        } else if needed_live_data {
            ConstraintLevel::ForbidNumericClaims
        } else {
            ConstraintLevel::QualitativeOnly
        };

        let mut system_prompt_additions = match constraint_level {
            ConstraintLevel::QuoteEvidenceOnly => "Only use the numbers provided below; do not estimate or recall figures from memory.".to_string(),
            ConstraintLevel::ForbidNumericClaims => "Live data is unavailable for this request; do not state or imply any numeric figures.".to_string(),
            ConstraintLevel::QualitativeOnly => "Answer qualitatively; no live numeric data was requested.".to_string(),
        };
        if !missing.is_empty() {
            system_prompt_additions.push_str(&format!(" Unavailable: {}.", missing.join(", ")));
        }

        let incomplete_reason = if missing.is_empty() { None } else { Some(format!("missing categories: {}", missing.join(", "))) };

        EvidencePack {
            context_items,
            numeric_tokens,
            formatted_context: formatted_blocks.join("\n"),
            system_prompt_additions,
            required_citations,
            freshness_warnings,
            constraint_level,
            is_complete: missing.is_empty() && errors.is_empty(),
            incomplete_reason,
        }
    }
}
