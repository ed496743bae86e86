// [libs/core/risk-classifier/src/normalizer.rs]
//! Consistency normalizer: the classifier LLM returns `category` and
//! `riskLevel` as independent fields, which occasionally disagree (a
//! `harm_risk` categorization paired with `riskLevel: "medium"`, say).
//! `category` is authoritative for the decision table; this module
//! overrides a mismatched `riskLevel` to the category's canonical floor
//! and logs the disagreement rather than trusting either field blindly.

use crate::errors::ClassificationError;
use novaos_models::{InterventionLevel, RiskSummary, VetoType};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    None,
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    Safe,
    DeathRisk,
    HarmRisk,
    RecklessDecision,
}

/// Raw classifier output, deserialized directly from the model's JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawClassification {
    pub risk_level: RiskLevel,
    pub category: RiskCategory,
    pub confidence: f64,
    pub reasoning: String,
}

impl RawClassification {
    pub fn from_json(raw: &str) -> Result<Self, ClassificationError> {
        let parsed: Self = serde_json::from_str(raw)?;
        if !(0.0..=1.0).contains(&parsed.confidence) {
            return Err(ClassificationError::ConfidenceOutOfRange(parsed.confidence));
        }
        Ok(parsed)
    }
}

const NUDGE_DOMAINS: [&str; 4] = ["health", "legal", "finance", "mental_health"];

pub struct ConsistencyNormalizer;

impl ConsistencyNormalizer {
    /// Forces `category` to own the decision and stamps a `RiskSummary`
    /// matching spec S4.2's table. `pending_ack` is left `None` — issuing
    /// the actual ack token is gate-strategy's job, since it owns the
    /// request/user/audit identifiers this normalizer never sees.
    pub fn normalize(raw: &RawClassification, audit_id: &str, domain: Option<&str>) -> RiskSummary {
        let (canonical_level, consistent) = match raw.category {
            RiskCategory::DeathRisk => (RiskLevel::Critical, raw.risk_level == RiskLevel::Critical),
            RiskCategory::HarmRisk => (RiskLevel::High, raw.risk_level == RiskLevel::High),
            RiskCategory::RecklessDecision => (RiskLevel::Medium, raw.risk_level == RiskLevel::Medium),
            RiskCategory::Safe => (raw.risk_level, matches!(raw.risk_level, RiskLevel::None | RiskLevel::Low)),
        };

        if !consistent {
            tracing::warn!(
                category = ?raw.category,
                reported_level = ?raw.risk_level,
                canonical_level = ?canonical_level,
                "shield classifier returned an inconsistent category/riskLevel pair; normalizing to category's canonical floor"
            );
        }

        match raw.category {
            RiskCategory::DeathRisk => RiskSummary {
                intervention_level: InterventionLevel::Veto,
                veto_type: None,
                stakes_level: "critical".to_string(),
                reason: raw.reasoning.clone(),
                audit_id: audit_id.to_string(),
                pending_ack: None,
                control_trigger: Some(Self::infer_control_trigger(&raw.reasoning)),
                crisis_resources: Some(Self::crisis_resources()),
                override_applied: None,
            },
            RiskCategory::HarmRisk => RiskSummary {
                intervention_level: InterventionLevel::Veto,
                veto_type: Some(VetoType::Hard),
                stakes_level: "high".to_string(),
                reason: raw.reasoning.clone(),
                audit_id: audit_id.to_string(),
                pending_ack: None,
                control_trigger: None,
                crisis_resources: None,
                override_applied: None,
            },
            RiskCategory::RecklessDecision => RiskSummary {
                intervention_level: InterventionLevel::Veto,
                veto_type: Some(VetoType::Soft),
                stakes_level: "medium".to_string(),
                reason: raw.reasoning.clone(),
                audit_id: audit_id.to_string(),
                pending_ack: None,
                control_trigger: None,
                crisis_resources: None,
                override_applied: None,
            },
            RiskCategory::Safe => {
                let nudges = domain.map(|d| NUDGE_DOMAINS.contains(&d)).unwrap_or(false);
                RiskSummary {
                    intervention_level: if nudges { InterventionLevel::Nudge } else { InterventionLevel::None },
                    veto_type: None,
                    stakes_level: "none".to_string(),
                    reason: raw.reasoning.clone(),
                    audit_id: audit_id.to_string(),
                    pending_ack: None,
                    control_trigger: None,
                    crisis_resources: None,
                    override_applied: None,
                }
            }
        }
    }

    /// Classifier outage or malformed output: fail open per spec S4.2.
    pub fn fail_open(audit_id: &str) -> RiskSummary {
        RiskSummary {
            intervention_level: InterventionLevel::None,
            veto_type: None,
            stakes_level: "unknown".to_string(),
            reason: "risk assessment unavailable".to_string(),
            audit_id: audit_id.to_string(),
            pending_ack: None,
            control_trigger: None,
            crisis_resources: None,
            override_applied: None,
        }
    }

    fn infer_control_trigger(reasoning: &str) -> String {
        reasoning
            .split(&['.', '\n'][..])
            .next()
            .unwrap_or(reasoning)
            .trim()
            .to_string()
    }

    fn crisis_resources() -> Vec<String> {
        vec![
            "988 Suicide & Crisis Lifeline (call or text 988)".to_string(),
            "Crisis Text Line: text HOME to 741741".to_string(),
            "International Association for Suicide Prevention: https://www.iasp.info/resources/Crisis_Centres/".to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(category: RiskCategory, risk_level: RiskLevel) -> RawClassification {
        RawClassification { risk_level, category, confidence: 0.9, reasoning: "Patient describes an in-progress overdose.".to_string() }
    }

    #[test]
    fn death_risk_yields_control_with_crisis_resources() {
        let summary = ConsistencyNormalizer::normalize(&raw(RiskCategory::DeathRisk, RiskLevel::Critical), "audit-1", None);
        assert_eq!(summary.intervention_level, InterventionLevel::Veto);
        assert!(summary.veto_type.is_none());
        assert!(summary.crisis_resources.is_some());
        assert!(summary.control_trigger.is_some());
    }

    #[test]
    fn harm_risk_yields_hard_veto() {
        let summary = ConsistencyNormalizer::normalize(&raw(RiskCategory::HarmRisk, RiskLevel::High), "audit-2", None);
        assert_eq!(summary.veto_type, Some(VetoType::Hard));
    }

    #[test]
    fn reckless_decision_yields_soft_veto() {
        let summary = ConsistencyNormalizer::normalize(&raw(RiskCategory::RecklessDecision, RiskLevel::Medium), "audit-3", None);
        assert_eq!(summary.veto_type, Some(VetoType::Soft));
    }

    #[test]
    fn safe_in_sensitive_domain_nudges() {
        let summary = ConsistencyNormalizer::normalize(&raw(RiskCategory::Safe, RiskLevel::Low), "audit-4", Some("finance"));
        assert_eq!(summary.intervention_level, InterventionLevel::Nudge);
    }

    #[test]
    fn safe_outside_sensitive_domain_has_no_intervention() {
        let summary = ConsistencyNormalizer::normalize(&raw(RiskCategory::Safe, RiskLevel::None), "audit-5", Some("cooking"));
        assert_eq!(summary.intervention_level, InterventionLevel::None);
    }

    #[test]
    fn mismatched_category_and_level_is_normalized_to_category_floor() {
        let summary = ConsistencyNormalizer::normalize(&raw(RiskCategory::HarmRisk, RiskLevel::Low), "audit-6", None);
        assert_eq!(summary.veto_type, Some(VetoType::Hard));
        assert_eq!(summary.stakes_level, "high");
    }

    #[test]
    fn out_of_range_confidence_is_rejected() {
        let raw_json = r#"{"riskLevel":"none","category":"safe","confidence":1.4,"reasoning":"test"}"#;
        assert!(RawClassification::from_json(raw_json).is_err());
    }

    #[test]
    fn well_formed_json_parses() {
        let raw_json = r#"{"riskLevel":"medium","category":"reckless_decision","confidence":0.8,"reasoning":"test"}"#;
        let parsed = RawClassification::from_json(raw_json).unwrap();
        assert_eq!(parsed.category, RiskCategory::RecklessDecision);
    }
}
