// [libs/domain/evidence/src/xml.rs]
//! The `<live_data_evidence>` envelope (spec S4.5 component 7) — the exact
//! wire shape injected into the Model gate's prompt. Escaping is manual
//! rather than pulled from a full XML writer crate: this is a single fixed
//! template, not general document construction.

use novaos_models::EvidencePack;

pub fn escape_xml(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Builds the literal envelope the Model gate receives: system
/// instructions, one `<data>` block per context item, an optional
/// `<freshness_warnings>` block, then the escaped user query.
pub fn build_envelope(pack: &EvidencePack, user_query: &str) -> String {
    let mut data_blocks = String::new();
    for item in &pack.context_items {
        let freshness = if item.is_stale { "stale" } else { "verified" };
        let entity_attr = item.entity.as_deref().unwrap_or("");
        data_blocks.push_str(&format!(
            "  <data category=\"{}\" entity=\"{}\" freshness=\"{}\">{}</data>\n",
            escape_xml(&item.category),
            escape_xml(entity_attr),
            freshness,
            escape_xml(&item.content),
        ));
    }

    let freshness_warnings_block = if pack.freshness_warnings.is_empty() {
        String::new()
    } else {
        format!("  <freshness_warnings>{}</freshness_warnings>\n", escape_xml(&pack.freshness_warnings.join("; ")))
    };

    format!(
        "<live_data_evidence>\n  <system_instructions>{}</system_instructions>\n{}{}  <user_query>{}</user_query>\n</live_data_evidence>",
        escape_xml(&pack.system_prompt_additions),
        data_blocks,
        freshness_warnings_block,
        escape_xml(user_query),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use novaos_models::{ConstraintLevel, ContextItem};

    #[test]
    fn escapes_the_five_reserved_characters() {
        assert_eq!(escape_xml("<a> & \"b\" 'c'"), "&lt;a&gt; &amp; &quot;b&quot; &apos;c&apos;");
    }

    #[test]
    fn envelope_omits_freshness_warnings_block_when_there_are_none() {
        let mut pack = EvidencePack::empty(ConstraintLevel::QuoteEvidenceOnly);
        pack.system_prompt_additions = "Only use the numbers provided below.".to_string();
        pack.context_items.push(ContextItem {
            id: "stock-AAPL".to_string(),
            category: "stock".to_string(),
            content: "178.50 usd".to_string(),
            entity: Some("AAPL".to_string()),
            fetched_at: Utc::now(),
            is_stale: false,
            citation: "https://example.test".to_string(),
        });

        let envelope = build_envelope(&pack, "what's AAPL at?");
        assert!(envelope.contains("<live_data_evidence>"));
        assert!(envelope.contains("category=\"stock\" entity=\"AAPL\" freshness=\"verified\""));
        assert!(!envelope.contains("freshness_warnings"));
        assert!(envelope.ends_with("</live_data_evidence>"));
    }

    #[test]
    fn envelope_includes_freshness_warnings_block_when_present() {
        let mut pack = EvidencePack::empty(ConstraintLevel::QuoteEvidenceOnly);
        pack.freshness_warnings.push("stock data is stale".to_string());
        let envelope = build_envelope(&pack, "q");
        assert!(envelope.contains("<freshness_warnings>stock data is stale</freshness_warnings>"));
    }

    #[test]
    fn user_query_is_escaped_inside_the_envelope() {
        let pack = EvidencePack::empty(ConstraintLevel::QualitativeOnly);
        let envelope = build_envelope(&pack, "<script>alert(1)</script>");
        assert!(envelope.contains("&lt;script&gt;"));
        assert!(!envelope.contains("<script>"));
    }
}
