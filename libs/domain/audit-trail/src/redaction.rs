// [libs/domain/audit-trail/src/redaction.rs]
//! Fixed, versioned PII pattern set (spec S4.11 step 2). Only the list of
//! pattern *names* that matched ever leaves this module — the raw matches
//! are overwritten in place and discarded.

use once_cell::sync::Lazy;
use regex::Regex;

/// Bumped whenever a pattern is added, removed, or its regex changes —
/// old `ResponseAudit` records remain interpretable against the version
/// they were written with even after this set evolves.
pub const PII_PATTERN_VERSION: u32 = 1;

struct PiiPattern {
    name: &'static str,
    regex: Regex,
}

macro_rules! pii_pattern {
    ($name:expr, $pattern:expr) => {
        PiiPattern { name: $name, regex: Regex::new($pattern).expect("static PII pattern is valid regex") }
    };
}

// Order matters: context-bearing patterns (routing/account numbers) run
// before the generic digit-run patterns (card, phone) so their longer,
// more specific matches consume the digits first. A placeholder token
// contains no digits, so a later pattern in the list can never re-match
// text a prior pattern already redacted — this is what makes `redact`
// idempotent without needing a second convergence pass.
static PATTERNS: Lazy<Vec<PiiPattern>> = Lazy::new(|| {
    vec![
        pii_pattern!("routing_number_with_context", r"(?i)\brouting\s*(?:number|#)?\s*[:#]?\s*\d{9}\b"),
        pii_pattern!("bank_account_with_context", r"(?i)\baccount\s*(?:number|#)?\s*[:#]?\s*\d{6,17}\b"),
        pii_pattern!("ssn", r"\b\d{3}-\d{2}-\d{4}\b"),
        pii_pattern!("card_number", r"\b(?:\d[ -]?){13,16}\b"),
        pii_pattern!("email", r"\b[\w.+-]+@[\w-]+\.[\w.-]+\b"),
        pii_pattern!("phone_number", r"\b(?:\+?1[-. ]?)?\(?\d{3}\)?[-. ]?\d{3}[-. ]?\d{4}\b"),
        pii_pattern!("date_of_birth", r"\b(?:0?[1-9]|1[0-2])[/-](?:0?[1-9]|[12]\d|3[01])[/-](?:\d{4}|\d{2})\b"),
        pii_pattern!("ipv4_address", r"\b(?:(?:25[0-5]|2[0-4]\d|1?\d?\d)\.){3}(?:25[0-5]|2[0-4]\d|1?\d?\d)\b"),
    ]
});

#[derive(Debug, Clone)]
pub struct PiiRedactionResult {
    pub redacted_text: String,
    pub patterns_matched: Vec<String>,
}

/// Applies the fixed pattern set in order, replacing every match with a
/// `[REDACTED:pattern_name]` token. `redact(redact(x)) == redact(x)`:
/// once a span is replaced, the placeholder contains no digits, `@`, or
/// slashes, so no later pattern (and no re-application) can match it again.
pub fn redact(text: &str) -> PiiRedactionResult {
    let mut working = text.to_string();
    let mut patterns_matched = Vec::new();

    for pattern in PATTERNS.iter() {
        let mut matched_this_pass = false;
        let replaced = pattern.regex.replace_all(&working, |_: &regex::Captures| {
            matched_this_pass = true;
            format!("[REDACTED:{}]", pattern.name)
        });
        if matched_this_pass {
            patterns_matched.push(pattern.name.to_string());
        }
        working = replaced.into_owned();
    }

    PiiRedactionResult { redacted_text: working, patterns_matched }
}
