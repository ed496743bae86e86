// [libs/domain/cognition/src/prompt.rs]
//! Prompt composition and post-constraint enforcement (spec S4.6).
//! Composition concatenates a fixed policy system prompt with fragments
//! derived from `GenerationConstraints`, followed by the XML-enveloped
//! user prompt produced upstream by `evidence::build_envelope`. Post-
//! constraints then patch the generated text for any `mustPrepend`/
//! `mustInclude` requirement the model didn't already satisfy.

#[derive(Debug, Clone, Default)]
pub struct GenerationConstraints {
    pub banned_phrases: Vec<String>,
    pub max_pronouns: Option<u32>,
    pub tone: Option<String>,
    pub must_prepend: Option<String>,
    pub must_include: Vec<String>,
    pub allow_numeric_precision: bool,
    pub allow_action_recommendations: bool,
}

impl GenerationConstraints {
    fn as_fragments(&self) -> Vec<String> {
        let mut fragments = Vec::new();

        if !self.banned_phrases.is_empty() {
            fragments.push(format!("Never use any of these phrases: {}.", self.banned_phrases.join(", ")));
        }
        if let Some(max_pronouns) = self.max_pronouns {
            fragments.push(format!("Use no more than {max_pronouns} first- or second-person pronouns in your reply."));
        }
        if let Some(tone) = &self.tone {
            fragments.push(format!("Adopt a {tone} tone."));
        }
        if !self.allow_numeric_precision {
            fragments.push("Do not state precise numeric figures; speak only in qualitative terms.".to_string());
        }
        if !self.allow_action_recommendations {
            fragments.push("Do not recommend a specific course of action.".to_string());
        }

        fragments
    }
}

/// Concatenates the fixed policy system prompt, the constraint fragments,
/// and the already-enveloped user prompt into the final prompt sent to the
/// provider chain.
pub fn compose_prompt(policy_system_prompt: &str, constraints: &GenerationConstraints, enveloped_user_prompt: &str) -> (String, String) {
    let mut system_prompt = policy_system_prompt.to_string();
    for fragment in constraints.as_fragments() {
        system_prompt.push('\n');
        system_prompt.push_str(&fragment);
    }

    (system_prompt, enveloped_user_prompt.to_string())
}

/// Applies spec S4.6's post-constraints: prepend `mustPrepend` if the
/// generated text doesn't already start with it; append any `mustInclude`
/// item the generated text doesn't already contain.
pub fn apply_post_constraints(generated: &str, constraints: &GenerationConstraints) -> String {
    let mut text = generated.to_string();

    if let Some(prefix) = &constraints.must_prepend {
        if !text.starts_with(prefix.as_str()) {
            text = format!("{prefix}\n\n{text}");
        }
    }

    for required in &constraints.must_include {
        if !text.contains(required.as_str()) {
            text.push_str("\n\n");
            text.push_str(required);
        }
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constraint_fragments_appear_in_composed_system_prompt() {
        let constraints = GenerationConstraints {
            banned_phrases: vec!["guaranteed".to_string()],
            tone: Some("calm".to_string()),
            allow_numeric_precision: false,
            ..Default::default()
        };
        let (system_prompt, _) = compose_prompt("Base policy.", &constraints, "<live_data_evidence></live_data_evidence>");
        assert!(system_prompt.contains("guaranteed"));
        assert!(system_prompt.contains("calm tone"));
        assert!(system_prompt.contains("Do not state precise numeric figures"));
    }

    #[test]
    fn enveloped_user_prompt_passes_through_unchanged() {
        let (_, user_prompt) = compose_prompt("Base policy.", &GenerationConstraints::default(), "<live_data_evidence>x</live_data_evidence>");
        assert_eq!(user_prompt, "<live_data_evidence>x</live_data_evidence>");
    }

    #[test]
    fn must_prepend_is_added_when_missing() {
        let constraints = GenerationConstraints { must_prepend: Some("Disclaimer:".to_string()), ..Default::default() };
        let patched = apply_post_constraints("Here's the answer.", &constraints);
        assert!(patched.starts_with("Disclaimer:"));
    }

    #[test]
    fn must_prepend_is_left_alone_when_already_present() {
        let constraints = GenerationConstraints { must_prepend: Some("Disclaimer:".to_string()), ..Default::default() };
        let patched = apply_post_constraints("Disclaimer: here's the answer.", &constraints);
        assert_eq!(patched, "Disclaimer: here's the answer.");
    }

    #[test]
    fn must_include_items_missing_from_the_reply_are_appended() {
        let constraints = GenerationConstraints { must_include: vec!["call 988".to_string()], ..Default::default() };
        let patched = apply_post_constraints("I hear you.", &constraints);
        assert!(patched.contains("call 988"));
    }

    #[test]
    fn must_include_item_already_present_is_not_duplicated() {
        let constraints = GenerationConstraints { must_include: vec!["call 988".to_string()], ..Default::default() };
        let patched = apply_post_constraints("Please call 988 if you need help.", &constraints);
        assert_eq!(patched.matches("call 988").count(), 1);
    }
}
