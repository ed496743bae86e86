// [libs/domain/cognition/src/constitutional.rs]
//! Constitutional Validator (spec S4.7). Calls the classifier LLM at
//! temperature 0 with a fixed rubric, expects strict JSON
//! `{violates, reason?, fix?}`. Parse errors or API errors fail open (no
//! violation) — the orchestrator's regeneration cap applies on the caller
//! side, this module only ever emits a single verdict per call.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::provider::{CompletionRequest, LlmProvider};

/// Kept as a single constant so the real prompt and any test fixture
/// share byte-identical wording.
pub const CONSTITUTIONAL_RUBRIC: &str = r#"You are a constitutional compliance reviewer for a conversational assistant's generated reply. Given the reply text and the constraints it was supposed to honor, output strict JSON with this shape:

{"violates": true|false, "reason": "one sentence, present only if violates is true", "fix": "concrete rewriting guidance, present only if violates is true"}

Flag a violation only for a clear, material breach of the stated constraints (a banned phrase appears verbatim, a disallowed numeric claim is stated, a required disclaimer is missing). Do not flag stylistic preferences."#;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstitutionalVerdict {
    pub violates: bool,
    pub reason: Option<String>,
    pub fix: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConstitutionalAction {
    Pass,
    Regenerate { fix_guidance: String },
}

pub struct ConstitutionalValidator {
    classifier: Arc<dyn LlmProvider>,
}

impl ConstitutionalValidator {
    pub fn new(classifier: Arc<dyn LlmProvider>) -> Self {
        Self { classifier }
    }

    #[tracing::instrument(skip(self, generated_text))]
    pub async fn validate(&self, generated_text: &str) -> ConstitutionalAction {
        let request = CompletionRequest {
            system_prompt: CONSTITUTIONAL_RUBRIC.to_string(),
            user_prompt: generated_text.to_string(),
            temperature: 0.0,
            max_tokens: 256,
        };

        let response = match self.classifier.complete(&request).await {
            Ok(response) => response,
            Err(error) => {
                tracing::warn!(error = %error, "constitutional classifier call failed, failing open");
                return ConstitutionalAction::Pass;
            }
        };

        let verdict: ConstitutionalVerdict = match serde_json::from_str(&response.content) {
            Ok(verdict) => verdict,
            Err(error) => {
                tracing::warn!(error = %error, "constitutional classifier returned malformed JSON, failing open");
                return ConstitutionalAction::Pass;
            }
        };

        if verdict.violates {
            ConstitutionalAction::Regenerate { fix_guidance: verdict.fix.unwrap_or_default() }
        } else {
            ConstitutionalAction::Pass
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CognitionError;
    use crate::provider::CompletionResponse;
    use async_trait::async_trait;

    struct ScriptedClassifier {
        reply: Result<&'static str, ()>,
    }

    #[async_trait]
    impl LlmProvider for ScriptedClassifier {
        fn name(&self) -> &str {
            "scripted-classifier"
        }

        async fn is_available(&self) -> bool {
            true
        }

        async fn complete(&self, _request: &CompletionRequest) -> Result<CompletionResponse, CognitionError> {
            match self.reply {
                Ok(content) => Ok(CompletionResponse { content: content.to_string(), provider_name: self.name().to_string() }),
                Err(()) => Err(CognitionError::ChainExhausted),
            }
        }
    }

    #[tokio::test]
    async fn no_violation_passes() {
        let validator = ConstitutionalValidator::new(Arc::new(ScriptedClassifier { reply: Ok(r#"{"violates":false}"#) }));
        assert_eq!(validator.validate("a fine reply").await, ConstitutionalAction::Pass);
    }

    #[tokio::test]
    async fn violation_yields_regenerate_with_fix_guidance() {
        let validator = ConstitutionalValidator::new(Arc::new(ScriptedClassifier {
            reply: Ok(r#"{"violates":true,"reason":"used a banned phrase","fix":"remove the phrase \"guaranteed\""}"#),
        }));
        let action = validator.validate("this is guaranteed to work").await;
        assert_eq!(action, ConstitutionalAction::Regenerate { fix_guidance: "remove the phrase \"guaranteed\"".to_string() });
    }

    #[tokio::test]
    async fn malformed_json_fails_open() {
        let validator = ConstitutionalValidator::new(Arc::new(ScriptedClassifier { reply: Ok("not json") }));
        assert_eq!(validator.validate("text").await, ConstitutionalAction::Pass);
    }

    #[tokio::test]
    async fn classifier_error_fails_open() {
        let validator = ConstitutionalValidator::new(Arc::new(ScriptedClassifier { reply: Err(()) }));
        assert_eq!(validator.validate("text").await, ConstitutionalAction::Pass);
    }
}
