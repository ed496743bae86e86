// [apps/gateway/src/message.rs]
/*!
 * =================================================================
 * APARATO: WIRE BOUNDARY (V1.0 - GATE PIPELINE GOLD)
 * CLASIFICACIÓN: APPLICATION ENTRY POINT (ESTRATO L1-APP)
 * RESPONSABILIDAD: TRADUCIR UNA SUBMISSION EN UN `ResponseEnvelope`,
 * CORRIENDO EL RATE LIMIT DE BORDE, EL GATE PIPELINE Y EL SELLADO DE AUDITORIA
 *
 * VISION HIPER-HOLÍSTICA:
 * Nada rio abajo de `kernel.rs` llama a `GatePipeline::run` directamente.
 * Este modulo es el unico que ve tanto el pipeline como el `AuditAssembler`,
 * porque sellar una auditoria es una decision tomada sobre el *resultado*
 * del pipeline, no un paso dentro de el.
 * =================================================================
 */

use chrono::Utc;
use novaos_audit_trail::AuditInput;
use novaos_gate_strategy::PipelineOutcome;
use novaos_models::{
    AckRequired, ApiError, InternalFailure, PipelineState, PolicyVersions, RequestContext, ResponseEnvelope, ResponseMetadata,
    ResponseStatus, Stance, GATE_ORDER,
};
use novaos_rate_limit::{RateLimitKey, TokenBucketConfig};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::state::AppState;

/// Everything a caller hands in to start one conversational turn. The
/// upstream transport (out of scope here) is responsible for producing
/// this from whatever wire request it actually received.
pub struct Submission {
    pub request_id: String,
    pub user_id: String,
    pub user_message: String,
    pub ack_token: Option<String>,
    pub ack_text: Option<String>,
    pub policy_version: u32,
    pub cancellation: CancellationToken,
}

/// Runs the edge rate limit, the Gate Pipeline, and audit sealing for one
/// submission, returning the wire-facing envelope. Every failure branch
/// passes through [`InternalFailure::sanitize`] before it leaves this
/// function; nothing internal (gate names, storage errors, policy
/// versions) crosses this boundary unredacted.
#[instrument(skip(state, submission), fields(request_id = %submission.request_id))]
pub async fn process(state: &AppState, submission: Submission) -> Result<ResponseEnvelope, ApiError> {
    let request_id = submission.request_id.clone();

    state.is_operational().map_err(|reason| {
        InternalFailure::ProviderUnavailable(reason).sanitize(request_id.clone())
    })?;

    check_rate_limit(state, &submission).await.map_err(|failure| failure.sanitize(request_id.clone()))?;

    let ctx = RequestContext {
        request_id: submission.request_id.clone(),
        user_id: submission.user_id.clone(),
        policy_version: submission.policy_version,
        cancellation: submission.cancellation,
    };

    let mut initial_state =
        PipelineState::new(submission.request_id.clone(), submission.user_id.clone(), submission.user_message.clone(), normalize(&submission.user_message));
    initial_state.ack_token = submission.ack_token;
    initial_state.ack_text = submission.ack_text;

    let start = Utc::now();
    let outcome = state.pipeline.run(&ctx, initial_state).await;
    let elapsed_ms = (Utc::now() - start).num_milliseconds().max(0) as u64;

    let envelope = envelope_for(state, &outcome, elapsed_ms).await;

    info!(status = ?envelope.status, "submission processed");
    Ok(envelope)
}

async fn check_rate_limit(state: &AppState, submission: &Submission) -> Result<(), InternalFailure> {
    let config = state.config.current();
    let bucket_config = TokenBucketConfig {
        max_tokens: config.rate_limit.bucket_capacity,
        refill_rate_per_sec: config.rate_limit.refill_per_second as f64,
        window_ms: 60_000,
    };
    let limiter = novaos_rate_limit::TokenBucketLimiter::new(state.kvs.clone());
    let key = RateLimitKey::user(submission.user_id.clone());

    match limiter.check_and_consume(&key, &bucket_config).await {
        Ok(decision) if decision.allowed => Ok(()),
        Ok(decision) => Err(InternalFailure::RateLimited { retry_after_ms: decision.retry_after_ms.unwrap_or(1_000) }),
        Err(error) => {
            warn!(error = %error, "api rate limiter store error, failing open");
            Ok(())
        }
    }
}

/// A hook for future normalization (whitespace collapse, unicode
/// confusable folding, etc); the pipeline itself treats this as already
/// final, so any future expansion happens here and nowhere else.
fn normalize(user_message: &str) -> String {
    user_message.trim().to_string()
}

async fn envelope_for(state: &AppState, outcome: &PipelineOutcome, elapsed_ms: u64) -> ResponseEnvelope {
    match outcome {
        PipelineOutcome::Completed(pipeline_state) => {
            let response = pipeline_state.generation.clone().unwrap_or_default();
            seal_audit(state, pipeline_state, &response).await;
            ResponseEnvelope {
                status: ResponseStatus::Success,
                response: Some(response),
                stance: Some(pipeline_state.stance),
                redirect: None,
                ack_required: None,
                stopped_reason: None,
                metadata: metadata_for(pipeline_state, elapsed_ms),
            }
        }
        PipelineOutcome::Stopped(pipeline_state) => {
            seal_audit(state, pipeline_state, "").await;
            ResponseEnvelope {
                status: ResponseStatus::Stopped,
                response: None,
                stance: Some(pipeline_state.stance),
                redirect: None,
                ack_required: None,
                stopped_reason: pipeline_state.stopped_reason.clone(),
                metadata: metadata_for(pipeline_state, elapsed_ms),
            }
        }
        PipelineOutcome::AwaitingAck(pipeline_state) => {
            let ack_required = pipeline_state.risk_summary.as_ref().and_then(|risk| risk.pending_ack.as_ref()).map(|pending| AckRequired {
                token: pending.ack_token.clone(),
                required_text: pending.required_text.clone(),
                expires_at: pending.expires_at,
            });
            ResponseEnvelope {
                status: ResponseStatus::AwaitAck,
                response: None,
                stance: Some(pipeline_state.stance),
                redirect: if pipeline_state.stance == Stance::Control { Some(Stance::Control) } else { None },
                ack_required,
                stopped_reason: pipeline_state.stopped_reason.clone(),
                metadata: metadata_for(pipeline_state, elapsed_ms),
            }
        }
        PipelineOutcome::RegenerationExhausted(pipeline_state) => {
            let response = pipeline_state.generation.clone().unwrap_or_default();
            seal_audit(state, pipeline_state, &response).await;
            ResponseEnvelope {
                status: ResponseStatus::Degraded,
                response: Some(response),
                stance: Some(pipeline_state.stance),
                redirect: None,
                ack_required: None,
                stopped_reason: Some("a well-formed response could not be produced".to_string()),
                metadata: metadata_for(pipeline_state, elapsed_ms),
            }
        }
    }
}

fn metadata_for(pipeline_state: &PipelineState, elapsed_ms: u64) -> ResponseMetadata {
    ResponseMetadata {
        request_id: pipeline_state.request_id.clone(),
        total_time_ms: elapsed_ms,
        regenerations: if pipeline_state.regeneration_count > 0 { Some(pipeline_state.regeneration_count) } else { None },
    }
}

/// Best-effort: a snapshot-store failure must never surface as a pipeline
/// failure to the caller who already has a valid reply in hand, so this
/// only warns.
async fn seal_audit(state: &AppState, pipeline_state: &PipelineState, response_text: &str) {
    let gates_executed = match pipeline_state.stopped_at {
        Some(stopped_at) => GATE_ORDER.iter().take_while(|gate| **gate != stopped_at).chain(std::iter::once(&stopped_at)).copied().collect(),
        None => GATE_ORDER.to_vec(),
    };

    let input = AuditInput {
        state: pipeline_state,
        response_text,
        policy_versions: PolicyVersions::default(),
        gates_executed,
        model: pipeline_state.generation.as_ref().map(|_| "primary".to_string()),
        intervention_applied: pipeline_state.risk_summary.as_ref().and_then(|risk| risk.control_trigger.clone()),
        trust_violations: Vec::new(),
        linguistic_violations: Vec::new(),
        constraints: Vec::new(),
    };

    if let Err(error) = state.audit_assembler.assemble(input).await {
        warn!(error = %error, "audit assembly failed, response already issued to caller");
    }
}
