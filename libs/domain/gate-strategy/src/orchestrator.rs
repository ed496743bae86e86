// [libs/domain/gate-strategy/src/orchestrator.rs]
//! Central dispatcher over the fixed gate sequence (spec S4.1). Mirrors the
//! teacher's `StrategyExecutor::execute_mission_sequence` shape: a single
//! entry point, polymorphic dispatch over a small fixed set of named
//! stages, one immutable record sealed at the end — except here the
//! sequence is eight gates long and fixed, not a one-of-N strategy choice.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use novaos_models::{GateAction, GateId, GateResult, PipelineState, RequestContext, Stance, GATE_ORDER};
use novaos_secrets_vault::GateTimeouts;
use tracing::{info, instrument, warn};

use crate::handler::GateHandler;
use crate::outcome::PipelineOutcome;

pub struct GatePipeline {
    handlers: HashMap<GateId, Arc<dyn GateHandler>>,
    timeouts: GateTimeouts,
    max_regeneration_attempts: u8,
}

impl GatePipeline {
    pub fn new(handlers: HashMap<GateId, Arc<dyn GateHandler>>, timeouts: GateTimeouts, max_regeneration_attempts: u8) -> Self {
        Self { handlers, timeouts, max_regeneration_attempts: max_regeneration_attempts.min(2) }
    }

    #[instrument(skip_all, fields(request_id = %ctx.request_id, user_id = %ctx.user_id))]
    pub async fn run(&self, ctx: &RequestContext, initial_state: PipelineState) -> PipelineOutcome {
        let sequence_started = Instant::now();
        let mut state = initial_state;
        let mut regeneration_hint: Option<String> = None;
        let mut gate_index: usize = 0;

        while gate_index < GATE_ORDER.len() {
            let gate_id = GATE_ORDER[gate_index];

            if ctx.cancellation.is_cancelled() {
                warn!(gate = gate_id.as_str(), "request cancelled mid-pipeline");
                return PipelineOutcome::Stopped(state.stopped(gate_id, "request cancelled"));
            }
            if sequence_started.elapsed() > self.timeouts.total_ceiling() {
                warn!(gate = gate_id.as_str(), "total pipeline timeout exceeded");
                return PipelineOutcome::Stopped(state.stopped(gate_id, "total pipeline timeout exceeded"));
            }

            let Some(handler) = self.handlers.get(&gate_id).cloned() else {
                gate_index += 1;
                continue;
            };

            let hint = regeneration_hint.take();
            let gate_timeout = self.timeout_for(gate_id);
            let gate_started = Instant::now();
            let result = match tokio::time::timeout(gate_timeout, handler.run(ctx, &state, hint.as_deref())).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(gate = gate_id.as_str(), budget_ms = gate_timeout.as_millis() as u64, "gate exceeded its timeout budget");
                    Self::timeout_result(gate_id, &state)
                }
            };

            info!(
                gate = gate_id.as_str(),
                status = ?result.status,
                action = ?result.action,
                elapsed_ms = gate_started.elapsed().as_millis() as u64,
                "gate evaluated"
            );

            match result.action {
                GateAction::Stop => {
                    let reason = result.failure_reason.unwrap_or_else(|| "gate returned stop".to_string());
                    return PipelineOutcome::Stopped(result.output.stopped(gate_id, reason));
                }
                GateAction::AwaitAck => {
                    return PipelineOutcome::AwaitingAck(result.output);
                }
                GateAction::Redirect => {
                    let target = result.redirect_target.unwrap_or(state.stance);
                    state = result.output.with_stance(target);
                    gate_index += 1;
                }
                GateAction::Regenerate => {
                    state = result.output;
                    if state.regeneration_count >= self.max_regeneration_attempts {
                        warn!(gate = gate_id.as_str(), attempts = state.regeneration_count, "regeneration cap reached");
                        return PipelineOutcome::RegenerationExhausted(state);
                    }
                    regeneration_hint = result.failure_reason;
                    state = state.regenerated();
                    gate_index = Self::index_of(GateId::Model);
                }
                GateAction::Continue => {
                    state = result.output;
                    gate_index += 1;
                }
            }
        }

        PipelineOutcome::Completed(state)
    }

    fn index_of(gate_id: GateId) -> usize {
        GATE_ORDER.iter().position(|candidate| *candidate == gate_id).expect("gate_id is always a member of GATE_ORDER")
    }

    fn timeout_for(&self, gate_id: GateId) -> Duration {
        let ms = match gate_id {
            GateId::Intent => self.timeouts.intent_ms,
            GateId::Shield => self.timeouts.shield_ms,
            GateId::Lens => self.timeouts.lens_ms,
            GateId::Stance => self.timeouts.stance_ms,
            GateId::Capability => self.timeouts.capability_ms,
            GateId::Model => self.timeouts.model_ms,
            GateId::Constitutional => self.timeouts.constitutional_ms,
            GateId::Memory => self.timeouts.memory_ms,
        };
        Duration::from_millis(ms)
    }

    /// Timeout fallback per spec S4.1: soft_fail+continue everywhere except
    /// Model (fatal stop) and Shield (fail open — classifier outage must
    /// not silently deny service).
    fn timeout_result(gate_id: GateId, state: &PipelineState) -> GateResult<PipelineState> {
        match gate_id {
            GateId::Model => GateResult::stop(gate_id, state.clone(), "model gate timed out", 0),
            GateId::Shield => GateResult::pass(gate_id, state.clone(), 0),
            _ => GateResult::soft_fail(gate_id, state.clone(), "gate timed out", 0),
        }
    }
}
