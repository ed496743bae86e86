// [libs/domain/gate-strategy/src/handler.rs]
//! The one contract every gate implements. `gate-strategy` only ever talks
//! to this trait — it has no notion of what Shield or Model actually do.

use async_trait::async_trait;
use novaos_models::{GateId, GateResult, PipelineState, RequestContext};

#[async_trait]
pub trait GateHandler: Send + Sync {
    fn gate_id(&self) -> GateId;

    /// `regeneration_hint` is `Some(fix_guidance)` only on a Model
    /// invocation that follows a Constitutional `regenerate` verdict;
    /// every other gate always receives `None`.
    async fn run(&self, ctx: &RequestContext, state: &PipelineState, regeneration_hint: Option<&str>) -> GateResult<PipelineState>;
}
