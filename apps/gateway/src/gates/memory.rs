// [apps/gateway/src/gates/memory.rs]
//! Memory gate (spec S4.1 step 8). Long-term memory writeback is out of
//! scope for the core pipeline; this gate exists only so `GATE_ORDER`
//! stays complete and any future memory store plugs in at a single seam.

use async_trait::async_trait;
use novaos_gate_strategy::GateHandler;
use novaos_models::{GateId, GateResult, PipelineState, RequestContext};

#[derive(Default)]
pub struct MemoryGate;

impl MemoryGate {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl GateHandler for MemoryGate {
    fn gate_id(&self) -> GateId {
        GateId::Memory
    }

    async fn run(&self, _ctx: &RequestContext, state: &PipelineState, _regeneration_hint: Option<&str>) -> GateResult<PipelineState> {
        GateResult::pass(GateId::Memory, state.clone(), 0)
    }
}
