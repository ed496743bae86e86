// [libs/domain/gate-strategy/src/outcome.rs]
//! What a full pipeline run resolves to. Exactly one variant is produced
//! per request; the gateway app maps each to a `ResponseEnvelope`.

use novaos_models::PipelineState;

#[derive(Debug, Clone)]
pub enum PipelineOutcome {
    /// Ran every gate to Memory without a terminal verdict.
    Completed(PipelineState),
    /// A gate returned `stop` (hard veto, fatal timeout, or unhandled error).
    Stopped(PipelineState),
    /// Shield issued a soft veto; caller must resubmit with an ack token.
    AwaitingAck(PipelineState),
    /// Constitutional kept finding violations past the regeneration cap.
    RegenerationExhausted(PipelineState),
}

impl PipelineOutcome {
    pub fn state(&self) -> &PipelineState {
        match self {
            PipelineOutcome::Completed(state)
            | PipelineOutcome::Stopped(state)
            | PipelineOutcome::AwaitingAck(state)
            | PipelineOutcome::RegenerationExhausted(state) => state,
        }
    }
}
