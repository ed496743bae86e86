// [apps/gateway/src/gates/mod.rs]
//! One file per gate (spec S4.1 GATE_ORDER), each implementing
//! `novaos_gate_strategy::GateHandler`. `Bootstrap` is the only caller that
//! constructs these and folds them into a `GatePipeline`.

mod capability;
mod constitutional;
mod intent;
mod lens;
mod memory;
mod model;
mod shield;
mod stance;

pub use capability::CapabilityGate;
pub use constitutional::ConstitutionalGate;
pub use intent::IntentGate;
pub use lens::LensGate;
pub use memory::MemoryGate;
pub use model::ModelGate;
pub use shield::ShieldGate;
pub use stance::StanceGate;
