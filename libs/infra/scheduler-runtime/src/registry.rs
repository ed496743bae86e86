// [libs/infra/scheduler-runtime/src/registry.rs]
//! The enumerated job table (spec S4.10 "Registry"). `scheduler-worker`
//! builds one of these at startup with all six handlers wired in; nothing
//! here depends on what the handlers do.

use std::sync::Arc;

use novaos_models::JobSpec;

use crate::handler::JobHandler;

pub struct JobRegistration {
    pub spec: JobSpec,
    pub handler: Arc<dyn JobHandler>,
}

#[derive(Default)]
pub struct JobRegistry {
    jobs: Vec<JobRegistration>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, spec: JobSpec, handler: Arc<dyn JobHandler>) -> Self {
        self.jobs.push(JobRegistration { spec, handler });
        self
    }

    pub fn jobs(&self) -> &[JobRegistration] {
        &self.jobs
    }
}
