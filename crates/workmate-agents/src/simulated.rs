use crate::agent::{Agent, AgentDescriptor};
use crate::capability::CapabilitySet;
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use workmate_core::{AgentResponse, Payload, Task};

/// Leaf executor that acknowledges every supported task without touching
/// any external system.
///
/// Used for the task types whose platform integration is not wired up yet;
/// the result payload carries `simulated: true` so callers can tell.
pub struct SimulatedAgent {
    descriptor: AgentDescriptor,
    capabilities: CapabilitySet,
    label: String,
    active: AtomicBool,
}

impl SimulatedAgent {
    /// `label` prefixes the outcome message, e.g. `"Email management"`.
    pub fn new(
        descriptor: AgentDescriptor,
        capabilities: CapabilitySet,
        label: impl Into<String>,
    ) -> Self {
        Self {
            descriptor,
            capabilities,
            label: label.into(),
            active: AtomicBool::new(true),
        }
    }

    pub fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::Relaxed);
    }
}

#[async_trait]
impl Agent for SimulatedAgent {
    fn descriptor(&self) -> &AgentDescriptor {
        &self.descriptor
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::Relaxed)
    }

    fn supports(&self, task: &Task) -> bool {
        self.capabilities.supports(task)
    }

    fn capabilities(&self) -> BTreeSet<String> {
        self.capabilities.to_set()
    }

    async fn execute(&self, task: &mut Task) -> AgentResponse {
        if !self.supports(task) {
            return AgentResponse::failed(format!("Unsupported task type: {}", task.task_type));
        }
        let mut data = Payload::new();
        data.insert("task_type".into(), task.task_type.clone().into());
        data.insert("simulated".into(), true.into());
        task.complete(data.clone());

        AgentResponse::ok(format!(
            "{} task '{}' completed (simulated)",
            self.label, task.task_type
        ))
        .with_data(data)
    }
}
