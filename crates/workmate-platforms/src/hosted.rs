use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;
use workmate_agents::{Agent, AgentDescriptor, CapabilitySet, PlatformAgent, Supervisor};
use workmate_core::{AgentResponse, Task, WorkmateResult};

/// A platform whose integration is simulated in-process.
///
/// Its task-type list is declared separately from the union of its
/// sub-agents: a sub-agent may know more task types than the platform
/// accepts from the dispatcher.
pub struct HostedPlatform {
    platform_name: String,
    capabilities: CapabilitySet,
    supervisor: Supervisor,
}

impl HostedPlatform {
    pub fn new(
        platform_name: impl Into<String>,
        descriptor: AgentDescriptor,
        capabilities: CapabilitySet,
    ) -> Self {
        Self {
            platform_name: platform_name.into(),
            capabilities,
            supervisor: Supervisor::new(descriptor),
        }
    }

    pub fn with_sub_agent(mut self, agent: Arc<dyn Agent>) -> Self {
        self.supervisor.add_sub_agent(agent);
        self
    }
}

#[async_trait]
impl Agent for HostedPlatform {
    fn descriptor(&self) -> &AgentDescriptor {
        self.supervisor.descriptor()
    }

    fn supports(&self, task: &Task) -> bool {
        self.capabilities.supports(task)
    }

    fn capabilities(&self) -> BTreeSet<String> {
        self.capabilities.to_set()
    }

    async fn execute(&self, task: &mut Task) -> AgentResponse {
        self.supervisor.delegate(task).await
    }
}

#[async_trait]
impl PlatformAgent for HostedPlatform {
    fn platform_name(&self) -> &str {
        &self.platform_name
    }

    fn sub_agents(&self) -> &[Arc<dyn Agent>] {
        self.supervisor.sub_agents()
    }

    async fn authenticate(&self) -> WorkmateResult<bool> {
        debug!(platform = %self.platform_name, "Simulated authentication");
        Ok(true)
    }

    async fn test_connection(&self) -> WorkmateResult<bool> {
        Ok(true)
    }
}
