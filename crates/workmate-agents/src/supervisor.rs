use crate::agent::{Agent, AgentDescriptor};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};
use workmate_core::{AgentResponse, Task, DEFAULT_CLARIFICATION_QUESTION};

/// An executor that owns an ordered list of sub-agents and forwards each
/// task to the first active one that supports it.
pub struct Supervisor {
    descriptor: AgentDescriptor,
    sub_agents: Vec<Arc<dyn Agent>>,
}

impl Supervisor {
    pub fn new(descriptor: AgentDescriptor) -> Self {
        Self {
            descriptor,
            sub_agents: Vec::new(),
        }
    }

    /// Append a sub-agent. Registration order is delegation priority.
    pub fn add_sub_agent(&mut self, agent: Arc<dyn Agent>) {
        debug!(
            supervisor = %self.descriptor.id,
            agent = %agent.descriptor().id,
            "Registered sub-agent"
        );
        self.sub_agents.push(agent);
    }

    /// Builder form of [`Supervisor::add_sub_agent`].
    pub fn with_sub_agent(mut self, agent: Arc<dyn Agent>) -> Self {
        self.add_sub_agent(agent);
        self
    }

    pub fn sub_agents(&self) -> &[Arc<dyn Agent>] {
        &self.sub_agents
    }

    /// First active sub-agent, in registration order, that supports `task`.
    pub fn find_capable(&self, task: &Task) -> Option<&Arc<dyn Agent>> {
        self.sub_agents
            .iter()
            .find(|agent| agent.is_active() && agent.supports(task))
    }

    /// Claim `task` for the first capable sub-agent and run it there.
    ///
    /// Without a capable sub-agent the task is left untouched and a
    /// clarification request is returned.
    pub async fn delegate(&self, task: &mut Task) -> AgentResponse {
        let Some(agent) = self.find_capable(task) else {
            warn!(
                supervisor = %self.descriptor.id,
                task_id = %task.id,
                task_type = %task.task_type,
                "No sub-agent capable of handling task"
            );
            return AgentResponse::needs_clarification(
                format!("No agent found capable of handling task: {}", task.task_type),
                DEFAULT_CLARIFICATION_QUESTION,
            );
        };

        let agent_id = agent.descriptor().id.clone();
        if !task.claim(agent_id.as_str()) {
            warn!(
                task_id = %task.id,
                agent = %agent_id,
                assigned = ?task.assigned_agent,
                status = %task.status,
                "Task was already claimed or finished; forwarding anyway"
            );
        }

        info!(
            supervisor = %self.descriptor.id,
            task_id = %task.id,
            agent = %agent_id,
            "Delegating task"
        );
        agent.execute(task).await
    }
}

#[async_trait]
impl Agent for Supervisor {
    fn descriptor(&self) -> &AgentDescriptor {
        &self.descriptor
    }

    fn supports(&self, task: &Task) -> bool {
        self.find_capable(task).is_some()
    }

    fn capabilities(&self) -> BTreeSet<String> {
        self.sub_agents
            .iter()
            .filter(|a| a.is_active())
            .flat_map(|a| a.capabilities())
            .collect()
    }

    async fn execute(&self, task: &mut Task) -> AgentResponse {
        self.delegate(task).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::capability::CapabilitySet;
    use crate::simulated::SimulatedAgent;
    use workmate_core::TaskStatus;

    fn leaf(id: &str, types: &[&str]) -> Arc<SimulatedAgent> {
        Arc::new(SimulatedAgent::new(
            AgentDescriptor::new(id, id, "test leaf"),
            CapabilitySet::new(types.iter().copied()),
            "Test",
        ))
    }

    fn supervisor(leaves: &[Arc<SimulatedAgent>]) -> Supervisor {
        let mut sup = Supervisor::new(AgentDescriptor::new("sup", "Sup", "test supervisor"));
        for l in leaves {
            sup.add_sub_agent(l.clone());
        }
        sup
    }

    #[test]
    fn test_first_match_wins() {
        let a = leaf("a", &["send_email"]);
        let b = leaf("b", &["send_email", "check_email"]);
        let sup = supervisor(&[a, b]);

        let task = Task::new("mail", "send_email");
        assert_eq!(sup.find_capable(&task).unwrap().descriptor().id, "a");

        let task = Task::new("inbox", "check_email");
        assert_eq!(sup.find_capable(&task).unwrap().descriptor().id, "b");
    }

    #[test]
    fn test_inactive_agents_are_skipped() {
        let a = leaf("a", &["send_email"]);
        let b = leaf("b", &["send_email"]);
        a.set_active(false);
        let sup = supervisor(&[a, b]);

        let task = Task::new("mail", "send_email");
        assert_eq!(sup.find_capable(&task).unwrap().descriptor().id, "b");
    }

    #[tokio::test]
    async fn test_delegate_claims_task() {
        let sup = supervisor(&[leaf("jira_ticket_agent", &["create_ticket"])]);
        let mut task = Task::new("ticket", "create_ticket");

        let response = sup.delegate(&mut task).await;
        assert!(response.is_success());
        assert_eq!(task.assigned_agent.as_deref(), Some("jira_ticket_agent"));
    }

    #[tokio::test]
    async fn test_delegate_without_capable_agent() {
        let sup = supervisor(&[leaf("a", &["send_email"])]);
        let mut task = Task::new("?", "launch_rocket");

        let response = sup.delegate(&mut task).await;
        assert!(!response.is_success());
        assert!(response.requires_clarification());
        assert!(response.message().contains("launch_rocket"));
        assert_eq!(task.status, TaskStatus::Pending);
        assert!(task.assigned_agent.is_none());
    }

    #[test]
    fn test_capabilities_union() {
        let sup = supervisor(&[leaf("a", &["send_email"]), leaf("b", &["check_email"])]);
        let caps = sup.capabilities();
        assert!(caps.contains("send_email"));
        assert!(caps.contains("check_email"));
        assert_eq!(caps.len(), 2);
    }
}
