use crate::config::JiraConfig;
use crate::hosted::HostedPlatform;
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;
use workmate_agents::{Agent, AgentDescriptor, CapabilitySet, SimulatedAgent};
use workmate_core::{AgentResponse, Payload, Task};

/// Task types the Jira platform accepts.
pub const JIRA_TASK_TYPES: [&str; 5] = [
    "create_ticket",
    "update_ticket",
    "assign_ticket",
    "track_progress",
    "project_management",
];

pub fn jira_platform(config: &JiraConfig) -> HostedPlatform {
    HostedPlatform::new(
        "jira",
        AgentDescriptor::new(
            "jira_platform",
            "Jira Platform Agent",
            "Manages Jira tickets, projects, and workflows",
        ),
        CapabilitySet::new(JIRA_TASK_TYPES),
    )
    .with_sub_agent(Arc::new(JiraTicketAgent::new(config)))
    .with_sub_agent(Arc::new(SimulatedAgent::new(
        AgentDescriptor::new(
            "jira_project_agent",
            "Jira Project Agent",
            "Manages Jira projects and workflows",
        ),
        CapabilitySet::new(["track_progress", "project_management"]),
        "Project management",
    )))
}

/// Creates and updates tickets. Ticket keys are numbered per process.
pub struct JiraTicketAgent {
    descriptor: AgentDescriptor,
    capabilities: CapabilitySet,
    base_url: String,
    project_key: String,
    next_number: AtomicU64,
}

impl JiraTicketAgent {
    pub fn new(config: &JiraConfig) -> Self {
        Self {
            descriptor: AgentDescriptor::new(
                "jira_ticket_agent",
                "Jira Ticket Agent",
                "Creates and manages Jira tickets",
            ),
            capabilities: CapabilitySet::new(["create_ticket", "update_ticket", "assign_ticket"]),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            project_key: config.project_key.clone(),
            next_number: AtomicU64::new(1),
        }
    }

    fn create_ticket(&self, task: &mut Task) -> AgentResponse {
        let project = task.param_str("project", &self.project_key).to_string();
        let number = self.next_number.fetch_add(1, Ordering::Relaxed);
        let ticket_id = format!("{project}-{number}");

        let mut result = Payload::new();
        result.insert("ticket_id".into(), ticket_id.clone().into());
        result.insert("title".into(), task.param_str("title", "New Ticket").into());
        result.insert(
            "description".into(),
            task.param_str("description", "No description").into(),
        );
        result.insert("priority".into(), task.param_str("priority", "medium").into());
        result.insert(
            "url".into(),
            format!("{}/browse/{ticket_id}", self.base_url).into(),
        );
        task.complete(result.clone());

        info!(task_id = %task.id, ticket = %ticket_id, "Jira ticket created");
        AgentResponse::ok(format!("Successfully created Jira ticket {ticket_id}")).with_data(result)
    }
}

#[async_trait]
impl Agent for JiraTicketAgent {
    fn descriptor(&self) -> &AgentDescriptor {
        &self.descriptor
    }

    fn supports(&self, task: &Task) -> bool {
        self.capabilities.supports(task)
    }

    fn capabilities(&self) -> BTreeSet<String> {
        self.capabilities.to_set()
    }

    async fn execute(&self, task: &mut Task) -> AgentResponse {
        match task.task_type.as_str() {
            "create_ticket" => self.create_ticket(task),
            "update_ticket" | "assign_ticket" => {
                let mut result = Payload::new();
                result.insert("task_type".into(), task.task_type.clone().into());
                result.insert("simulated".into(), true.into());
                if let Some(ticket) = task.payload.get("ticket_id") {
                    result.insert("ticket_id".into(), ticket.clone());
                }
                task.complete(result.clone());
                AgentResponse::ok(format!(
                    "Jira ticket task '{}' completed (simulated)",
                    task.task_type
                ))
                .with_data(result)
            }
            other => AgentResponse::failed(format!("Unsupported task type: {other}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_ticket_keys_increment() {
        let agent = JiraTicketAgent::new(&JiraConfig::default());
        let mut first = Task::new("bug", "create_ticket").with_param("title", json!("Login broken"));
        let mut second = Task::new("bug", "create_ticket").with_param("project", json!("OPS"));

        let r1 = agent.execute(&mut first).await;
        let r2 = agent.execute(&mut second).await;

        assert_eq!(r1.message(), "Successfully created Jira ticket PROJ-1");
        assert_eq!(r1.data().unwrap()["title"], json!("Login broken"));
        assert_eq!(
            r1.data().unwrap()["url"],
            json!("https://company.atlassian.net/browse/PROJ-1")
        );
        assert_eq!(r2.data().unwrap()["ticket_id"], json!("OPS-2"));
    }

    #[tokio::test]
    async fn test_assign_ticket_is_simulated() {
        let agent = JiraTicketAgent::new(&JiraConfig::default());
        let mut task = Task::new("assign", "assign_ticket").with_param("ticket_id", json!("PROJ-9"));
        let response = agent.execute(&mut task).await;
        assert!(response.is_success());
        assert_eq!(response.data().unwrap()["ticket_id"], json!("PROJ-9"));
    }

    #[tokio::test]
    async fn test_platform_delegates_progress_to_project_agent() {
        let platform = jira_platform(&JiraConfig::default());
        let mut task = Task::new("status", "track_progress");
        let response = platform.execute(&mut task).await;
        assert!(response.is_success());
        assert_eq!(task.assigned_agent.as_deref(), Some("jira_project_agent"));
    }
}
