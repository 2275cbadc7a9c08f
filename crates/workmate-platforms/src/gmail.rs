use crate::config::GmailConfig;
use crate::hosted::HostedPlatform;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use workmate_agents::{Agent, AgentDescriptor, CapabilitySet, SimulatedAgent};
use workmate_core::{AgentResponse, Payload, Task};

/// Task types the Gmail platform accepts.
pub const GMAIL_TASK_TYPES: [&str; 4] =
    ["send_email", "check_email", "schedule_email", "email_followup"];

/// Build the Gmail platform: sender first, then the inbox manager.
pub fn gmail_platform(config: &GmailConfig) -> HostedPlatform {
    HostedPlatform::new(
        "gmail",
        AgentDescriptor::new(
            "gmail_platform",
            "Gmail Platform Agent",
            "Manages email sending, receiving, and organization",
        ),
        CapabilitySet::new(GMAIL_TASK_TYPES),
    )
    .with_sub_agent(Arc::new(EmailSenderAgent::new(config)))
    .with_sub_agent(Arc::new(SimulatedAgent::new(
        AgentDescriptor::new(
            "email_manager_agent",
            "Email Manager Agent",
            "Manages email organization and follow-ups",
        ),
        CapabilitySet::new(["check_email", "email_followup"]),
        "Email management",
    )))
}

/// Sends and schedules outgoing mail.
pub struct EmailSenderAgent {
    descriptor: AgentDescriptor,
    capabilities: CapabilitySet,
    default_recipient: String,
}

impl EmailSenderAgent {
    pub fn new(config: &GmailConfig) -> Self {
        Self {
            descriptor: AgentDescriptor::new(
                "email_sender_agent",
                "Email Sender Agent",
                "Sends emails and manages email delivery",
            ),
            capabilities: CapabilitySet::new(["send_email", "schedule_email"]),
            default_recipient: config.default_recipient.clone(),
        }
    }

    fn send_email(&self, task: &mut Task) -> AgentResponse {
        let recipient = task
            .param_str("recipient", &self.default_recipient)
            .to_string();
        let subject = task.param_str("subject", "No Subject").to_string();
        let template = task.param_str("template", "default").to_string();
        let email_id = format!("email_{}", Uuid::new_v4().simple());

        let mut result = Payload::new();
        result.insert("email_id".into(), email_id.clone().into());
        result.insert("recipient".into(), recipient.clone().into());
        result.insert("subject".into(), subject.into());
        result.insert("template".into(), template.into());
        result.insert("sent_at".into(), Utc::now().to_rfc3339().into());
        task.complete(result.clone());

        info!(task_id = %task.id, email_id = %email_id, "Email sent");
        AgentResponse::ok(format!("Email sent successfully to {recipient}")).with_data(result)
    }

    fn schedule_email(&self, task: &mut Task) -> AgentResponse {
        let mut result = Payload::new();
        result.insert("scheduled".into(), true.into());
        result.insert("simulated".into(), true.into());
        if let Some(send_at) = task.payload.get("send_at") {
            result.insert("send_at".into(), send_at.clone());
        }
        task.complete(result.clone());

        AgentResponse::ok("Email scheduled successfully (simulated)").with_data(result)
    }
}

#[async_trait]
impl Agent for EmailSenderAgent {
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
            "send_email" => self.send_email(task),
            "schedule_email" => self.schedule_email(task),
            other => AgentResponse::failed(format!("Unsupported task type: {other}")),
        }
    }
}
