use crate::config::CalendarConfig;
use crate::hosted::HostedPlatform;
use async_trait::async_trait;
use chrono::{Duration, DurationRound, Utc};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use workmate_agents::{Agent, AgentDescriptor, CapabilitySet};
use workmate_core::{AgentResponse, Payload, Task};

/// Task types the Calendar platform accepts.
pub const CALENDAR_TASK_TYPES: [&str; 4] = [
    "schedule_meeting",
    "check_availability",
    "send_invite",
    "reschedule_meeting",
];

pub fn calendar_platform(config: &CalendarConfig) -> HostedPlatform {
    HostedPlatform::new(
        "calendar",
        AgentDescriptor::new(
            "calendar_platform",
            "Calendar Platform Agent",
            "Manages calendar events and scheduling",
        ),
        CapabilitySet::new(CALENDAR_TASK_TYPES),
    )
    .with_sub_agent(Arc::new(CalendarSchedulerAgent::new(config)))
}

/// Books meetings. No slot search: a meeting goes where the payload puts it,
/// or at the top of the next hour.
pub struct CalendarSchedulerAgent {
    descriptor: AgentDescriptor,
    capabilities: CapabilitySet,
    meeting_base_url: String,
    default_duration: i64,
}

impl CalendarSchedulerAgent {
    pub fn new(config: &CalendarConfig) -> Self {
        Self {
            descriptor: AgentDescriptor::new(
                "calendar_scheduler_agent",
                "Calendar Scheduler Agent",
                "Schedules meetings and manages calendar events",
            ),
            capabilities: CapabilitySet::new(CALENDAR_TASK_TYPES),
            meeting_base_url: config.meeting_base_url.trim_end_matches('/').to_string(),
            default_duration: config.default_duration_minutes,
        }
    }

    fn schedule_meeting(&self, task: &mut Task) -> AgentResponse {
        let title = task.param_str("title", "Meeting").to_string();
        let duration = task
            .payload
            .get("duration")
            .and_then(serde_json::Value::as_i64)
            .unwrap_or(self.default_duration);
        let meeting_type = task.param_str("type", "general").to_string();
        let scheduled_time = match task.payload.get("start_time").and_then(|v| v.as_str()) {
            Some(start) => start.to_string(),
            None => next_hour(),
        };
        let meeting_id = format!("meeting_{}", &Uuid::new_v4().simple().to_string()[..12]);

        let mut result = Payload::new();
        result.insert("meeting_id".into(), meeting_id.clone().into());
        result.insert("title".into(), title.clone().into());
        result.insert("duration".into(), duration.into());
        result.insert("type".into(), meeting_type.into());
        result.insert("scheduled_time".into(), scheduled_time.into());
        result.insert(
            "meeting_url".into(),
            format!("{}/{meeting_id}", self.meeting_base_url).into(),
        );
        task.complete(result.clone());

        info!(task_id = %task.id, meeting = %meeting_id, "Meeting scheduled");
        AgentResponse::ok(format!(
            "Successfully scheduled {title} for {duration} minutes"
        ))
        .with_data(result)
    }
}

fn next_hour() -> String {
    let now = Utc::now();
    let hour = Duration::hours(1);
    now.duration_trunc(hour)
        .map(|t| t + hour)
        .unwrap_or(now)
        .to_rfc3339()
}

#[async_trait]
impl Agent for CalendarSchedulerAgent {
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
        if task.task_type == "schedule_meeting" {
            return self.schedule_meeting(task);
        }
        if !self.supports(task) {
            return AgentResponse::failed(format!("Unsupported task type: {}", task.task_type));
        }
        let mut result = Payload::new();
        result.insert("task_type".into(), task.task_type.clone().into());
        result.insert("simulated".into(), true.into());
        task.complete(result.clone());
        AgentResponse::ok(format!(
            "Calendar task '{}' completed (simulated)",
            task.task_type
        ))
        .with_data(result)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_schedule_meeting_from_payload() {
        let agent = CalendarSchedulerAgent::new(&CalendarConfig::default());
        let mut task = Task::new("standup", "schedule_meeting")
            .with_param("title", json!("Standup"))
            .with_param("duration", json!(15))
            .with_param("start_time", json!("2024-01-01T14:00:00Z"));

        let response = agent.execute(&mut task).await;
        assert_eq!(response.message(), "Successfully scheduled Standup for 15 minutes");
        let data = response.data().unwrap();
        assert_eq!(data["scheduled_time"], json!("2024-01-01T14:00:00Z"));
        assert_eq!(data["type"], json!("general"));
        let id = data["meeting_id"].as_str().unwrap();
        assert_eq!(
            data["meeting_url"],
            json!(format!("https://meet.company.com/{id}"))
        );
    }

    #[tokio::test]
    async fn test_default_duration() {
        let agent = CalendarSchedulerAgent::new(&CalendarConfig::default());
        let mut task = Task::new("sync", "schedule_meeting");
        let response = agent.execute(&mut task).await;
        assert_eq!(response.data().unwrap()["duration"], json!(30));
        assert_eq!(response.message(), "Successfully scheduled Meeting for 30 minutes");
    }

    #[tokio::test]
    async fn test_other_calendar_tasks() {
        let agent = CalendarSchedulerAgent::new(&CalendarConfig::default());
        let mut task = Task::new("free?", "check_availability");
        let response = agent.execute(&mut task).await;
        assert!(response.is_success());
        assert_eq!(
            response.message(),
            "Calendar task 'check_availability' completed (simulated)"
        );
    }
}
