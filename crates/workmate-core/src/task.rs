use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Open string-keyed parameter bag carried by a task.
///
/// Expected keys per task type (all optional, executors fall back to defaults):
///
/// | task type | keys |
/// |---|---|
/// | `github_create_issue` | `repository`, `title`, `description` |
/// | `send_email` | `recipient`, `subject`, `template` |
/// | `email_followup` | `email_id`, `tracking_type` |
/// | `create_ticket` | `title`, `description`, `priority` |
/// | `schedule_meeting` | `title`, `duration`, `type` |
pub type Payload = HashMap<String, serde_json::Value>;

/// Lifecycle state of a [`Task`].
///
/// Transitions only move forward:
/// `Pending -> InProgress -> {Completed, Failed, RequiresClarification}`.
/// A pending task may also fail, complete, or ask for clarification directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
    RequiresClarification,
}

impl TaskStatus {
    /// Completed and Failed are final.
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }

    /// Whether moving from `self` to `next` is a forward transition.
    pub fn can_transition_to(self, next: TaskStatus) -> bool {
        match self {
            TaskStatus::Pending => next != TaskStatus::Pending,
            TaskStatus::InProgress => matches!(
                next,
                TaskStatus::Completed | TaskStatus::Failed | TaskStatus::RequiresClarification
            ),
            TaskStatus::Completed | TaskStatus::Failed | TaskStatus::RequiresClarification => {
                false
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
            TaskStatus::RequiresClarification => "requires_clarification",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Priority of a task. Informational only; nothing orders work by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl TaskPriority {
    /// Parse a priority label, falling back to [`TaskPriority::Medium`] for
    /// anything unrecognised.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "low" => TaskPriority::Low,
            "high" => TaskPriority::High,
            "urgent" => TaskPriority::Urgent,
            _ => TaskPriority::Medium,
        }
    }
}

impl std::fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskPriority::Low => write!(f, "low"),
            TaskPriority::Medium => write!(f, "medium"),
            TaskPriority::High => write!(f, "high"),
            TaskPriority::Urgent => write!(f, "urgent"),
        }
    }
}

/// A unit of work routed through the dispatcher by its `task_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default)]
    pub description: String,
    pub task_type: String,
    #[serde(default)]
    pub payload: Payload,
    #[serde(default = "default_status")]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: TaskPriority,
    /// Identifier of the executor that claimed the task. Written once.
    #[serde(default)]
    pub assigned_agent: Option<String>,
    #[serde(default)]
    pub result: Option<Payload>,
    #[serde(default)]
    pub error_message: Option<String>,
    /// Non-owning back-reference to the task this one was derived from.
    #[serde(default)]
    pub parent_task_id: Option<Uuid>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

fn default_status() -> TaskStatus {
    TaskStatus::Pending
}

impl Task {
    /// Create a pending, medium-priority task with a fresh id.
    pub fn new(description: impl Into<String>, task_type: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            description: description.into(),
            task_type: task_type.into(),
            payload: Payload::new(),
            status: TaskStatus::Pending,
            priority: TaskPriority::Medium,
            assigned_agent: None,
            result: None,
            error_message: None,
            parent_task_id: None,
            created_by: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }

    /// Insert a single payload entry.
    pub fn with_param(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.payload.insert(key.into(), value);
        self
    }

    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_parent(mut self, parent_id: Uuid) -> Self {
        self.parent_task_id = Some(parent_id);
        self
    }

    pub fn created_by(mut self, agent_id: impl Into<String>) -> Self {
        self.created_by = Some(agent_id.into());
        self
    }

    /// Look up a payload string, falling back to `default`.
    pub fn param_str<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.payload
            .get(key)
            .and_then(|v| v.as_str())
            .unwrap_or(default)
    }

    /// Record `agent_id` as the executor and move to `InProgress`.
    ///
    /// Returns `false` (and leaves the task untouched) if the task was
    /// already claimed or has left the pending/in-progress states.
    pub fn claim(&mut self, agent_id: impl Into<String>) -> bool {
        if self.assigned_agent.is_some() {
            return false;
        }
        if !self.mark_in_progress() {
            return false;
        }
        self.assigned_agent = Some(agent_id.into());
        true
    }

    /// Move to `InProgress`. Idempotent while in progress.
    pub fn mark_in_progress(&mut self) -> bool {
        if self.status == TaskStatus::InProgress {
            return true;
        }
        self.transition(TaskStatus::InProgress)
    }

    /// Move to `Completed` and store the result.
    pub fn complete(&mut self, result: Payload) -> bool {
        if !self.transition(TaskStatus::Completed) {
            return false;
        }
        self.result = Some(result);
        true
    }

    /// Move to `Failed` and store the error message.
    pub fn fail(&mut self, message: impl Into<String>) -> bool {
        if !self.transition(TaskStatus::Failed) {
            return false;
        }
        self.error_message = Some(message.into());
        true
    }

    /// Move to `RequiresClarification`.
    pub fn request_clarification(&mut self) -> bool {
        self.transition(TaskStatus::RequiresClarification)
    }

    fn transition(&mut self, next: TaskStatus) -> bool {
        if self.status.can_transition_to(next) {
            self.status = next;
            true
        } else {
            false
        }
    }
}
