use crate::task::{Payload, Task};
use crate::WorkmateError;
use serde::{Deserialize, Serialize};

/// Question used when a clarification is requested without a specific prompt.
pub const DEFAULT_CLARIFICATION_QUESTION: &str =
    "Could you provide more details or rephrase your request?";

/// Message used when a hard failure is reported without a diagnostic.
pub const DEFAULT_FAILURE_MESSAGE: &str = "Task failed without a diagnostic message";

/// Result of any execution attempt.
///
/// Three shapes exist: success, hard failure, and soft failure that asks the
/// user for clarification. A response can never claim success while asking
/// for clarification; the constructors and the deserializer both enforce it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ResponseRecord")]
pub struct AgentResponse {
    success: bool,
    message: String,
    data: Option<Payload>,
    tasks_created: Vec<Task>,
    requires_clarification: bool,
    clarification_question: Option<String>,
}

impl AgentResponse {
    /// A successful outcome.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
            tasks_created: Vec::new(),
            requires_clarification: false,
            clarification_question: None,
        }
    }

    /// A hard failure.
    ///
    /// An empty message is replaced by [`DEFAULT_FAILURE_MESSAGE`].
    pub fn failed(message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            DEFAULT_FAILURE_MESSAGE.to_string()
        } else {
            message
        };
        Self {
            success: false,
            ..Self::ok(message)
        }
    }

    /// A soft failure asking the user for more input.
    ///
    /// An empty question is replaced by [`DEFAULT_CLARIFICATION_QUESTION`].
    pub fn needs_clarification(message: impl Into<String>, question: impl Into<String>) -> Self {
        let question = question.into();
        let question = if question.trim().is_empty() {
            DEFAULT_CLARIFICATION_QUESTION.to_string()
        } else {
            question
        };
        Self {
            success: false,
            requires_clarification: true,
            clarification_question: Some(question),
            ..Self::ok(message)
        }
    }

    /// Attach a result payload.
    pub fn with_data(mut self, data: Payload) -> Self {
        self.data = Some(data);
        self
    }

    /// Attach tasks created while handling the request, in creation order.
    pub fn with_tasks(mut self, tasks: Vec<Task>) -> Self {
        self.tasks_created = tasks;
        self
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn data(&self) -> Option<&Payload> {
        self.data.as_ref()
    }

    /// True when `data` is present and holds at least one entry.
    pub fn has_data(&self) -> bool {
        self.data.as_ref().is_some_and(|d| !d.is_empty())
    }

    pub fn tasks_created(&self) -> &[Task] {
        &self.tasks_created
    }

    pub fn requires_clarification(&self) -> bool {
        self.requires_clarification
    }

    pub fn clarification_question(&self) -> Option<&str> {
        self.clarification_question.as_deref()
    }

    /// A failure that should halt a serial batch.
    pub fn is_hard_failure(&self) -> bool {
        !self.success && !self.requires_clarification
    }
}

/// Wire shape of [`AgentResponse`], validated on the way in.
#[derive(Deserialize)]
struct ResponseRecord {
    success: bool,
    message: String,
    #[serde(default)]
    data: Option<Payload>,
    #[serde(default)]
    tasks_created: Option<Vec<Task>>,
    #[serde(default)]
    requires_clarification: bool,
    #[serde(default)]
    clarification_question: Option<String>,
}

impl TryFrom<ResponseRecord> for AgentResponse {
    type Error = WorkmateError;

    fn try_from(record: ResponseRecord) -> Result<Self, Self::Error> {
        if record.success && record.requires_clarification {
            return Err(WorkmateError::Agent(
                "a response cannot both succeed and require clarification".to_string(),
            ));
        }
        let mut response = if record.requires_clarification {
            AgentResponse::needs_clarification(
                record.message,
                record.clarification_question.unwrap_or_default(),
            )
        } else if record.success {
            AgentResponse::ok(record.message)
        } else {
            AgentResponse::failed(record.message)
        };
        response.data = record.data;
        response.tasks_created = record.tasks_created.unwrap_or_default();
        Ok(response)
    }
}
