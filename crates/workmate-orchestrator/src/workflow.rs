use serde::{Deserialize, Serialize};
use uuid::Uuid;
use workmate_core::{AgentResponse, Payload, Task, WorkmateError};

/// How a batch of tasks is sequenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// One at a time, in order; a hard failure stops the batch.
    #[default]
    Serial,
    /// Every task runs regardless of the others' outcomes.
    Parallel,
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionMode::Serial => write!(f, "serial"),
            ExecutionMode::Parallel => write!(f, "parallel"),
        }
    }
}

impl std::str::FromStr for ExecutionMode {
    type Err = WorkmateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "serial" => Ok(ExecutionMode::Serial),
            "parallel" => Ok(ExecutionMode::Parallel),
            other => Err(WorkmateError::Config(format!(
                "Unknown execution mode '{other}'. Use 'serial' or 'parallel'"
            ))),
        }
    }
}

/// A task to be created, as supplied by a caller or a workflow file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtaskSpec {
    pub description: String,
    pub task_type: String,
    #[serde(default)]
    pub payload: Payload,
}

impl SubtaskSpec {
    pub fn new(description: impl Into<String>, task_type: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            task_type: task_type.into(),
            payload: Payload::new(),
        }
    }

    pub fn into_task(self) -> Task {
        Task::new(self.description, self.task_type).with_payload(self.payload)
    }
}

/// Outcome of one task inside a workflow run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowStepResult {
    pub task_id: Uuid,
    pub success: bool,
    pub message: String,
    pub data: Option<Payload>,
}

/// Summary of a workflow run.
///
/// `results` only covers tasks that actually ran; a serial run that stopped
/// early has fewer results than `total_tasks`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowReport {
    pub workflow_id: Uuid,
    pub execution_mode: ExecutionMode,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub failed_tasks: usize,
    pub results: Vec<WorkflowStepResult>,
}

impl WorkflowReport {
    pub fn new(mode: ExecutionMode, tasks: &[Task], responses: &[AgentResponse]) -> Self {
        let results: Vec<WorkflowStepResult> = tasks
            .iter()
            .zip(responses)
            .map(|(task, response)| WorkflowStepResult {
                task_id: task.id,
                success: response.is_success(),
                message: response.message().to_string(),
                data: response.data().cloned(),
            })
            .collect();
        let completed = results.iter().filter(|r| r.success).count();

        Self {
            workflow_id: Uuid::new_v4(),
            execution_mode: mode,
            total_tasks: tasks.len(),
            completed_tasks: completed,
            failed_tasks: results.len() - completed,
            results,
        }
    }

    /// Tasks that never ran because the batch stopped.
    pub fn skipped_tasks(&self) -> usize {
        self.total_tasks - self.results.len()
    }
}
