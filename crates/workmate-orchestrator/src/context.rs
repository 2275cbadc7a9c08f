use crate::dispatcher::Dispatcher;
use crate::evaluator::{Evaluation, Evaluator};
use crate::workflow::{ExecutionMode, WorkflowReport};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::info;
use workmate_agents::{Agent, PlatformAgent};
use workmate_core::{AgentResponse, Task};

/// Overall health derived from the platform probes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemHealth {
    Healthy,
    Degraded,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemStatus {
    pub platform_status: BTreeMap<String, bool>,
    pub total_tasks_processed: usize,
    pub system_health: SystemHealth,
}

/// Everything that happened to one task in [`AssistantContext::process_task`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedTask {
    pub task: Task,
    pub response: AgentResponse,
    pub evaluation: Evaluation,
    pub follow_ups: Vec<Task>,
    /// Empty unless follow-ups were dispatched.
    pub follow_up_responses: Vec<AgentResponse>,
}

/// A leaf executor as seen from outside its platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubAgentInfo {
    pub id: String,
    pub name: String,
    pub task_types: BTreeSet<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformInfo {
    pub agent_id: String,
    pub name: String,
    pub description: String,
    pub task_types: BTreeSet<String>,
    pub sub_agents: Vec<SubAgentInfo>,
}

/// Process-wide wiring: one dispatcher and one evaluator, built once and
/// shared by reference.
#[derive(Clone)]
pub struct AssistantContext {
    dispatcher: Arc<Dispatcher>,
    evaluator: Arc<Evaluator>,
}

impl AssistantContext {
    pub fn new(dispatcher: Dispatcher, evaluator: Evaluator) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            evaluator: Arc::new(evaluator),
        }
    }

    /// Register each platform under its own name.
    pub fn from_platforms(platforms: Vec<Arc<dyn PlatformAgent>>) -> Self {
        let dispatcher = platforms
            .into_iter()
            .fold(Dispatcher::new(), |dispatcher, platform| {
                dispatcher.with_platform(platform)
            });
        Self::new(dispatcher, Evaluator::new())
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    pub fn evaluator(&self) -> &Arc<Evaluator> {
        &self.evaluator
    }

    /// Dispatch `task`, evaluate the outcome, and derive follow-ups.
    ///
    /// Follow-ups are the evaluator's generated tasks plus any tasks the
    /// executor reported creating. With `dispatch_follow_ups` they are run
    /// and evaluated too, but their own follow-ups are not.
    pub async fn process_task(&self, mut task: Task, dispatch_follow_ups: bool) -> ProcessedTask {
        let response = self.dispatcher.execute(&mut task).await;
        let evaluation = self.evaluator.evaluate(&task, &response);

        let mut follow_ups = self.evaluator.generate_follow_up_tasks(&task, &response);
        follow_ups.extend(response.tasks_created().iter().cloned());

        let mut follow_up_responses = Vec::new();
        if dispatch_follow_ups {
            for follow_up in &mut follow_ups {
                let follow_up_response = self.dispatcher.execute(follow_up).await;
                self.evaluator.evaluate(follow_up, &follow_up_response);
                follow_up_responses.push(follow_up_response);
            }
        }

        info!(
            task_id = %task.id,
            quality = evaluation.quality_score,
            follow_ups = follow_ups.len(),
            dispatched = follow_up_responses.len(),
            "Task processed"
        );

        ProcessedTask {
            task,
            response,
            evaluation,
            follow_ups,
            follow_up_responses,
        }
    }

    /// Run a batch and evaluate every task that ran.
    pub async fn run_workflow(&self, tasks: &mut [Task], mode: ExecutionMode) -> WorkflowReport {
        let responses = self.dispatcher.orchestrate(tasks, mode).await;
        for (task, response) in tasks.iter().zip(&responses) {
            self.evaluator.evaluate(task, response);
        }
        let report = WorkflowReport::new(mode, tasks, &responses);
        info!(
            workflow_id = %report.workflow_id,
            total = report.total_tasks,
            completed = report.completed_tasks,
            failed = report.failed_tasks,
            "Workflow evaluated"
        );
        report
    }

    /// Probe every platform and summarise.
    pub async fn system_status(&self) -> SystemStatus {
        let platform_status = self.dispatcher.platform_status().await;
        let system_health = if platform_status.values().all(|up| *up) {
            SystemHealth::Healthy
        } else {
            SystemHealth::Degraded
        };
        SystemStatus {
            platform_status,
            total_tasks_processed: self.dispatcher.history_len(),
            system_health,
        }
    }

    /// Registered platforms with their sub-agents and task types.
    pub fn platform_capabilities(&self) -> BTreeMap<String, PlatformInfo> {
        self.dispatcher
            .platforms()
            .iter()
            .map(|(name, platform)| {
                let descriptor = platform.descriptor();
                let info = PlatformInfo {
                    agent_id: descriptor.id.clone(),
                    name: descriptor.name.clone(),
                    description: descriptor.description.clone(),
                    task_types: platform.capabilities(),
                    sub_agents: platform
                        .sub_agents()
                        .iter()
                        .map(|agent| SubAgentInfo {
                            id: agent.descriptor().id.clone(),
                            name: agent.descriptor().name.clone(),
                            task_types: agent.capabilities(),
                        })
                        .collect(),
                };
                (name.clone(), info)
            })
            .collect()
    }
}
