use crate::monitor::DispatchMonitor;
use crate::router;
use crate::workflow::{ExecutionMode, SubtaskSpec, WorkflowReport};
use async_trait::async_trait;
use futures_util::future::join_all;
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use workmate_agents::{Agent, AgentDescriptor, PlatformAgent};
use workmate_core::{AgentResponse, Task, TaskStatus};

/// Identifier the dispatcher stamps on tasks it creates.
pub const DISPATCHER_ID: &str = "hierarchical_supervisor";

/// Top-level entry point: routes each task to the platform that owns its
/// type and keeps an append-only record of everything it was given.
pub struct Dispatcher {
    descriptor: AgentDescriptor,
    platforms: BTreeMap<String, Arc<dyn PlatformAgent>>,
    history: Mutex<Vec<Task>>,
    monitor: Arc<DispatchMonitor>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            descriptor: AgentDescriptor::new(
                DISPATCHER_ID,
                "Hierarchical Supervisor",
                "Routes tasks to platform supervisors and orchestrates workflows",
            ),
            platforms: BTreeMap::new(),
            history: Mutex::new(Vec::new()),
            monitor: Arc::new(DispatchMonitor::new()),
        }
    }

    /// Register `platform` under `name`, replacing any previous registration.
    pub fn register_platform(&mut self, name: impl Into<String>, platform: Arc<dyn PlatformAgent>) {
        let name = name.into();
        info!(platform = %name, agent = %platform.descriptor().id, "Registered platform");
        if self.platforms.insert(name.clone(), platform).is_some() {
            debug!(platform = %name, "Replaced existing platform registration");
        }
    }

    /// Builder form of [`Dispatcher::register_platform`], keyed by the
    /// platform's own name.
    pub fn with_platform(mut self, platform: Arc<dyn PlatformAgent>) -> Self {
        let name = platform.platform_name().to_string();
        self.register_platform(name, platform);
        self
    }

    pub fn platforms(&self) -> &BTreeMap<String, Arc<dyn PlatformAgent>> {
        &self.platforms
    }

    pub fn platform(&self, name: &str) -> Option<&Arc<dyn PlatformAgent>> {
        self.platforms.get(name)
    }

    pub fn monitor(&self) -> &Arc<DispatchMonitor> {
        &self.monitor
    }

    /// Platform that owns `task.task_type`, whether or not it is registered.
    pub fn route(&self, task: &Task) -> Option<&'static str> {
        router::platform_for(&task.task_type)
    }

    /// Record `task` in the history, route it, and run it on its platform.
    ///
    /// Never fails: an unroutable task, an unregistered platform, or a
    /// platform that rejects the task all come back as clarification
    /// requests. When the executor leaves the task unfinished, its status is
    /// settled from the response.
    pub async fn execute(&self, task: &mut Task) -> AgentResponse {
        let index = {
            let mut history = self.history.lock();
            history.push(task.clone());
            history.len() - 1
        };

        let start = Instant::now();
        let (platform, response) = self.dispatch(task).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        settle_status(task, &response);
        if let Some(entry) = self.history.lock().get_mut(index) {
            *entry = task.clone();
        }

        match platform {
            Some(name) => self.monitor.record_dispatch(name, &response, duration_ms).await,
            None => self.monitor.record_unrouted().await,
        }

        info!(
            task_id = %task.id,
            task_type = %task.task_type,
            status = %task.status,
            success = response.is_success(),
            duration_ms,
            "Task dispatched"
        );
        response
    }

    async fn dispatch(&self, task: &mut Task) -> (Option<&'static str>, AgentResponse) {
        let platform_agent = self
            .route(task)
            .and_then(|name| self.platforms.get(name).map(|agent| (name, agent)));

        let Some((name, agent)) = platform_agent else {
            warn!(task_id = %task.id, task_type = %task.task_type, "No platform for task type");
            return (
                None,
                AgentResponse::needs_clarification(
                    format!("No platform agent found for task type: {}", task.task_type),
                    "Could you specify which platform or service you want to use?",
                ),
            );
        };

        if !agent.supports(task) {
            warn!(
                task_id = %task.id,
                task_type = %task.task_type,
                platform = %name,
                "Platform rejected task"
            );
            return (
                Some(name),
                AgentResponse::needs_clarification(
                    format!(
                        "Platform agent {name} cannot handle task type: {}",
                        task.task_type
                    ),
                    format!("Could you specify more details about what you want to do with {name}?"),
                ),
            );
        }

        // Supervisor-backed platforms leave the claim to the leaf that runs it.
        let claimed = agent.sub_agents().is_empty() && task.claim(agent.descriptor().id.clone());
        if !claimed {
            task.mark_in_progress();
        }
        debug!(task_id = %task.id, platform = %name, "Forwarding task to platform");
        (Some(name), agent.execute(task).await)
    }

    /// Run `tasks` in order.
    ///
    /// Serial mode stops after the first hard failure, so the returned list
    /// may be shorter than `tasks`. Parallel mode runs everything
    /// concurrently and returns responses in input order.
    pub async fn orchestrate(&self, tasks: &mut [Task], mode: ExecutionMode) -> Vec<AgentResponse> {
        info!(count = tasks.len(), mode = %mode, "Orchestrating tasks");
        match mode {
            ExecutionMode::Serial => {
                let mut responses = Vec::with_capacity(tasks.len());
                for task in tasks {
                    let response = self.execute(task).await;
                    let halt = response.is_hard_failure();
                    responses.push(response);
                    if halt {
                        warn!(task_id = %task.id, "Hard failure; stopping serial run");
                        break;
                    }
                }
                responses
            }
            ExecutionMode::Parallel => join_all(tasks.iter_mut().map(|task| self.execute(task))).await,
        }
    }

    /// [`Dispatcher::orchestrate`] plus a summary of what ran.
    pub async fn run_workflow(&self, tasks: &mut [Task], mode: ExecutionMode) -> WorkflowReport {
        let responses = self.orchestrate(tasks, mode).await;
        let report = WorkflowReport::new(mode, tasks, &responses);
        info!(
            workflow_id = %report.workflow_id,
            total = report.total_tasks,
            completed = report.completed_tasks,
            failed = report.failed_tasks,
            "Workflow finished"
        );
        report
    }

    /// Build child tasks of `parent` from `specs`.
    pub fn create_subtasks(&self, parent: &Task, specs: &[SubtaskSpec]) -> Vec<Task> {
        specs
            .iter()
            .cloned()
            .map(|spec| spec.into_task().with_parent(parent.id).created_by(DISPATCHER_ID))
            .collect()
    }

    /// Copy of every task passed to [`Dispatcher::execute`], in submission order.
    pub fn history(&self) -> Vec<Task> {
        self.history.lock().clone()
    }

    pub fn history_len(&self) -> usize {
        self.history.lock().len()
    }

    /// Probe every registered platform's connection.
    ///
    /// Probes run on separate tokio tasks; an error or a panic in a probe is
    /// reported as `false`.
    pub async fn platform_status(&self) -> BTreeMap<String, bool> {
        let probes: Vec<_> = self
            .platforms
            .iter()
            .map(|(name, platform)| {
                let platform = Arc::clone(platform);
                (
                    name.clone(),
                    tokio::spawn(async move { platform.test_connection().await }),
                )
            })
            .collect();

        let mut status = BTreeMap::new();
        for (name, probe) in probes {
            let up = match probe.await {
                Ok(Ok(up)) => up,
                Ok(Err(e)) => {
                    warn!(platform = %name, error = %e, "Connection probe failed");
                    false
                }
                Err(e) => {
                    warn!(platform = %name, error = %e, "Connection probe panicked");
                    false
                }
            };
            status.insert(name, up);
        }
        status
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Bring a still-open task in line with the response it produced.
fn settle_status(task: &mut Task, response: &AgentResponse) {
    if !matches!(task.status, TaskStatus::Pending | TaskStatus::InProgress) {
        return;
    }
    if response.is_success() {
        task.complete(response.data().cloned().unwrap_or_default());
    } else if response.requires_clarification() {
        task.request_clarification();
    } else {
        task.fail(response.message());
    }
}

#[async_trait]
impl Agent for Dispatcher {
    fn descriptor(&self) -> &AgentDescriptor {
        &self.descriptor
    }

    // Anything can be submitted; unroutable tasks get a clarification request.
    fn supports(&self, _task: &Task) -> bool {
        true
    }

    fn capabilities(&self) -> BTreeSet<String> {
        self.platforms
            .values()
            .flat_map(|platform| platform.capabilities())
            .collect()
    }

    async fn execute(&self, task: &mut Task) -> AgentResponse {
        Dispatcher::execute(self, task).await
    }
}
