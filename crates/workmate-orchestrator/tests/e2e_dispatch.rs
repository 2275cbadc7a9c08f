#![allow(clippy::unwrap_used, clippy::expect_used)]

//! End-to-end dispatch tests.
//!
//! Scripted platforms count invocations so batch behaviour can be checked
//! exactly; the concrete Gmail and GitHub platforms cover the full
//! dispatch → evaluate → follow-up path.

use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use workmate_agents::{Agent, AgentDescriptor, CapabilitySet, PlatformAgent};
use workmate_core::{AgentResponse, Task, TaskStatus, WorkmateError, WorkmateResult};
use workmate_orchestrator::*;
use workmate_platforms::{default_platforms, GitHubConfig, GitHubPlatform, PlatformsConfig};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ---------------------------------------------------------------------------
// Scripted platform
// ---------------------------------------------------------------------------

#[derive(Clone, Copy)]
enum Script {
    Succeed,
    HardFail,
}

#[derive(Clone, Copy)]
enum Probe {
    Up,
    Error,
    Panic,
}

struct ScriptedPlatform {
    name: &'static str,
    descriptor: AgentDescriptor,
    capabilities: CapabilitySet,
    script: Script,
    probe: Probe,
    calls: AtomicUsize,
}

impl ScriptedPlatform {
    fn new(name: &'static str, task_types: &[&str], script: Script) -> Arc<Self> {
        Self::with_probe(name, task_types, script, Probe::Up)
    }

    fn with_probe(
        name: &'static str,
        task_types: &[&str],
        script: Script,
        probe: Probe,
    ) -> Arc<Self> {
        Arc::new(Self {
            name,
            descriptor: AgentDescriptor::new(format!("{name}_platform"), name, "scripted"),
            capabilities: CapabilitySet::new(task_types.iter().copied()),
            script,
            probe,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Agent for ScriptedPlatform {
    fn descriptor(&self) -> &AgentDescriptor {
        &self.descriptor
    }

    fn supports(&self, task: &Task) -> bool {
        self.capabilities.supports(task)
    }

    async fn execute(&self, _task: &mut Task) -> AgentResponse {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.script {
            Script::Succeed => AgentResponse::ok(format!("{} handled the task", self.name)),
            Script::HardFail => AgentResponse::failed(format!("{} backend unavailable", self.name)),
        }
    }
}

#[async_trait]
impl PlatformAgent for ScriptedPlatform {
    fn platform_name(&self) -> &str {
        self.name
    }

    fn sub_agents(&self) -> &[Arc<dyn Agent>] {
        &[]
    }

    async fn authenticate(&self) -> WorkmateResult<bool> {
        Ok(true)
    }

    async fn test_connection(&self) -> WorkmateResult<bool> {
        match self.probe {
            Probe::Up => Ok(true),
            Probe::Error => Err(WorkmateError::Platform("connection refused".into())),
            Probe::Panic => panic!("probe blew up"),
        }
    }
}

fn default_context() -> AssistantContext {
    AssistantContext::from_platforms(default_platforms(&PlatformsConfig::default()).unwrap())
}

// ---------------------------------------------------------------------------
// Dispatcher properties
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unmapped_task_is_soft_failure_recorded_once() {
    let context = default_context();
    let dispatcher = context.dispatcher();
    let mut task = Task::new("tell me a joke", "tell_joke");

    let response = dispatcher.execute(&mut task).await;

    assert!(!response.is_success());
    assert!(response.requires_clarification());
    assert!(!response.clarification_question().unwrap().is_empty());
    let history = dispatcher.history();
    assert_eq!(history.iter().filter(|t| t.id == task.id).count(), 1);
    assert_eq!(history.len(), 1);
}

#[tokio::test]
async fn routing_is_idempotent() {
    let context = default_context();
    let task = Task::new("ticket", "assign_ticket");
    let first = context.dispatcher().route(&task);
    let second = context.dispatcher().route(&task);
    assert_eq!(first, Some("jira"));
    assert_eq!(first, second);
}

#[tokio::test]
async fn serial_run_stops_at_first_hard_failure() {
    let jira = ScriptedPlatform::new("jira", &["create_ticket"], Script::HardFail);
    let gmail = ScriptedPlatform::new("gmail", &["send_email"], Script::Succeed);
    let calendar = ScriptedPlatform::new("calendar", &["schedule_meeting"], Script::Succeed);
    let dispatcher = Dispatcher::new()
        .with_platform(jira.clone())
        .with_platform(gmail.clone())
        .with_platform(calendar.clone());

    let mut tasks = vec![
        Task::new("A", "create_ticket"),
        Task::new("B", "send_email"),
        Task::new("C", "schedule_meeting"),
    ];
    let responses = dispatcher.orchestrate(&mut tasks, ExecutionMode::Serial).await;

    assert_eq!(responses.len(), 1);
    assert!(responses[0].is_hard_failure());
    assert_eq!(jira.calls(), 1);
    assert_eq!(gmail.calls(), 0);
    assert_eq!(calendar.calls(), 0);
    assert_eq!(tasks[0].status, TaskStatus::Failed);
    assert_eq!(tasks[1].status, TaskStatus::Pending);
    assert_eq!(dispatcher.history_len(), 1);
}

#[tokio::test]
async fn serial_run_continues_past_clarification() {
    let gmail = ScriptedPlatform::new("gmail", &["send_email"], Script::Succeed);
    let dispatcher = Dispatcher::new().with_platform(gmail.clone());

    let mut tasks = vec![Task::new("A", "small_talk"), Task::new("B", "send_email")];
    let responses = dispatcher.orchestrate(&mut tasks, ExecutionMode::Serial).await;

    assert_eq!(responses.len(), 2);
    assert!(responses[0].requires_clarification());
    assert!(responses[1].is_success());
    assert_eq!(gmail.calls(), 1);
}

#[tokio::test]
async fn parallel_run_never_stops_early() {
    let jira = ScriptedPlatform::new("jira", &["create_ticket"], Script::HardFail);
    let gmail = ScriptedPlatform::new("gmail", &["send_email"], Script::Succeed);
    let dispatcher = Dispatcher::new()
        .with_platform(jira.clone())
        .with_platform(gmail.clone());

    let mut tasks = vec![
        Task::new("A", "create_ticket"),
        Task::new("B", "send_email"),
        Task::new("C", "create_ticket"),
    ];
    let report = dispatcher.run_workflow(&mut tasks, ExecutionMode::Parallel).await;

    assert_eq!(report.results.len(), 3);
    assert_eq!(report.completed_tasks, 1);
    assert_eq!(report.failed_tasks, 2);
    assert_eq!(jira.calls(), 2);
    assert_eq!(gmail.calls(), 1);
    let ids: Vec<_> = report.results.iter().map(|r| r.task_id).collect();
    assert_eq!(ids, tasks.iter().map(|t| t.id).collect::<Vec<_>>());
}

#[tokio::test]
async fn failing_probes_report_false() {
    let dispatcher = Dispatcher::new()
        .with_platform(ScriptedPlatform::new("gmail", &["send_email"], Script::Succeed))
        .with_platform(ScriptedPlatform::with_probe(
            "jira",
            &["create_ticket"],
            Script::Succeed,
            Probe::Error,
        ))
        .with_platform(ScriptedPlatform::with_probe(
            "calendar",
            &["schedule_meeting"],
            Script::Succeed,
            Probe::Panic,
        ));
    let context = AssistantContext::new(dispatcher, Evaluator::new());

    let status = context.system_status().await;

    assert!(status.platform_status["gmail"]);
    assert!(!status.platform_status["jira"]);
    assert!(!status.platform_status["calendar"]);
    assert_eq!(status.system_health, SystemHealth::Degraded);
    assert_eq!(status.total_tasks_processed, 0);
}

// ---------------------------------------------------------------------------
// Evaluator properties
// ---------------------------------------------------------------------------

#[tokio::test]
async fn evaluating_twice_records_two_identical_evaluations() {
    let evaluator = Evaluator::new();
    let task = Task::new("ticket", "create_ticket");
    let response = AgentResponse::ok("Successfully created Jira ticket PROJ-1");
    let before = evaluator.summary().total_evaluations;

    let first = evaluator.evaluate(&task, &response);
    let second = evaluator.evaluate(&task, &response);

    assert_eq!(first, second);
    assert_eq!(evaluator.summary().total_evaluations, before + 2);
}

#[tokio::test]
async fn send_email_through_gmail() {
    let context = default_context();
    let mut task = Task::new("Welcome mail", "send_email")
        .with_param("subject", json!("Welcome"))
        .with_param("recipient", json!("a@b.com"));

    assert_eq!(context.dispatcher().route(&task), Some("gmail"));
    let response = context.dispatcher().execute(&mut task).await;

    assert!(response.is_success());
    assert_eq!(response.data().unwrap()["recipient"], json!("a@b.com"));
    assert_eq!(task.assigned_agent.as_deref(), Some("email_sender_agent"));
    assert_eq!(task.status, TaskStatus::Completed);

    let evaluation = context.evaluator().evaluate(&task, &response);
    assert_eq!(evaluation.completeness_score, 100);
    assert!(evaluation
        .recommendations
        .iter()
        .any(|r| r.contains("delivery confirmation tracking")));
    assert!(!evaluation.follow_up_needed);
    assert!(evaluation.follow_up_tasks.is_empty());

    let follow_ups = context.evaluator().generate_follow_up_tasks(&task, &response);
    assert_eq!(follow_ups.len(), 1);
    assert_eq!(follow_ups[0].task_type, "email_followup");
    assert_eq!(follow_ups[0].parent_task_id, Some(task.id));
    assert_eq!(
        follow_ups[0].payload["email_id"],
        response.data().unwrap()["email_id"]
    );
}

#[tokio::test]
async fn github_issue_triggers_confirmation_email() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/repos/acme/web/issues"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "number": 42,
            "html_url": "https://github.com/acme/web/issues/42"
        })))
        .mount(&server)
        .await;

    let github = GitHubPlatform::new(&GitHubConfig {
        token: Some("ghp_test".into()),
        api_base_url: server.uri(),
        default_repository: "acme/web".into(),
        ..GitHubConfig::default()
    })
    .unwrap();
    let mut platforms = default_platforms(&PlatformsConfig {
        github: GitHubConfig {
            enabled: false,
            ..GitHubConfig::default()
        },
        ..PlatformsConfig::default()
    })
    .unwrap();
    platforms.push(Arc::new(github));
    let context = AssistantContext::from_platforms(platforms);

    let task = Task::new("Login crash", "github_create_issue")
        .with_param("title", json!("Crash on login"));
    let processed = context.process_task(task, true).await;

    assert!(processed.response.is_success());
    assert_eq!(processed.response.data().unwrap()["issue_id"], json!(42));
    assert!(processed.evaluation.follow_up_needed);
    assert_eq!(processed.evaluation.follow_up_tasks[0].task_type, "send_email");

    assert_eq!(processed.follow_ups.len(), 1);
    let follow_up = &processed.follow_ups[0];
    assert_eq!(follow_up.task_type, "send_email");
    assert_eq!(follow_up.parent_task_id, Some(processed.task.id));
    assert_eq!(follow_up.created_by.as_deref(), Some(EVALUATOR_ID));
    assert_eq!(follow_up.payload["issue_data"]["issue_id"], json!(42));

    // The confirmation mail went out through Gmail.
    assert_eq!(processed.follow_up_responses.len(), 1);
    assert!(processed.follow_up_responses[0].is_success());
    assert_eq!(follow_up.status, TaskStatus::Completed);
    assert_eq!(context.dispatcher().history_len(), 2);
    assert_eq!(context.evaluator().summary().total_evaluations, 2);
}

#[tokio::test]
async fn follow_ups_are_not_dispatched_unless_asked() {
    let context = default_context();
    let task = Task::new("Standup", "schedule_meeting").with_param("title", json!("Standup"));

    let processed = context.process_task(task, false).await;

    assert!(processed.response.is_success());
    assert_eq!(processed.follow_ups.len(), 1);
    assert_eq!(processed.follow_ups[0].param_str("template", ""), "meeting_reminder");
    assert!(processed.follow_up_responses.is_empty());
    assert_eq!(context.dispatcher().history_len(), 1);
}

#[tokio::test]
async fn disabled_platform_routes_to_clarification() {
    let mut config = PlatformsConfig::default();
    config.jira.enabled = false;
    let context = AssistantContext::from_platforms(default_platforms(&config).unwrap());

    let mut task = Task::new("ticket", "create_ticket");
    let response = context.dispatcher().execute(&mut task).await;

    assert!(response.requires_clarification());
    assert!(!context.platform_capabilities().contains_key("jira"));
}

#[tokio::test]
async fn workflow_with_real_platforms() {
    let context = default_context();
    let specs = vec![
        SubtaskSpec::new("Open ticket", "create_ticket"),
        SubtaskSpec::new("Notify team", "send_email"),
        SubtaskSpec::new("Book review", "schedule_meeting"),
    ];
    let parent = Task::new("Release prep", "project_management");
    let mut tasks = context.dispatcher().create_subtasks(&parent, &specs);

    let report = context.run_workflow(&mut tasks, ExecutionMode::Serial).await;

    assert_eq!(report.total_tasks, 3);
    assert_eq!(report.completed_tasks, 3);
    assert!(tasks.iter().all(|t| t.status == TaskStatus::Completed));
    assert!(tasks.iter().all(|t| t.parent_task_id == Some(parent.id)));
    let summary = context.evaluator().summary();
    assert_eq!(summary.total_evaluations, 3);
    assert_eq!(summary.success_rate, 100.0);

    let monitor = context.dispatcher().monitor().snapshot().await;
    assert_eq!(monitor.platforms["jira"].succeeded, 1);
    assert_eq!(monitor.total_dispatched(), 3);
}

#[tokio::test]
async fn capabilities_listing() {
    let context = default_context();
    let capabilities = context.platform_capabilities();

    assert_eq!(capabilities.len(), 4);
    let gmail = &capabilities["gmail"];
    assert_eq!(gmail.task_types.len(), 4);
    assert_eq!(gmail.sub_agents[0].id, "email_sender_agent");
    assert!(capabilities["github"]
        .task_types
        .contains("github_create_issue"));
}
