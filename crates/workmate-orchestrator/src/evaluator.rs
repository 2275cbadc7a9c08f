//! Rule-based evaluation of finished tasks.
//!
//! Scoring is deterministic and depends only on the task type and the shape
//! of the response:
//!
//! | check | effect |
//! |---|---|
//! | success, data empty | completeness 90 |
//! | success, data non-empty | completeness 100 |
//! | failure | completeness 20, issue "Task execution failed" |
//! | message longer than 10 chars | quality +40 |
//! | data non-empty | quality +40 |
//! | no clarification needed | quality +20 |
//!
//! Follow-ups exist in two forms. [`Evaluation::follow_up_tasks`] holds
//! advisory descriptors; [`Evaluator::generate_follow_up_tasks`] builds
//! runnable [`Task`]s. The two follow different rules and are not derived
//! from each other.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};
use uuid::Uuid;
use workmate_agents::{Agent, AgentDescriptor, CapabilitySet};
use workmate_core::{
    AgentResponse, Payload, Task, TaskPriority, TaskStatus, WorkmateError, WorkmateResult,
};

/// Identifier of the evaluator when it runs as an agent.
pub const EVALUATOR_ID: &str = "reflection_agent";

/// Task types the evaluator handles as an agent.
pub const EVALUATOR_TASK_TYPES: [&str; 3] =
    ["evaluate_completion", "quality_check", "follow_up_analysis"];

const MAX_RANKED: usize = 5;

/// Advisory follow-up attached to an [`Evaluation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowUpDescriptor {
    #[serde(rename = "type")]
    pub task_type: String,
    pub description: String,
    pub priority: TaskPriority,
}

/// Scored assessment of one task/response pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub task_id: Uuid,
    pub task_type: String,
    pub success: bool,
    pub completeness_score: u8,
    pub quality_score: u8,
    pub issues_identified: Vec<String>,
    pub recommendations: Vec<String>,
    pub follow_up_needed: bool,
    pub follow_up_tasks: Vec<FollowUpDescriptor>,
}

/// A string and how often it occurred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub value: String,
    pub count: usize,
}

/// Aggregate over every evaluation recorded so far.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub total_evaluations: usize,
    pub average_quality: f64,
    /// Percentage, 0 to 100.
    pub success_rate: f64,
    pub common_issues: Vec<RankedEntry>,
    pub top_recommendations: Vec<RankedEntry>,
}

/// Something worth improving, found by looking at task history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImprovementOpportunity {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub recommendation: String,
    pub priority: TaskPriority,
}

/// Scores finished tasks, proposes follow-ups, and keeps an append-only
/// record of every evaluation.
pub struct Evaluator {
    descriptor: AgentDescriptor,
    capabilities: CapabilitySet,
    history: Mutex<Vec<Evaluation>>,
}

impl Evaluator {
    pub fn new() -> Self {
        Self {
            descriptor: AgentDescriptor::new(
                EVALUATOR_ID,
                "Reflection Agent",
                "Evaluates task completion and ensures quality outcomes",
            ),
            capabilities: CapabilitySet::new(EVALUATOR_TASK_TYPES),
            history: Mutex::new(Vec::new()),
        }
    }

    /// Score `response` as the outcome of `task` and record the result.
    pub fn evaluate(&self, task: &Task, response: &AgentResponse) -> Evaluation {
        let success = response.is_success();
        let mut evaluation = Evaluation {
            task_id: task.id,
            task_type: task.task_type.clone(),
            success,
            completeness_score: 0,
            quality_score: 0,
            issues_identified: Vec::new(),
            recommendations: Vec::new(),
            follow_up_needed: false,
            follow_up_tasks: Vec::new(),
        };

        evaluation.completeness_score = match (success, response.has_data()) {
            (true, true) => 100,
            (true, false) => 90,
            (false, _) => {
                evaluation
                    .issues_identified
                    .push("Task execution failed".to_string());
                20
            }
        };

        if response.message().chars().count() > 10 {
            evaluation.quality_score += 40;
        }
        if response.has_data() {
            evaluation.quality_score += 40;
        }
        if !response.requires_clarification() {
            evaluation.quality_score += 20;
        }

        if response.requires_clarification() {
            evaluation
                .issues_identified
                .push("Requires user clarification".to_string());
            evaluation
                .recommendations
                .push("Provide more specific instructions to avoid ambiguity".to_string());
        }

        match task.task_type.as_str() {
            "github_create_issue"
                if success && response.data().is_some_and(|d| d.contains_key("issue_id")) =>
            {
                evaluation
                    .recommendations
                    .push("Consider sending confirmation email about the created issue".to_string());
                evaluation.follow_up_needed = true;
                evaluation.follow_up_tasks.push(FollowUpDescriptor {
                    task_type: "send_email".to_string(),
                    description: "Send confirmation email about GitHub issue creation".to_string(),
                    priority: TaskPriority::Low,
                });
            }
            "send_email" if success => {
                evaluation
                    .recommendations
                    .push("Consider setting up delivery confirmation tracking".to_string());
            }
            _ => {}
        }

        debug!(
            task_id = %task.id,
            task_type = %task.task_type,
            completeness = evaluation.completeness_score,
            quality = evaluation.quality_score,
            follow_up = evaluation.follow_up_needed,
            "Task evaluated"
        );
        self.history.lock().push(evaluation.clone());
        evaluation
    }

    /// Runnable follow-up tasks for a successfully finished task.
    pub fn generate_follow_up_tasks(&self, completed: &Task, response: &AgentResponse) -> Vec<Task> {
        if !response.is_success() {
            return Vec::new();
        }
        let data = response.data().map(|d| json!(d)).unwrap_or(Value::Null);

        let follow_up = match completed.task_type.as_str() {
            "github_create_issue" => Task::new(
                "Send confirmation email about GitHub issue creation",
                "send_email",
            )
            .with_param("subject", json!("GitHub Issue Created Successfully"))
            .with_param("template", json!("github_issue_confirmation"))
            .with_param("issue_data", data),
            "send_email" => {
                let email_id = data.get("email_id").cloned().unwrap_or(Value::Null);
                Task::new("Track email delivery status", "email_followup")
                    .with_param("email_id", email_id)
                    .with_param("tracking_type", json!("delivery_confirmation"))
            }
            "schedule_meeting" => Task::new("Send meeting reminder", "send_email")
                .with_param("subject", json!("Meeting Reminder"))
                .with_param("template", json!("meeting_reminder"))
                .with_param("meeting_data", data),
            _ => return Vec::new(),
        };

        let follow_up = follow_up.with_parent(completed.id).created_by(EVALUATOR_ID);
        info!(
            parent = %completed.id,
            follow_up = %follow_up.id,
            task_type = %follow_up.task_type,
            "Generated follow-up task"
        );
        vec![follow_up]
    }

    /// Look for failure-rate and repetition patterns in `history`.
    pub fn identify_improvement_opportunities(&self, history: &[Task]) -> Vec<ImprovementOpportunity> {
        let mut opportunities = Vec::new();
        if history.is_empty() {
            return opportunities;
        }

        let failed = history
            .iter()
            .filter(|t| t.status == TaskStatus::Failed)
            .count();
        // More than 10% failed.
        if failed * 10 > history.len() {
            opportunities.push(ImprovementOpportunity {
                kind: "high_failure_rate".to_string(),
                description: "High task failure rate detected".to_string(),
                recommendation: "Review and improve error handling mechanisms".to_string(),
                priority: TaskPriority::High,
            });
        }

        let by_type = rank_by_frequency(history.iter().map(|t| t.task_type.as_str()));
        if let Some(top) = by_type.first().filter(|entry| entry.count > 5) {
            opportunities.push(ImprovementOpportunity {
                kind: "workflow_optimization".to_string(),
                description: format!("High frequency of {} tasks", top.value),
                recommendation: format!(
                    "Consider creating templates or automation for {} tasks",
                    top.value
                ),
                priority: TaskPriority::Medium,
            });
        }

        opportunities
    }

    /// Aggregate over every recorded evaluation. All zero when there are none.
    pub fn summary(&self) -> EvaluationSummary {
        let history = self.history.lock();
        if history.is_empty() {
            return EvaluationSummary::default();
        }

        let total = history.len();
        let quality: f64 = history.iter().map(|e| f64::from(e.quality_score)).sum();
        let succeeded = history.iter().filter(|e| e.success).count();

        let mut common_issues = rank_by_frequency(
            history
                .iter()
                .flat_map(|e| e.issues_identified.iter().map(String::as_str)),
        );
        common_issues.truncate(MAX_RANKED);
        let mut top_recommendations = rank_by_frequency(
            history
                .iter()
                .flat_map(|e| e.recommendations.iter().map(String::as_str)),
        );
        top_recommendations.truncate(MAX_RANKED);

        EvaluationSummary {
            total_evaluations: total,
            average_quality: quality / total as f64,
            success_rate: succeeded as f64 / total as f64 * 100.0,
            common_issues,
            top_recommendations,
        }
    }

    /// Copy of all evaluations, oldest first.
    pub fn history(&self) -> Vec<Evaluation> {
        self.history.lock().clone()
    }

    fn evaluate_completion(&self, task: &Task) -> AgentResponse {
        let decoded = decode_param::<Task>(&task.payload, "target_task").and_then(|target| {
            decode_param::<AgentResponse>(&task.payload, "target_response")
                .map(|response| (target, response))
        });
        let (target, target_response) = match decoded {
            Ok(pair) => pair,
            Err(e) => {
                warn!(task_id = %task.id, error = %e, "Cannot evaluate task");
                let detail = match e {
                    WorkmateError::Evaluation(detail) => detail,
                    other => other.to_string(),
                };
                return AgentResponse::failed(detail);
            }
        };

        let evaluation = self.evaluate(&target, &target_response);
        let message = format!(
            "Evaluation completed. Quality score: {}/100",
            evaluation.quality_score
        );
        AgentResponse::ok(message).with_data(to_payload(&evaluation))
    }

    fn quality_check(&self) -> AgentResponse {
        let summary = self.summary();
        let mut data = Payload::new();
        data.insert("overall_quality".into(), json!(summary.average_quality));
        data.insert("evaluations".into(), json!(summary.total_evaluations));
        data.insert("success_rate".into(), json!(summary.success_rate));
        data.insert(
            "areas_checked".into(),
            json!(["Task completion rate", "Response quality", "Clarification rate"]),
        );
        data.insert("common_issues".into(), json!(summary.common_issues));
        data.insert("recommendations".into(), json!(summary.top_recommendations));
        AgentResponse::ok("Quality check completed successfully").with_data(data)
    }

    fn follow_up_analysis(&self) -> AgentResponse {
        let history = self.history.lock();
        let needing: Vec<&Evaluation> = history.iter().filter(|e| e.follow_up_needed).collect();
        let high_priority = needing
            .iter()
            .flat_map(|e| &e.follow_up_tasks)
            .filter(|f| matches!(f.priority, TaskPriority::High | TaskPriority::Urgent))
            .count();
        let suggested: BTreeSet<&str> = needing
            .iter()
            .flat_map(|e| &e.follow_up_tasks)
            .map(|f| f.description.as_str())
            .collect();

        let mut data = Payload::new();
        data.insert("follow_ups_needed".into(), json!(needing.len()));
        data.insert("high_priority_follow_ups".into(), json!(high_priority));
        data.insert("suggested_actions".into(), json!(suggested));
        AgentResponse::ok("Follow-up analysis completed").with_data(data)
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Agent for Evaluator {
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
        let response = match task.task_type.as_str() {
            "evaluate_completion" => self.evaluate_completion(task),
            "quality_check" => self.quality_check(),
            "follow_up_analysis" => self.follow_up_analysis(),
            other => {
                return AgentResponse::failed(format!("Unsupported reflection task type: {other}"))
            }
        };

        task.claim(EVALUATOR_ID);
        if response.is_success() {
            task.complete(response.data().cloned().unwrap_or_default());
        } else {
            task.fail(response.message());
        }
        response
    }
}

fn decode_param<T: DeserializeOwned>(payload: &Payload, key: &str) -> WorkmateResult<T> {
    let value = payload
        .get(key)
        .filter(|v| !v.is_null())
        .ok_or_else(|| WorkmateError::Evaluation(format!("Missing {key} for evaluation")))?;
    serde_json::from_value(value.clone())
        .map_err(|e| WorkmateError::Evaluation(format!("Invalid {key}: {e}")))
}

fn to_payload(evaluation: &Evaluation) -> Payload {
    match serde_json::to_value(evaluation) {
        Ok(Value::Object(map)) => map.into_iter().collect(),
        _ => Payload::new(),
    }
}

/// Count occurrences, most frequent first; ties keep first-seen order.
fn rank_by_frequency<'a>(items: impl Iterator<Item = &'a str>) -> Vec<RankedEntry> {
    let mut ranked: Vec<RankedEntry> = Vec::new();
    for item in items {
        match ranked.iter_mut().find(|entry| entry.value == item) {
            Some(entry) => entry.count += 1,
            None => ranked.push(RankedEntry {
                value: item.to_string(),
                count: 1,
            }),
        }
    }
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked
}
