use crate::config::GitHubConfig;
use crate::hosted::HostedPlatform;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use workmate_agents::{Agent, AgentDescriptor, CapabilitySet, PlatformAgent, SimulatedAgent};
use workmate_core::{AgentResponse, Payload, Task, WorkmateError, WorkmateResult};

/// Task types the GitHub platform accepts.
pub const GITHUB_TASK_TYPES: [&str; 6] = [
    "github_create_issue",
    "github_create_pr",
    "github_list_repos",
    "github_update_repo",
    "code_review",
    "repository_management",
];

const USER_AGENT: &str = concat!("workmate/", env!("CARGO_PKG_VERSION"));

/// Minimal GitHub REST client.
#[derive(Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

/// Issue fields returned by `POST /repos/{owner}/{repo}/issues`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedIssue {
    pub number: u64,
    pub html_url: String,
}

impl GitHubClient {
    pub fn new(config: &GitHubConfig) -> WorkmateResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| WorkmateError::Http(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token: config.token.clone().filter(|t| !t.trim().is_empty()),
        })
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = request.header("Accept", "application/vnd.github+json");
        match &self.token {
            Some(token) => request.header("Authorization", format!("token {token}")),
            None => request,
        }
    }

    /// Create an issue. Non-201 responses become `WorkmateError::Platform`
    /// carrying the response body.
    pub async fn create_issue(
        &self,
        repository: &str,
        title: &str,
        body: &str,
    ) -> WorkmateResult<CreatedIssue> {
        let url = format!("{}/repos/{repository}/issues", self.base_url);
        let response = self
            .authorized(self.http.post(&url))
            .json(&serde_json::json!({ "title": title, "body": body }))
            .send()
            .await
            .map_err(|e| WorkmateError::Http(e.to_string()))?;

        let status = response.status();
        if status != reqwest::StatusCode::CREATED {
            let text = response.text().await.unwrap_or_default();
            return Err(WorkmateError::Platform(format!(
                "GitHub returned {status}: {text}"
            )));
        }

        response
            .json::<CreatedIssue>()
            .await
            .map_err(|e| WorkmateError::Http(format!("Invalid issue response: {e}")))
    }

    /// `GET /user` with the configured token.
    pub async fn authenticated_user_ok(&self) -> WorkmateResult<bool> {
        if self.token.is_none() {
            return Ok(false);
        }
        let response = self
            .authorized(self.http.get(format!("{}/user", self.base_url)))
            .send()
            .await
            .map_err(|e| WorkmateError::Http(e.to_string()))?;
        Ok(response.status().is_success())
    }

    /// `GET /` without credentials.
    pub async fn ping(&self) -> WorkmateResult<bool> {
        let response = self
            .http
            .get(&self.base_url)
            .send()
            .await
            .map_err(|e| WorkmateError::Http(e.to_string()))?;
        Ok(response.status().is_success())
    }
}

/// Creates and manages GitHub issues.
///
/// Without a token the agent runs in simulation mode and reports a
/// placeholder issue instead of calling the API.
pub struct GitHubIssueAgent {
    descriptor: AgentDescriptor,
    capabilities: CapabilitySet,
    client: GitHubClient,
    default_repository: String,
}

impl GitHubIssueAgent {
    pub fn new(client: GitHubClient, default_repository: impl Into<String>) -> Self {
        Self {
            descriptor: AgentDescriptor::new(
                "github_issue_agent",
                "GitHub Issue Agent",
                "Creates and manages GitHub issues",
            ),
            capabilities: CapabilitySet::new([
                "github_create_issue",
                "github_update_issue",
                "github_list_issues",
            ]),
            client,
            default_repository: default_repository.into(),
        }
    }

    async fn create_issue(&self, task: &mut Task) -> AgentResponse {
        let repository = task
            .param_str("repository", &self.default_repository)
            .to_string();
        let title = task.param_str("title", "New Issue").to_string();
        let description = task.param_str("description", "").to_string();

        if !self.client.has_token() {
            warn!(task_id = %task.id, "GitHub token not configured; simulating issue creation");
            let mut result = Payload::new();
            result.insert("issue_id".into(), "simulated_123".into());
            result.insert("repository".into(), repository.clone().into());
            result.insert("title".into(), title.into());
            result.insert("description".into(), description.into());
            result.insert(
                "url".into(),
                format!("https://github.com/{repository}/issues/123").into(),
            );
            result.insert("simulated".into(), true.into());
            task.complete(result.clone());
            return AgentResponse::ok(
                "GitHub token not configured. Issue created in simulation mode.",
            )
            .with_data(result);
        }

        match self
            .client
            .create_issue(&repository, &title, &description)
            .await
        {
            Ok(issue) => {
                let mut result = Payload::new();
                result.insert("issue_id".into(), issue.number.into());
                result.insert("repository".into(), repository.into());
                result.insert("url".into(), issue.html_url.into());
                task.complete(result.clone());

                info!(task_id = %task.id, issue = issue.number, "GitHub issue created");
                AgentResponse::ok(format!(
                    "Successfully created GitHub issue #{}",
                    issue.number
                ))
                .with_data(result)
            }
            Err(WorkmateError::Platform(detail)) => {
                let message = format!("Failed to create GitHub issue: {detail}");
                error!(task_id = %task.id, %message);
                task.fail(message.as_str());
                AgentResponse::failed(message)
            }
            Err(e) => {
                let message = format!("Error creating GitHub issue: {e}");
                error!(task_id = %task.id, %message);
                task.fail(message.as_str());
                AgentResponse::failed(message)
            }
        }
    }

    // The REST client only covers issue creation; updates and listings are
    // reported in simulation mode.
    fn simulated_issue_update(&self, task: &mut Task) -> AgentResponse {
        let repository = task
            .param_str("repository", &self.default_repository)
            .to_string();
        let Some(number) = task
            .payload
            .get("issue_number")
            .and_then(serde_json::Value::as_u64)
        else {
            let message = "Missing issue_number for GitHub issue update";
            task.fail(message);
            return AgentResponse::failed(message);
        };

        let mut result = Payload::new();
        result.insert("issue_id".into(), number.into());
        result.insert("repository".into(), repository.into());
        result.insert("simulated".into(), true.into());
        task.complete(result.clone());
        AgentResponse::ok(format!("GitHub issue #{number} updated in simulation mode."))
            .with_data(result)
    }

    fn simulated_issue_list(&self, task: &mut Task) -> AgentResponse {
        let repository = task
            .param_str("repository", &self.default_repository)
            .to_string();
        let mut result = Payload::new();
        result.insert("repository".into(), repository.clone().into());
        result.insert("issues".into(), serde_json::Value::Array(Vec::new()));
        result.insert("simulated".into(), true.into());
        task.complete(result.clone());
        AgentResponse::ok(format!("Listed issues for {repository} in simulation mode."))
            .with_data(result)
    }
}

#[async_trait]
impl Agent for GitHubIssueAgent {
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
            "github_create_issue" => self.create_issue(task).await,
            "github_update_issue" => self.simulated_issue_update(task),
            "github_list_issues" => self.simulated_issue_list(task),
            other => AgentResponse::failed(format!("Unsupported task type: {other}")),
        }
    }
}

/// GitHub platform: issues, repositories, and pull requests.
///
/// Delegation works as for the hosted platforms; only the probes reach the
/// real API.
pub struct GitHubPlatform {
    hosted: HostedPlatform,
    client: GitHubClient,
}

impl GitHubPlatform {
    pub fn new(config: &GitHubConfig) -> WorkmateResult<Self> {
        let client = GitHubClient::new(config)?;
        let hosted = HostedPlatform::new(
            "github",
            AgentDescriptor::new(
                "github_platform",
                "GitHub Platform Agent",
                "Manages GitHub repositories, issues, and pull requests",
            ),
            CapabilitySet::new(GITHUB_TASK_TYPES),
        )
        .with_sub_agent(Arc::new(GitHubIssueAgent::new(
            client.clone(),
            config.default_repository.clone(),
        )))
        .with_sub_agent(Arc::new(SimulatedAgent::new(
            AgentDescriptor::new(
                "github_repo_agent",
                "GitHub Repository Agent",
                "Manages GitHub repositories and settings",
            ),
            CapabilitySet::new([
                "github_list_repos",
                "github_update_repo",
                "repository_management",
            ]),
            "Repository management",
        )))
        .with_sub_agent(Arc::new(SimulatedAgent::new(
            AgentDescriptor::new(
                "github_pr_agent",
                "GitHub Pull Request Agent",
                "Creates and manages GitHub pull requests",
            ),
            CapabilitySet::new(["github_create_pr", "code_review"]),
            "Pull request",
        )));

        Ok(Self { hosted, client })
    }
}

#[async_trait]
impl Agent for GitHubPlatform {
    fn descriptor(&self) -> &AgentDescriptor {
        self.hosted.descriptor()
    }

    fn supports(&self, task: &Task) -> bool {
        self.hosted.supports(task)
    }

    fn capabilities(&self) -> BTreeSet<String> {
        self.hosted.capabilities()
    }

    async fn execute(&self, task: &mut Task) -> AgentResponse {
        self.hosted.execute(task).await
    }
}

#[async_trait]
impl PlatformAgent for GitHubPlatform {
    fn platform_name(&self) -> &str {
        self.hosted.platform_name()
    }

    fn sub_agents(&self) -> &[Arc<dyn Agent>] {
        self.hosted.sub_agents()
    }

    async fn authenticate(&self) -> WorkmateResult<bool> {
        self.client.authenticated_user_ok().await
    }

    async fn test_connection(&self) -> WorkmateResult<bool> {
        self.client.ping().await
    }
}
