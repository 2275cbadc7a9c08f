use serde::{Deserialize, Serialize};

/// Settings for every platform integration, usually read from the
/// `[github]`, `[gmail]`, `[jira]`, and `[calendar]` tables of the config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlatformsConfig {
    #[serde(default)]
    pub github: GitHubConfig,
    #[serde(default)]
    pub gmail: GmailConfig,
    #[serde(default)]
    pub jira: JiraConfig,
    #[serde(default)]
    pub calendar: CalendarConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Personal access token. Without one, issue creation runs in simulation mode.
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_github_api")]
    pub api_base_url: String,
    /// Repository used when a task payload names none.
    #[serde(default = "default_repository")]
    pub default_repository: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            token: None,
            api_base_url: default_github_api(),
            default_repository: default_repository(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GmailConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Recipient used when a task payload names none.
    #[serde(default = "default_recipient")]
    pub default_recipient: String,
}

impl Default for GmailConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default_recipient: default_recipient(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_jira_url")]
    pub base_url: String,
    #[serde(default = "default_project_key")]
    pub project_key: String,
}

impl Default for JiraConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_jira_url(),
            project_key: default_project_key(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_meeting_url")]
    pub meeting_base_url: String,
    /// Meeting length in minutes when the payload gives none.
    #[serde(default = "default_duration")]
    pub default_duration_minutes: i64,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            meeting_base_url: default_meeting_url(),
            default_duration_minutes: default_duration(),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_github_api() -> String {
    "https://api.github.com".to_string()
}
fn default_repository() -> String {
    "company/default".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_recipient() -> String {
    "example@company.com".to_string()
}
fn default_jira_url() -> String {
    "https://company.atlassian.net".to_string()
}
fn default_project_key() -> String {
    "PROJ".to_string()
}
fn default_meeting_url() -> String {
    "https://meet.company.com".to_string()
}
fn default_duration() -> i64 {
    30
}
