//! Platform executors for the services workmate automates.
//!
//! Each platform is a [`PlatformAgent`] that owns a supervisor over a few
//! focused sub-agents. GitHub issue creation talks to the REST API when a
//! token is configured; everything else is simulated in-process.

/// Platform configuration (`[github]`, `[gmail]`, `[jira]`, `[calendar]`).
pub mod config;
/// Calendar scheduling.
pub mod calendar;
/// GitHub issues, repositories, and pull requests.
pub mod github;
/// Gmail sending and inbox management.
pub mod gmail;
/// Generic in-process platform wrapper.
pub mod hosted;
/// Jira tickets and projects.
pub mod jira;

pub use calendar::{calendar_platform, CalendarSchedulerAgent, CALENDAR_TASK_TYPES};
pub use config::{CalendarConfig, GitHubConfig, GmailConfig, JiraConfig, PlatformsConfig};
pub use github::{GitHubClient, GitHubIssueAgent, GitHubPlatform, GITHUB_TASK_TYPES};
pub use gmail::{gmail_platform, EmailSenderAgent, GMAIL_TASK_TYPES};
pub use hosted::HostedPlatform;
pub use jira::{jira_platform, JiraTicketAgent, JIRA_TASK_TYPES};

use std::sync::Arc;
use tracing::info;
use workmate_agents::PlatformAgent;
use workmate_core::WorkmateResult;

/// Build every enabled platform from config, in a fixed order.
pub fn default_platforms(config: &PlatformsConfig) -> WorkmateResult<Vec<Arc<dyn PlatformAgent>>> {
    let mut platforms: Vec<Arc<dyn PlatformAgent>> = Vec::new();

    if config.github.enabled {
        platforms.push(Arc::new(GitHubPlatform::new(&config.github)?));
    }
    if config.gmail.enabled {
        platforms.push(Arc::new(gmail_platform(&config.gmail)));
    }
    if config.jira.enabled {
        platforms.push(Arc::new(jira_platform(&config.jira)));
    }
    if config.calendar.enabled {
        platforms.push(Arc::new(calendar_platform(&config.calendar)));
    }

    info!(count = platforms.len(), "Platforms built");
    Ok(platforms)
}
