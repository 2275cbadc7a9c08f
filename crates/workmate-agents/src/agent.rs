use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use workmate_core::{AgentResponse, Task};

/// Metadata identifying an executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentDescriptor {
    /// Stable identifier written into `Task::assigned_agent`.
    pub id: String,
    pub name: String,
    pub description: String,
}

impl AgentDescriptor {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
        }
    }
}

impl std::fmt::Display for AgentDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// Trait that every executor implements, whether a leaf or a supervisor.
///
/// `execute` never fails with an error: every outcome, including failures
/// of external services, is reported as an [`AgentResponse`]. Implementations
/// that talk to the network convert their errors before returning.
#[async_trait]
pub trait Agent: Send + Sync {
    fn descriptor(&self) -> &AgentDescriptor;

    /// Inactive agents are skipped during delegation even when capable.
    fn is_active(&self) -> bool {
        true
    }

    /// Side-effect-free check of whether this agent handles `task`.
    fn supports(&self, task: &Task) -> bool;

    /// Task types this agent declares. Returns an owned copy.
    fn capabilities(&self) -> BTreeSet<String> {
        BTreeSet::new()
    }

    async fn execute(&self, task: &mut Task) -> AgentResponse;
}
