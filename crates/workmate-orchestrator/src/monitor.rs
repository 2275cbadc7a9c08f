use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use workmate_core::AgentResponse;

/// Counters for one platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformMetrics {
    pub dispatched: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub clarifications: u64,
    pub duration_ms: u64,
}

/// Point-in-time copy of the monitor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitorSnapshot {
    pub platforms: BTreeMap<String, PlatformMetrics>,
    /// Tasks that never reached a platform.
    pub unrouted: u64,
}

impl MonitorSnapshot {
    pub fn total_dispatched(&self) -> u64 {
        self.platforms.values().map(|m| m.dispatched).sum::<u64>() + self.unrouted
    }
}

#[derive(Default)]
struct MonitorState {
    platforms: BTreeMap<String, PlatformMetrics>,
    unrouted: u64,
}

/// Tracks dispatch outcomes per platform.
pub struct DispatchMonitor {
    state: Arc<RwLock<MonitorState>>,
}

impl DispatchMonitor {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(MonitorState::default())),
        }
    }

    /// Record a response returned by `platform`.
    pub async fn record_dispatch(&self, platform: &str, response: &AgentResponse, duration_ms: u64) {
        let mut state = self.state.write().await;
        let metrics = state.platforms.entry(platform.to_string()).or_default();
        metrics.dispatched += 1;
        metrics.duration_ms += duration_ms;
        if response.is_success() {
            metrics.succeeded += 1;
        } else if response.requires_clarification() {
            metrics.clarifications += 1;
        } else {
            metrics.failed += 1;
        }
    }

    /// Record a task with no platform to go to.
    pub async fn record_unrouted(&self) {
        self.state.write().await.unrouted += 1;
    }

    pub async fn get_metrics(&self, platform: &str) -> Option<PlatformMetrics> {
        self.state.read().await.platforms.get(platform).cloned()
    }

    pub async fn snapshot(&self) -> MonitorSnapshot {
        let state = self.state.read().await;
        MonitorSnapshot {
            platforms: state.platforms.clone(),
            unrouted: state.unrouted,
        }
    }

    /// Serialize the current counters as JSON.
    pub async fn to_json(&self) -> serde_json::Value {
        let snapshot = self.snapshot().await;
        serde_json::json!({
            "platforms": snapshot.platforms,
            "unrouted": snapshot.unrouted,
            "total_dispatched": snapshot.total_dispatched(),
        })
    }
}

impl Default for DispatchMonitor {
    fn default() -> Self {
        Self::new()
    }
}
