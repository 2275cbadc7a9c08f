use crate::agent::Agent;
use async_trait::async_trait;
use std::sync::Arc;
use workmate_core::WorkmateResult;

/// An agent that fronts one external service (GitHub, Gmail, ...).
///
/// The probes feed status reporting only; they never gate dispatch. An `Err`
/// from a probe is reported as "down" by the caller.
#[async_trait]
pub trait PlatformAgent: Agent {
    /// Short platform key such as `"github"`.
    fn platform_name(&self) -> &str;

    /// The leaf executors behind this platform, in delegation order.
    fn sub_agents(&self) -> &[Arc<dyn Agent>];

    async fn authenticate(&self) -> WorkmateResult<bool>;

    async fn test_connection(&self) -> WorkmateResult<bool>;
}
