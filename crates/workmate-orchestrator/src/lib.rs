//! Routing, orchestration, and evaluation on top of the platform executors.
//!
//! A task enters through the [`Dispatcher`], which looks its type up in the
//! static [`router`] table and hands it to the owning platform. Batches run
//! serially (stopping at the first hard failure) or in parallel. The
//! [`Evaluator`] scores each outcome and proposes follow-up tasks, and
//! [`AssistantContext`] wires the two together.
//!
//! # Main types
//!
//! - [`Dispatcher`]: Platform registry, task history, and batch orchestration.
//! - [`Evaluator`]: Deterministic scoring, follow-up generation, and summaries.
//! - [`AssistantContext`]: Dispatch → evaluate → follow-up pipeline and system status.
//! - [`DispatchMonitor`]: Per-platform dispatch counters.
//! - [`ExecutionMode`] / [`WorkflowReport`]: Batch sequencing and its outcome.

/// Process-wide wiring of dispatcher and evaluator.
pub mod context;
/// Top-level task dispatcher.
pub mod dispatcher;
/// Rule-based evaluation and follow-up generation.
pub mod evaluator;
/// Per-platform dispatch metrics.
pub mod monitor;
/// Static task-type to platform table.
pub mod router;
/// Execution modes, subtask descriptors, and workflow reports.
pub mod workflow;

pub use context::{
    AssistantContext, PlatformInfo, ProcessedTask, SubAgentInfo, SystemHealth, SystemStatus,
};
pub use dispatcher::{Dispatcher, DISPATCHER_ID};
pub use evaluator::{
    Evaluation, EvaluationSummary, Evaluator, FollowUpDescriptor, ImprovementOpportunity,
    RankedEntry, EVALUATOR_ID, EVALUATOR_TASK_TYPES,
};
pub use monitor::{DispatchMonitor, MonitorSnapshot, PlatformMetrics};
pub use router::{platform_for, task_types_for, PLATFORM_ROUTES};
pub use workflow::{ExecutionMode, SubtaskSpec, WorkflowReport, WorkflowStepResult};
