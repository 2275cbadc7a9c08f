//! Executor contract and delegation building blocks.
//!
//! Every executor in workmate, from a single-purpose leaf to a whole
//! platform, implements [`Agent`]. Composition happens through
//! [`Supervisor`], which forwards a task to the first active sub-agent whose
//! capability set covers the task type.
//!
//! # Main types
//!
//! - [`Agent`]: Capability check plus async execution of a [`Task`](workmate_core::Task).
//! - [`AgentDescriptor`]: Identifier, display name, and description of an executor.
//! - [`CapabilitySet`]: Fixed set of task types an executor declares.
//! - [`Supervisor`]: Ordered collection of sub-agents with first-match delegation.
//! - [`PlatformAgent`]: An agent fronting an external service, with liveness probes.
//! - [`SimulatedAgent`]: Leaf executor that acknowledges supported tasks without side effects.

/// The executor trait and descriptor.
pub mod agent;
/// Declared task-type capability sets.
pub mod capability;
/// Platform-level executor contract.
pub mod platform;
/// Simulated leaf executor.
pub mod simulated;
/// Composite supervisor with capability-based delegation.
pub mod supervisor;

pub use agent::{Agent, AgentDescriptor};
pub use capability::CapabilitySet;
pub use platform::PlatformAgent;
pub use simulated::SimulatedAgent;
pub use supervisor::Supervisor;
