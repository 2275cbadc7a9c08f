//! Core types and error definitions for the workmate assistant.
//!
//! This crate provides the value types that flow through the dispatch
//! pipeline: tasks produced by personas or callers, the uniform response
//! envelope returned by every executor, and the error type used at the
//! collaborator seams.
//!
//! # Main types
//!
//! - [`WorkmateError`]: Unified error enum for all workmate subsystems.
//! - [`WorkmateResult`]: Convenience alias for `Result<T, WorkmateError>`.
//! - [`Task`]: A unit of automatable work with a type, payload, and status.
//! - [`TaskStatus`]: Forward-only lifecycle of a task.
//! - [`TaskPriority`]: Informational priority attached to a task.
//! - [`AgentResponse`]: Result envelope of any execution attempt.

/// Error types.
pub mod error;
/// Uniform execution-result envelope.
pub mod response;
/// Task model and lifecycle helpers.
pub mod task;

pub use error::{WorkmateError, WorkmateResult};
pub use response::{AgentResponse, DEFAULT_CLARIFICATION_QUESTION, DEFAULT_FAILURE_MESSAGE};
pub use task::{Payload, Task, TaskPriority, TaskStatus};
