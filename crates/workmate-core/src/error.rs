use thiserror::Error;

/// A convenience `Result` alias using [`WorkmateError`].
pub type WorkmateResult<T> = Result<T, WorkmateError>;

/// Top-level error type for the workmate crates.
///
/// Task outcomes are never reported through this type; they travel as
/// [`AgentResponse`](crate::AgentResponse) values. Errors only appear at the
/// collaborator seams (network calls, probes, config, payload decoding).
#[derive(Error, Debug)]
pub enum WorkmateError {
    /// An error raised inside an executor.
    #[error("Agent error: {0}")]
    Agent(String),

    /// An error reported by a platform integration.
    #[error("Platform error: {0}")]
    Platform(String),

    /// A task could not be routed.
    #[error("Routing error: {0}")]
    Routing(String),

    /// Evaluation input was missing or malformed.
    #[error("Evaluation error: {0}")]
    Evaluation(String),

    /// An error in configuration parsing or validation.
    #[error("Config error: {0}")]
    Config(String),

    /// An error from an outbound HTTP request.
    #[error("HTTP error: {0}")]
    Http(String),

    /// A JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
