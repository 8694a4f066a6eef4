//! Error types for the FitBuddy orchestration engine
//!
//! Every remote failure (model provider, MCP service) is caught at the
//! agent boundary and folded into an `AgentResult`; the variants here are
//! internal plumbing plus the one client-facing case, `InvalidRequest`.

use thiserror::Error;

/// Main error type for the multi-agent system
#[derive(Error, Debug)]
pub enum AgentError {
    /// Malformed inbound request, rejected before classification
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Request state machine transition errors
    #[error("Invalid state transition from {from:?} to {to:?}: {reason}")]
    InvalidTransition {
        from: String,
        to: String,
        reason: String,
    },

    /// Intent classification errors
    #[error("Classification failed: {0}")]
    ClassificationError(String),

    /// Model provider errors
    #[error("Gateway error: {0}")]
    GatewayError(String),

    /// MCP remote service errors
    #[error("Remote service error: {0}")]
    RemoteServiceError(String),

    /// Conversation memory errors
    #[error("Memory error: {0}")]
    MemoryError(String),

    /// Streaming errors
    #[error("Streaming error: {0}")]
    StreamingError(String),

    /// Timeout errors
    #[error("Operation timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Generic errors with context
    #[error("Agent error: {0}")]
    Generic(String),
}

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Convert anyhow errors to AgentError
impl From<anyhow::Error> for AgentError {
    fn from(err: anyhow::Error) -> Self {
        AgentError::Generic(err.to_string())
    }
}
