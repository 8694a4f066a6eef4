//! External interface types
//!
//! The HTTP transport itself is an external collaborator; this module
//! defines the request/response payloads it exchanges with the
//! orchestrator, plus the memory-management and health surfaces.

pub mod frames;

pub use frames::{Delta, FrameBuilder, FrameChoice, FrameMetadata, StreamFrame, STREAM_DONE_MARKER};

use crate::errors::{AgentError, Result};
use serde::{Deserialize, Serialize};

/// Inbound chat request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub user_id: String,
    pub message: String,
    #[serde(default = "default_session")]
    pub session_id: String,
    #[serde(default)]
    pub stream: bool,
}

fn default_session() -> String {
    "default".to_string()
}

impl ChatRequest {
    pub fn new(user_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            message: message.into(),
            session_id: default_session(),
            stream: false,
        }
    }

    /// Reject malformed input before classification with a client-facing
    /// validation error
    pub fn validate(&self) -> Result<()> {
        if self.user_id.trim().is_empty() {
            return Err(AgentError::InvalidRequest(
                "user_id is required".to_string(),
            ));
        }
        if self.message.trim().is_empty() {
            return Err(AgentError::InvalidRequest(
                "message is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// One entry in the per-request execution log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentLog {
    pub agent: String,
    pub action: String,
    pub details: String,
}

/// Non-streaming reply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub logs: Vec<AgentLog>,
}

/// Liveness/readiness report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    pub llm_provider: String,
    pub model: String,
    pub provider_reachable: bool,
}

/// Per-session memory statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryStats {
    pub user_id: String,
    pub session_id: String,
    pub has_memory: bool,
    pub message_count: usize,
}

/// Store-wide memory statistics
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GlobalMemoryStats {
    pub total_sessions: usize,
    pub total_messages: usize,
}
