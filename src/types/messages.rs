//! Message and conversation turn types
//!
//! An inbound `Message` is immutable once created by the transport layer.
//! `ConversationTurn` is the unit persisted in the memory store after a
//! reply is finalized; ordering is append-only per (user_id, session_id).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Inbound user message, produced by the transport collaborator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub user_id: String,
    pub text: String,
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
}

impl Message {
    /// Create a message stamped with the current time
    pub fn new(user_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            text: text.into(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Speaker role of a persisted conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One logged user or assistant message in persisted conversation history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub user_id: String,
    pub session_id: String,
    pub role: Role,
    pub text: String,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
}

impl ConversationTurn {
    /// Create a turn stamped with the current time
    pub fn new(
        user_id: impl Into<String>,
        session_id: impl Into<String>,
        role: Role,
        text: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            session_id: session_id.into(),
            role,
            text: text.into(),
            metadata: HashMap::new(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Attach a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_timestamped() {
        let msg = Message::new("u1", "I ran 5 km");
        assert_eq!(msg.user_id, "u1");
        assert!(msg.timestamp > 0);
    }

    #[test]
    fn test_turn_serialization() {
        let turn = ConversationTurn::new("u1", "default", Role::Assistant, "Nice run!")
            .with_metadata("intent", serde_json::json!("log_activity"));

        let json = serde_json::to_string(&turn).unwrap();
        assert!(json.contains("\"assistant\""));

        let back: ConversationTurn = serde_json::from_str(&json).unwrap();
        assert_eq!(back.role, Role::Assistant);
        assert_eq!(back.metadata["intent"], serde_json::json!("log_activity"));
    }

    #[test]
    fn test_role_wire_names() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&Role::Assistant).unwrap(),
            "\"assistant\""
        );
    }
}
