//! MCP-style remote fitness-tracking service
//!
//! The Logger agent talks to the external tracking backend through the
//! `RemoteService` trait: capability discovery (`tools/list`) plus remote
//! invocation (`tools/call`). The HTTP implementation lives in `client`.

pub mod client;

pub use client::McpClient;

use crate::errors::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One discoverable operation exposed by the remote service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "inputSchema")]
    pub input_schema: serde_json::Value,
}

/// Capability-discovery + remote-call interface to the tracking backend
#[async_trait]
pub trait RemoteService: Send + Sync {
    /// List the operations the service currently exposes
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>>;

    /// Invoke one operation with JSON arguments, returning its text content
    async fn call_tool(&self, name: &str, arguments: serde_json::Value) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_descriptor_deserialization() {
        let json = r#"{
            "name": "log_activity",
            "description": "Record a fitness activity",
            "inputSchema": {"type": "object", "properties": {"user_id": {"type": "string"}}}
        }"#;

        let tool: ToolDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(tool.name, "log_activity");
        assert_eq!(tool.input_schema["type"], "object");
    }

    #[test]
    fn test_tool_descriptor_defaults() {
        let tool: ToolDescriptor = serde_json::from_str(r#"{"name": "get_user_stats"}"#).unwrap();
        assert!(tool.description.is_empty());
        assert!(tool.input_schema.is_null());
    }
}
