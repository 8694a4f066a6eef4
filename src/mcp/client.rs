//! HTTP client for the MCP server
//!
//! Posts JSON-RPC-style envelopes ({"method": ..., "params": ...}) to the
//! configured base URL. All failures map to `AgentError::RemoteServiceError`;
//! the Logger agent converts those into failed `AgentResult`s.

use crate::config::McpConfig;
use crate::errors::{AgentError, Result};
use crate::mcp::{RemoteService, ToolDescriptor};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

/// HTTP client for the fitness-tracking MCP server
#[derive(Debug, Clone)]
pub struct McpClient {
    client: Client,
    base_url: String,
}

impl McpClient {
    pub fn new(config: &McpConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(AgentError::HttpError)?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post(&self, body: Value) -> Result<Value> {
        let response = self
            .client
            .post(&self.base_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                AgentError::RemoteServiceError(format!("Failed to reach MCP server: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(AgentError::RemoteServiceError(format!(
                "MCP server returned HTTP {}",
                response.status()
            )));
        }

        response.json().await.map_err(|e| {
            AgentError::RemoteServiceError(format!("Failed to parse MCP response: {}", e))
        })
    }
}

#[async_trait]
impl RemoteService for McpClient {
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>> {
        let result = self
            .post(json!({
                "method": "tools/list",
                "params": {}
            }))
            .await?;

        let tools = result
            .get("result")
            .and_then(|r| r.get("tools"))
            .cloned()
            .unwrap_or(Value::Array(vec![]));

        let tools: Vec<ToolDescriptor> = serde_json::from_value(tools).map_err(|e| {
            AgentError::RemoteServiceError(format!("Malformed tool list: {}", e))
        })?;

        debug!(count = tools.len(), "discovered MCP tools");
        Ok(tools)
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> Result<String> {
        let result = self
            .post(json!({
                "method": "tools/call",
                "params": {
                    "name": name,
                    "arguments": arguments
                }
            }))
            .await?;

        if let Some(inner) = result.get("result") {
            let content = inner.get("content").cloned().unwrap_or(Value::Null);
            return Ok(match content {
                Value::String(s) => s,
                Value::Null => "Tool executed successfully".to_string(),
                other => other.to_string(),
            });
        }

        let message = result
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
            .unwrap_or("Unknown error")
            .to_string();

        Err(AgentError::RemoteServiceError(format!(
            "Tool '{}' execution failed: {}",
            name, message
        )))
    }
}
