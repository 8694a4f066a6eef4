//! Cloud-hosted OpenAI-compatible provider
//!
//! Talks to a chat-completions endpoint with bearer authentication. Also
//! covers self-hosted OpenAI-compatible servers (vLLM and the like) since
//! only the base URL and key differ.

use crate::config::LlmConfig;
use crate::errors::{AgentError, Result};
use crate::gateway::{GenerateParams, TextGenerator};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// OpenAI-compatible chat-completions provider
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiProvider {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(AgentError::HttpError)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl TextGenerator for OpenAiProvider {
    fn id(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str, params: &GenerateParams) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);

        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: params.temperature,
            max_tokens: params.max_tokens,
            stream: false,
        };

        let mut builder = self.client.post(&url).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| AgentError::GatewayError(format!("Failed to send request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AgentError::GatewayError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AgentError::GatewayError(format!("Failed to parse response: {}", e)))?;

        body.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AgentError::GatewayError("Response contained no choices".to_string()))
    }

    async fn is_reachable(&self) -> bool {
        let url = format!("{}/models", self.base_url);

        let mut builder = self.client.get(&url).timeout(Duration::from_secs(2));
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        match builder.send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderKind;

    fn openai_config() -> LlmConfig {
        LlmConfig {
            provider: ProviderKind::Openai,
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: Some("sk-test".to_string()),
            model: "gpt-4o-mini".to_string(),
            timeout_secs: 20,
        }
    }

    #[test]
    fn test_provider_creation() {
        let provider = OpenAiProvider::new(&openai_config()).unwrap();
        assert_eq!(provider.id(), "openai");
        assert_eq!(provider.model(), "gpt-4o-mini");
    }

    #[test]
    fn test_response_parsing() {
        let json = r#"{
            "choices": [
                {"message": {"role": "assistant", "content": "Keep it up!"}}
            ]
        }"#;

        let body: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(body.choices[0].message.content, "Keep it up!");
    }
}
