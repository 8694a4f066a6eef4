//! Self-hosted Ollama provider
//!
//! Talks to an Ollama instance via POST /api/generate (non-streaming) and
//! probes /api/version for reachability.

use crate::config::LlmConfig;
use crate::errors::{AgentError, Result};
use crate::gateway::{GenerateParams, TextGenerator};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Ollama text-generation provider
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaProvider {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(AgentError::HttpError)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl TextGenerator for OllamaProvider {
    fn id(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str, params: &GenerateParams) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);

        let request = OllamaGenerateRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            stream: false,
            options: OllamaOptions {
                temperature: params.temperature,
                num_predict: params.max_tokens,
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
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

        let body: OllamaGenerateResponse = response
            .json()
            .await
            .map_err(|e| AgentError::GatewayError(format!("Failed to parse response: {}", e)))?;

        Ok(body.response)
    }

    async fn is_reachable(&self) -> bool {
        let url = format!("{}/api/version", self.base_url);

        match self
            .client
            .get(&url)
            .timeout(Duration::from_secs(2))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

/// Ollama generate request
#[derive(Debug, Clone, Serialize)]
struct OllamaGenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Clone, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

/// Ollama generate response (non-streaming)
#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_creation() {
        let config = LlmConfig::default();
        let provider = OllamaProvider::new(&config).unwrap();

        assert_eq!(provider.id(), "ollama");
        assert_eq!(provider.model(), "qwen2.5:7b-instruct");
        assert_eq!(provider.base_url(), "http://127.0.0.1:11434");
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let config = LlmConfig {
            base_url: "http://localhost:11434/".to_string(),
            ..LlmConfig::default()
        };
        let provider = OllamaProvider::new(&config).unwrap();
        assert_eq!(provider.base_url(), "http://localhost:11434");
    }

    #[test]
    fn test_request_serialization() {
        let request = OllamaGenerateRequest {
            model: "llama3.1:8b".to_string(),
            prompt: "hello".to_string(),
            stream: false,
            options: OllamaOptions {
                temperature: 0.1,
                num_predict: 300,
            },
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["stream"], serde_json::json!(false));
        assert_eq!(json["options"]["num_predict"], serde_json::json!(300));
    }
}
