//! Model Gateway - uniform call surface over text-generation backends
//!
//! Providers are interchangeable behind the `TextGenerator` trait and
//! selected once at startup from configuration. The gateway bounds every
//! call with a timeout and converts provider errors into a sentinel
//! `GenerateOutcome::Unavailable` instead of propagating them, so callers
//! can take a rule-based fallback path rather than crash a request.

pub mod ollama;
pub mod openai;

pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

use crate::api::HealthReport;
use crate::config::{LlmConfig, ProviderKind};
use crate::errors::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Generation parameters passed through to the provider
#[derive(Debug, Clone)]
pub struct GenerateParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerateParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 400,
        }
    }
}

impl GenerateParams {
    /// Low-temperature parameters for classification calls
    pub fn deterministic() -> Self {
        Self {
            temperature: 0.1,
            max_tokens: 300,
        }
    }
}

/// Outcome of a gateway call; provider failures never surface as `Err`
#[derive(Debug, Clone, PartialEq)]
pub enum GenerateOutcome {
    Text(String),
    /// Provider errored or timed out; callers fall back to rule-based paths
    Unavailable { reason: String },
}

impl GenerateOutcome {
    pub fn text(&self) -> Option<&str> {
        match self {
            GenerateOutcome::Text(t) => Some(t),
            GenerateOutcome::Unavailable { .. } => None,
        }
    }
}

/// Capability contract implemented by each provider variant
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Stable provider identifier surfaced in metadata and health checks
    fn id(&self) -> &str;

    /// Model name this provider is configured for
    fn model(&self) -> &str;

    /// Produce a completion for the prompt
    async fn generate(&self, prompt: &str, params: &GenerateParams) -> Result<String>;

    /// Cheap reachability probe
    async fn is_reachable(&self) -> bool;
}

/// Gateway wrapping one provider with timeout and sentinel-failure behavior
pub struct ModelGateway {
    provider: Arc<dyn TextGenerator>,
    timeout: Duration,
}

impl ModelGateway {
    pub fn new(provider: Arc<dyn TextGenerator>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    /// Build the configured provider variant
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let provider: Arc<dyn TextGenerator> = match config.provider {
            ProviderKind::Openai => Arc::new(OpenAiProvider::new(config)?),
            ProviderKind::Ollama => Arc::new(OllamaProvider::new(config)?),
        };

        Ok(Self::new(provider, Duration::from_secs(config.timeout_secs)))
    }

    /// Active provider identity
    pub fn provider_id(&self) -> &str {
        self.provider.id()
    }

    /// Configured model name
    pub fn model(&self) -> &str {
        self.provider.model()
    }

    /// Generate text, always resolving within the configured timeout.
    ///
    /// Errors and timeouts are captured as `GenerateOutcome::Unavailable`;
    /// the caller decides whether to degrade or fall back.
    pub async fn generate(&self, prompt: &str, params: &GenerateParams) -> GenerateOutcome {
        match tokio::time::timeout(self.timeout, self.provider.generate(prompt, params)).await {
            Ok(Ok(text)) => GenerateOutcome::Text(text),
            Ok(Err(e)) => {
                warn!(provider = self.provider.id(), error = %e, "provider call failed");
                GenerateOutcome::Unavailable {
                    reason: e.to_string(),
                }
            }
            Err(_) => {
                warn!(
                    provider = self.provider.id(),
                    timeout_ms = self.timeout.as_millis() as u64,
                    "provider call timed out"
                );
                GenerateOutcome::Unavailable {
                    reason: format!("timed out after {}ms", self.timeout.as_millis()),
                }
            }
        }
    }

    /// Liveness/readiness report for the health surface
    pub async fn health(&self) -> HealthReport {
        let reachable = self.provider.is_reachable().await;
        HealthReport {
            status: if reachable { "healthy" } else { "degraded" }.to_string(),
            llm_provider: self.provider.id().to_string(),
            model: self.provider.model().to_string(),
            provider_reachable: reachable,
        }
    }
}
