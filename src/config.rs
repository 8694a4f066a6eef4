//! Configuration loading
//!
//! Reads `~/.fitbuddy/config.toml`, creating it with defaults on first
//! load. Provider choice is static configuration, read once at process
//! start, never decided per-request.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub mcp: McpConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
}

/// Text-generation provider variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Cloud-hosted, OpenAI chat-completions API
    Openai,
    /// Self-hosted Ollama instance
    Ollama,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: ProviderKind,
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    /// Per-call timeout for generation requests
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Ollama,
            base_url: "http://127.0.0.1:11434".to_string(),
            api_key: None,
            model: "qwen2.5:7b-instruct".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct McpConfig {
    /// Base URL of the fitness-tracking MCP server
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for McpConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080/mcp".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Retention policy variants for conversation memory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetentionKind {
    /// Keep only the last `max_turns` turns
    BoundedWindow,
    /// Collapse evicted turns into a rolling summary
    Summarizing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    pub retention: RetentionKind,
    /// Maximum turns kept verbatim per (user, session)
    pub max_turns: usize,
    /// Turns handed to the classifier as recent context
    pub history_limit: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            retention: RetentionKind::BoundedWindow,
            max_turns: 20,
            history_limit: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Pattern-match confidence below which classification escalates to
    /// the Model Gateway
    pub escalation_threshold: f64,
    /// Overall request deadline; on expiry synthesis is forced with
    /// whatever agent results are available
    pub request_deadline_secs: u64,
    /// Character size of each streamed content delta
    pub stream_chunk_chars: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            escalation_threshold: 0.55,
            request_deadline_secs: 60,
            stream_chunk_chars: 24,
        }
    }
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            let config = Config::default();
            config.save()?;
            return Ok(config);
        }

        let contents =
            fs::read_to_string(&config_path).context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let toml_string = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&config_path, toml_string).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;

        Ok(home.join(".fitbuddy").join("config.toml"))
    }
}
