//! Configuration type definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_api_base() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_history_window() -> usize {
    20
}

fn default_max_iterations() -> u32 {
    10
}

fn default_retrieval_top_k() -> usize {
    3
}

fn default_call_timeout_secs() -> u64 {
    30
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8330
}

fn default_cache_capacity() -> usize {
    100
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Agent loop tuning.
    #[serde(default)]
    pub agent: AgentConfig,
    /// Model provider settings.
    #[serde(default)]
    pub provider: ProviderConfig,
    /// HTTP gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,
    /// Data directory for catalog files, policy docs, users, and sessions.
    /// Empty string means `~/.orbitdesk/data`.
    #[serde(default)]
    pub data_dir: String,
}

/// Conversation loop parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Number of recent turns included as model context.
    #[serde(default = "default_history_window")]
    pub history_window: usize,
    /// Maximum model calls per user turn before forcing the fallback.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    /// Top-k passages for the retrieval fallback and the policy-search tool.
    #[serde(default = "default_retrieval_top_k")]
    pub retrieval_top_k: usize,
    /// Wall-clock timeout for each model call and each tool invocation.
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            history_window: default_history_window(),
            max_iterations: default_max_iterations(),
            retrieval_top_k: default_retrieval_top_k(),
            call_timeout_secs: default_call_timeout_secs(),
        }
    }
}

/// Model provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API key. Usually supplied via `GEMINI_API_KEY` instead of the file.
    #[serde(default)]
    pub api_key: String,
    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,
    /// API base URL (overridable for tests and proxies).
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            api_base: default_api_base(),
        }
    }
}

/// HTTP gateway settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Response cache capacity (normalized message -> prior outcome).
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cache_capacity: default_cache_capacity(),
        }
    }
}

impl Config {
    /// Resolved data directory (defaults to `~/.orbitdesk/data`).
    pub fn data_path(&self) -> PathBuf {
        if self.data_dir.is_empty() {
            Self::dir().join("data")
        } else {
            PathBuf::from(&self.data_dir)
        }
    }

    /// Directory where sessions are persisted.
    pub fn sessions_path(&self) -> PathBuf {
        self.data_path().join("sessions")
    }
}
