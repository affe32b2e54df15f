//! Configuration management
//!
//! Configuration is loaded from `~/.orbitdesk/config.json` with environment
//! variable overrides following the pattern `ORBITDESK_SECTION_KEY`.

mod types;

pub use types::*;

use crate::error::Result;
use std::path::PathBuf;

impl Config {
    /// Returns the OrbitDesk configuration directory path (~/.orbitdesk).
    pub fn dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".orbitdesk")
    }

    /// Returns the path to the config file (~/.orbitdesk/config.json).
    pub fn path() -> PathBuf {
        Self::dir().join("config.json")
    }

    /// Load configuration from the default path with environment overrides.
    ///
    /// If the config file doesn't exist, returns default configuration.
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::path())
    }

    /// Load configuration from a specific path with environment overrides.
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            serde_json::from_str(&content)?
        } else {
            Config::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Save configuration to the default path, creating the directory.
    pub fn save(&self) -> Result<()> {
        std::fs::create_dir_all(Self::dir())?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(Self::path(), content)?;
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("ORBITDESK_AGENT_HISTORY_WINDOW") {
            if let Ok(v) = val.parse() {
                self.agent.history_window = v;
            }
        }
        if let Ok(val) = std::env::var("ORBITDESK_AGENT_MAX_ITERATIONS") {
            if let Ok(v) = val.parse() {
                self.agent.max_iterations = v;
            }
        }
        if let Ok(val) = std::env::var("ORBITDESK_AGENT_RETRIEVAL_TOP_K") {
            if let Ok(v) = val.parse() {
                self.agent.retrieval_top_k = v;
            }
        }
        if let Ok(val) = std::env::var("ORBITDESK_AGENT_CALL_TIMEOUT_SECS") {
            if let Ok(v) = val.parse() {
                self.agent.call_timeout_secs = v;
            }
        }

        if let Ok(val) = std::env::var("ORBITDESK_PROVIDER_MODEL") {
            self.provider.model = val;
        }
        if let Ok(val) = std::env::var("ORBITDESK_PROVIDER_API_BASE") {
            self.provider.api_base = val;
        }
        // GEMINI_API_KEY matches the original deployment; GOOGLE_API_KEY is
        // the documented alternate.
        if let Ok(val) = std::env::var("GEMINI_API_KEY") {
            self.provider.api_key = val;
        } else if let Ok(val) = std::env::var("GOOGLE_API_KEY") {
            self.provider.api_key = val;
        }

        if let Ok(val) = std::env::var("ORBITDESK_GATEWAY_HOST") {
            self.gateway.host = val;
        }
        if let Ok(val) = std::env::var("ORBITDESK_GATEWAY_PORT") {
            if let Ok(v) = val.parse() {
                self.gateway.port = v;
            }
        }
        if let Ok(val) = std::env::var("ORBITDESK_DATA_DIR") {
            self.data_dir = val;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let path = PathBuf::from("/nonexistent/orbitdesk/config.json");
        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.agent.max_iterations, 10);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut f = std::fs::File::create(&path).unwrap();
        write!(f, r#"{{"gateway": {{"port": 9000}}}}"#).unwrap();

        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.gateway.port, 9000);
        assert_eq!(config.gateway.host, "127.0.0.1");
    }

    #[test]
    fn test_load_rejects_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(Config::load_from_path(&path).is_err());
    }
}
