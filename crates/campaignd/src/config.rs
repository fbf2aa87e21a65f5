//! Configuration management for campaignd.
//!
//! Loads settings from a TOML file (or defaults), then applies environment
//! overrides. `.env` is read in `main` before this runs.

use anyhow::{Context, Result};
use campaign_common::LlmConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{info, warn};

/// Config file path used when none is given
pub const CONFIG_PATH: &str = "/etc/campaignd/config.toml";

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

fn default_port() -> u16 {
    3000
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind_addr: default_bind_addr(),
        }
    }
}

impl ServerConfig {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

/// Full daemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub llm: LlmConfig,
}

impl Config {
    /// Load from an explicit path (must exist), else `CONFIG_PATH`, else defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Self::load_or_default(Path::new(CONFIG_PATH)),
        }
    }

    /// Load config from `path`, or defaults if it does not exist.
    ///
    /// Unreadable or malformed files are errors.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(content) => Self::parse(&content, path),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No config at {}, using defaults", path.display());
                Ok(Config::default())
            }
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    /// Load config from specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content, path)
    }

    fn parse(content: &str, path: &Path) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from `lookup`.
    ///
    /// Recognised keys: `ANTHROPIC_API_KEY`, `CLAUDE_MODEL`,
    /// `ANTHROPIC_BASE_URL`, `PORT`. Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("ANTHROPIC_API_KEY") {
            self.llm.api_key = Some(key);
        }
        if let Some(model) = get("CLAUDE_MODEL") {
            self.llm.model = model;
        }
        if let Some(endpoint) = get("ANTHROPIC_BASE_URL") {
            self.llm.endpoint = endpoint;
        }
        if let Some(port) = get("PORT") {
            match port.trim().parse::<u16>() {
                Ok(port) => self.server.port = port,
                Err(_) => warn!("Ignoring invalid PORT value: {}", port),
            }
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.llm.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.listen_addr(), "0.0.0.0:3000");
        assert_eq!(config.llm.model, "claude-3-5-sonnet-20241022");
        assert_eq!(config.llm.max_tokens, 4000);
        assert!(!config.has_api_key());
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
[server]
port = 8080

[llm]
model = "claude-3-5-haiku-20241022"
timeout_secs = 30
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.bind_addr, "0.0.0.0");
        assert_eq!(config.llm.model, "claude-3-5-haiku-20241022");
        assert_eq!(config.llm.timeout_secs, 30);
        // Defaults for missing fields
        assert_eq!(config.llm.max_tokens, 4000);
        assert_eq!(config.llm.endpoint, "https://api.anthropic.com");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_overrides(env(&[
            ("ANTHROPIC_API_KEY", "sk-test"),
            ("CLAUDE_MODEL", "claude-custom"),
            ("PORT", "4100"),
        ]));

        assert!(config.has_api_key());
        assert_eq!(config.llm.model, "claude-custom");
        assert_eq!(config.server.port, 4100);
    }

    #[test]
    fn test_invalid_and_empty_overrides_ignored() {
        let mut config = Config::default();
        config.apply_overrides(env(&[("PORT", "not-a-port"), ("CLAUDE_MODEL", "  ")]));

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.llm.model, "claude-3-5-sonnet-20241022");
    }

    #[test]
    fn test_load_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nport = 9000").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.server.port, 9000);
    }

    #[test]
    fn test_explicit_missing_path_is_error() {
        let result = Config::load(Some(Path::new("/nonexistent/campaignd.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_default_path_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_malformed_default_path_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nport = \"not a number\"").unwrap();

        let err = Config::load_or_default(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse"));
    }

    #[test]
    fn test_api_key_not_serialized() {
        let mut config = Config::default();
        config.llm.api_key = Some("sk-secret".to_string());
        let rendered = toml::to_string(&config).unwrap();
        assert!(!rendered.contains("sk-secret"));
    }
}
