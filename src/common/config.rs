//! Configuration file handling

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::paths::config_path;
use super::Result;

/// Main configuration structure
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Debug adapter configurations
    #[serde(default)]
    pub adapters: HashMap<String, AdapterConfig>,

    /// Default settings
    #[serde(default)]
    pub defaults: Defaults,

    /// Timeout settings
    #[serde(default)]
    pub timeouts: Timeouts,
}

/// Configuration for a debug adapter
#[derive(Debug, Deserialize, Clone)]
pub struct AdapterConfig {
    /// Path to the adapter executable
    pub path: PathBuf,

    /// Additional arguments to pass to the adapter
    #[serde(default)]
    pub args: Vec<String>,

    /// Language this adapter debugs, overrides `defaults.language`
    #[serde(default)]
    pub language: Option<String>,
}

/// Default settings
#[derive(Debug, Deserialize)]
pub struct Defaults {
    /// Default adapter to use
    #[serde(default = "default_adapter")]
    pub adapter: String,

    /// Language identifier breakpoint requests must carry
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            adapter: default_adapter(),
            language: default_language(),
        }
    }
}

fn default_adapter() -> String {
    "lldb-dap".to_string()
}

fn default_language() -> String {
    "r".to_string()
}

/// Timeout settings in seconds
#[derive(Debug, Deserialize)]
pub struct Timeouts {
    /// Timeout for DAP initialize request
    #[serde(default = "default_dap_initialize")]
    pub dap_initialize_secs: u64,

    /// Timeout for general DAP requests, including `setBreakpoints`
    #[serde(default = "default_dap_request")]
    pub dap_request_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            dap_initialize_secs: default_dap_initialize(),
            dap_request_secs: default_dap_request(),
        }
    }
}

fn default_dap_initialize() -> u64 {
    10
}
fn default_dap_request() -> u64 {
    30
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = config_path() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }
        Ok(Self::default())
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| super::Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| super::Error::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.defaults.language.trim().is_empty() {
            return Err(super::Error::Config("defaults.language must not be empty".to_string()));
        }
        if self.timeouts.dap_initialize_secs == 0 || self.timeouts.dap_request_secs == 0 {
            return Err(super::Error::Config("timeouts must be at least one second".to_string()));
        }
        Ok(())
    }

    /// Get adapter configuration by name
    ///
    /// Falls back to searching PATH if not explicitly configured
    pub fn get_adapter(&self, name: &str) -> Option<AdapterConfig> {
        if let Some(config) = self.adapters.get(name) {
            return Some(config.clone());
        }

        which::which(name).ok().map(|path| AdapterConfig {
            path,
            args: Vec::new(),
            language: None,
        })
    }

    /// Language the named adapter debugs
    pub fn language_for(&self, adapter: &str) -> String {
        self.adapters
            .get(adapter)
            .and_then(|a| a.language.clone())
            .unwrap_or_else(|| self.defaults.language.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.defaults.adapter, "lldb-dap");
        assert_eq!(config.defaults.language, "r");
        assert_eq!(config.timeouts.dap_initialize_secs, 10);
        assert_eq!(config.timeouts.dap_request_secs, 30);
        assert!(config.adapters.is_empty());
    }

    #[test]
    fn test_adapter_language_overrides_default() {
        let config = Config::parse(
            r#"
            [defaults]
            adapter = "rdap"
            language = "r"

            [adapters.debugpy]
            path = "/usr/bin/debugpy-adapter"
            language = "python"

            [adapters.rdap]
            path = "/opt/rdap/bin/rdap"
            args = ["--stdio"]

            [timeouts]
            dap_request_secs = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.language_for("debugpy"), "python");
        assert_eq!(config.language_for("rdap"), "r");
        assert_eq!(config.timeouts.dap_request_secs, 5);
        assert_eq!(config.timeouts.dap_initialize_secs, 10);

        let rdap = config.get_adapter("rdap").unwrap();
        assert_eq!(rdap.path, PathBuf::from("/opt/rdap/bin/rdap"));
        assert_eq!(rdap.args, vec!["--stdio".to_string()]);
    }

    #[test]
    fn test_invalid_toml_is_config_parse_error() {
        let err = Config::parse("[defaults\nadapter = 1").unwrap_err();
        assert!(matches!(err, crate::Error::ConfigParse(_)));
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let err = Config::parse("[timeouts]\ndap_request_secs = 0\n").unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[defaults]\nlanguage = \"python\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.defaults.language, "python");
    }

    #[test]
    fn test_load_from_missing_file_is_file_read_error() {
        let err = Config::load_from(Path::new("/nonexistent/bpbind/config.toml")).unwrap_err();
        assert!(matches!(err, crate::Error::FileRead { .. }));
    }
}
