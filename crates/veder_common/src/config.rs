//! Configuration management for Veder.
//!
//! Loads settings from a TOML file or uses defaults. Every field has a
//! default, so a partial file is valid.
//!
//! Lookup order: explicit path, `$VEDER_CONFIG`,
//! `$XDG_CONFIG_HOME/veder/config.toml`, then built-in defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use veder_shared::{Language, Result, VederError};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "VEDER_CONFIG";

/// Generative service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base URL of the generative language API
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Request deadline. Absent means no deadline: a hung service hangs the query.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    #[serde(default = "default_report_temperature")]
    pub report_temperature: f32,

    #[serde(default = "default_market_temperature")]
    pub market_temperature: f32,

    /// Ask the service to ground answers with web search
    #[serde(default = "default_search_grounding")]
    pub search_grounding: bool,
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_model() -> String {
    "gemini-3-pro-preview".to_string()
}

fn default_api_key_env() -> String {
    "API_KEY".to_string()
}

fn default_report_temperature() -> f32 {
    0.0
}

fn default_market_temperature() -> f32 {
    0.1
}

fn default_search_grounding() -> bool {
    true
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            timeout_secs: None,
            report_temperature: default_report_temperature(),
            market_temperature: default_market_temperature(),
            search_grounding: default_search_grounding(),
        }
    }
}

impl ServiceConfig {
    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> Result<String> {
        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
            _ => Err(VederError::Config(format!(
                "API key not set: export {} before running",
                self.api_key_env
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub language: Language,
}

/// Optional report consistency checks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Warn when holder percentages do not sum to 100
    #[serde(default)]
    pub check_holder_percentages: bool,

    /// Allowed deviation from 100, in percentage points
    #[serde(default = "default_holder_tolerance")]
    pub holder_tolerance: f64,
}

fn default_holder_tolerance() -> f64 {
    1.0
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            check_holder_percentages: false,
            holder_tolerance: default_holder_tolerance(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub validation: ValidationConfig,
}

impl Config {
    /// Load config from `path`, or from the default locations.
    ///
    /// An explicit path that cannot be read is an error; missing default
    /// locations fall back to built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from_path(&path),
            _ => {
                info!("No config file found, using defaults");
                Ok(Config::default())
            }
        }
    }

    /// `$VEDER_CONFIG`, else `$XDG_CONFIG_HOME/veder/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            if !path.is_empty() {
                return Some(PathBuf::from(path));
            }
        }
        dirs::config_dir().map(|dir| dir.join("veder").join("config.toml"))
    }

    fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            warn!("Invalid config at {}: {}", path.display(), e);
            VederError::Config(format!("{}: {}", path.display(), e))
        })?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.service.model, "gemini-3-pro-preview");
        assert_eq!(config.service.api_key_env, "API_KEY");
        assert!(config.service.timeout_secs.is_none());
        assert_eq!(config.service.report_temperature, 0.0);
        assert!(config.service.search_grounding);
        assert_eq!(config.output.language, Language::Zh);
        assert!(!config.validation.check_holder_percentages);
    }

    #[test]
    fn test_parse_partial_toml() {
        let toml_str = r#"
[service]
model = "gemini-2.5-flash"
timeout_secs = 90

[output]
language = "en"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.service.model, "gemini-2.5-flash");
        assert_eq!(config.service.timeout_secs, Some(90));
        assert_eq!(config.output.language, Language::En);
        // Defaults for missing fields
        assert_eq!(config.service.market_temperature, 0.1);
        assert_eq!(config.validation.holder_tolerance, 1.0);
    }

    #[test]
    fn test_load_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[validation]\ncheck_holder_percentages = true").unwrap();
        let config = Config::load(Some(file.path())).unwrap();
        assert!(config.validation.check_holder_percentages);
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let err = Config::load(Some(Path::new("/nonexistent/veder/config.toml"))).unwrap_err();
        assert!(matches!(err, VederError::Io(_)));
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[service\nmodel = ").unwrap();
        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, VederError::Config(_)));
    }

    #[test]
    fn test_missing_api_key_is_config_error() {
        let service = ServiceConfig {
            api_key_env: "VEDER_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..ServiceConfig::default()
        };
        assert!(matches!(service.api_key(), Err(VederError::Config(_))));
    }
}
