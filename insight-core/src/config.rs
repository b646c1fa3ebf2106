//! Application configuration.
//!
//! Values are resolved once at startup in this order: built-in defaults, an
//! optional TOML file, then environment variables (a `.env` file is loaded
//! first when present). The resulting [`AppConfig`] is passed explicitly to
//! the components that need it; nothing reads the environment later on.

use crate::error::{ConfigError, CoreError};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

pub const CONFIG_PATH_VAR: &str = "INSIGHT_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "insight.toml";
pub const DEFAULT_MODEL: &str = "tngtech/deepseek-r1t-chimera:free";
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Checked in order; the first non-empty value wins.
pub const API_KEY_VARS: [&str; 2] = ["OPENROUTER_API_KEY", "OPENAI_API_KEY"];

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    /// Root of the unpacked activity export (`saved/` and `likes/` live here).
    pub data_dir: PathBuf,
    /// Where categorization results are written when requested.
    pub output_dir: PathBuf,
    pub uploads: UploadConfig,
    pub llm: LlmConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Uploaded export files are stored here as `<id>.json`.
    pub upload_dir: PathBuf,
    /// Largest accepted file, in bytes.
    pub max_file_size: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub default_model: String,
    pub timeout_secs: u64,
    /// Captions categorized at the same time; 1 keeps calls strictly sequential.
    pub concurrency: usize,
    pub retry: RetryPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            data_dir: PathBuf::from("playground/data/your_instagram_activity"),
            output_dir: PathBuf::from("outputs"),
            uploads: UploadConfig::default(),
            llm: LlmConfig::default(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("uploads"),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            timeout_secs: 120,
            concurrency: 1,
            retry: RetryPolicy::default(),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 1000,
            max_backoff_ms: 30000,
        }
    }
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("default_model", &self.default_model)
            .field("timeout_secs", &self.timeout_secs)
            .field("concurrency", &self.concurrency)
            .field("retry", &self.retry)
            .finish()
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl AppConfig {
    /// Load configuration from `.env`, the optional TOML file and the process
    /// environment, then validate it.
    pub fn load() -> Result<Self, CoreError> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!("Loaded environment from {}", path.display());
        }

        let explicit_path = std::env::var(CONFIG_PATH_VAR).ok();
        let path = explicit_path
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        let mut config = if path.exists() {
            Self::from_file(&path)?
        } else if explicit_path.is_some() {
            return Err(ConfigError::FileNotFound {
                path: path.display().to_string(),
            }
            .into());
        } else {
            Self::default()
        };

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, CoreError> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Overlay environment values. `lookup` is injected so tests never touch
    /// the real process environment.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(host) = get("HOST") {
            self.server.host = host;
        }
        if let Some(port) = get("PORT") {
            self.server.port = parse_var("PORT", &port)?;
        }
        if let Some(dir) = get("INSIGHT_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(dir) = get("INSIGHT_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }
        if let Some(dir) = get("UPLOAD_DIR") {
            self.uploads.upload_dir = PathBuf::from(dir);
        }
        if let Some(size) = get("MAX_FILE_SIZE") {
            self.uploads.max_file_size = parse_var("MAX_FILE_SIZE", &size)?;
        }
        if let Some(url) = get("LLM_BASE_URL") {
            self.llm.base_url = url;
        }
        if let Some(model) = get("LLM_DEFAULT_MODEL") {
            self.llm.default_model = model;
        }
        if let Some(secs) = get("LLM_TIMEOUT_SECS") {
            self.llm.timeout_secs = parse_var("LLM_TIMEOUT_SECS", &secs)?;
        }
        if let Some(attempts) = get("LLM_MAX_ATTEMPTS") {
            self.llm.retry.max_attempts = parse_var("LLM_MAX_ATTEMPTS", &attempts)?;
        }
        if let Some(concurrency) = get("LLM_CONCURRENCY") {
            self.llm.concurrency = parse_var("LLM_CONCURRENCY", &concurrency)?;
        }
        if let Some(key) = API_KEY_VARS.iter().find_map(|var| get(*var)) {
            self.llm.api_key = Some(key);
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationFailed {
                reason: "port must be non-zero".to_string(),
            });
        }
        if let Err(e) = url::Url::parse(&self.llm.base_url) {
            return Err(ConfigError::InvalidValue {
                field: "llm.base_url".to_string(),
                value: format!("{} ({})", self.llm.base_url, e),
            });
        }
        if self.uploads.max_file_size == 0 {
            return Err(ConfigError::ValidationFailed {
                reason: "uploads.max_file_size must be at least 1 byte".to_string(),
            });
        }
        if self.llm.default_model.trim().is_empty() {
            return Err(ConfigError::ValidationFailed {
                reason: "llm.default_model must not be empty".to_string(),
            });
        }
        if self.llm.retry.max_attempts == 0 {
            return Err(ConfigError::ValidationFailed {
                reason: "llm.retry.max_attempts must be at least 1".to_string(),
            });
        }
        if self.llm.concurrency == 0 {
            return Err(ConfigError::ValidationFailed {
                reason: "llm.concurrency must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_var<T: FromStr>(field: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.bind_address(), "0.0.0.0:8000");
        assert_eq!(config.llm.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.llm.default_model, DEFAULT_MODEL);
        assert_eq!(config.llm.concurrency, 1);
        assert!(config.llm.api_key.is_none());
        assert_eq!(config.uploads.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.uploads.max_file_size, 10 * 1024 * 1024);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config
            .apply_env_overrides(env_of(&[
                ("PORT", "9100"),
                ("INSIGHT_DATA_DIR", "/tmp/export"),
                ("LLM_MAX_ATTEMPTS", "5"),
                ("LLM_CONCURRENCY", "4"),
                ("UPLOAD_DIR", "/var/uploads"),
                ("MAX_FILE_SIZE", "2048"),
            ]))
            .unwrap();

        assert_eq!(config.uploads.upload_dir, PathBuf::from("/var/uploads"));
        assert_eq!(config.uploads.max_file_size, 2048);

        assert_eq!(config.server.port, 9100);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/export"));
        assert_eq!(config.llm.retry.max_attempts, 5);
        assert_eq!(config.llm.concurrency, 4);
    }

    #[test]
    fn test_api_key_fallback_chain() {
        let mut config = AppConfig::default();
        config
            .apply_env_overrides(env_of(&[("OPENAI_API_KEY", "sk-openai")]))
            .unwrap();
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-openai"));

        let mut config = AppConfig::default();
        config
            .apply_env_overrides(env_of(&[
                ("OPENROUTER_API_KEY", "sk-router"),
                ("OPENAI_API_KEY", "sk-openai"),
            ]))
            .unwrap();
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-router"));

        let mut config = AppConfig::default();
        config
            .apply_env_overrides(env_of(&[
                ("OPENROUTER_API_KEY", "  "),
                ("OPENAI_API_KEY", "sk-openai"),
            ]))
            .unwrap();
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-openai"));
    }

    #[test]
    fn test_invalid_env_value() {
        let mut config = AppConfig::default();
        let err = config
            .apply_env_overrides(env_of(&[("PORT", "eighty")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "PORT"));
    }

    #[test]
    fn test_validation_failures() {
        let mut config = AppConfig::default();
        config.llm.base_url = "not a url".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));

        let mut config = AppConfig::default();
        config.llm.concurrency = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationFailed { .. })
        ));

        let mut config = AppConfig::default();
        config.llm.retry.max_attempts = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.uploads.max_file_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
data_dir = "/srv/export"

[server]
port = 8123

[llm]
default_model = "google/gemini-2.0-flash:free"
timeout_secs = 30

[llm.retry]
max_attempts = 2
"#
        )
        .unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.server.port, 8123);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.data_dir, PathBuf::from("/srv/export"));
        assert_eq!(config.output_dir, PathBuf::from("outputs"));
        assert_eq!(config.llm.default_model, "google/gemini-2.0-flash:free");
        assert_eq!(config.llm.timeout_secs, 30);
        assert_eq!(config.llm.retry.max_attempts, 2);
        assert_eq!(config.llm.retry.max_backoff_ms, 30000);
    }

    #[test]
    fn test_invalid_toml() {
        let err = AppConfig::from_toml_str("server = [").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let mut config = LlmConfig::default();
        config.api_key = Some("sk-secret".to_string());
        let debug = format!("{:?}", config);
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
