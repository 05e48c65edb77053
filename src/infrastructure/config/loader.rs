//! Hierarchical configuration for the TaskWing engine (SPEC_FULL §D).
//!
//! Precedence (lowest to highest): programmatic defaults, then
//! `.taskwing/config.yaml`, then `.taskwing/local.yaml`, then
//! `TASKWING_`-prefixed environment variables (double-underscore nesting),
//! mirroring the teacher's `ConfigLoader::load` merge order.

use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration error types.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("figment failed to load configuration: {0}")]
    Load(#[from] figment::Error),

    #[error("chat model name must not be empty")]
    EmptyChatModel,

    #[error("embedding model name must not be empty")]
    EmptyEmbeddingModel,

    #[error("invalid max_retries: {0}. Must be at least 1")]
    InvalidMaxRetries(u32),

    #[error("invalid retry_base_delay_ms: {0}. Must be positive")]
    InvalidRetryBaseDelay(u64),

    #[error("invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("large_project_file_threshold must be positive")]
    InvalidLargeProjectThreshold,

    #[error("source_scan_cap must be positive")]
    InvalidSourceScanCap,
}

/// C1/C2 model selection and gateway endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelConfig {
    #[serde(default = "default_chat_model")]
    pub chat_model: String,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    #[serde(default = "default_chat_base_url")]
    pub chat_base_url: String,
    #[serde(default = "default_embedding_base_url")]
    pub embedding_base_url: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            chat_model: default_chat_model(),
            embedding_model: default_embedding_model(),
            chat_base_url: default_chat_base_url(),
            embedding_base_url: default_embedding_base_url(),
        }
    }
}

/// C6 structured generator retry policy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GeneratorConfig {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self { max_retries: default_max_retries(), retry_base_delay_ms: default_retry_base_delay_ms() }
    }
}

/// C5 semantic middleware toggles.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SemanticMiddlewareConfig {
    #[serde(default)]
    pub allow_missing_files: bool,
}

/// C10 repair planner opt-ins.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct RepairConfig {
    #[serde(default)]
    pub allow_global_mutation: bool,
    #[serde(default)]
    pub adopt_unmanaged: bool,
}

/// C11 bootstrap flags mirror.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct BootstrapConfig {
    #[serde(default)]
    pub force: bool,
    #[serde(default)]
    pub skip_index: bool,
    #[serde(default)]
    pub skip_init: bool,
}

/// Structured logging configuration (§B).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    pub log_dir: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), format: default_log_format(), log_dir: None }
    }
}

/// Top-level TaskWing configuration (SPEC_FULL §D).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TaskWingConfig {
    #[serde(default)]
    pub models: ModelConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub semantic_middleware: SemanticMiddlewareConfig,
    #[serde(default)]
    pub repair: RepairConfig,
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// §4.9 large-project guard threshold.
    #[serde(default = "default_large_project_threshold")]
    pub large_project_file_threshold: usize,
    /// §5 source-file scanner cap.
    #[serde(default = "default_source_scan_cap")]
    pub source_scan_cap: usize,
}

fn default_chat_model() -> String {
    "claude-3-5-sonnet-20241022".to_string()
}
fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}
fn default_chat_base_url() -> String {
    "https://api.anthropic.com".to_string()
}
fn default_embedding_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_max_retries() -> u32 {
    3
}
fn default_retry_base_delay_ms() -> u64 {
    500
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "pretty".to_string()
}
fn default_large_project_threshold() -> usize {
    5000
}
fn default_source_scan_cap() -> usize {
    10_000
}

/// Hierarchical configuration loader, mirroring the teacher's
/// `ConfigLoader::load` figment merge chain.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from `.taskwing/config.yaml`, `.taskwing/local.yaml`
    /// and `TASKWING_`-prefixed environment variables, layered over defaults.
    pub fn load() -> Result<TaskWingConfig, ConfigError> {
        let config: TaskWingConfig = Figment::new()
            .merge(Serialized::defaults(TaskWingConfig::default()))
            .merge(Yaml::file(".taskwing/config.yaml"))
            .merge(Yaml::file(".taskwing/local.yaml"))
            .merge(Env::prefixed("TASKWING_").split("__"))
            .extract()?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, skipping the project-local
    /// overlay files (used by tests and the demo binary's `--config` path).
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<TaskWingConfig, ConfigError> {
        let config: TaskWingConfig = Figment::new()
            .merge(Serialized::defaults(TaskWingConfig::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed("TASKWING_").split("__"))
            .extract()?;

        Self::validate(&config)?;
        Ok(config)
    }

    pub fn validate(config: &TaskWingConfig) -> Result<(), ConfigError> {
        if config.models.chat_model.trim().is_empty() {
            return Err(ConfigError::EmptyChatModel);
        }
        if config.models.embedding_model.trim().is_empty() {
            return Err(ConfigError::EmptyEmbeddingModel);
        }
        if config.generator.max_retries == 0 {
            return Err(ConfigError::InvalidMaxRetries(0));
        }
        if config.generator.retry_base_delay_ms == 0 {
            return Err(ConfigError::InvalidRetryBaseDelay(0));
        }
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }
        if config.large_project_file_threshold == 0 {
            return Err(ConfigError::InvalidLargeProjectThreshold);
        }
        if config.source_scan_cap == 0 {
            return Err(ConfigError::InvalidSourceScanCap);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = TaskWingConfig::default();
        assert_eq!(config.generator.max_retries, 3);
        assert_eq!(config.large_project_file_threshold, 5000);
        assert_eq!(config.source_scan_cap, 10_000);
        ConfigLoader::validate(&config).expect("default config should be valid");
    }

    #[test]
    fn validate_rejects_empty_chat_model() {
        let mut config = TaskWingConfig::default();
        config.models.chat_model = String::new();
        assert!(matches!(ConfigLoader::validate(&config), Err(ConfigError::EmptyChatModel)));
    }

    #[test]
    fn validate_rejects_zero_max_retries() {
        let mut config = TaskWingConfig::default();
        config.generator.max_retries = 0;
        assert!(matches!(ConfigLoader::validate(&config), Err(ConfigError::InvalidMaxRetries(0))));
    }

    #[test]
    fn validate_rejects_invalid_log_level() {
        let mut config = TaskWingConfig::default();
        config.logging.level = "verbose".to_string();
        assert!(matches!(ConfigLoader::validate(&config), Err(ConfigError::InvalidLogLevel(_))));
    }

    #[test]
    fn validate_rejects_zero_large_project_threshold() {
        let mut config = TaskWingConfig::default();
        config.large_project_file_threshold = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidLargeProjectThreshold)
        ));
    }

    #[test]
    fn yaml_parsing_overrides_defaults() {
        let yaml = r"
models:
  chat_model: custom-model
generator:
  max_retries: 5
logging:
  level: debug
";
        let config: TaskWingConfig = serde_yaml::from_str(yaml).expect("yaml should parse");
        assert_eq!(config.models.chat_model, "custom-model");
        assert_eq!(config.generator.max_retries, 5);
        assert_eq!(config.logging.level, "debug");
        // Untouched nested defaults still apply.
        assert_eq!(config.models.embedding_model, default_embedding_model());
        ConfigLoader::validate(&config).expect("parsed config should be valid");
    }

    #[test]
    fn hierarchical_merging_overrides_win() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut base_file = NamedTempFile::new().unwrap();
        writeln!(base_file, "generator:\n  max_retries: 2\nlogging:\n  level: info").unwrap();
        base_file.flush().unwrap();

        let mut override_file = NamedTempFile::new().unwrap();
        writeln!(override_file, "generator:\n  max_retries: 7").unwrap();
        override_file.flush().unwrap();

        let config: TaskWingConfig = Figment::new()
            .merge(Serialized::defaults(TaskWingConfig::default()))
            .merge(Yaml::file(base_file.path()))
            .merge(Yaml::file(override_file.path()))
            .extract()
            .unwrap();

        assert_eq!(config.generator.max_retries, 7, "override file should win");
        assert_eq!(config.logging.level, "info", "base value should persist when not overridden");
    }

    #[test]
    fn env_override_affects_load() {
        use std::env;
        use std::sync::Mutex;
        static ENV_LOCK: Mutex<()> = Mutex::new(());
        let _guard = ENV_LOCK.lock().unwrap();

        unsafe {
            env::set_var("TASKWING_LOGGING__LEVEL", "debug");
        }
        let config: TaskWingConfig = Figment::new()
            .merge(Serialized::defaults(TaskWingConfig::default()))
            .merge(Env::prefixed("TASKWING_").split("__"))
            .extract()
            .unwrap();
        assert_eq!(config.logging.level, "debug");
        unsafe {
            env::remove_var("TASKWING_LOGGING__LEVEL");
        }
    }
}
