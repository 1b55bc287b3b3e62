//! Server configuration

use std::path::{Path, PathBuf};

use billing_core::memory::DEFAULT_MEMORY_WINDOW;
use billing_core::prompt::{BILLING_TABLES, DEFAULT_TOP_K};
use serde::Deserialize;

use crate::ai::client::{API_URL, DEFAULT_MODEL};
use crate::error::ConfigError;

/// Server configuration loaded from environment variables
pub struct Config {
    pub bind_address: String,
    /// Path of the JSON database descriptor
    pub sql_config_path: PathBuf,
    pub anthropic_api_key: Option<String>,
    pub llm_model: String,
    pub llm_api_url: String,
    pub llm_timeout_secs: u64,
    /// Append-only record of every answered question
    pub log_path: PathBuf,
    pub memory_window: usize,
    pub top_k: usize,
    pub tables: Vec<String>,
    pub cors_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            bind_address: std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8000".into()),
            sql_config_path: std::env::var("SQL_CONFIG_PATH")
                .unwrap_or_else(|_| "configs/sql_config.json".into())
                .into(),
            anthropic_api_key: std::env::var("ANTHROPIC_API_KEY")
                .ok()
                .filter(|key| !key.is_empty()),
            llm_model: std::env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into()),
            llm_api_url: std::env::var("LLM_API_URL").unwrap_or_else(|_| API_URL.into()),
            llm_timeout_secs: env_parse("LLM_TIMEOUT_SECS", 60),
            log_path: std::env::var("LOG_PATH")
                .unwrap_or_else(|_| "logging.txt".into())
                .into(),
            memory_window: env_parse("MEMORY_WINDOW", DEFAULT_MEMORY_WINDOW),
            top_k: env_parse("TOP_K", DEFAULT_TOP_K),
            tables: std::env::var("SQL_TABLES")
                .map(|raw| split_list(&raw))
                .unwrap_or_else(|_| BILLING_TABLES.iter().map(|t| t.to_string()).collect()),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|raw| split_list(&raw))
                .unwrap_or_else(|_| vec!["*".to_string()]),
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(var = name, value = %raw, "Ignoring unparseable value");
            default
        }),
        Err(_) => default,
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Database connection descriptor, read from the file at `SQL_CONFIG_PATH`
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub user: String,
    #[serde(default)]
    pub password: Option<String>,
    pub database: String,
    /// Applied as the transaction's `search_path` when set
    #[serde(default)]
    pub schema: Option<String>,
}

fn default_port() -> u16 {
    5432
}

impl DatabaseConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::Invalid("host must be non-empty".to_string()));
        }
        if self.database.trim().is_empty() {
            return Err(ConfigError::Invalid("database must be non-empty".to_string()));
        }
        if let Some(schema) = &self.schema {
            if schema.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "schema must be omitted or non-empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_descriptor(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_descriptor_with_defaults() {
        let file = write_descriptor(
            r#"{"host": "db", "user": "billing", "password": "pw", "database": "billing"}"#,
        );
        let cfg = DatabaseConfig::load(file.path()).unwrap();
        assert_eq!(cfg.port, 5432);
        assert_eq!(cfg.password.as_deref(), Some("pw"));
        assert_eq!(cfg.schema, None);
    }

    #[test]
    fn rejects_blank_schema() {
        let file = write_descriptor(
            r#"{"host": "db", "user": "u", "database": "d", "schema": " "}"#,
        );
        assert!(matches!(
            DatabaseConfig::load(file.path()),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn reports_missing_file_and_bad_json() {
        let missing = DatabaseConfig::load(Path::new("/nonexistent/sql_config.json"));
        assert!(matches!(missing, Err(ConfigError::Read { .. })));

        let file = write_descriptor("{not json");
        assert!(matches!(
            DatabaseConfig::load(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn splits_comma_lists() {
        assert_eq!(split_list(" a, b ,,c"), ["a", "b", "c"]);
    }
}
