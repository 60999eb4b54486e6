//! Configuration loading with hierarchical merging.

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Database path cannot be empty")]
    EmptyDatabasePath,

    #[error("Invalid max_connections: {0}. Must be at least 1")]
    InvalidMaxConnections(u32),

    #[error("Invalid pool_size: {0}. Must be between 1 and 100")]
    InvalidPoolSize(usize),

    #[error("Invalid rate limit: window and request limit must be positive")]
    InvalidRateLimit,

    #[error("Invalid execution quota: {0}. Must be positive")]
    InvalidExecutionQuota(i64),

    #[error("Invalid container timeout: must be positive")]
    InvalidContainerTimeout,
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging.
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults
    /// 2. .deepsandbox/config.yaml (project config)
    /// 3. .deepsandbox/local.yaml (local overrides, optional)
    /// 4. Environment variables (`DEEPSANDBOX_`* prefix)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".deepsandbox/config.yaml"))
            .merge(Yaml::file(".deepsandbox/local.yaml"))
            .merge(Env::prefixed("DEEPSANDBOX_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading.
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.database.path.is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }
        if config.database.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(
                config.database.max_connections,
            ));
        }

        if config.execution.pool_size == 0 || config.execution.pool_size > 100 {
            return Err(ConfigError::InvalidPoolSize(config.execution.pool_size));
        }
        if config.execution.container_timeout_secs == 0 {
            return Err(ConfigError::InvalidContainerTimeout);
        }

        if config.admission.rate_limit_window_secs == 0
            || config.admission.max_requests_per_window <= 0
        {
            return Err(ConfigError::InvalidRateLimit);
        }
        if config.admission.max_executions_per_day <= 0 {
            return Err(ConfigError::InvalidExecutionQuota(
                config.admission.max_executions_per_day,
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        Ok(())
    }
}
