use serde::{Deserialize, Serialize};

/// Main configuration structure for DeepSandbox.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Admission control configuration
    #[serde(default)]
    pub admission: AdmissionConfig,

    /// Execution pipeline configuration
    #[serde(default)]
    pub execution: ExecutionConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Static API credentials mapping bearer tokens to principals.
    /// Credential issuance proper is an external collaborator.
    #[serde(default)]
    pub api_keys: Vec<ApiKeyConfig>,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ServerConfig {
    /// Bind address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_bind_addr() -> String {
    "127.0.0.1".to_string()
}

const fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    /// Path to the `SQLite` database file
    #[serde(default = "default_database_path")]
    pub path: String,

    /// Maximum number of database connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> String {
    ".deepsandbox/deepsandbox.db".to_string()
}

const fn default_max_connections() -> u32 {
    10
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// Admission control configuration.
///
/// Both gates are fixed-window: a window's expiry is set at first touch and
/// never extended, so burst traffic at a boundary can admit up to twice the
/// nominal limit across it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AdmissionConfig {
    /// Rate-limit window length in seconds
    #[serde(default = "default_rate_limit_window_secs")]
    pub rate_limit_window_secs: u64,

    /// Maximum requests per identity per window
    #[serde(default = "default_max_requests_per_window")]
    pub max_requests_per_window: i64,

    /// Default maximum code executions per identity per UTC calendar day.
    /// Per-user quota blobs may override this.
    #[serde(default = "default_max_executions_per_day")]
    pub max_executions_per_day: i64,
}

const fn default_rate_limit_window_secs() -> u64 {
    60
}

const fn default_max_requests_per_window() -> i64 {
    100
}

const fn default_max_executions_per_day() -> i64 {
    1000
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            rate_limit_window_secs: default_rate_limit_window_secs(),
            max_requests_per_window: default_max_requests_per_window(),
            max_executions_per_day: default_max_executions_per_day(),
        }
    }
}

/// Execution pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ExecutionConfig {
    /// Default and maximum single-task timeout in seconds.
    /// Per-user quota blobs (`max_execution_time`) may override the cap.
    #[serde(default = "default_container_timeout_secs")]
    pub container_timeout_secs: u32,

    /// Number of concurrently running executions
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,

    /// Depth of the pending work queue feeding the pool
    #[serde(default = "default_queue_depth")]
    pub queue_depth: usize,
}

const fn default_container_timeout_secs() -> u32 {
    300
}

const fn default_pool_size() -> usize {
    10
}

const fn default_queue_depth() -> usize {
    256
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            container_timeout_secs: default_container_timeout_secs(),
            pool_size: default_pool_size(),
            queue_depth: default_queue_depth(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// One static API credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ApiKeyConfig {
    /// Bearer token presented by the client
    pub token: String,
    /// Principal identity
    pub id: String,
    /// Display name
    pub username: String,
    /// Role names ("admin", "user")
    #[serde(default)]
    pub roles: Vec<String>,
    /// Raw quota JSON object, e.g. `{"max_executions_per_day": 50}`
    #[serde(default)]
    pub quota: Option<String>,
}
