use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Document store configuration
    pub store: StoreConfig,

    /// Catalog load configuration
    pub loader: LoaderConfig,

    /// Observability configuration
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from the embedded defaults, an optional file and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config/local.toml".to_string());

        config::Config::builder()
            // Start with default values
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            // Override with config file if it exists
            .add_source(config::File::with_name(&config_path).required(false))
            // Override with environment variables (prefix: PROPSEARCH_)
            .add_source(
                config::Environment::with_prefix("PROPSEARCH")
                    .separator("__")
                    .try_parsing(true),
            )
            // Deployment-level shortcuts for the two settings every install touches
            .set_override_option("server.port", std::env::var("APP_PORT").ok())?
            .set_override_option("store.redis_url", std::env::var("REDIS_URL").ok())?
            .build()?
            .try_deserialize()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            store: StoreConfig::default(),
            loader: LoaderConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Directory holding the static entry page and assets
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
            public_dir: default_public_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store backend type
    #[serde(default)]
    pub backend: StoreBackend,

    /// Redis connection string
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    /// Name of the search index over property documents
    #[serde(default = "default_index_name")]
    pub index_name: String,

    /// Upper bound on a single search aggregation (milliseconds)
    #[serde(default = "default_query_timeout")]
    pub query_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            redis_url: default_redis_url(),
            index_name: default_index_name(),
            query_timeout_ms: default_query_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    #[default]
    Redis,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// CSV of `zip,lat,lon` rows
    #[serde(default = "default_zip_csv")]
    pub zip_csv_path: PathBuf,

    /// CSV of address rows in OpenAddresses column order
    #[serde(default = "default_address_csv")]
    pub address_csv_path: PathBuf,

    /// Maximum number of properties to create
    #[serde(default = "default_max_properties")]
    pub max_properties: u64,

    /// State code written into every address
    #[serde(default = "default_state")]
    pub state: String,

    /// Max retry attempts per load step on store failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base retry backoff (milliseconds), doubled per attempt
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_ms: u64,

    /// Fixed seed for reproducible synthetic data
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            zip_csv_path: default_zip_csv(),
            address_csv_path: default_address_csv(),
            max_properties: default_max_properties(),
            state: default_state(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff(),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
        }
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_request_timeout() -> u64 {
    30
}

fn default_public_dir() -> PathBuf {
    PathBuf::from("./public")
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_index_name() -> String {
    "propIdx".to_string()
}

fn default_query_timeout() -> u64 {
    5_000
}

fn default_zip_csv() -> PathBuf {
    PathBuf::from("./data/zip_lat_long.csv")
}

fn default_address_csv() -> PathBuf {
    PathBuf::from("./data/co.csv")
}

fn default_max_properties() -> u64 {
    100_000
}

fn default_state() -> String {
    "CO".to_string()
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_backoff() -> u64 {
    500
}

fn default_log_level() -> String {
    "info".to_string()
}
