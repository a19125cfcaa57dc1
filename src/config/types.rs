//! Configuration data types.

use crate::backend::Backend;
use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Global settings
    #[serde(default)]
    pub global: GlobalConfig,

    /// Simulated traffic settings
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Named backend pools
    #[serde(default)]
    pub pools: Vec<PoolConfig>,
}

/// Global configuration settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GlobalConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format: json or pretty
    #[serde(default)]
    pub log_format: LogFormat,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::Json,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

/// Simulated traffic settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct SimulationConfig {
    /// Total requests to route per run
    #[serde(default = "default_requests")]
    pub requests: usize,

    /// Number of concurrent callers
    #[serde(default = "default_workers")]
    pub workers: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            requests: default_requests(),
            workers: default_workers(),
        }
    }
}

/// Backend pool configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PoolConfig {
    /// Unique name for this pool
    pub name: String,

    /// Backends in rotation order
    #[serde(default)]
    pub backends: Vec<BackendConfig>,
}

/// Individual backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Backend identifier, usually an address
    pub id: String,

    /// Relative selection weight (default: 1)
    #[serde(default = "default_weight")]
    pub weight: i64,
}

impl From<&BackendConfig> for Backend {
    fn from(config: &BackendConfig) -> Self {
        Backend::new(config.id.clone(), config.weight)
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_requests() -> usize {
    10
}

fn default_workers() -> usize {
    4
}

fn default_weight() -> i64 {
    1
}
