//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::calculate::DEFAULT_EPSILON;
use crate::fetch::{FetcherConfig, DEFAULT_BASE_URL, DEFAULT_USER_AGENT};
use crate::rank::{TopN, TOP_N_DEFAULT, TOP_N_MAX, TOP_N_MIN};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Which season is loaded and how its metrics are derived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonConfig {
    /// Season label, e.g. "2023-24"
    #[serde(default = "default_season")]
    pub season: String,

    /// "Regular Season" or "Playoffs"
    #[serde(default = "default_season_type")]
    pub season_type: String,

    /// Denominator guard for derived metrics
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,

    #[serde(default = "default_top_n")]
    pub default_top_n: usize,
}

fn default_season() -> String {
    "2023-24".to_string()
}

fn default_season_type() -> String {
    "Regular Season".to_string()
}

fn default_epsilon() -> f64 {
    DEFAULT_EPSILON
}

fn default_top_n() -> usize {
    TOP_N_DEFAULT
}

impl Default for SeasonConfig {
    fn default() -> Self {
        Self {
            season: default_season(),
            season_type: default_season_type(),
            epsilon: default_epsilon(),
            default_top_n: default_top_n(),
        }
    }
}

impl SeasonConfig {
    /// Default top-N as a bounded value. Call after [`AppConfig::validate`].
    pub fn top_n(&self) -> TopN {
        TopN::clamped(Some(self.default_top_n))
    }
}

/// Upstream stats API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl Default for StatsApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl StatsApiConfig {
    pub fn fetcher_config(&self) -> FetcherConfig {
        FetcherConfig {
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(self.timeout_seconds),
            user_agent: self.user_agent.clone(),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub season: SeasonConfig,

    #[serde(default)]
    pub stats_api: StatsApiConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            season: SeasonConfig::default(),
            stats_api: StatsApiConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise use defaults.
    pub fn from_file_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            debug!("No config file at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.season.epsilon.is_finite() || self.season.epsilon <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "Epsilon must be a positive number, got {}",
                self.season.epsilon
            )));
        }

        if !(TOP_N_MIN..=TOP_N_MAX).contains(&self.season.default_top_n) {
            return Err(ConfigError::ValidationError(format!(
                "Default top N must be between {} and {}",
                TOP_N_MIN, TOP_N_MAX
            )));
        }

        if !is_season_label(&self.season.season) {
            return Err(ConfigError::ValidationError(format!(
                "Season must look like 2023-24, got {:?}",
                self.season.season
            )));
        }

        if self.stats_api.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "Stats API timeout must be greater than 0".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// `YYYY-YY` where the second year follows the first.
pub fn is_season_label(value: &str) -> bool {
    let Some((start, end)) = value.split_once('-') else {
        return false;
    };
    if start.len() != 4 || end.len() != 2 {
        return false;
    }
    match (start.parse::<u32>(), end.parse::<u32>()) {
        (Ok(start), Ok(end)) => (start + 1) % 100 == end,
        _ => false,
    }
}
