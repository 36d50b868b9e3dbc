use crate::dashboard::params::{OrderDirection, PairDayOrderBy};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";
pub const DEFAULT_ENDPOINT: &str = "https://api.thegraph.com/subgraphs/name/ianlapham/uniswapv2";
pub const ENDPOINT_ENV_VAR: &str = "SUBGRAPH_ENDPOINT";

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub dashboard: DashboardConfig,
    pub explorer: ExplorerConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: 30,
        }
    }
}

/// Initial parameter values for a freshly started dashboard.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DashboardConfig {
    pub first: u32,
    pub order_by: PairDayOrderBy,
    pub order_direction: OrderDirection,
    pub created_within_hours: u32,
    pub min_daily_volume_usd: f64,
    pub activity_window_hours: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            first: 1000,
            order_by: PairDayOrderBy::DailyVolumeUsd,
            order_direction: OrderDirection::Desc,
            created_within_hours: 72,
            min_daily_volume_usd: 1000.0,
            activity_window_hours: 24,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ExplorerConfig {
    pub pair_url: String,
    pub token_url: String,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            pair_url: "https://www.dextools.io/app/uniswap/pair-explorer/".to_string(),
            token_url: "https://etherscan.io/token/".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub page_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            page_size: 100,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let config_str = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&config_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path` when given, otherwise the default location if it exists,
    /// otherwise built-in defaults. The endpoint env var wins over the file.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::load(Path::new(DEFAULT_CONFIG_PATH))?
            }
            None => Self::default(),
        };
        if let Ok(endpoint) = std::env::var(ENDPOINT_ENV_VAR) {
            config.apply_endpoint_override(&endpoint)?;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        fs::write(path, config_str)?;
        Ok(())
    }

    pub fn apply_endpoint_override(&mut self, endpoint: &str) -> Result<()> {
        let endpoint = endpoint.trim();
        if endpoint.is_empty() {
            return Err(Error::ConfigError(format!("{} is set but empty", ENDPOINT_ENV_VAR)));
        }
        let previous = std::mem::replace(&mut self.api.endpoint, endpoint.to_string());
        if let Err(e) = self.validate() {
            self.api.endpoint = previous;
            return Err(e);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.api.endpoint.starts_with("http://") || self.api.endpoint.starts_with("https://")) {
            return Err(Error::ConfigError(format!(
                "api.endpoint must be an http(s) URL: {}",
                self.api.endpoint
            )));
        }
        if self.api.timeout_secs == 0 {
            return Err(Error::ConfigError("api.timeout_secs must be positive".to_string()));
        }
        if self.server.page_size == 0 {
            return Err(Error::ConfigError("server.page_size must be positive".to_string()));
        }
        if self.dashboard.activity_window_hours == 0 {
            return Err(Error::ConfigError(
                "dashboard.activity_window_hours must be positive".to_string(),
            ));
        }
        crate::validation::validate_first(self.dashboard.first)
            .map_err(|e| Error::ConfigError(e.to_string()))?;
        crate::validation::validate_min_volume(self.dashboard.min_daily_volume_usd)
            .map_err(|e| Error::ConfigError(e.to_string()))?;
        Ok(())
    }
}
