//! Runtime configuration read from the environment (and `.env` via dotenv)

use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_USERNAME: &str = "emon4075";
pub const DEFAULT_BASE_URL: &str = "https://io.adafruit.com/api/v2";
pub const DEFAULT_FEED_LIMIT: u32 = 500;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 600;
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8501";
pub const DEFAULT_CHART_WIDTH: u32 = 1200;
pub const DEFAULT_CHART_HEIGHT: u32 = 600;

/// Configuration errors
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be a number, got '{value}'")]
    NotANumber { name: &'static str, value: String },
    #[error("{name} must be greater than zero")]
    Zero { name: &'static str },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub username: String,
    pub api_key: Option<String>,
    pub base_url: String,
    pub feed_limit: u32,
    pub cache_ttl: Duration,
    pub listen_addr: String,
    pub chart_width: u32,
    pub chart_height: u32,
}

impl Config {
    /// Load configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary lookup function.
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let username = get("AIO_USERNAME").unwrap_or_else(|| DEFAULT_USERNAME.to_string());
        let api_key = get("AIO_KEY");
        let base_url = get("AIO_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let feed_limit = parse_positive("FEED_LIMIT", get("FEED_LIMIT"), DEFAULT_FEED_LIMIT)?;
        let ttl_secs = parse_positive("CACHE_TTL_SECS", get("CACHE_TTL_SECS"), DEFAULT_CACHE_TTL_SECS)?;
        let chart_width = parse_positive("CHART_WIDTH", get("CHART_WIDTH"), DEFAULT_CHART_WIDTH)?;
        let chart_height = parse_positive("CHART_HEIGHT", get("CHART_HEIGHT"), DEFAULT_CHART_HEIGHT)?;

        let listen_addr = get("LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());

        Ok(Config {
            username,
            api_key,
            base_url,
            feed_limit,
            cache_ttl: Duration::from_secs(ttl_secs),
            listen_addr,
            chart_width,
            chart_height,
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

fn parse_positive<T>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialEq + Default,
{
    let Some(raw) = raw else {
        return Ok(default);
    };

    let value: T = raw.trim().parse().map_err(|_| ConfigError::NotANumber {
        name,
        value: raw.clone(),
    })?;

    if value == T::default() {
        return Err(ConfigError::Zero { name });
    }

    Ok(value)
}
