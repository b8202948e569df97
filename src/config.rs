use std::env;

use crate::selectors::Timeframe;

/// Timeframes offered when `CHART_TIMEFRAMES` is not set (values are hours).
pub const DEFAULT_TIMEFRAMES: &str = "24:1 Day,168:1 Week,672:1 Month,8760:1 Year";

#[derive(Debug, Clone)]
pub struct Config {
    // Sensor backend
    pub backend_base_url: String,
    pub backend_timeout_seconds: u64,

    // Selector contents
    pub devices: Vec<String>,
    pub timeframes: Vec<Timeframe>,

    // API settings
    pub api_host: String,
    pub api_port: u16,

    // Per-page chart sessions
    pub session_idle_seconds: u64,
    pub max_sessions: u64,

    // Periodic chart refresh (0 disables)
    pub refresh_interval_seconds: u64,

    // Rate limiting
    pub disable_rate_limiting: bool,
    pub rate_limit_per_second: u64,
    pub rate_limit_burst: u32,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if required environment variables are not set,
    /// and `ConfigError::Invalid` if the device or timeframe lists cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let devices = parse_devices(
            &env::var("CHART_DEVICES").map_err(|_| ConfigError::Missing("CHART_DEVICES"))?,
        )?;
        let timeframes = parse_timeframes(
            &env::var("CHART_TIMEFRAMES").unwrap_or_else(|_| DEFAULT_TIMEFRAMES.to_string()),
        )?;

        Ok(Self {
            // Sensor backend
            backend_base_url: env::var("BACKEND_BASE_URL")
                .map_err(|_| ConfigError::Missing("BACKEND_BASE_URL"))?
                .trim_end_matches('/')
                .to_string(),
            backend_timeout_seconds: env::var("BACKEND_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),

            devices,
            timeframes,

            // API settings
            api_host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            api_port: env::var("API_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),

            session_idle_seconds: env::var("SESSION_IDLE_SECONDS")
                .unwrap_or_else(|_| "1800".to_string())
                .parse()
                .unwrap_or(1800),
            max_sessions: env::var("MAX_SESSIONS")
                .unwrap_or_else(|_| "10000".to_string())
                .parse()
                .unwrap_or(10_000),

            refresh_interval_seconds: env::var("REFRESH_INTERVAL_SECONDS")
                .unwrap_or_else(|_| "0".to_string())
                .parse()
                .unwrap_or(0),

            // Rate limiting
            disable_rate_limiting: env::var("DISABLE_RATE_LIMITING")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
            rate_limit_per_second: env::var("RATE_LIMIT_PER_SECOND")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
            rate_limit_burst: env::var("RATE_LIMIT_BURST")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .unwrap_or(60),
        })
    }

    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }
}

/// Parse a comma-separated device list, dropping blank entries.
///
/// # Errors
///
/// Returns `ConfigError::Invalid` if no device remains.
pub fn parse_devices(raw: &str) -> Result<Vec<String>, ConfigError> {
    let devices: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(ToString::to_string)
        .collect();

    if devices.is_empty() {
        return Err(ConfigError::Invalid {
            key: "CHART_DEVICES",
            reason: "at least one device is required".to_string(),
        });
    }

    Ok(devices)
}

/// Parse a comma-separated `value:name` timeframe list.
///
/// # Errors
///
/// Returns `ConfigError::Invalid` on an entry without a `:` separator, with an
/// empty value, or when the list is empty.
pub fn parse_timeframes(raw: &str) -> Result<Vec<Timeframe>, ConfigError> {
    let mut timeframes = Vec::new();

    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let Some((value, name)) = entry.split_once(':') else {
            return Err(ConfigError::Invalid {
                key: "CHART_TIMEFRAMES",
                reason: format!("expected value:name, got '{entry}'"),
            });
        };

        let value = value.trim();
        if value.is_empty() {
            return Err(ConfigError::Invalid {
                key: "CHART_TIMEFRAMES",
                reason: format!("empty value in '{entry}'"),
            });
        }

        timeframes.push(Timeframe {
            value: value.to_string(),
            name: name.trim().to_string(),
        });
    }

    if timeframes.is_empty() {
        return Err(ConfigError::Invalid {
            key: "CHART_TIMEFRAMES",
            reason: "at least one timeframe is required".to_string(),
        });
    }

    Ok(timeframes)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}
