//! Application configuration, read from the environment at startup.
//!
//! Every setting has a default so a bare `carelink` starts against a local
//! database and logs notifications instead of mailing them.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "CareLink";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_PREDICTOR_PROGRAM: &str = "python3";
pub const DEFAULT_PREDICTOR_SCRIPT: &str = "predict_asthma.py";
pub const DEFAULT_PREDICTOR_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_NOTIFY_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_MAIL_SENDER: &str = "alerts@carelink.local";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_path: PathBuf,
    pub predictor_program: String,
    pub predictor_script: PathBuf,
    pub predictor_timeout: Duration,
    /// Unset → notifications are logged, not sent.
    pub mail_relay_url: Option<String>,
    pub mail_relay_token: Option<String>,
    pub mail_sender: String,
    pub notification_timeout: Duration,
}

impl AppConfig {
    /// Read from the process environment (after loading `.env` if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr = match get("CARELINK_BIND") {
            Some(raw) => raw.trim().parse().map_err(|e: std::net::AddrParseError| {
                ConfigError::InvalidValue {
                    key: "CARELINK_BIND",
                    value: raw.clone(),
                    reason: e.to_string(),
                }
            })?,
            None => SocketAddr::from(([127, 0, 0, 1], 5000)),
        };

        Ok(Self {
            bind_addr,
            database_path: get("CARELINK_DB")
                .map(PathBuf::from)
                .unwrap_or_else(default_database_path),
            predictor_program: get("CARELINK_PREDICTOR_PROGRAM")
                .unwrap_or_else(|| DEFAULT_PREDICTOR_PROGRAM.into()),
            predictor_script: get("CARELINK_PREDICTOR_SCRIPT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PREDICTOR_SCRIPT)),
            predictor_timeout: seconds(
                "CARELINK_PREDICTOR_TIMEOUT_SECS",
                get("CARELINK_PREDICTOR_TIMEOUT_SECS"),
                DEFAULT_PREDICTOR_TIMEOUT_SECS,
            )?,
            mail_relay_url: get("CARELINK_MAIL_RELAY_URL"),
            mail_relay_token: get("CARELINK_MAIL_RELAY_TOKEN"),
            mail_sender: get("CARELINK_MAIL_FROM").unwrap_or_else(|| DEFAULT_MAIL_SENDER.into()),
            notification_timeout: seconds(
                "CARELINK_NOTIFY_TIMEOUT_SECS",
                get("CARELINK_NOTIFY_TIMEOUT_SECS"),
                DEFAULT_NOTIFY_TIMEOUT_SECS,
            )?,
        })
    }
}

fn seconds(key: &'static str, raw: Option<String>, default: u64) -> Result<Duration, ConfigError> {
    let Some(raw) = raw else {
        return Ok(Duration::from_secs(default));
    };
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::InvalidValue {
            key,
            value: raw,
            reason: "must be greater than zero".into(),
        }),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(e) => Err(ConfigError::InvalidValue {
            key,
            value: raw,
            reason: e.to_string(),
        }),
    }
}

/// Get the application data directory
pub fn app_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("carelink"))
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn default_database_path() -> PathBuf {
    app_data_dir().join("carelink.db")
}

/// Default `tracing` filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "carelink=info"
}
