use std::{fmt, str::FromStr, time::Duration};

use crate::error::{ExporterError, Result};

pub const DEFAULT_EXPORTER_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_EXPORTER_PORT: u16 = 8000;
pub const DEFAULT_METRICS_PREFIX: &str = "qbittorrent";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_directive(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = ExporterError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "TRACE" => Ok(Self::Trace),
            "DEBUG" => Ok(Self::Debug),
            "INFO" => Ok(Self::Info),
            "WARN" | "WARNING" => Ok(Self::Warn),
            "ERROR" | "CRITICAL" => Ok(Self::Error),
            other => Err(ExporterError::InvalidConfig(format!(
                "unknown log level: {other}"
            ))),
        }
    }
}

/// Connection settings for the torrent daemon's Web API.
#[derive(Clone)]
pub struct DaemonConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub request_timeout: Duration,
}

impl DaemonConfig {
    pub fn has_credentials(&self) -> bool {
        !self.username.is_empty()
    }
}

impl fmt::Debug for DaemonConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DaemonConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Settings exactly as they arrive from flags or the environment, before
/// validation.
#[derive(Debug, Clone, Default)]
pub struct RawConfig {
    pub host: Option<String>,
    pub port: Option<String>,
    pub username: String,
    pub password: String,
    pub exporter_address: String,
    pub exporter_port: u16,
    pub log_level: String,
    pub metrics_prefix: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct ExporterConfig {
    pub daemon: DaemonConfig,
    pub listen_address: String,
    pub listen_port: u16,
    pub log_level: LogLevel,
    pub metrics_prefix: String,
}

impl ExporterConfig {
    pub fn from_parts(raw: RawConfig) -> Result<Self> {
        let host = raw
            .host
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                ExporterError::MissingConfig(
                    "no host specified, please set QBITTORRENT_HOST".to_string(),
                )
            })?
            .to_string();

        let port = raw
            .port
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                ExporterError::MissingConfig(
                    "no port specified, please set QBITTORRENT_PORT".to_string(),
                )
            })?;
        let port = port
            .parse::<u16>()
            .ok()
            .filter(|port| *port != 0)
            .ok_or_else(|| {
                ExporterError::InvalidConfig(format!("QBITTORRENT_PORT is not a valid port: {port}"))
            })?;

        if raw.request_timeout_secs == 0 {
            return Err(ExporterError::InvalidConfig(
                "request timeout must be at least one second".to_string(),
            ));
        }

        let metrics_prefix = raw.metrics_prefix.trim().to_string();
        validate_metrics_prefix(&metrics_prefix)?;

        let listen_address = match raw.exporter_address.trim() {
            "" => DEFAULT_EXPORTER_ADDRESS.to_string(),
            address => address.to_string(),
        };

        Ok(Self {
            daemon: DaemonConfig {
                host,
                port,
                username: raw.username,
                password: raw.password,
                request_timeout: Duration::from_secs(raw.request_timeout_secs),
            },
            listen_address,
            listen_port: raw.exporter_port,
            log_level: raw.log_level.parse()?,
            metrics_prefix,
        })
    }
}

fn validate_metrics_prefix(prefix: &str) -> Result<()> {
    let mut chars = prefix.chars();
    let valid = chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_' || first == ':')
        && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == ':');

    if valid {
        return Ok(());
    }

    Err(ExporterError::InvalidConfig(format!(
        "metrics prefix is not a valid metric name: {prefix:?}"
    )))
}
