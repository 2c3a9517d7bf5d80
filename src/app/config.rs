//! Runtime configuration read from the environment.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;

use crate::domain::ConfigError;
use crate::infra::PostgresConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(ConfigError::InvalidValue {
                key: "LOG_FORMAT".to_string(),
                message: format!("unknown format '{other}', expected 'pretty' or 'json'"),
            }),
        }
    }
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub api_auth_key: SecretString,
    pub log_format: LogFormat,
    pub request_timeout: Duration,
    pub postgres: PostgresConfig,
}

impl AppConfig {
    /// Reads the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name
    /// to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
        };

        let database_url = required("DATABASE_URL")?;
        let api_auth_key = SecretString::from(required("API_AUTH_KEY")?);

        let bind_addr = parse_or(&lookup, "BIND_ADDR", || {
            DEFAULT_BIND_ADDR
                .parse::<SocketAddr>()
                .map_err(|_| ConfigError::from("invalid default bind address"))
        })?;

        let log_format = lookup("LOG_FORMAT")
            .map(|raw| raw.parse::<LogFormat>())
            .transpose()?
            .unwrap_or_default();

        let timeout_secs: u64 = parse_or(&lookup, "REQUEST_TIMEOUT_SECS", || {
            Ok(DEFAULT_REQUEST_TIMEOUT_SECS)
        })?;

        let mut postgres = PostgresConfig::default();
        postgres.max_connections = parse_or(&lookup, "DB_MAX_CONNECTIONS", || {
            Ok(postgres.max_connections)
        })?;
        if postgres.max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                key: "DB_MAX_CONNECTIONS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        postgres.min_connections = postgres.min_connections.min(postgres.max_connections);

        Ok(Self {
            database_url,
            bind_addr,
            api_auth_key,
            log_format,
            request_timeout: Duration::from_secs(timeout_secs),
            postgres,
        })
    }
}

fn parse_or<F, T, D>(lookup: &F, key: &str, default: D) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
    D: FnOnce() -> Result<T, ConfigError>,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => {
            raw.trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: e.to_string(),
                })
        }
        _ => default(),
    }
}
