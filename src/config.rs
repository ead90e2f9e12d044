//! Runtime configuration
//!
//! Everything the validator needs is read once at startup into a
//! [`ValidatorConfig`] and passed down explicitly. Values come from the process
//! environment (after an optional `.env` file has been loaded by the binary).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ENV_USERNAME: &str = "USERNAME";
pub const ENV_PASSWORD: &str = "PASSWORD";
pub const ENV_ENDPOINT: &str = "ENDPOINT";
pub const ENV_PORT: &str = "PORT";
pub const ENV_DATABASE: &str = "DATABASE";
pub const ENV_CONNECT_TIMEOUT: &str = "CONNECT_TIMEOUT_SECS";
pub const ENV_REPORT_FORMAT: &str = "REPORT_FORMAT";
pub const ENV_SAMPLE_LIMIT: &str = "SAMPLE_LIMIT";

/// Configuration errors. Always fatal: nothing is validated without a database.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is unset or empty
    #[error("Missing required configuration variable: {0}")]
    Missing(&'static str),

    /// A variable is set but cannot be used
    #[error("Invalid value {value:?} for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Connection parameters for the source database
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub username: String,
    pub password: String,
    pub endpoint: String,
    pub port: u16,
    pub database: String,
}

impl DatabaseConfig {
    /// Render a libpq keyword/value connection string
    ///
    /// Values are always quoted so passwords containing spaces, quotes or
    /// backslashes survive intact.
    pub fn connection_string(&self, connect_timeout_secs: u64) -> String {
        format!(
            "host={} port={} dbname={} user={} password={} connect_timeout={}",
            quote_conninfo(&self.endpoint),
            self.port,
            quote_conninfo(&self.database),
            quote_conninfo(&self.username),
            quote_conninfo(&self.password),
            connect_timeout_secs
        )
    }

    /// `user@host:port/database`, safe to log
    pub fn display_target(&self) -> String {
        format!(
            "{}@{}:{}/{}",
            self.username, self.endpoint, self.port, self.database
        )
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("port", &self.port)
            .field("database", &self.database)
            .finish()
    }
}

fn quote_conninfo(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for c in value.chars() {
        if c == '\'' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('\'');
    quoted
}

/// How the final report is rendered on stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            other => Err(format!("expected \"text\" or \"json\", got \"{}\"", other)),
        }
    }
}

/// Full validator configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorConfig {
    pub database: DatabaseConfig,

    /// Upper bound for establishing the database connection
    pub connect_timeout_secs: u64,

    pub report_format: ReportFormat,

    /// Maximum number of findings printed per failing check
    pub sample_limit: usize,
}

impl ValidatorConfig {
    pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
    pub const DEFAULT_SAMPLE_LIMIT: usize = 20;

    /// Build the configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &'static str| -> Option<String> {
            lookup(key).filter(|v| !v.trim().is_empty())
        };
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let database = DatabaseConfig {
            username: require(ENV_USERNAME)?,
            password: require(ENV_PASSWORD)?,
            endpoint: require(ENV_ENDPOINT)?.trim().to_string(),
            port: parse_value(ENV_PORT, &require(ENV_PORT)?)?,
            database: require(ENV_DATABASE)?.trim().to_string(),
        };

        let connect_timeout_secs: u64 = match get(ENV_CONNECT_TIMEOUT) {
            Some(raw) => {
                positive(ENV_CONNECT_TIMEOUT, &raw, parse_value(ENV_CONNECT_TIMEOUT, &raw)?)?
            }
            None => Self::DEFAULT_CONNECT_TIMEOUT_SECS,
        };

        let report_format: ReportFormat = match get(ENV_REPORT_FORMAT) {
            Some(raw) => raw.parse().map_err(|reason| ConfigError::Invalid {
                var: ENV_REPORT_FORMAT,
                value: raw.clone(),
                reason,
            })?,
            None => ReportFormat::default(),
        };

        let sample_limit: usize = match get(ENV_SAMPLE_LIMIT) {
            Some(raw) => positive(ENV_SAMPLE_LIMIT, &raw, parse_value(ENV_SAMPLE_LIMIT, &raw)?)?,
            None => Self::DEFAULT_SAMPLE_LIMIT,
        };

        Ok(Self {
            database,
            connect_timeout_secs,
            report_format,
            sample_limit,
        })
    }
}

fn parse_value<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
        var,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

fn positive<T>(var: &'static str, raw: &str, value: T) -> Result<T, ConfigError>
where
    T: PartialEq + Default,
{
    if value == T::default() {
        return Err(ConfigError::Invalid {
            var,
            value: raw.to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(value)
}
