//! Server configuration from the environment.
//!
//! Variables are read from the process environment, after an optional
//! `.env` file has been loaded with [`load_dotenv`].
//!
//! | Variable                | Default     |
//! |-------------------------|-------------|
//! | `SENDERO_HOST`          | `127.0.0.1` |
//! | `SENDERO_PORT`          | `8000`      |
//! | `SENDERO_INTROSPECTION` | `true`      |
//! | `SENDERO_LOG_JSON`      | `false`     |

use std::str::FromStr;

use crate::coerce::parse_flag;

pub const HOST_VAR: &str = "SENDERO_HOST";
pub const PORT_VAR: &str = "SENDERO_PORT";
pub const INTROSPECTION_VAR: &str = "SENDERO_INTROSPECTION";
pub const LOG_JSON_VAR: &str = "SENDERO_LOG_JSON";

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} has an invalid value `{value}`: expected {expected}")]
    Invalid {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Loads `.env` from the working directory, if there is one.
pub fn load_dotenv() {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "loaded .env");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub introspection: bool,
    pub log_json: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            introspection: true,
            log_json: false,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds the configuration from `lookup`, which returns the value of a
    /// variable when it is set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Ok(Self {
            host: lookup(HOST_VAR).unwrap_or(defaults.host),
            port: parse_var(&lookup, PORT_VAR, "a port number")?.unwrap_or(defaults.port),
            introspection: flag_var(&lookup, INTROSPECTION_VAR)?.unwrap_or(defaults.introspection),
            log_json: flag_var(&lookup, LOG_JSON_VAR)?.unwrap_or(defaults.log_json),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<F, T>(lookup: &F, var: &'static str, expected: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(var)
        .map(|value| {
            value.trim().parse().map_err(|_| ConfigError::Invalid {
                var,
                value: value.clone(),
                expected,
            })
        })
        .transpose()
}

fn flag_var<F>(lookup: &F, var: &'static str) -> Result<Option<bool>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var)
        .map(|value| {
            parse_flag(value.trim()).ok_or_else(|| ConfigError::Invalid {
                var,
                value: value.clone(),
                expected: "a boolean",
            })
        })
        .transpose()
}
