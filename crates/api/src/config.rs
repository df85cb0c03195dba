//! Process configuration, read from environment variables.
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `BANKCORE_BIND_ADDR` | `0.0.0.0:8080` | HTTP listen address |
//! | `BANKCORE_STORE` | `memory` | `memory` or `postgres` |
//! | `DATABASE_URL` | (none) | required when `BANKCORE_STORE=postgres` |
//! | `BANKCORE_LOG_FORMAT` | `json` | `json` or `pretty` |

use std::net::SocketAddr;

use thiserror::Error;

use bankcore_observability::LogFormat;

pub const BIND_ADDR: &str = "BANKCORE_BIND_ADDR";
pub const STORE: &str = "BANKCORE_STORE";
pub const DATABASE_URL: &str = "DATABASE_URL";
pub const LOG_FORMAT: &str = "BANKCORE_LOG_FORMAT";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} is required: {reason}")]
    Missing { key: &'static str, reason: &'static str },

    #[error("{key}={value} is invalid: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Where accounts and transactions are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    InMemory,
    Postgres { database_url: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub store: StoreBackend,
    pub log_format: LogFormat,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup (tests pass a map).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_addr = lookup(BIND_ADDR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr: SocketAddr = raw_addr.parse().map_err(|e: std::net::AddrParseError| {
            ConfigError::Invalid {
                key: BIND_ADDR,
                value: raw_addr.clone(),
                reason: e.to_string(),
            }
        })?;

        let store = match lookup(STORE).as_deref().map(str::trim) {
            None | Some("") | Some("memory") => StoreBackend::InMemory,
            Some("postgres") => StoreBackend::Postgres {
                database_url: lookup(DATABASE_URL)
                    .filter(|url| !url.trim().is_empty())
                    .ok_or(ConfigError::Missing {
                        key: DATABASE_URL,
                        reason: "BANKCORE_STORE=postgres needs a connection string",
                    })?,
            },
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: STORE,
                    value: other.to_string(),
                    reason: "expected 'memory' or 'postgres'".to_string(),
                });
            }
        };

        let log_format = match lookup(LOG_FORMAT) {
            None => LogFormat::default(),
            Some(raw) => LogFormat::parse(&raw).ok_or_else(|| ConfigError::Invalid {
                key: LOG_FORMAT,
                value: raw.clone(),
                reason: "expected 'json' or 'pretty'".to_string(),
            })?,
        };

        Ok(Self {
            bind_addr,
            store,
            log_format,
        })
    }
}
