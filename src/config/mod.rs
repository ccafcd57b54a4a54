//! Configuration module - environment variable parsing

use std::env;
use std::net::SocketAddr;

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Server binding address
    pub server_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// PostgreSQL connection string. When present, products and categories
    /// are kept in the database instead of in memory.
    pub db_conn: Option<String>,
    /// Emit START/END events for every request
    pub log_requests: bool,

    /// Allowed client origins for CORS (empty = any origin)
    pub client_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // PORT wins over SERVER_ADDR, same as most hosting platforms expect
        let server_addr = match lookup("PORT") {
            Some(port) => format!("0.0.0.0:{}", port),
            None => lookup("SERVER_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string()),
        };

        let log_requests = match lookup("LOG_REQUESTS") {
            Some(raw) => parse_flag(&raw).ok_or(ConfigError::InvalidFlag("LOG_REQUESTS"))?,
            None => true,
        };

        Ok(Self {
            server_addr: server_addr
                .parse()
                .map_err(|_| ConfigError::InvalidAddress)?,

            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),

            db_conn: lookup("DB_CONN").filter(|s| !s.trim().is_empty()),
            log_requests,

            client_origins: lookup("CLIENT_ORIGIN")
                .map(|raw| {
                    raw.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),
        })
    }

    /// Whether the persistent (PostgreSQL) store is selected
    pub fn with_persistent_store(&self) -> bool {
        self.db_conn.is_some()
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid boolean value for environment variable: {0}")]
    InvalidFlag(&'static str),

    #[error("Invalid server address format")]
    InvalidAddress,
}
