//! Uplink configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`), read once at startup and immutable
//! thereafter. Variable names match the original backend deployment
//! (`DB_PWD`, `MYSQL_DATABASE`, `APP_PORT`).

use std::net::SocketAddr;
use std::time::Duration;

/// Connection target: host, port, optional credentials and database name.
///
/// Supplied once at process start; the supervisors never mutate it.
#[derive(Debug, Clone)]
pub struct TargetDescriptor {
    /// Remote host name or address.
    pub host: String,
    /// Remote TCP port.
    pub port: u16,
    /// User name, where the endpoint authenticates.
    pub user: Option<String>,
    /// Password, where the endpoint authenticates.
    pub password: Option<String>,
    /// Target database name (database case only).
    pub database: Option<String>,
}

impl TargetDescriptor {
    /// Returns `host:port` for plain socket targets.
    #[must_use]
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Top-level configuration for the uplink service.
///
/// Loaded once at startup via [`UplinkConfig::from_env`].
#[derive(Debug, Clone)]
pub struct UplinkConfig {
    /// Socket address to bind the HTTP readiness endpoint to.
    pub listen_addr: SocketAddr,

    /// MySQL target (host, port, credentials, database name).
    pub database: TargetDescriptor,

    /// Log ingester target (plain TCP, JSON lines).
    pub log_sink: TargetDescriptor,

    /// Fixed delay between reconnect attempts. No backoff growth, no
    /// jitter, no attempt cap.
    pub retry_delay: Duration,
}

impl UplinkConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to sensible defaults when a variable is not set.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if `APP_PORT`, `DB_PORT` or `LOG_SINK_PORT` is set
    /// but cannot be parsed as a port number.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let app_port: u16 = match std::env::var("APP_PORT") {
            Ok(v) => v.parse()?,
            Err(_) => 3000,
        };
        let listen_addr: SocketAddr = ([0, 0, 0, 0], app_port).into();

        let database = TargetDescriptor {
            host: std::env::var("DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: match std::env::var("DB_PORT") {
                Ok(v) => v.parse()?,
                Err(_) => 3306,
            },
            user: std::env::var("DB_USER").ok(),
            password: std::env::var("DB_PWD").ok(),
            database: Some(
                std::env::var("MYSQL_DATABASE").unwrap_or_else(|_| "medlink".to_string()),
            ),
        };

        let log_sink = TargetDescriptor {
            host: std::env::var("LOG_SINK_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: match std::env::var("LOG_SINK_PORT") {
                Ok(v) => v.parse()?,
                Err(_) => 5000,
            },
            user: None,
            password: None,
            database: None,
        };

        let retry_delay = Duration::from_secs(parse_env("RETRY_DELAY_SECS", 5));

        Ok(Self {
            listen_addr,
            database,
            log_sink,
            retry_delay,
        })
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
