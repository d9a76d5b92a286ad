//! # API Configuration Module
//!
//! Loads server settings from environment variables, with defaults where a
//! sensible one exists.
//!
//! ## Environment Variables
//!
//! - `API_HOST`: bind address (default: "0.0.0.0")
//! - `API_PORT`: listen port (default: 3000)
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `DATABASE_MAX_CONNECTIONS`: pool size (default: 10)
//! - `LOG_LEVEL`: logging level (default: "info")
//! - `API_CORS_ORIGINS`: comma-separated list of allowed CORS origins
//! - `API_REQUEST_TIMEOUT_SECONDS`: per-request timeout (default: 30)
//! - `BOOKING_HORIZON_DAYS`: how many days ahead parents may book (default: 21)

use eyre::{eyre, Result, WrapErr};
use std::env;
use tracing::Level;

pub const DEFAULT_BOOKING_HORIZON_DAYS: u32 = 21;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub database_max_connections: u32,
    pub log_level: Level,
    pub cors_origins: Option<Vec<String>>,
    /// Request timeout in seconds
    pub request_timeout: u64,
    /// Number of days, starting today in the tutor's timezone, offered on the public profile.
    pub booking_horizon_days: u32,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`ApiConfig::from_env`] but reads keys through `lookup`.
    ///
    /// # Errors
    ///
    /// - `DATABASE_URL` is missing
    /// - `API_PORT`, `DATABASE_MAX_CONNECTIONS` or `BOOKING_HORIZON_DAYS` is not a number
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        // Network settings
        let host = lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = lookup("API_PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .wrap_err("Invalid API_PORT value")?;

        // Database settings
        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| eyre!("DATABASE_URL environment variable must be set"))?;
        let database_max_connections = lookup("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|| "10".to_string())
            .parse()
            .wrap_err("Invalid DATABASE_MAX_CONNECTIONS value")?;

        let log_level = match lookup("LOG_LEVEL")
            .unwrap_or_else(|| "info".to_string())
            .as_str()
        {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };

        let cors_origins = lookup("API_CORS_ORIGINS")
            .map(|origins| origins.split(',').map(|s| s.trim().to_string()).collect());

        let request_timeout = lookup("API_REQUEST_TIMEOUT_SECONDS")
            .and_then(|value| value.parse().ok())
            .unwrap_or(30);

        let booking_horizon_days = match lookup("BOOKING_HORIZON_DAYS") {
            Some(value) => value.parse().wrap_err("Invalid BOOKING_HORIZON_DAYS value")?,
            None => DEFAULT_BOOKING_HORIZON_DAYS,
        };

        Ok(Self {
            host,
            port,
            database_url,
            database_max_connections,
            log_level,
            cors_origins,
            request_timeout,
            booking_horizon_days,
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lookup(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn test_defaults() {
        let config = ApiConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/tb")]))
            .unwrap();

        assert_eq!(config.server_addr(), "0.0.0.0:3000");
        assert_eq!(config.database_max_connections, 10);
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.cors_origins, None);
        assert_eq!(config.request_timeout, 30);
        assert_eq!(config.booking_horizon_days, 21);
    }

    #[test]
    fn test_database_url_is_required() {
        assert!(ApiConfig::from_lookup(lookup(&[])).is_err());
    }

    #[test]
    fn test_overrides() {
        let config = ApiConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/tb"),
            ("API_PORT", "8080"),
            ("LOG_LEVEL", "debug"),
            ("API_CORS_ORIGINS", "http://a.test, http://b.test"),
            ("BOOKING_HORIZON_DAYS", "7"),
        ]))
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.log_level, Level::DEBUG);
        assert_eq!(
            config.cors_origins,
            Some(vec!["http://a.test".to_string(), "http://b.test".to_string()])
        );
        assert_eq!(config.booking_horizon_days, 7);
    }

    #[test]
    fn test_bad_port() {
        let result = ApiConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/tb"),
            ("API_PORT", "eighty"),
        ]));
        assert!(result.is_err());
    }
}
