//! Application configuration, loaded from the environment.

use std::net::SocketAddr;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
    #[error("missing required variable {0}")]
    Missing(&'static str),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    /// Public origin used in sitemap URLs, e.g. `https://app.example.com`.
    pub public_base_url: String,
    pub reminder_poll_secs: u64,
    /// How far ahead the reminder sweep looks, in hours.
    pub reminder_horizon_hours: i64,
    pub analytics_enabled: bool,
}

fn parse<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::Invalid { key, value })
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let get = |key: &'static str| std::env::var(key).ok().filter(|v| !v.is_empty());

        Ok(Self {
            bind_addr: match get("BIND_ADDR") {
                Some(v) => parse("BIND_ADDR", v)?,
                None => SocketAddr::from(([127, 0, 0, 1], 3000)),
            },
            database_url: get("DATABASE_URL").unwrap_or_else(|| "sqlite:data/app.db".to_string()),
            jwt_secret: get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?,
            jwt_ttl_hours: match get("JWT_TTL_HOURS") {
                Some(v) => parse("JWT_TTL_HOURS", v)?,
                None => 24,
            },
            public_base_url: get("PUBLIC_BASE_URL")
                .unwrap_or_else(|| "http://localhost:3000".to_string())
                .trim_end_matches('/')
                .to_string(),
            reminder_poll_secs: match get("REMINDER_POLL_SECS") {
                Some(v) => parse("REMINDER_POLL_SECS", v)?,
                None => 300,
            },
            reminder_horizon_hours: match get("REMINDER_HORIZON_HOURS") {
                Some(v) => parse("REMINDER_HORIZON_HOURS", v)?,
                None => 24,
            },
            analytics_enabled: get("ANALYTICS_ENABLED").is_some_and(|v| v == "1" || v == "true"),
        })
    }
}
