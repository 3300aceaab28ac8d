use crate::infrastructure::security::generate_secret;
use std::collections::HashMap;
use std::env;
use thiserror::Error;
use tracing::{info, warn};

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_SESSION_TTL_SECS: u64 = 24 * 60 * 60;
const MAX_SESSION_TTL_SECS: u64 = 365 * 24 * 60 * 60;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub session_secret: String,
    pub session_ttl_secs: u64,
    pub cookie_secure: bool,
}

impl Config {
    /// Reads the process environment, after loading `.env` if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        let vars: HashMap<String, String> = env::vars().collect();
        Self::from_vars(&vars)
    }

    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            vars.get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let host = get("PANTRY_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parse_or("PANTRY_PORT", get("PANTRY_PORT"), DEFAULT_PORT)?;
        let session_ttl_secs = parse_or(
            "SESSION_TTL_SECS",
            get("SESSION_TTL_SECS"),
            DEFAULT_SESSION_TTL_SECS,
        )?;
        if session_ttl_secs == 0 || session_ttl_secs > MAX_SESSION_TTL_SECS {
            return Err(ConfigError::InvalidValue {
                key: "SESSION_TTL_SECS",
                value: session_ttl_secs.to_string(),
            });
        }
        let cookie_secure = parse_or("COOKIE_SECURE", get("COOKIE_SECURE"), false)?;

        let database_url = get("DATABASE_URL");
        match &database_url {
            Some(url) => info!(database_url = %url, "Using SQLite store"),
            None => info!("DATABASE_URL not set, using in-memory store"),
        }

        let session_secret = get("SESSION_SECRET").unwrap_or_else(|| {
            warn!("SESSION_SECRET not set, sessions will not survive a restart");
            generate_secret()
        });

        Ok(Self {
            host,
            port,
            database_url,
            session_secret,
            session_ttl_secs,
            cookie_secure,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: std::str::FromStr>(
    key: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
    }
}
