// src/config.rs

use std::{env, fmt, net::SocketAddr};

use dotenvy::dotenv;
use url::Url;

/// Slug used to recognise the PAPI test when `PAPI_TEST_SLUG` is not set.
pub const DEFAULT_PAPI_TEST_SLUG: &str = "papi";

/// Upper bound for any link validity, configured or per link (30 days).
pub const MAX_LINK_TTL_MINUTES: i64 = 43_200;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub rust_log: String,
    pub bind_addr: SocketAddr,
    pub public_base_url: Url,
    /// Validity of a freshly issued test link, in minutes.
    pub link_ttl_minutes: i64,
    pub papi_test_slug: String,
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} must be set", key),
            ConfigError::Invalid { key, reason } => write!(f, "{} is invalid: {}", key, reason),
        }
    }
}

impl std::error::Error for ConfigError {}

fn required(key: &'static str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::Missing(key))
}

fn optional(key: &'static str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_link_ttl(raw: &str) -> Result<i64, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        key: "TEST_LINK_TTL_MINUTES",
        reason,
    };
    let minutes = raw.trim().parse::<i64>().map_err(|e| invalid(e.to_string()))?;
    if !(1..=MAX_LINK_TTL_MINUTES).contains(&minutes) {
        return Err(invalid(format!(
            "must be between 1 and {} minutes",
            MAX_LINK_TTL_MINUTES
        )));
    }
    Ok(minutes)
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        let database_url = required("DATABASE_URL")?;
        let jwt_secret = required("JWT_SECRET")?;
        let rust_log = optional("RUST_LOG", "info");

        let link_ttl_minutes = parse_link_ttl(&required("TEST_LINK_TTL_MINUTES")?)?;

        let bind_addr = optional("BIND_ADDR", "0.0.0.0:3000")
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                key: "BIND_ADDR",
                reason: e.to_string(),
            })?;

        let public_base_url = Url::parse(&optional("PUBLIC_BASE_URL", "http://localhost:3000"))
            .map_err(|e| ConfigError::Invalid {
                key: "PUBLIC_BASE_URL",
                reason: e.to_string(),
            })?;

        let papi_test_slug = optional("PAPI_TEST_SLUG", DEFAULT_PAPI_TEST_SLUG);

        Ok(Self {
            database_url,
            jwt_secret,
            rust_log,
            bind_addr,
            public_base_url,
            link_ttl_minutes,
            papi_test_slug,
        })
    }

    /// Builds the shareable URL a candidate opens to take the test.
    pub fn test_link(&self, token: &str) -> Result<Url, url::ParseError> {
        self.public_base_url.join(&format!("test/{}", token))
    }
}
