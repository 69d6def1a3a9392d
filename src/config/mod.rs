//! Application configuration loaded from environment.

use std::fmt;
use std::net::SocketAddr;

use chrono::Duration;

use crate::auth::HashCost;

/// Default session lifetime when `JWT_EXPIRE` is unset.
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

/// Longest accepted session lifetime.
pub const MAX_TOKEN_TTL_DAYS: i64 = 3650;

/// Application configuration loaded from `.env` and environment variables.
#[derive(Clone)]
pub struct Config {
    /// Server bind address (e.g. `0.0.0.0:5000`).
    pub server_addr: SocketAddr,
    /// PostgreSQL connection URL. `None` selects the in-memory credential store.
    pub database_url: Option<String>,
    /// JWT signing secret. Required, never defaulted.
    pub jwt_secret: String,
    /// Session token lifetime.
    pub token_ttl: Duration,
    /// Argon2 work factor for new password hashes.
    pub hash_cost: HashCost,
    /// Allowed CORS origin; any origin when unset.
    pub cors_origin: Option<String>,
    /// Log level: `error`, `warn`, `info`, `debug`, `trace`.
    pub log_level: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("server_addr", &self.server_addr)
            .field("database_url", &self.database_url.as_ref().map(|_| "<set>"))
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .field("hash_cost", &self.hash_cost)
            .field("cors_origin", &self.cors_origin)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment. Call `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> Result<Self, ConfigLoadError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigLoadError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server_addr = lookup("SERVER_ADDR").unwrap_or_else(|| "0.0.0.0:5000".to_string());
        let server_addr: SocketAddr = server_addr
            .parse()
            .map_err(|_| ConfigLoadError::InvalidServerAddr)?;

        let database_url = lookup("DATABASE_URL").filter(|s| !s.trim().is_empty());

        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigLoadError::MissingJwtSecret)?;

        let token_ttl = match lookup("JWT_EXPIRE") {
            Some(raw) => parse_ttl(&raw)?,
            None => Duration::hours(DEFAULT_TOKEN_TTL_HOURS),
        };

        let defaults = HashCost::default();
        let hash_cost = HashCost {
            memory_kib: parse_u32(&lookup, "PASSWORD_HASH_MEMORY_KIB", defaults.memory_kib)?,
            iterations: parse_u32(&lookup, "PASSWORD_HASH_ITERATIONS", defaults.iterations)?,
            parallelism: parse_u32(&lookup, "PASSWORD_HASH_PARALLELISM", defaults.parallelism)?,
        };

        let cors_origin = lookup("CORS_ORIGIN").filter(|s| !s.trim().is_empty());
        let log_level = lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        Ok(Self {
            server_addr,
            database_url,
            jwt_secret,
            token_ttl,
            hash_cost,
            cors_origin,
            log_level,
        })
    }
}

/// Parse a lifetime such as `3600`, `90s`, `30m`, `24h` or `7d`.
pub fn parse_ttl(raw: &str) -> Result<Duration, ConfigLoadError> {
    let raw = raw.trim();
    let invalid = || ConfigLoadError::InvalidJwtExpire(raw.to_string());

    let (digits, unit) = match raw.char_indices().find(|(_, c)| !c.is_ascii_digit()) {
        Some((idx, _)) => raw.split_at(idx),
        None => (raw, "s"),
    };
    let value: i64 = digits.parse().map_err(|_| invalid())?;

    let ttl = match unit {
        "s" => Duration::try_seconds(value),
        "m" => Duration::try_minutes(value),
        "h" => Duration::try_hours(value),
        "d" => Duration::try_days(value),
        _ => None,
    };
    match ttl {
        Some(ttl) if ttl <= Duration::days(MAX_TOKEN_TTL_DAYS) => Ok(ttl),
        _ => Err(invalid()),
    }
}

fn parse_u32<F>(lookup: &F, key: &'static str, default: u32) -> Result<u32, ConfigLoadError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigLoadError::InvalidNumber(key)),
        None => Ok(default),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("Invalid SERVER_ADDR")]
    InvalidServerAddr,

    #[error("JWT_SECRET must be set")]
    MissingJwtSecret,

    #[error("Invalid JWT_EXPIRE: {0}")]
    InvalidJwtExpire(String),

    #[error("Invalid number in {0}")]
    InvalidNumber(&'static str),
}
