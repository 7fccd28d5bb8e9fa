//! Environment-driven settings, loaded once at startup.

use std::{net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub media_root: PathBuf,
    pub index_cache_ttl: Duration,
    pub session_inactivity: time::Duration,
    pub secure_cookies: bool,
}

impl Config {
    /// Reads the process environment, after merging a `.env` file if one exists.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        Ok(Config {
            database_url: var_or("DATABASE_URL", "sqlite://yatube.db?mode=rwc"),
            bind_addr: parse_var("BIND_ADDR", "0.0.0.0:8080")?,
            media_root: PathBuf::from(var_or("MEDIA_ROOT", "media")),
            index_cache_ttl: Duration::from_secs(parse_var("INDEX_CACHE_TTL_SECS", "20")?),
            session_inactivity: time::Duration::minutes(parse_var("SESSION_INACTIVITY_MINUTES", "60")?),
            secure_cookies: parse_var("SECURE_COOKIES", "false")?,
        })
    }
}

fn var_or(key: &str, default: &str) -> String {
    dotenv::var(key).unwrap_or_else(|_| default.to_owned())
}

fn parse_var<T>(key: &str, default: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = var_or(key, default);
    raw.parse()
        .with_context(|| format!("invalid value {raw:?} for {key}"))
}
