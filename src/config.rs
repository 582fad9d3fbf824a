use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: String,
    pub database_url: String,
    pub db_max_connections: u32,

    // Rate limiting
    pub rate_api_per_min: u32,

    pub api_prefix: String,

    // Logging
    pub log_dir: String,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_addr: env_or("SERVER_ADDR", "127.0.0.1:8000"),
            database_url: env_or("DATABASE_URL", "sqlite://hrms.db"),
            db_max_connections: parse_env("DB_MAX_CONNECTIONS", 5)?,
            rate_api_per_min: parse_env("RATE_API_PER_MIN", 1000)?,
            api_prefix: env_or("API_PREFIX", "/api"),
            log_dir: env_or("LOG_DIR", "logs"),
            log_level: env_or("LOG_LEVEL", "info"),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} must be a number, got {raw:?}")),
        Err(_) => Ok(default),
    }
}
