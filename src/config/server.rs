// src/config/server.rs
use std::env;
use std::path::PathBuf;

pub const ENV_CLICKS_PATH: &str = "CLICKS_PATH";
pub const DEFAULT_CLICKS_PATH: &str = "data/clicks.json";

/// Settings for the click-tracking / probe service, read from the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub clicks_path: PathBuf,
    pub db: DbConfig,
}

/// MySQL coordinates for the `/api/test/db` probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 3306,
            user: "root".to_string(),
            password: String::new(),
            database: "news_db".to_string(),
        }
    }
}

impl DbConfig {
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            host: env::var("DB_HOST").unwrap_or(d.host),
            port: env::var("DB_PORT")
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(d.port),
            user: env::var("DB_USER").unwrap_or(d.user),
            password: env::var("DB_PASSWORD").unwrap_or(d.password),
            database: env::var("DB_NAME").unwrap_or(d.database),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            clicks_path: env::var(ENV_CLICKS_PATH)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_CLICKS_PATH)),
            db: DbConfig::from_env(),
        }
    }
}
