//! Process configuration for skydex.
//!
//! Env-driven with `serde` defaults, the same shape as Postrust's
//! `AppConfig::from_env`: a `Default` impl supplies every fallback, then
//! `from_env` overlays whatever environment variables are actually set.

use serde::{Deserialize, Serialize};

/// Main application configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    /// Connection string. For SQLite this is a file path or `:memory:`;
    /// for PostgreSQL a `postgresql://` URI.
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Which backend `database_url` points at: `"sqlite"` or `"postgres"`.
    #[serde(default = "default_dialect")]
    pub dialect: String,

    /// Connection pool size.
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,

    /// Server host to bind.
    #[serde(default = "default_host")]
    pub server_host: String,

    /// Server port.
    #[serde(default = "default_port")]
    pub server_port: u16,

    /// Default `RUST_LOG` filter when the env var is unset.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            dialect: default_dialect(),
            pool_size: default_pool_size(),
            server_host: default_host(),
            server_port: default_port(),
            log_filter: default_log_filter(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("DATABASE_URL") {
            config.database_url = url;
        }
        if let Ok(dialect) = std::env::var("SKYDEX_DIALECT") {
            config.dialect = dialect;
        }
        if let Ok(size) = std::env::var("SKYDEX_POOL_SIZE") {
            if let Ok(n) = size.parse() {
                config.pool_size = n;
            }
        }
        if let Ok(host) = std::env::var("SKYDEX_SERVER_HOST") {
            config.server_host = host;
        }
        if let Ok(port) = std::env::var("SKYDEX_SERVER_PORT") {
            if let Ok(p) = port.parse() {
                config.server_port = p;
            }
        }
        if let Ok(port) = std::env::var("PORT") {
            if let Ok(p) = port.parse() {
                config.server_port = p;
            }
        }

        config
    }
}

fn default_database_url() -> String {
    "skydex.sqlite3".to_string()
}

fn default_dialect() -> String {
    "sqlite".to_string()
}

fn default_pool_size() -> u32 {
    10
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_filter() -> String {
    "skydex=info".to_string()
}
