//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Upper bound for `?limit=` on feed listings.
pub const MAX_PAGE_SIZE: u64 = 100;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseSettings>,
    pub redis: Option<RedisSettings>,
    /// Default number of posts returned by `GET /api/posts`.
    pub feed_page_size: u64,
}

/// Posts database; absent means the in-memory repository is used.
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Notification transport; absent means in-process pub/sub.
#[derive(Debug, Clone)]
pub struct RedisSettings {
    pub url: String,
    pub connect_timeout: Duration,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseSettings {
            url,
            max_connections: parse_var("DB_MAX_CONNECTIONS", 100),
            min_connections: parse_var("DB_MIN_CONNECTIONS", 10),
        });

        let redis = env::var("REDIS_URL").ok().map(|url| RedisSettings {
            url,
            connect_timeout: Duration::from_secs(parse_var("REDIS_CONNECT_TIMEOUT_SECS", 5)),
        });

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT", 8080),
            database,
            redis,
            feed_page_size: parse_var::<u64>("FEED_PAGE_SIZE", 20).clamp(1, MAX_PAGE_SIZE),
        }
    }
}

fn parse_var<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
