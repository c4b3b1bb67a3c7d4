//! Application state - shared across all handlers.

use std::sync::Arc;

use chirp_core::FeedStore;
use chirp_core::ports::{Notifier, PostRepository};
use chirp_infra::{InMemoryPostRepository, InMemoryPubSub, PubSubNotifier};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub feed: FeedStore,
    pub feed_page_size: u64,
    /// Name of the storage backend in use, reported by the health check.
    pub storage: &'static str,
}

impl AppState {
    /// Build the application state, falling back to in-memory adapters for
    /// anything that is not configured or not reachable.
    pub async fn new(config: &AppConfig) -> Self {
        let (posts, storage) = build_repository(config).await;
        let notifier = build_notifier(config).await;

        tracing::info!(storage, "Application state initialized");

        Self {
            feed: FeedStore::new(posts, notifier),
            feed_page_size: config.feed_page_size,
            storage,
        }
    }

    /// Fully in-memory state.
    #[cfg(test)]
    pub fn in_memory(feed_page_size: u64) -> Self {
        Self {
            feed: FeedStore::new(
                Arc::new(InMemoryPostRepository::new()),
                Arc::new(PubSubNotifier::new(InMemoryPubSub::default())),
            ),
            feed_page_size,
            storage: "memory",
        }
    }
}

#[cfg(feature = "postgres")]
async fn build_repository(config: &AppConfig) -> (Arc<dyn PostRepository>, &'static str) {
    use chirp_infra::{DatabaseConfig, PostgresPostRepository};

    let Some(settings) = &config.database else {
        tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
        return (Arc::new(InMemoryPostRepository::new()), "memory");
    };

    let db_config = DatabaseConfig {
        url: settings.url.clone(),
        max_connections: settings.max_connections,
        min_connections: settings.min_connections,
    };

    match db_config.connect().await {
        Ok(conn) => (Arc::new(PostgresPostRepository::new(conn)), "postgres"),
        Err(e) => {
            tracing::error!(
                "Failed to connect to database: {}. Using in-memory fallback.",
                e
            );
            (Arc::new(InMemoryPostRepository::new()), "memory")
        }
    }
}

#[cfg(not(feature = "postgres"))]
async fn build_repository(_config: &AppConfig) -> (Arc<dyn PostRepository>, &'static str) {
    tracing::info!("Running without postgres feature - using in-memory repository");
    (Arc::new(InMemoryPostRepository::new()), "memory")
}

#[cfg(feature = "redis")]
async fn build_notifier(config: &AppConfig) -> Arc<dyn Notifier> {
    use chirp_infra::{RedisConfig, RedisPubSub};

    if let Some(settings) = &config.redis {
        let redis_config =
            RedisConfig::new(settings.url.clone()).with_connect_timeout(settings.connect_timeout);
        match RedisPubSub::connect(&redis_config).await {
            Ok(pubsub) => return Arc::new(PubSubNotifier::new(pubsub)),
            Err(e) => tracing::error!(
                "Failed to connect to Redis: {}. Notifications stay in-process.",
                e
            ),
        }
    }

    Arc::new(PubSubNotifier::new(InMemoryPubSub::default()))
}

#[cfg(not(feature = "redis"))]
async fn build_notifier(_config: &AppConfig) -> Arc<dyn Notifier> {
    Arc::new(PubSubNotifier::new(InMemoryPubSub::default()))
}
