//! # Chirp Infrastructure
//!
//! Concrete implementations of the ports defined in `chirp-core`.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory only
//! - `postgres` - PostgreSQL post repository via SeaORM
//! - `redis` - Redis pub/sub transport for notifications

pub mod database;
pub mod notifier;
pub mod pubsub;

// Re-exports - In-Memory
pub use database::InMemoryPostRepository;
pub use notifier::PubSubNotifier;
pub use pubsub::InMemoryPubSub;

// Re-exports - PostgreSQL
#[cfg(feature = "postgres")]
pub use database::{DatabaseConfig, PostgresPostRepository};

// Re-exports - Redis
#[cfg(feature = "redis")]
pub use pubsub::{RedisConfig, RedisPubSub};
