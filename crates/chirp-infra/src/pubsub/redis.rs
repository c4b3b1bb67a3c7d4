//! Redis pub/sub - notification fan-out across server instances.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use chirp_core::ports::{PubSub, PubSubError, PubSubMessage};

/// Redis connection settings.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis URL (e.g., redis://localhost:6379)
    pub url: String,
    pub connect_timeout: Duration,
}

impl RedisConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            connect_timeout: Duration::from_secs(5),
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

/// Redis-backed pub/sub.
pub struct RedisPubSub {
    conn: ConnectionManager,
    client: Client,
    subscriptions: RwLock<HashMap<String, JoinHandle<()>>>,
}

impl RedisPubSub {
    pub async fn connect(config: &RedisConfig) -> Result<Self, PubSubError> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| PubSubError::Connection(e.to_string()))?;

        // Fail fast if Redis is unreachable
        let conn = tokio::time::timeout(
            config.connect_timeout,
            ConnectionManager::new(client.clone()),
        )
        .await
        .map_err(|_| PubSubError::Connection("Connection timed out".to_string()))?
        .map_err(|e| PubSubError::Connection(e.to_string()))?;

        tracing::info!(url = %config.url, "Connected to Redis PubSub");

        Ok(Self {
            conn,
            client,
            subscriptions: RwLock::new(HashMap::new()),
        })
    }
}

#[async_trait]
impl PubSub for RedisPubSub {
    async fn publish(&self, channel: &str, message: &str) -> Result<(), PubSubError> {
        let mut conn = self.conn.clone();
        conn.publish::<_, _, ()>(channel, message)
            .await
            .map_err(|e| PubSubError::PublishError(e.to_string()))
    }

    async fn subscribe<F>(&self, channel: &str, handler: F) -> Result<(), PubSubError>
    where
        F: Fn(PubSubMessage) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync + 'static,
    {
        let mut pubsub = self
            .client
            .get_async_pubsub()
            .await
            .map_err(|e| PubSubError::Connection(e.to_string()))?;
        pubsub
            .subscribe(channel)
            .await
            .map_err(|e| PubSubError::SubscribeError(e.to_string()))?;

        let channel_name = channel.to_string();
        let handle = tokio::spawn(async move {
            let mut stream = pubsub.on_message();
            while let Some(msg) = stream.next().await {
                let payload: String = match msg.get_payload() {
                    Ok(p) => p,
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to get message payload");
                        continue;
                    }
                };

                handler(PubSubMessage {
                    channel: msg.get_channel_name().to_string(),
                    payload,
                })
                .await;
            }

            tracing::info!(channel = %channel_name, "PubSub connection closed");
        });

        if let Some(previous) = self
            .subscriptions
            .write()
            .await
            .insert(channel.to_string(), handle)
        {
            previous.abort();
        }

        tracing::debug!(channel = %channel, "Subscribed to Redis channel");
        Ok(())
    }

    async fn unsubscribe(&self, channel: &str) -> Result<(), PubSubError> {
        if let Some(handle) = self.subscriptions.write().await.remove(channel) {
            handle.abort();
            tracing::debug!(channel = %channel, "Unsubscribed from Redis channel");
        }
        Ok(())
    }
}
