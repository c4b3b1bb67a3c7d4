//! In-memory pub/sub - notification fan-out within a single process.
//!
//! Used when Redis is not configured.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{RwLock, broadcast};
use tokio::task::JoinHandle;

use chirp_core::ports::{PubSub, PubSubError, PubSubMessage};

struct Channel {
    sender: broadcast::Sender<String>,
    listeners: Vec<JoinHandle<()>>,
}

/// In-memory pub/sub over tokio broadcast channels.
pub struct InMemoryPubSub {
    channels: Arc<RwLock<HashMap<String, Channel>>>,
    buffer_size: usize,
}

impl InMemoryPubSub {
    pub fn new(buffer_size: usize) -> Self {
        Self {
            channels: Arc::new(RwLock::new(HashMap::new())),
            buffer_size,
        }
    }
}

impl Default for InMemoryPubSub {
    fn default() -> Self {
        Self::new(100)
    }
}

#[async_trait]
impl PubSub for InMemoryPubSub {
    async fn publish(&self, channel: &str, message: &str) -> Result<(), PubSubError> {
        let channels = self.channels.read().await;

        match channels.get(channel) {
            Some(entry) => {
                // A send only fails when every receiver is gone.
                let delivered = entry.sender.send(message.to_string()).unwrap_or(0);
                tracing::debug!(channel = %channel, delivered, "Message published");
            }
            None => tracing::debug!(channel = %channel, "No subscribers for channel"),
        }

        Ok(())
    }

    async fn subscribe<F>(&self, channel: &str, handler: F) -> Result<(), PubSubError>
    where
        F: Fn(PubSubMessage) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync + 'static,
    {
        let mut channels = self.channels.write().await;
        let entry = channels
            .entry(channel.to_string())
            .or_insert_with(|| Channel {
                sender: broadcast::channel(self.buffer_size).0,
                listeners: Vec::new(),
            });

        let mut receiver = entry.sender.subscribe();
        let channel_name = channel.to_string();

        let listener = tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(payload) => {
                        handler(PubSubMessage {
                            channel: channel_name.clone(),
                            payload,
                        })
                        .await;
                    }
                    Err(broadcast::error::RecvError::Lagged(count)) => {
                        tracing::warn!(channel = %channel_name, lagged = count, "Subscriber lagged behind");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        entry.listeners.push(listener);

        tracing::info!(channel = %channel, "Subscribed to channel");
        Ok(())
    }

    async fn unsubscribe(&self, channel: &str) -> Result<(), PubSubError> {
        if let Some(entry) = self.channels.write().await.remove(channel) {
            for listener in entry.listeners {
                listener.abort();
            }
            tracing::info!(channel = %channel, "Unsubscribed from channel");
        }
        Ok(())
    }
}
