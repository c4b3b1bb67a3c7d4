//! Notifier that publishes like/reply events as JSON on a pub/sub transport.
//!
//! Each recipient has its own channel, `<prefix>:<recipient_id>`. Whatever
//! delivers notifications to users subscribes there.

use async_trait::async_trait;

use chirp_core::domain::{Notification, UserId};
use chirp_core::error::NotifyError;
use chirp_core::ports::{Notifier, PubSub};

pub const DEFAULT_CHANNEL_PREFIX: &str = "notifications";

pub struct PubSubNotifier<P> {
    pubsub: P,
    prefix: String,
}

impl<P: PubSub> PubSubNotifier<P> {
    pub fn new(pubsub: P) -> Self {
        Self::with_prefix(pubsub, DEFAULT_CHANNEL_PREFIX)
    }

    pub fn with_prefix(pubsub: P, prefix: impl Into<String>) -> Self {
        Self {
            pubsub,
            prefix: prefix.into(),
        }
    }

    /// Channel carrying `recipient`'s notifications.
    pub fn channel_for(&self, recipient: UserId) -> String {
        format!("{}:{}", self.prefix, recipient)
    }

    pub fn pubsub(&self) -> &P {
        &self.pubsub
    }
}

#[async_trait]
impl<P: PubSub> Notifier for PubSubNotifier<P> {
    async fn notify(&self, notification: Notification) -> Result<(), NotifyError> {
        let channel = self.channel_for(notification.recipient_id);
        let payload = serde_json::to_string(&notification)
            .map_err(|e| NotifyError::Serialization(e.to_string()))?;

        self.pubsub
            .publish(&channel, &payload)
            .await
            .map_err(|e| NotifyError::Publish(e.to_string()))?;

        tracing::debug!(
            channel = %channel,
            kind = notification.kind.as_str(),
            subject_id = %notification.subject_id,
            "Notification published"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chirp_core::domain::NotificationKind;
    use tokio::sync::mpsc;
    use uuid::Uuid;

    use super::*;
    use crate::pubsub::InMemoryPubSub;

    #[tokio::test]
    async fn test_notification_lands_on_recipient_channel() {
        let notifier = PubSubNotifier::new(InMemoryPubSub::default());
        let recipient = Uuid::new_v4();
        let (tx, mut rx) = mpsc::channel(1);

        notifier
            .pubsub()
            .subscribe(&notifier.channel_for(recipient), move |msg| {
                let tx = tx.clone();
                Box::pin(async move {
                    let _ = tx.send(msg.payload).await;
                })
            })
            .await
            .unwrap();

        let sent = Notification::new(
            Uuid::new_v4(),
            recipient,
            NotificationKind::Reply,
            Uuid::new_v4(),
        );
        notifier.notify(sent.clone()).await.unwrap();

        let payload = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        let received: Notification = serde_json::from_str(&payload).unwrap();
        assert_eq!(received, sent);
    }

    #[test]
    fn test_channel_prefix() {
        let notifier = PubSubNotifier::with_prefix(InMemoryPubSub::default(), "feed");
        let recipient = Uuid::new_v4();
        assert_eq!(notifier.channel_for(recipient), format!("feed:{recipient}"));
    }
}
