//! Notifier port - hands like/reply events to the delivery subsystem.

use async_trait::async_trait;

use crate::domain::Notification;
use crate::error::NotifyError;

/// Fire-and-forget notification dispatch.
///
/// Delivery, ordering and retries belong to the implementation.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: Notification) -> Result<(), NotifyError>;
}
