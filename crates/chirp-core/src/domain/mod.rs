//! Domain entities - the core business objects.

mod notification;
mod post;

pub use notification::{Notification, NotificationKind};
pub use post::{MAX_CONTENT_CHARS, Post, validate_content};

/// Identifier of a user owned by the external identity layer.
pub type UserId = uuid::Uuid;

/// Identifier of a [`Post`].
pub type PostId = uuid::Uuid;
