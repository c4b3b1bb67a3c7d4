use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{PostId, UserId};

/// What happened to the recipient's post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Liked,
    Reply,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Liked => "liked",
            NotificationKind::Reply => "reply",
        }
    }
}

/// Event emitted after a like or reply has been committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub actor_id: UserId,
    pub recipient_id: UserId,
    pub kind: NotificationKind,
    /// The liked post, or the newly created reply.
    pub subject_id: PostId,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        actor_id: UserId,
        recipient_id: UserId,
        kind: NotificationKind,
        subject_id: PostId,
    ) -> Self {
        Self {
            actor_id,
            recipient_id,
            kind,
            subject_id,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_kind_serializes_lowercase() {
        let notification = Notification::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            NotificationKind::Liked,
            Uuid::new_v4(),
        );

        let json = serde_json::to_value(&notification).unwrap();
        assert_eq!(json["kind"], "liked");
        assert_eq!(NotificationKind::Reply.as_str(), "reply");
    }
}
