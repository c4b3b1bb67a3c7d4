use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{PostId, UserId};
use crate::error::DomainError;

/// Maximum post length, counted in Unicode scalar values.
pub const MAX_CONTENT_CHARS: usize = 280;

/// Post entity - a single feed entry, either top-level or a reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    /// `None` once the author has been removed; the post itself survives.
    pub author_id: Option<UserId>,
    /// Thread root this post replies to. Never points at another reply.
    pub parent_id: Option<PostId>,
    pub content: String,
    pub is_reply: bool,
    pub liked_by: BTreeSet<UserId>,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Create a new top-level post.
    pub fn new(author_id: UserId, content: String) -> Result<Self, DomainError> {
        validate_content(&content)?;

        Ok(Self {
            id: Uuid::new_v4(),
            author_id: Some(author_id),
            parent_id: None,
            content,
            is_reply: false,
            liked_by: BTreeSet::new(),
            created_at: Utc::now(),
        })
    }

    /// Create a reply attached to `root`.
    ///
    /// `root` must already be a thread root; callers resolve it with
    /// [`Post::thread_root_id`] first.
    pub fn reply_to(root: &Post, author_id: UserId, content: String) -> Result<Self, DomainError> {
        if let Some(grandparent) = root.parent_id {
            return Err(DomainError::Validation(format!(
                "post {} is a reply to {} and cannot anchor a thread",
                root.id, grandparent
            )));
        }

        let mut reply = Self::new(author_id, content)?;
        reply.parent_id = Some(root.id);
        reply.is_reply = true;
        Ok(reply)
    }

    /// Id of the post anchoring this post's thread.
    pub fn thread_root_id(&self) -> PostId {
        self.parent_id.unwrap_or(self.id)
    }

    pub fn is_liked_by(&self, user_id: UserId) -> bool {
        self.liked_by.contains(&user_id)
    }

    /// Stable retrieval path for the post's detail view.
    pub fn detail_path(&self) -> String {
        format!("/api/posts/{}", self.id)
    }
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.content)
    }
}

/// Check post content: not blank, at most [`MAX_CONTENT_CHARS`] characters.
pub fn validate_content(content: &str) -> Result<(), DomainError> {
    if content.trim().is_empty() {
        return Err(DomainError::Validation(
            "content must not be empty".to_string(),
        ));
    }

    let len = content.chars().count();
    if len > MAX_CONTENT_CHARS {
        return Err(DomainError::Validation(format!(
            "content is {len} characters, the limit is {MAX_CONTENT_CHARS}"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_post_is_top_level() {
        let author = Uuid::new_v4();
        let post = Post::new(author, "hello".to_string()).unwrap();

        assert_eq!(post.author_id, Some(author));
        assert_eq!(post.parent_id, None);
        assert!(!post.is_reply);
        assert!(post.liked_by.is_empty());
        assert_eq!(post.thread_root_id(), post.id);
        assert_eq!(post.to_string(), "hello");
    }

    #[test]
    fn test_content_limits() {
        let author = Uuid::new_v4();

        assert!(Post::new(author, "a".repeat(280)).is_ok());
        assert!(matches!(
            Post::new(author, "a".repeat(281)),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            Post::new(author, String::new()),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            Post::new(author, "   \n".to_string()),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn test_content_counts_characters_not_bytes() {
        // 280 two-byte characters
        let content = "é".repeat(280);
        assert_eq!(content.len(), 560);
        assert!(validate_content(&content).is_ok());
    }

    #[test]
    fn test_reply_points_at_root() {
        let root = Post::new(Uuid::new_v4(), "root".to_string()).unwrap();
        let reply = Post::reply_to(&root, Uuid::new_v4(), "re".to_string()).unwrap();

        assert!(reply.is_reply);
        assert_eq!(reply.parent_id, Some(root.id));
        assert_eq!(reply.thread_root_id(), root.id);
    }

    #[test]
    fn test_reply_to_reply_is_rejected() {
        let root = Post::new(Uuid::new_v4(), "root".to_string()).unwrap();
        let reply = Post::reply_to(&root, Uuid::new_v4(), "re".to_string()).unwrap();

        let nested = Post::reply_to(&reply, Uuid::new_v4(), "re re".to_string());
        assert!(matches!(nested, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_detail_path_uses_id() {
        let post = Post::new(Uuid::new_v4(), "hello".to_string()).unwrap();
        assert_eq!(post.detail_path(), format!("/api/posts/{}", post.id));
    }
}
