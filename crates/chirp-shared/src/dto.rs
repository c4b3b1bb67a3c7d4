//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body of `POST /api/posts` and `POST /api/posts/{id}/replies`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostContentRequest {
    pub content: String,
}

/// Query string of `GET /api/posts`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedQuery {
    pub limit: Option<u64>,
}

/// A post as seen by API clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: Uuid,
    /// `null` once the author's account is gone.
    pub author_id: Option<Uuid>,
    pub parent_id: Option<Uuid>,
    pub content: String,
    pub is_reply: bool,
    pub likes: u64,
    /// Detail view path of this post.
    pub url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepliesResponse {
    pub thread_root: Uuid,
    pub count: u64,
    pub replies: Vec<PostResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LikeToggleResponse {
    pub liked: bool,
    pub likes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LikersResponse {
    pub count: u64,
    pub users: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorRemovedResponse {
    pub orphaned_posts: u64,
}
