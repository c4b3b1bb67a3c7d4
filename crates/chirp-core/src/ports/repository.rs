use std::collections::BTreeSet;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Post, PostId, UserId};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Save an entity (create or update).
    async fn save(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// Post repository.
///
/// Implementations must keep threads one level deep: `save` rejects a post
/// whose parent is missing or is itself a reply with [`RepoError::Constraint`].
/// `delete` cascades to the post's replies and to all likes.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// Replies anchored on `root_id`, newest first.
    async fn find_replies(&self, root_id: PostId) -> Result<Vec<Post>, RepoError>;

    async fn count_replies(&self, root_id: PostId) -> Result<u64, RepoError>;

    /// Top-level posts, newest first.
    async fn find_top_level(&self, limit: u64) -> Result<Vec<Post>, RepoError>;

    /// Posts written by `author_id`, newest first.
    async fn find_by_author(&self, author_id: UserId) -> Result<Vec<Post>, RepoError>;

    /// Flip `user_id`'s membership in the post's liker set.
    ///
    /// Returns `true` if the user now likes the post. Fails with
    /// [`RepoError::NotFound`] when the post does not exist.
    async fn toggle_like(&self, post_id: PostId, user_id: UserId) -> Result<bool, RepoError>;

    async fn count_likes(&self, post_id: PostId) -> Result<u64, RepoError>;

    async fn find_likers(&self, post_id: PostId) -> Result<BTreeSet<UserId>, RepoError>;

    /// Detach `author_id` from every post they wrote. Returns the number of posts touched.
    async fn clear_author(&self, author_id: UserId) -> Result<u64, RepoError>;
}
