//! Feed service - posts, reply threads, likes and the notifications they trigger.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::domain::{Notification, NotificationKind, Post, PostId, UserId};
use crate::error::{DomainError, RepoError};
use crate::ports::{Notifier, PostRepository};

/// Stateless feed service over a [`PostRepository`] and a [`Notifier`].
///
/// Every operation is a single read-modify-write against the repository.
/// Notifications are emitted only after the write succeeded, and a failing
/// notifier never fails the operation.
#[derive(Clone)]
pub struct FeedStore {
    posts: Arc<dyn PostRepository>,
    notifier: Arc<dyn Notifier>,
}

impl FeedStore {
    pub fn new(posts: Arc<dyn PostRepository>, notifier: Arc<dyn Notifier>) -> Self {
        Self { posts, notifier }
    }

    /// Publish a new top-level post.
    pub async fn create_post(&self, author: UserId, content: String) -> Result<Post, DomainError> {
        let post = Post::new(author, content)?;
        let saved = self.posts.save(post).await?;

        tracing::info!(post_id = %saved.id, author_id = %author, "Post created");
        Ok(saved)
    }

    /// Reply to `parent_id`.
    ///
    /// Replies to a reply are attached to that reply's thread root, so threads
    /// never grow deeper than one level. The author of the post actually
    /// replied to is notified.
    pub async fn reply(
        &self,
        parent_id: PostId,
        author: UserId,
        content: String,
    ) -> Result<Post, DomainError> {
        let parent = self.load(parent_id).await?;
        let root = match parent.parent_id {
            Some(root_id) => self.load(root_id).await?,
            None => parent.clone(),
        };

        let reply = Post::reply_to(&root, author, content)?;
        let saved = self.posts.save(reply).await?;

        tracing::info!(
            post_id = %saved.id,
            root_id = %root.id,
            replied_to = %parent.id,
            "Reply created"
        );

        self.dispatch(author, parent.author_id, NotificationKind::Reply, saved.id)
            .await;

        Ok(saved)
    }

    /// Like or unlike `post_id` on behalf of `user`.
    ///
    /// Returns whether the user likes the post afterwards. Only a new like
    /// notifies the post's author.
    pub async fn toggle_like(&self, post_id: PostId, user: UserId) -> Result<bool, DomainError> {
        let post = self.load(post_id).await?;

        let liked = self
            .posts
            .toggle_like(post_id, user)
            .await
            .map_err(|e| not_found_as(e, post_id))?;

        tracing::debug!(post_id = %post_id, user_id = %user, liked, "Like toggled");

        if liked {
            self.dispatch(user, post.author_id, NotificationKind::Liked, post.id)
                .await;
        }

        Ok(liked)
    }

    pub async fn get_post(&self, post_id: PostId) -> Result<Post, DomainError> {
        self.load(post_id).await
    }

    /// The post anchoring `post_id`'s thread: its parent, or the post itself.
    pub async fn get_thread_root(&self, post_id: PostId) -> Result<Post, DomainError> {
        let post = self.load(post_id).await?;
        match post.parent_id {
            Some(root_id) => self.load(root_id).await,
            None => Ok(post),
        }
    }

    pub async fn count_replies(&self, post_id: PostId) -> Result<u64, DomainError> {
        let root_id = self.load(post_id).await?.thread_root_id();
        Ok(self.posts.count_replies(root_id).await?)
    }

    /// All replies in `post_id`'s thread, newest first.
    pub async fn list_replies(&self, post_id: PostId) -> Result<Vec<Post>, DomainError> {
        let root_id = self.load(post_id).await?.thread_root_id();
        Ok(self.posts.find_replies(root_id).await?)
    }

    pub async fn count_likes(&self, post_id: PostId) -> Result<u64, DomainError> {
        self.posts
            .count_likes(post_id)
            .await
            .map_err(|e| not_found_as(e, post_id))
    }

    pub async fn list_likers(&self, post_id: PostId) -> Result<BTreeSet<UserId>, DomainError> {
        self.posts
            .find_likers(post_id)
            .await
            .map_err(|e| not_found_as(e, post_id))
    }

    /// Newest top-level posts.
    pub async fn list_feed(&self, limit: u64) -> Result<Vec<Post>, DomainError> {
        Ok(self.posts.find_top_level(limit).await?)
    }

    pub async fn list_by_author(&self, author: UserId) -> Result<Vec<Post>, DomainError> {
        Ok(self.posts.find_by_author(author).await?)
    }

    /// Delete a post together with every reply in its thread.
    pub async fn delete_post(&self, post_id: PostId) -> Result<(), DomainError> {
        self.posts
            .delete(post_id)
            .await
            .map_err(|e| not_found_as(e, post_id))?;

        tracing::info!(post_id = %post_id, "Post deleted");
        Ok(())
    }

    /// Orphan every post written by `author`. The posts stay in the feed.
    pub async fn remove_author(&self, author: UserId) -> Result<u64, DomainError> {
        let orphaned = self.posts.clear_author(author).await?;

        tracing::info!(author_id = %author, orphaned, "Author detached from posts");
        Ok(orphaned)
    }

    async fn load(&self, post_id: PostId) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::post_not_found(post_id))
    }

    async fn dispatch(
        &self,
        actor: UserId,
        recipient: Option<UserId>,
        kind: NotificationKind,
        subject: PostId,
    ) {
        // Orphaned posts have nobody to tell.
        let Some(recipient) = recipient else {
            tracing::debug!(subject_id = %subject, kind = kind.as_str(), "No recipient for notification");
            return;
        };

        let notification = Notification::new(actor, recipient, kind, subject);
        if let Err(e) = self.notifier.notify(notification).await {
            tracing::warn!(
                error = %e,
                recipient_id = %recipient,
                kind = kind.as_str(),
                "Notification dispatch failed"
            );
        }
    }
}

fn not_found_as(err: RepoError, post_id: PostId) -> DomainError {
    match err {
        RepoError::NotFound => DomainError::post_not_found(post_id),
        other => other.into(),
    }
}
