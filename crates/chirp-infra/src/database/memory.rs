//! In-memory post repository - used when no database is configured.
//!
//! Mirrors the relational behaviour of the PostgreSQL adapter: deleting a post
//! cascades to its replies, and removing an author only orphans their posts.
//! Data is lost on process restart.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use chirp_core::domain::{Post, PostId, UserId};
use chirp_core::error::RepoError;
use chirp_core::ports::{BaseRepository, PostRepository};

struct StoredPost {
    /// Insertion order, breaks ties between equal timestamps.
    seq: u64,
    post: Post,
}

#[derive(Default)]
struct Store {
    posts: HashMap<PostId, StoredPost>,
    next_seq: u64,
}

impl Store {
    /// Matching posts, newest first.
    fn newest_first<F>(&self, filter: F) -> Vec<Post>
    where
        F: Fn(&Post) -> bool,
    {
        let mut matched: Vec<&StoredPost> =
            self.posts.values().filter(|s| filter(&s.post)).collect();
        matched.sort_by(|a, b| {
            b.post
                .created_at
                .cmp(&a.post.created_at)
                .then(b.seq.cmp(&a.seq))
        });
        matched.into_iter().map(|s| s.post.clone()).collect()
    }

    fn post(&self, id: PostId) -> Result<&Post, RepoError> {
        self.posts.get(&id).map(|s| &s.post).ok_or(RepoError::NotFound)
    }

    fn check_threading(&self, post: &Post) -> Result<(), RepoError> {
        let Some(parent_id) = post.parent_id else {
            return Ok(());
        };

        let parent = self.posts.get(&parent_id).ok_or_else(|| {
            RepoError::Constraint(format!("parent post {parent_id} does not exist"))
        })?;
        if parent.post.parent_id.is_some() {
            return Err(RepoError::Constraint(format!(
                "parent post {parent_id} is itself a reply"
            )));
        }
        if self
            .posts
            .values()
            .any(|s| s.post.parent_id == Some(post.id))
        {
            return Err(RepoError::Constraint(format!(
                "post {} anchors a thread and cannot become a reply",
                post.id
            )));
        }

        Ok(())
    }
}

/// Post repository backed by a `HashMap` behind an async `RwLock`.
#[derive(Default)]
pub struct InMemoryPostRepository {
    store: RwLock<Store>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let store = self.store.read().await;
        Ok(store.posts.get(&id).map(|s| s.post.clone()))
    }

    async fn save(&self, post: Post) -> Result<Post, RepoError> {
        let mut store = self.store.write().await;
        store.check_threading(&post)?;

        let seq = match store.posts.get(&post.id) {
            Some(existing) => existing.seq,
            None => {
                store.next_seq += 1;
                store.next_seq
            }
        };
        store.posts.insert(
            post.id,
            StoredPost {
                seq,
                post: post.clone(),
            },
        );

        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut store = self.store.write().await;
        if store.posts.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }

        let before = store.posts.len();
        store.posts.retain(|_, s| s.post.parent_id != Some(id));
        tracing::debug!(
            post_id = %id,
            cascaded = before - store.posts.len(),
            "Post removed"
        );

        Ok(())
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find_replies(&self, root_id: PostId) -> Result<Vec<Post>, RepoError> {
        let store = self.store.read().await;
        Ok(store.newest_first(|p| p.parent_id == Some(root_id)))
    }

    async fn count_replies(&self, root_id: PostId) -> Result<u64, RepoError> {
        let store = self.store.read().await;
        let count = store
            .posts
            .values()
            .filter(|s| s.post.parent_id == Some(root_id))
            .count();
        Ok(count as u64)
    }

    async fn find_top_level(&self, limit: u64) -> Result<Vec<Post>, RepoError> {
        let store = self.store.read().await;
        let mut posts = store.newest_first(|p| p.parent_id.is_none());
        posts.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(posts)
    }

    async fn find_by_author(&self, author_id: UserId) -> Result<Vec<Post>, RepoError> {
        let store = self.store.read().await;
        Ok(store.newest_first(|p| p.author_id == Some(author_id)))
    }

    async fn toggle_like(&self, post_id: PostId, user_id: UserId) -> Result<bool, RepoError> {
        let mut store = self.store.write().await;
        let stored = store.posts.get_mut(&post_id).ok_or(RepoError::NotFound)?;
        let likers = &mut stored.post.liked_by;

        if likers.remove(&user_id) {
            Ok(false)
        } else {
            likers.insert(user_id);
            Ok(true)
        }
    }

    async fn count_likes(&self, post_id: PostId) -> Result<u64, RepoError> {
        let store = self.store.read().await;
        Ok(store.post(post_id)?.liked_by.len() as u64)
    }

    async fn find_likers(&self, post_id: PostId) -> Result<BTreeSet<UserId>, RepoError> {
        let store = self.store.read().await;
        Ok(store.post(post_id)?.liked_by.clone())
    }

    async fn clear_author(&self, author_id: UserId) -> Result<u64, RepoError> {
        let mut store = self.store.write().await;
        let mut touched = 0;
        for stored in store.posts.values_mut() {
            if stored.post.author_id == Some(author_id) {
                stored.post.author_id = None;
                touched += 1;
            }
        }
        Ok(touched)
    }
}
