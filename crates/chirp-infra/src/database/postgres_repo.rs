//! PostgreSQL post repository.
//!
//! Threads are one level deep and `posts.parent_id` cascades on delete, so
//! removing a root also removes its replies and every `post_likes` row.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbConn, DbErr, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait, Value,
};
use uuid::Uuid;

use chirp_core::domain::{Post, PostId, UserId};
use chirp_core::error::RepoError;
use chirp_core::ports::{BaseRepository, PostRepository};

use super::entity::post::{self, Entity as PostEntity};
use super::entity::post_like::{self, Entity as PostLikeEntity};

fn query_err(e: DbErr) -> RepoError {
    let err_str = e.to_string();
    if err_str.contains("duplicate") || err_str.contains("unique") {
        RepoError::Constraint("Entity already exists".to_string())
    } else {
        RepoError::Query(err_str)
    }
}

/// PostgreSQL post repository.
pub struct PostgresPostRepository {
    db: DbConn,
}

impl PostgresPostRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    async fn ensure_exists(&self, post_id: PostId) -> Result<post::Model, RepoError> {
        PostEntity::find_by_id(post_id)
            .one(&self.db)
            .await
            .map_err(query_err)?
            .ok_or(RepoError::NotFound)
    }

    async fn likers_of(&self, post_id: PostId) -> Result<BTreeSet<UserId>, RepoError> {
        let likes = PostLikeEntity::find()
            .filter(post_like::Column::PostId.eq(post_id))
            .all(&self.db)
            .await
            .map_err(query_err)?;

        Ok(likes.into_iter().map(|l| l.user_id).collect())
    }

    /// Load likers for a page of posts with a single query.
    async fn with_likers(&self, models: Vec<post::Model>) -> Result<Vec<Post>, RepoError> {
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
        let likes = PostLikeEntity::find()
            .filter(post_like::Column::PostId.is_in(ids))
            .all(&self.db)
            .await
            .map_err(query_err)?;

        let mut by_post: HashMap<Uuid, BTreeSet<UserId>> = HashMap::new();
        for like in likes {
            by_post.entry(like.post_id).or_default().insert(like.user_id);
        }

        Ok(models
            .into_iter()
            .map(|m| {
                let likers = by_post.remove(&m.id).unwrap_or_default();
                m.into_domain(likers)
            })
            .collect())
    }

    async fn check_threading(&self, post: &Post) -> Result<(), RepoError> {
        let Some(parent_id) = post.parent_id else {
            return Ok(());
        };

        let parent = PostEntity::find_by_id(parent_id)
            .one(&self.db)
            .await
            .map_err(query_err)?
            .ok_or_else(|| {
                RepoError::Constraint(format!("parent post {parent_id} does not exist"))
            })?;
        if parent.parent_id.is_some() {
            return Err(RepoError::Constraint(format!(
                "parent post {parent_id} is itself a reply"
            )));
        }

        let anchored = PostEntity::find()
            .filter(post::Column::ParentId.eq(post.id))
            .count(&self.db)
            .await
            .map_err(query_err)?;
        if anchored > 0 {
            return Err(RepoError::Constraint(format!(
                "post {} anchors a thread and cannot become a reply",
                post.id
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for PostgresPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let Some(model) = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(query_err)?
        else {
            return Ok(None);
        };

        let likers = self.likers_of(id).await?;
        Ok(Some(model.into_domain(likers)))
    }

    async fn save(&self, post: Post) -> Result<Post, RepoError> {
        self.check_threading(&post).await?;

        let txn = self.db.begin().await.map_err(query_err)?;

        let exists = PostEntity::find_by_id(post.id)
            .one(&txn)
            .await
            .map_err(query_err)?
            .is_some();

        let active: post::ActiveModel = (&post).into();
        if exists {
            active.update(&txn).await.map_err(query_err)?;
            PostLikeEntity::delete_many()
                .filter(post_like::Column::PostId.eq(post.id))
                .exec(&txn)
                .await
                .map_err(query_err)?;
        } else {
            active.insert(&txn).await.map_err(query_err)?;
        }

        if !post.liked_by.is_empty() {
            let now = Utc::now();
            let rows = post.liked_by.iter().map(|user_id| post_like::ActiveModel {
                post_id: Set(post.id),
                user_id: Set(*user_id),
                created_at: Set(now.into()),
            });
            PostLikeEntity::insert_many(rows)
                .exec_without_returning(&txn)
                .await
                .map_err(query_err)?;
        }

        txn.commit().await.map_err(query_err)?;

        tracing::debug!(post_id = %post.id, updated = exists, "Post saved");
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let result = PostEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(query_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_replies(&self, root_id: PostId) -> Result<Vec<Post>, RepoError> {
        let models = PostEntity::find()
            .filter(post::Column::ParentId.eq(root_id))
            .order_by_desc(post::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(query_err)?;

        self.with_likers(models).await
    }

    async fn count_replies(&self, root_id: PostId) -> Result<u64, RepoError> {
        PostEntity::find()
            .filter(post::Column::ParentId.eq(root_id))
            .count(&self.db)
            .await
            .map_err(query_err)
    }

    async fn find_top_level(&self, limit: u64) -> Result<Vec<Post>, RepoError> {
        let models = PostEntity::find()
            .filter(post::Column::ParentId.is_null())
            .order_by_desc(post::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(query_err)?;

        self.with_likers(models).await
    }

    async fn find_by_author(&self, author_id: UserId) -> Result<Vec<Post>, RepoError> {
        let models = PostEntity::find()
            .filter(post::Column::AuthorId.eq(author_id))
            .order_by_desc(post::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(query_err)?;

        self.with_likers(models).await
    }

    async fn toggle_like(&self, post_id: PostId, user_id: UserId) -> Result<bool, RepoError> {
        self.ensure_exists(post_id).await?;

        let removed = PostLikeEntity::delete_many()
            .filter(post_like::Column::PostId.eq(post_id))
            .filter(post_like::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(query_err)?;
        if removed.rows_affected > 0 {
            return Ok(false);
        }

        let like = post_like::ActiveModel {
            post_id: Set(post_id),
            user_id: Set(user_id),
            created_at: Set(Utc::now().into()),
        };
        PostLikeEntity::insert(like)
            .on_conflict(
                OnConflict::columns([post_like::Column::PostId, post_like::Column::UserId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(query_err)?;

        Ok(true)
    }

    async fn count_likes(&self, post_id: PostId) -> Result<u64, RepoError> {
        self.ensure_exists(post_id).await?;

        PostLikeEntity::find()
            .filter(post_like::Column::PostId.eq(post_id))
            .count(&self.db)
            .await
            .map_err(query_err)
    }

    async fn find_likers(&self, post_id: PostId) -> Result<BTreeSet<UserId>, RepoError> {
        self.ensure_exists(post_id).await?;
        self.likers_of(post_id).await
    }

    async fn clear_author(&self, author_id: UserId) -> Result<u64, RepoError> {
        let result = PostEntity::update_many()
            .col_expr(post::Column::AuthorId, Expr::value(Value::Uuid(None)))
            .filter(post::Column::AuthorId.eq(author_id))
            .exec(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.rows_affected)
    }
}
