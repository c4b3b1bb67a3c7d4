//! Post entity for SeaORM.

use std::collections::BTreeSet;

use sea_orm::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub author_id: Option<Uuid>,
    pub parent_id: Option<Uuid>,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub is_reply: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ParentId",
        to = "Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Parent,
    #[sea_orm(has_many = "super::post_like::Entity")]
    Likes,
}

impl Related<super::post_like::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Likes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Build the domain post from a row and its likers.
    pub fn into_domain(self, liked_by: BTreeSet<Uuid>) -> chirp_core::domain::Post {
        chirp_core::domain::Post {
            id: self.id,
            author_id: self.author_id,
            parent_id: self.parent_id,
            content: self.content,
            is_reply: self.is_reply,
            liked_by,
            created_at: self.created_at.into(),
        }
    }
}

/// Conversion from Domain Post to SeaORM ActiveModel. Likers live in `post_likes`.
impl From<&chirp_core::domain::Post> for ActiveModel {
    fn from(post: &chirp_core::domain::Post) -> Self {
        Self {
            id: Set(post.id),
            author_id: Set(post.author_id),
            parent_id: Set(post.parent_id),
            content: Set(post.content.clone()),
            is_reply: Set(post.is_reply),
            created_at: Set(post.created_at.into()),
        }
    }
}
