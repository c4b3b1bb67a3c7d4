use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Posts::Table)
                    .if_not_exists()
                    .col(pk_uuid(Posts::Id))
                    // Nullable: the post outlives its author.
                    .col(uuid_null(Posts::AuthorId))
                    .col(uuid_null(Posts::ParentId))
                    .col(text(Posts::Content))
                    .col(boolean(Posts::IsReply).default(false))
                    .col(timestamp_with_time_zone(Posts::CreatedAt))
                    .check(Expr::cust("char_length(content) BETWEEN 1 AND 280"))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_posts_parent")
                            .from(Posts::Table, Posts::ParentId)
                            .to(Posts::Table, Posts::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_posts_parent_created_at")
                    .table(Posts::Table)
                    .col(Posts::ParentId)
                    .col(Posts::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_posts_author_id")
                    .table(Posts::Table)
                    .col(Posts::AuthorId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Posts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Posts {
    Table,
    Id,
    AuthorId,
    ParentId,
    Content,
    IsReply,
    CreatedAt,
}
