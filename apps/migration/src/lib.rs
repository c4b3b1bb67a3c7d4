//! Schema migrations for the `posts` and `post_likes` tables.

pub use sea_orm_migration::prelude::*;

mod m20240601_000001_create_posts;
mod m20240601_000002_create_post_likes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240601_000001_create_posts::Migration),
            Box::new(m20240601_000002_create_post_likes::Migration),
        ]
    }
}
