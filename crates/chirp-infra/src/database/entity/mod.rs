//! SeaORM entities for the `posts` and `post_likes` tables.

pub mod post;
pub mod post_like;
