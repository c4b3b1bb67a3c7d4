//! HTTP handlers and route configuration.

mod health;
mod posts;
mod users;

use actix_web::{HttpRequest, error, web};
use chirp_core::domain::Post;
use chirp_shared::dto::PostResponse;

use crate::middleware::error::AppError;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health::health_check))
            .service(
                web::scope("/posts")
                    .route("", web::get().to(posts::list_feed))
                    .route("", web::post().to(posts::create_post))
                    .route("/{id}", web::get().to(posts::get_post))
                    .route("/{id}", web::delete().to(posts::delete_post))
                    .route("/{id}/thread", web::get().to(posts::thread_root))
                    .route("/{id}/replies", web::get().to(posts::list_replies))
                    .route("/{id}/replies", web::post().to(posts::reply))
                    .route("/{id}/like", web::post().to(posts::toggle_like))
                    .route("/{id}/likers", web::get().to(posts::list_likers)),
            )
            .service(
                web::scope("/users")
                    .route("/{id}/posts", web::get().to(users::list_posts))
                    .route("/{id}/authorship", web::delete().to(users::remove_author)),
            ),
    );
}

/// Malformed JSON bodies are reported as problem documents too.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: error::JsonPayloadError, _req: &HttpRequest| {
        AppError::BadRequest(err.to_string()).into()
    })
}

pub(crate) fn post_response(post: Post) -> PostResponse {
    PostResponse {
        url: post.detail_path(),
        likes: post.liked_by.len() as u64,
        id: post.id,
        author_id: post.author_id,
        parent_id: post.parent_id,
        content: post.content,
        is_reply: post.is_reply,
        created_at: post.created_at,
    }
}
