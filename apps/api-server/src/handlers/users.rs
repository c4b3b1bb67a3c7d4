//! Per-user views and the account-removal hook.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use chirp_shared::ApiResponse;
use chirp_shared::dto::AuthorRemovedResponse;

use super::post_response;
use crate::middleware::error::{AppError, AppResult};
use crate::middleware::identity::Identity;
use crate::state::AppState;

/// GET /api/users/{id}/posts
pub async fn list_posts(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let posts = state.feed.list_by_author(path.into_inner()).await?;
    let body: Vec<_> = posts.into_iter().map(post_response).collect();

    Ok(HttpResponse::Ok().json(ApiResponse::ok(body)))
}

/// DELETE /api/users/{id}/authorship
///
/// Called when an account is closed: the user's posts stay but lose their author.
pub async fn remove_author(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let user_id = path.into_inner();
    if identity.user_id != user_id {
        return Err(AppError::Forbidden(
            "users can only detach their own posts".to_string(),
        ));
    }

    let orphaned_posts = state.feed.remove_author(user_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(AuthorRemovedResponse { orphaned_posts })))
}
