//! Post, reply and like handlers.

use actix_web::{HttpResponse, http::header, web};
use uuid::Uuid;

use chirp_shared::ApiResponse;
use chirp_shared::dto::{
    FeedQuery, LikeToggleResponse, LikersResponse, PostContentRequest, RepliesResponse,
};

use super::post_response;
use crate::config::MAX_PAGE_SIZE;
use crate::middleware::error::{AppError, AppResult};
use crate::middleware::identity::Identity;
use crate::state::AppState;

/// GET /api/posts
pub async fn list_feed(
    state: web::Data<AppState>,
    query: web::Query<FeedQuery>,
) -> AppResult<HttpResponse> {
    let limit = query
        .limit
        .unwrap_or(state.feed_page_size)
        .clamp(1, MAX_PAGE_SIZE);

    let posts = state.feed.list_feed(limit).await?;
    let body: Vec<_> = posts.into_iter().map(post_response).collect();

    Ok(HttpResponse::Ok().json(ApiResponse::ok(body)))
}

/// POST /api/posts
pub async fn create_post(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<PostContentRequest>,
) -> AppResult<HttpResponse> {
    let post = state
        .feed
        .create_post(identity.user_id, body.into_inner().content)
        .await?;

    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, post.detail_path()))
        .json(ApiResponse::ok(post_response(post))))
}

/// GET /api/posts/{id} - the post's detail view.
pub async fn get_post(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = state.feed.get_post(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post_response(post))))
}

/// DELETE /api/posts/{id} - authors only; removes the whole thread under a root.
pub async fn delete_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let post = state.feed.get_post(post_id).await?;

    if post.author_id != Some(identity.user_id) {
        return Err(AppError::Forbidden(
            "only the author can delete a post".to_string(),
        ));
    }

    state.feed.delete_post(post_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/posts/{id}/thread
pub async fn thread_root(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let root = state.feed.get_thread_root(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post_response(root))))
}

/// GET /api/posts/{id}/replies
pub async fn list_replies(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let root = state.feed.get_thread_root(post_id).await?;
    let replies = state.feed.list_replies(root.id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(RepliesResponse {
        thread_root: root.id,
        count: replies.len() as u64,
        replies: replies.into_iter().map(post_response).collect(),
    })))
}

/// POST /api/posts/{id}/replies
pub async fn reply(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<PostContentRequest>,
) -> AppResult<HttpResponse> {
    let post = state
        .feed
        .reply(path.into_inner(), identity.user_id, body.into_inner().content)
        .await?;

    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, post.detail_path()))
        .json(ApiResponse::ok(post_response(post))))
}

/// POST /api/posts/{id}/like - likes, or unlikes if already liked.
pub async fn toggle_like(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let liked = state.feed.toggle_like(post_id, identity.user_id).await?;
    let likes = state.feed.count_likes(post_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(LikeToggleResponse { liked, likes })))
}

/// GET /api/posts/{id}/likers
pub async fn list_likers(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let users: Vec<Uuid> = state
        .feed
        .list_likers(path.into_inner())
        .await?
        .into_iter()
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::ok(LikersResponse {
        count: users.len() as u64,
        users,
    })))
}
