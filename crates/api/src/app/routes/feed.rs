use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;

use coalition_core::{ClubId, PostId};
use coalition_feed::{NewComment, NewPost, PostPatch};

use crate::app::errors;
use crate::app::routes::common::parse_id;
use crate::app::services::AppServices;
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_feed).post(create_post))
        .route(
            "/:id",
            get(get_post).patch(edit_post).delete(delete_post),
        )
        .route("/:id/like", post(toggle_like))
        .route("/:id/comments", get(list_comments).post(add_comment))
}

#[derive(Debug, Default, Deserialize)]
pub struct FeedQuery {
    pub club_id: Option<String>,
}

pub async fn list_feed(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Query(query): Query<FeedQuery>,
) -> axum::response::Response {
    let club_filter: Option<ClubId> = match query.club_id.as_deref().map(parse_id) {
        Some(Ok(id)) => Some(id),
        Some(Err(resp)) => return resp,
        None => None,
    };
    match services.feed.list_feed(&ctx.actor(), club_filter).await {
        Ok(posts) => (StatusCode::OK, Json(serde_json::json!({ "items": posts }))).into_response(),
        Err(err) => errors::domain_error_to_response(err),
    }
}

pub async fn create_post(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Json(input): Json<NewPost>,
) -> axum::response::Response {
    match services.feed.create_post(&ctx.actor(), input).await {
        Ok(post) => (StatusCode::CREATED, Json(post)).into_response(),
        Err(err) => errors::domain_error_to_response(err),
    }
}

pub async fn get_post(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let post_id: PostId = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.feed.post(&ctx.actor(), post_id).await {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(err) => errors::domain_error_to_response(err),
    }
}

pub async fn edit_post(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
    Json(patch): Json<PostPatch>,
) -> axum::response::Response {
    let post_id: PostId = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.feed.edit_post(&ctx.actor(), post_id, patch).await {
        Ok(post) => (StatusCode::OK, Json(post)).into_response(),
        Err(err) => errors::domain_error_to_response(err),
    }
}

pub async fn delete_post(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let post_id: PostId = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.feed.delete_post(&ctx.actor(), post_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => errors::domain_error_to_response(err),
    }
}

pub async fn toggle_like(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let post_id: PostId = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.feed.toggle_like(&ctx.actor(), post_id).await {
        Ok(liked) => (StatusCode::OK, Json(serde_json::json!({ "liked": liked }))).into_response(),
        Err(err) => errors::domain_error_to_response(err),
    }
}

pub async fn list_comments(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let post_id: PostId = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.feed.list_comments(&ctx.actor(), post_id).await {
        Ok(comments) => {
            (StatusCode::OK, Json(serde_json::json!({ "items": comments }))).into_response()
        }
        Err(err) => errors::domain_error_to_response(err),
    }
}

pub async fn add_comment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
    Json(input): Json<NewComment>,
) -> axum::response::Response {
    let post_id: PostId = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.feed.add_comment(&ctx.actor(), post_id, input).await {
        Ok(comment) => (StatusCode::CREATED, Json(comment)).into_response(),
        Err(err) => errors::domain_error_to_response(err),
    }
}
