use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use coalition_core::{AccountId, ClubId, RequestId};

use crate::app::routes::common::parse_id;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new()
        .route("/requests", post(request_membership))
        .route("/requests/mine", get(my_pending_request))
        .route("/requests/club/:club_id", get(pending_requests))
        .route("/requests/:id/approve", post(approve_request))
        .route("/requests/:id/reject", post(reject_request))
        .route("/members/:id", axum::routing::delete(remove_member))
}

pub async fn request_membership(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Json(body): Json<dto::MembershipRequestBody>,
) -> axum::response::Response {
    let club_id: ClubId = match parse_id(&body.club_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services
        .workflow
        .request(&ctx.actor(), club_id, body.message)
        .await
    {
        Ok(request) => (StatusCode::CREATED, Json(dto::request_to_json(&request))).into_response(),
        Err(err) => errors::domain_error_to_response(err),
    }
}

pub async fn my_pending_request(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
) -> axum::response::Response {
    match services.workflow.my_pending_request(&ctx.actor()).await {
        Ok(request) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "request": request.as_ref().map(dto::request_to_json),
            })),
        )
            .into_response(),
        Err(err) => errors::domain_error_to_response(err),
    }
}

pub async fn pending_requests(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(club_id): Path<String>,
) -> axum::response::Response {
    let club_id: ClubId = match parse_id(&club_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.workflow.pending_requests(&ctx.actor(), club_id).await {
        Ok(requests) => {
            let items: Vec<_> = requests.iter().map(dto::request_to_json).collect();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(err) => errors::domain_error_to_response(err),
    }
}

pub async fn approve_request(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::ReviewBody>,
) -> axum::response::Response {
    let request_id: RequestId = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services
        .workflow
        .approve(&ctx.actor(), request_id, body.notes)
        .await
    {
        Ok(request) => (StatusCode::OK, Json(dto::request_to_json(&request))).into_response(),
        Err(err) => errors::domain_error_to_response(err),
    }
}

pub async fn reject_request(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::ReviewBody>,
) -> axum::response::Response {
    let request_id: RequestId = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services
        .workflow
        .reject(&ctx.actor(), request_id, body.notes)
        .await
    {
        Ok(request) => (StatusCode::OK, Json(dto::request_to_json(&request))).into_response(),
        Err(err) => errors::domain_error_to_response(err),
    }
}

pub async fn remove_member(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let account_id: AccountId = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.workflow.remove_member(&ctx.actor(), account_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => errors::domain_error_to_response(err),
    }
}
