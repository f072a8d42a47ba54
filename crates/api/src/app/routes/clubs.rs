use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use coalition_core::{AccountId, ClubId};
use coalition_members::{ClubPatch, NewClub};

use crate::app::routes::common::parse_id;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_clubs).post(create_club))
        .route("/:id", get(get_club).patch(update_club).delete(delete_club))
        .route("/:id/members", get(list_members))
}

pub async fn list_clubs(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.workflow.list_clubs().await {
        Ok(clubs) => {
            let items: Vec<_> = clubs.iter().map(dto::club_to_json).collect();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(err) => errors::domain_error_to_response(err),
    }
}

pub async fn get_club(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let club_id: ClubId = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.workflow.club(club_id).await {
        Ok(club) => (StatusCode::OK, Json(dto::club_to_json(&club))).into_response(),
        Err(err) => errors::domain_error_to_response(err),
    }
}

pub async fn create_club(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Json(body): Json<dto::CreateClubBody>,
) -> axum::response::Response {
    let president_id: Option<AccountId> = match body.president_id.as_deref().map(parse_id) {
        Some(Ok(id)) => Some(id),
        Some(Err(resp)) => return resp,
        None => None,
    };
    let input = NewClub {
        name: body.name,
        description: body.description,
        country: body.country,
        president_id,
    };
    match services.workflow.create_club(&ctx.actor(), input).await {
        Ok(club) => (StatusCode::CREATED, Json(dto::club_to_json(&club))).into_response(),
        Err(err) => errors::domain_error_to_response(err),
    }
}

pub async fn update_club(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
    Json(patch): Json<ClubPatch>,
) -> axum::response::Response {
    let club_id: ClubId = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.workflow.update_club(&ctx.actor(), club_id, patch).await {
        Ok(club) => (StatusCode::OK, Json(dto::club_to_json(&club))).into_response(),
        Err(err) => errors::domain_error_to_response(err),
    }
}

pub async fn delete_club(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let club_id: ClubId = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.workflow.delete_club(&ctx.actor(), club_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => errors::domain_error_to_response(err),
    }
}

pub async fn list_members(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let club_id: ClubId = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let members = match services.workflow.club_members(club_id).await {
        Ok(members) => members,
        Err(err) => return errors::domain_error_to_response(err),
    };
    let mut items = Vec::with_capacity(members.len());
    for account in &members {
        let network_member = match services.gate.is_network_member(account.id).await {
            Ok(flag) => flag,
            Err(err) => return errors::domain_error_to_response(err),
        };
        let mut entry = dto::account_to_json(account);
        entry["network_member"] = serde_json::json!(network_member);
        items.push(entry);
    }
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}
