use std::str::FromStr;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::{StatusCode, header::SET_COOKIE},
    response::{AppendHeaders, IntoResponse},
    routing::{get, post},
};
use serde::Deserialize;

use coalition_auth::{ImpersonationController, Role};
use coalition_core::{AccountId, ClubId};
use coalition_members::store::AccountFilter;

use crate::app::routes::auth::{clear_cookie, set_cookie};
use crate::app::routes::common::parse_id;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::{ActorContext, SessionContext};
use crate::middleware::{IMPERSONATOR_COOKIE, SESSION_COOKIE};

pub fn router() -> Router {
    Router::new()
        .route("/impersonate", post(impersonate))
        .route("/impersonate/stop", post(stop_impersonation))
        .route("/accounts", get(list_accounts))
        .route("/accounts/:id/role", post(update_role))
        .route("/clubs/deleted", get(deleted_clubs))
}

/// Begin impersonating another account. The admin's own session is parked
/// in the `impersonator_session` cookie until they stop.
pub async fn impersonate(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Extension(session): Extension<SessionContext>,
    Json(body): Json<dto::ImpersonateBody>,
) -> axum::response::Response {
    let target: AccountId = match parse_id(&body.account_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    // The target must resolve to a live account before any session swap.
    let account = match services.workflow.account(target).await {
        Ok(account) => account,
        Err(err) => return errors::domain_error_to_response(err),
    };

    let controller = ImpersonationController::new(services.sessions.as_ref());
    let slots = match controller.impersonate(&ctx.actor(), session.slots().clone(), target) {
        Ok(slots) => slots,
        Err(err) => return errors::domain_error_to_response(err),
    };

    let parked = slots
        .original
        .as_ref()
        .map(|t| t.as_str().to_owned())
        .unwrap_or_default();
    (
        AppendHeaders([
            (SET_COOKIE, set_cookie(SESSION_COOKIE, slots.primary.as_str())),
            (SET_COOKIE, set_cookie(IMPERSONATOR_COOKIE, &parked)),
        ]),
        Json(dto::account_to_json(&account)),
    )
        .into_response()
}

/// Swap back to the admin's own session.
pub async fn stop_impersonation(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
) -> axum::response::Response {
    let controller = ImpersonationController::new(services.sessions.as_ref());
    let restored = match controller.stop(session.slots().clone()) {
        Ok(slots) => slots,
        Err(err) => return errors::domain_error_to_response(err),
    };

    (
        AppendHeaders([
            (
                SET_COOKIE,
                set_cookie(SESSION_COOKIE, restored.primary.as_str()),
            ),
            (SET_COOKIE, clear_cookie(IMPERSONATOR_COOKIE)),
        ]),
        StatusCode::NO_CONTENT,
    )
        .into_response()
}

#[derive(Debug, Default, Deserialize)]
pub struct AccountQuery {
    pub club_id: Option<String>,
    pub role: Option<String>,
    pub country: Option<String>,
    #[serde(default)]
    pub include_deleted: bool,
}

pub async fn list_accounts(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Query(query): Query<AccountQuery>,
) -> axum::response::Response {
    let club_id: Option<ClubId> = match query.club_id.as_deref().map(parse_id) {
        Some(Ok(id)) => Some(id),
        Some(Err(resp)) => return resp,
        None => None,
    };
    let role = match query.role.as_deref().map(Role::from_str) {
        Some(Ok(role)) => Some(role),
        Some(Err(err)) => return errors::domain_error_to_response(err),
        None => None,
    };
    let filter = AccountFilter {
        club_id,
        role,
        country: query.country,
        include_deleted: query.include_deleted,
    };

    match services.workflow.list_accounts(&ctx.actor(), filter).await {
        Ok(accounts) => {
            let items: Vec<_> = accounts.iter().map(dto::account_to_json).collect();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(err) => errors::domain_error_to_response(err),
    }
}

/// Change an account's role, optionally flipping its network membership in
/// the same call.
pub async fn update_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateRoleBody>,
) -> axum::response::Response {
    let account_id: AccountId = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let role = match Role::from_str(&body.role) {
        Ok(role) => role,
        Err(err) => return errors::domain_error_to_response(err),
    };

    let actor = ctx.actor();
    let account = match services.workflow.update_role(&actor, account_id, role).await {
        Ok(account) => account,
        Err(err) => return errors::domain_error_to_response(err),
    };

    if let Some(enabled) = body.network_member {
        if let Err(err) = services
            .gate
            .set_network_member(&actor, account_id, enabled)
            .await
        {
            return errors::domain_error_to_response(err);
        }
    }

    (StatusCode::OK, Json(dto::account_to_json(&account))).into_response()
}

pub async fn deleted_clubs(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
) -> axum::response::Response {
    match services.workflow.deleted_clubs(&ctx.actor()).await {
        Ok(clubs) => {
            let items: Vec<_> = clubs.iter().map(dto::club_to_json).collect();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(err) => errors::domain_error_to_response(err),
    }
}
