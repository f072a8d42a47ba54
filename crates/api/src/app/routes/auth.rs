use std::sync::Arc;

use axum::{
    Json,
    extract::Extension,
    http::{StatusCode, header::SET_COOKIE},
    response::{AppendHeaders, IntoResponse},
};

use crate::app::dto;
use crate::app::services::AppServices;
use crate::context::{ActorContext, SessionContext};
use crate::middleware::{IMPERSONATOR_COOKIE, SESSION_COOKIE};

pub async fn me(
    Extension(ctx): Extension<ActorContext>,
    Extension(session): Extension<SessionContext>,
) -> axum::response::Response {
    let mut body = dto::account_to_json(ctx.account());
    body["impersonating"] = serde_json::Value::Bool(session.is_impersonating());
    (StatusCode::OK, Json(body)).into_response()
}

/// Revoke the live session(s) and clear both cookies.
pub async fn logout(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
) -> axum::response::Response {
    let slots = session.slots();
    services.sessions.revoke(&slots.primary);
    if let Some(original) = &slots.original {
        services.sessions.revoke(original);
    }

    (
        AppendHeaders([
            (SET_COOKIE, clear_cookie(SESSION_COOKIE)),
            (SET_COOKIE, clear_cookie(IMPERSONATOR_COOKIE)),
        ]),
        StatusCode::NO_CONTENT,
    )
        .into_response()
}

pub(crate) fn set_cookie(name: &str, value: &str) -> String {
    format!("{name}={value}; Path=/; HttpOnly; SameSite=Lax")
}

pub(crate) fn clear_cookie(name: &str) -> String {
    format!("{name}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}
