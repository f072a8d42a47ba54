//! Cookie-based session authentication.
//!
//! Every protected request carries a `session` cookie, plus an
//! `impersonator_session` cookie while a super admin is impersonating.
//! The account is loaded fresh on each request so role or deletion changes
//! take effect immediately.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use coalition_auth::{SessionService, SessionSlots, SessionToken};
use coalition_members::store::DirectoryStore;

use crate::context::{ActorContext, SessionContext};

pub const SESSION_COOKIE: &str = "session";
pub const IMPERSONATOR_COOKIE: &str = "impersonator_session";

#[derive(Clone)]
pub struct AuthState {
    pub sessions: Arc<dyn SessionService>,
    pub directory: Arc<dyn DirectoryStore>,
}

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let primary = cookie_value(req.headers(), SESSION_COOKIE)
        .map(SessionToken::from_string)
        .ok_or(StatusCode::UNAUTHORIZED)?;
    let original = cookie_value(req.headers(), IMPERSONATOR_COOKIE).map(SessionToken::from_string);

    let account_id = state
        .sessions
        .resolve(&primary)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let account = state
        .directory
        .account(account_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .filter(|a| !a.is_deleted())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    req.extensions_mut().insert(ActorContext::new(account));
    req.extensions_mut().insert(SessionContext::new(SessionSlots {
        primary,
        original,
    }));

    Ok(next.run(req).await)
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let raw = headers.get(axum::http::header::COOKIE)?.to_str().ok()?;
    raw.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name && !value.is_empty()).then(|| value.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::COOKIE;

    #[test]
    fn cookie_parsing_handles_multiple_pairs() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            "theme=dark; session=abc123; impersonator_session=xyz"
                .parse()
                .unwrap(),
        );
        assert_eq!(
            cookie_value(&headers, SESSION_COOKIE).as_deref(),
            Some("abc123")
        );
        assert_eq!(
            cookie_value(&headers, IMPERSONATOR_COOKIE).as_deref(),
            Some("xyz")
        );
        assert_eq!(cookie_value(&headers, "missing"), None);
    }

    #[test]
    fn empty_cookie_values_read_as_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, "session=".parse().unwrap());
        assert_eq!(cookie_value(&headers, SESSION_COOKIE), None);
    }
}
