//! HTTP application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store/service wiring (in-memory or Postgres)
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(services: Arc<AppServices>) -> Router {
    let auth_state = middleware::AuthState {
        sessions: services.sessions.clone(),
        directory: services.directory.clone(),
    };

    // Protected routes: everything except the health probe.
    let protected = routes::router()
        .layer(Extension(services))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header::COOKIE};
    use chrono::Utc;
    use tower::ServiceExt;

    use coalition_core::AccountId;
    use coalition_members::records::Account;

    #[tokio::test]
    async fn health_is_public() {
        let app = build_app(Arc::new(services::build_in_memory()));
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn protected_routes_require_a_session_cookie() {
        let app = build_app(Arc::new(services::build_in_memory()));
        let response = app
            .oneshot(Request::get("/me").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn a_minted_session_resolves_to_its_account() {
        let services = Arc::new(services::build_in_memory());
        let account = Account::new(AccountId::new(), "visitor", Utc::now());
        services
            .directory
            .insert_account(account.clone())
            .await
            .unwrap();
        let token = services.sessions.mint(account.id);

        let app = build_app(services);
        let response = app
            .oneshot(
                Request::get("/me")
                    .header(COOKIE, format!("session={token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn stale_sessions_are_rejected() {
        let app = build_app(Arc::new(services::build_in_memory()));
        let response = app
            .oneshot(
                Request::get("/me")
                    .header(COOKIE, "session=not-a-live-token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
