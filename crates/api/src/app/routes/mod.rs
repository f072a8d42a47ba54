use axum::{Router, routing::get};

pub mod admin;
pub mod auth;
pub mod clubs;
pub mod common;
pub mod feed;
pub mod membership;
pub mod network;
pub mod system;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/me", get(auth::me))
        .route("/logout", axum::routing::post(auth::logout))
        .nest("/clubs", clubs::router())
        .nest("/membership", membership::router())
        .nest("/network", network::router())
        .nest("/feed", feed::router())
        .nest("/admin", admin::router())
}
