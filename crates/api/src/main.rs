use std::sync::Arc;

use coalition_api::app::{self, services};

#[tokio::main]
async fn main() {
    coalition_observability::init();

    let services = match std::env::var("DATABASE_URL") {
        Ok(url) => {
            let pool = sqlx::PgPool::connect(&url)
                .await
                .expect("failed to connect to DATABASE_URL");
            coalition_infra::migrate(&pool)
                .await
                .expect("schema migration failed");
            services::build_postgres(pool)
        }
        Err(_) => {
            tracing::warn!("DATABASE_URL not set; running on in-memory stores");
            services::build_in_memory()
        }
    };

    let app = app::build_app(Arc::new(services));

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080")
        .await
        .expect("failed to bind 0.0.0.0:8080");

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
