use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;

use coalition_core::{AccountId, DemandId, ReportId};
use coalition_network::{DemandFilter, NewDemand, NewReport, OnboardingForm};

use crate::app::routes::common::parse_id;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new()
        .route("/access", get(access_status))
        .route("/onboarding", post(submit_onboarding))
        .route("/organizations", get(list_organizations))
        .route("/nominations", post(nominate))
        .route("/agents", get(agents))
        .route("/reports", get(list_reports).post(submit_report))
        .route("/reports/unread", get(unread_reports))
        .route("/reports/:id/read", post(mark_report_read))
        .route("/reports/:id/archive", post(archive_report))
        .route("/reports/:id", axum::routing::delete(delete_report))
        .route("/demands", get(list_demands).post(create_demand))
        .route("/demands/:id/status", post(update_demand_status))
}

pub async fn access_status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
) -> axum::response::Response {
    match services.gate.access_status(&ctx.actor()).await {
        Ok(status) => (StatusCode::OK, Json(status)).into_response(),
        Err(err) => errors::domain_error_to_response(err),
    }
}

pub async fn submit_onboarding(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Json(form): Json<OnboardingForm>,
) -> axum::response::Response {
    match services.gate.submit_onboarding(&ctx.actor(), form).await {
        Ok(membership) => (StatusCode::OK, Json(membership)).into_response(),
        Err(err) => errors::domain_error_to_response(err),
    }
}

pub async fn list_organizations(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
) -> axum::response::Response {
    match services.gate.list_organizations(&ctx.actor()).await {
        Ok(organizations) => (
            StatusCode::OK,
            Json(serde_json::json!({ "items": organizations })),
        )
            .into_response(),
        Err(err) => errors::domain_error_to_response(err),
    }
}

pub async fn nominate(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Json(body): Json<dto::NominateBody>,
) -> axum::response::Response {
    let account_id: AccountId = match parse_id(&body.account_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.gate.nominate(&ctx.actor(), account_id).await {
        Ok(membership) => (StatusCode::CREATED, Json(membership)).into_response(),
        Err(err) => errors::domain_error_to_response(err),
    }
}

pub async fn agents(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
) -> axum::response::Response {
    match services.gate.agents(&ctx.actor()).await {
        Ok(agents) => {
            let items: Vec<_> = agents.iter().map(dto::account_to_json).collect();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(err) => errors::domain_error_to_response(err),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    #[serde(default)]
    pub include_archived: bool,
}

pub async fn list_reports(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Query(query): Query<ReportQuery>,
) -> axum::response::Response {
    match services
        .gate
        .list_reports(&ctx.actor(), query.include_archived)
        .await
    {
        Ok(reports) => {
            (StatusCode::OK, Json(serde_json::json!({ "items": reports }))).into_response()
        }
        Err(err) => errors::domain_error_to_response(err),
    }
}

pub async fn submit_report(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Json(input): Json<NewReport>,
) -> axum::response::Response {
    match services.gate.submit_report(&ctx.actor(), input).await {
        Ok(report) => (StatusCode::CREATED, Json(report)).into_response(),
        Err(err) => errors::domain_error_to_response(err),
    }
}

pub async fn unread_reports(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
) -> axum::response::Response {
    match services.gate.unread_report_count(&ctx.actor()).await {
        Ok(count) => {
            (StatusCode::OK, Json(serde_json::json!({ "unread": count }))).into_response()
        }
        Err(err) => errors::domain_error_to_response(err),
    }
}

pub async fn mark_report_read(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let report_id: ReportId = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.gate.mark_report_read(&ctx.actor(), report_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => errors::domain_error_to_response(err),
    }
}

pub async fn archive_report(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let report_id: ReportId = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.gate.archive_report(&ctx.actor(), report_id).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(err) => errors::domain_error_to_response(err),
    }
}

pub async fn delete_report(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let report_id: ReportId = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.gate.delete_report(&ctx.actor(), report_id).await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => errors::domain_error_to_response(err),
    }
}

pub async fn list_demands(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Query(filter): Query<DemandFilter>,
) -> axum::response::Response {
    match services.gate.list_demands(&ctx.actor(), filter).await {
        Ok(demands) => {
            (StatusCode::OK, Json(serde_json::json!({ "items": demands }))).into_response()
        }
        Err(err) => errors::domain_error_to_response(err),
    }
}

pub async fn create_demand(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Json(input): Json<NewDemand>,
) -> axum::response::Response {
    match services.gate.create_demand(&ctx.actor(), input).await {
        Ok(demand) => (StatusCode::CREATED, Json(demand)).into_response(),
        Err(err) => errors::domain_error_to_response(err),
    }
}

pub async fn update_demand_status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::DemandStatusBody>,
) -> axum::response::Response {
    let demand_id: DemandId = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services
        .gate
        .update_demand_status(&ctx.actor(), demand_id, body.status)
        .await
    {
        Ok(demand) => (StatusCode::OK, Json(demand)).into_response(),
        Err(err) => errors::domain_error_to_response(err),
    }
}
