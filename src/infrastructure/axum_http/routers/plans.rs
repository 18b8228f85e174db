use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use tracing::error;

use crate::{
    domain::value_objects::subscriptions::PlanDto,
    infrastructure::{
        axum_http::error_responses::error_response,
        postgres::{postgres_connection::PgPoolSquad, repositories::plans::PlanPostgres},
    },
    usecases::plan_catalog::PlanCatalog,
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let plan_catalog = PlanCatalog::new(Arc::new(PlanPostgres::new(db_pool)));

    Router::new()
        .route("/", get(list_plans))
        .with_state(Arc::new(plan_catalog))
}

pub async fn list_plans(
    State(plan_catalog): State<Arc<PlanCatalog<PlanPostgres>>>,
) -> Response {
    match plan_catalog.list_visible().await {
        Ok(plans) => {
            let plans: Vec<PlanDto> = plans.into_iter().map(PlanDto::from).collect();
            Json(plans).into_response()
        }
        Err(err) => {
            error!(error = ?err, "Failed to list plans");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "")
        }
    }
}
