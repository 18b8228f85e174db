use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::json;

use crate::{
    config::config_model::DotEnvyConfig,
    domain::value_objects::webhooks::WebhookOutcome,
    infrastructure::{
        axum_http::error_responses::error_response,
        postgres::{
            postgres_connection::PgPoolSquad,
            repositories::{
                accounts::AccountPostgres, listings::ListingPostgres, payments::PaymentPostgres,
                plans::PlanPostgres, webhook_events::WebhookEventPostgres,
            },
        },
    },
    payments::stripe_client::StripeClient,
    usecases::{
        plan_catalog::PlanCatalog, reconciler::EntitlementReconciler,
        webhook::PaymentWebhookUseCase,
    },
};

type Webhook = PaymentWebhookUseCase<
    AccountPostgres,
    ListingPostgres,
    PaymentPostgres,
    PlanPostgres,
    WebhookEventPostgres,
    StripeClient,
>;

pub fn routes(db_pool: Arc<PgPoolSquad>, config: Arc<DotEnvyConfig>) -> Router {
    let plan_catalog = Arc::new(PlanCatalog::new(Arc::new(PlanPostgres::new(Arc::clone(
        &db_pool,
    )))));
    let reconciler = EntitlementReconciler::new(
        Arc::new(AccountPostgres::new(Arc::clone(&db_pool))),
        Arc::new(ListingPostgres::new(Arc::clone(&db_pool))),
        Arc::new(PaymentPostgres::new(Arc::clone(&db_pool))),
        plan_catalog,
        config.billing.clone(),
    );
    let webhook_usecase = PaymentWebhookUseCase::new(
        Arc::new(WebhookEventPostgres::new(Arc::clone(&db_pool))),
        super::build_gateway(&config),
        Arc::new(reconciler),
    );

    Router::new()
        .route("/webhook", post(receive_webhook))
        .with_state(Arc::new(webhook_usecase))
}

pub async fn receive_webhook(
    State(webhook_usecase): State<Arc<Webhook>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(signature) = headers
        .get("stripe-signature")
        .and_then(|value| value.to_str().ok())
    else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Missing stripe-signature header",
        );
    };

    match webhook_usecase.handle_delivery(&body, signature).await {
        Ok(WebhookOutcome::Duplicate) => {
            Json(json!({ "received": true, "duplicate": true })).into_response()
        }
        Ok(_) => Json(json!({ "received": true })).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}
