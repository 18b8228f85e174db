use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get},
};
use serde_json::json;

use crate::{
    auth::AuthAccount,
    infrastructure::{
        axum_http::error_responses::error_response,
        postgres::{postgres_connection::PgPoolSquad, repositories::accounts::AccountPostgres},
    },
    usecases::subscriptions::SubscriptionUseCase,
};

type Subscriptions = SubscriptionUseCase<AccountPostgres>;

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let subscription_usecase =
        SubscriptionUseCase::new(Arc::new(AccountPostgres::new(db_pool)));

    Router::new()
        .route("/me", get(current_subscription))
        .route("/me/auto-renew", delete(cancel_auto_renew))
        .with_state(Arc::new(subscription_usecase))
}

pub async fn current_subscription(
    State(subscription_usecase): State<Arc<Subscriptions>>,
    auth_account: AuthAccount,
) -> Response {
    match subscription_usecase
        .current_subscription(auth_account.requester())
        .await
    {
        Ok(Some(subscription)) => Json(subscription).into_response(),
        Ok(None) => Json(json!({ "subscription": null })).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

pub async fn cancel_auto_renew(
    State(subscription_usecase): State<Arc<Subscriptions>>,
    auth_account: AuthAccount,
) -> Response {
    match subscription_usecase
        .cancel_auto_renew(auth_account.requester())
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}
