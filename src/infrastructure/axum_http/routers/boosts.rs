use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
    auth::AuthAccount,
    config::config_model::DotEnvyConfig,
    domain::value_objects::boosts::{AdminChargeOutcome, CreditBoostOutcome},
    infrastructure::{
        axum_http::error_responses::error_response,
        postgres::{
            postgres_connection::PgPoolSquad,
            repositories::{
                accounts::AccountPostgres, listings::ListingPostgres, payments::PaymentPostgres,
            },
        },
    },
    usecases::boosts::BoostUseCase,
};

type Boosts = BoostUseCase<AccountPostgres, ListingPostgres, PaymentPostgres>;

fn build_usecase(db_pool: Arc<PgPoolSquad>, config: &DotEnvyConfig) -> Arc<Boosts> {
    Arc::new(BoostUseCase::new(
        Arc::new(AccountPostgres::new(Arc::clone(&db_pool))),
        Arc::new(ListingPostgres::new(Arc::clone(&db_pool))),
        Arc::new(PaymentPostgres::new(Arc::clone(&db_pool))),
        config.billing.clone(),
    ))
}

pub fn routes(db_pool: Arc<PgPoolSquad>, config: Arc<DotEnvyConfig>) -> Router {
    Router::new()
        .route(
            "/:listing_id/boost",
            post(boost_with_credits)
                .get(boost_status)
                .delete(remove_boost),
        )
        .with_state(build_usecase(db_pool, &config))
}

pub fn admin_routes(db_pool: Arc<PgPoolSquad>, config: Arc<DotEnvyConfig>) -> Router {
    Router::new()
        .route("/:listing_id/boost", post(admin_boost).delete(remove_boost))
        .with_state(build_usecase(db_pool, &config))
}

#[derive(Debug, Deserialize)]
pub struct CreditBoostRequest {
    pub duration_days: i64,
}

#[derive(Debug, Deserialize)]
pub struct AdminBoostRequest {
    pub duration_days: i64,
    pub priority: Option<i32>,
    #[serde(default)]
    pub charge_owner: bool,
}

fn credit_outcome_response(outcome: CreditBoostOutcome) -> Response {
    match outcome {
        CreditBoostOutcome::Activated {
            expiry,
            priority,
            remaining_credits,
        } => Json(json!({
            "activated": true,
            "boost_expiry": expiry,
            "boost_priority": priority,
            "remaining_credits": remaining_credits,
        }))
        .into_response(),
        CreditBoostOutcome::PaymentRequired {
            cost,
            balance,
            shortfall,
        } => (
            StatusCode::PAYMENT_REQUIRED,
            Json(json!({
                "payment_required": true,
                "cost": cost,
                "balance": balance,
                "shortfall": shortfall,
            })),
        )
            .into_response(),
    }
}

pub async fn boost_with_credits(
    State(boost_usecase): State<Arc<Boosts>>,
    auth_account: AuthAccount,
    Path(listing_id): Path<Uuid>,
    Json(payload): Json<CreditBoostRequest>,
) -> Response {
    match boost_usecase
        .boost_with_credits(auth_account.requester(), listing_id, payload.duration_days)
        .await
    {
        Ok(outcome) => credit_outcome_response(outcome),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

pub async fn admin_boost(
    State(boost_usecase): State<Arc<Boosts>>,
    auth_account: AuthAccount,
    Path(listing_id): Path<Uuid>,
    Json(payload): Json<AdminBoostRequest>,
) -> Response {
    match boost_usecase
        .admin_boost(
            auth_account.requester(),
            listing_id,
            payload.duration_days,
            payload.priority,
            payload.charge_owner,
        )
        .await
    {
        Ok(result) => {
            let charge = match result.charge {
                AdminChargeOutcome::NotCharged => json!({ "type": "not_charged" }),
                AdminChargeOutcome::Charged { remaining_credits } => json!({
                    "type": "charged",
                    "remaining_credits": remaining_credits,
                }),
                AdminChargeOutcome::PendingPayment { amount_minor } => json!({
                    "type": "pending_payment",
                    "amount_minor": amount_minor,
                }),
            };
            Json(json!({
                "boost_expiry": result.expiry,
                "boost_priority": result.priority,
                "charge": charge,
            }))
            .into_response()
        }
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

pub async fn remove_boost(
    State(boost_usecase): State<Arc<Boosts>>,
    auth_account: AuthAccount,
    Path(listing_id): Path<Uuid>,
) -> Response {
    match boost_usecase
        .remove_boost(auth_account.requester(), listing_id)
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

pub async fn boost_status(
    State(boost_usecase): State<Arc<Boosts>>,
    Path(listing_id): Path<Uuid>,
) -> Response {
    match boost_usecase.boost_status(listing_id).await {
        Ok(status) => Json(status).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::Value;

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn insufficient_credits_answer_402_with_payment_required_true() {
        let response = credit_outcome_response(CreditBoostOutcome::PaymentRequired {
            cost: 35,
            balance: 10,
            shortfall: 25,
        });
        assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);

        let body = body_json(response).await;
        assert_eq!(body["payment_required"], true);
        assert_eq!(body["cost"], 35);
        assert_eq!(body["balance"], 10);
        assert_eq!(body["shortfall"], 25);
    }

    #[tokio::test]
    async fn activated_boost_answers_with_activated_true() {
        let response = credit_outcome_response(CreditBoostOutcome::Activated {
            expiry: Utc::now(),
            priority: 50,
            remaining_credits: 5,
        });
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["activated"], true);
        assert_eq!(body["remaining_credits"], 5);
        assert!(body.get("payment_required").is_none());
    }
}
