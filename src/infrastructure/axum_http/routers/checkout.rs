use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
    auth::AuthAccount,
    config::config_model::DotEnvyConfig,
    domain::value_objects::checkout::CheckoutOutcome,
    infrastructure::{
        axum_http::error_responses::error_response,
        postgres::{
            postgres_connection::PgPoolSquad,
            repositories::{
                accounts::AccountPostgres, listings::ListingPostgres, plans::PlanPostgres,
            },
        },
    },
    payments::stripe_client::StripeClient,
    usecases::{checkout::CheckoutUseCase, plan_catalog::PlanCatalog},
};

type Checkout = CheckoutUseCase<AccountPostgres, ListingPostgres, PlanPostgres, StripeClient>;

pub fn routes(db_pool: Arc<PgPoolSquad>, config: Arc<DotEnvyConfig>) -> Router {
    let account_repo = AccountPostgres::new(Arc::clone(&db_pool));
    let listing_repo = ListingPostgres::new(Arc::clone(&db_pool));
    let plan_catalog = PlanCatalog::new(Arc::new(PlanPostgres::new(Arc::clone(&db_pool))));
    let checkout_usecase = CheckoutUseCase::new(
        Arc::new(account_repo),
        Arc::new(listing_repo),
        Arc::new(plan_catalog),
        super::build_gateway(&config),
        config.billing.clone(),
    );

    Router::new()
        .route("/subscription", post(start_subscription_checkout))
        .route("/boost", post(start_boost_checkout))
        .route("/sessions/:session_id", get(get_session_status))
        .with_state(Arc::new(checkout_usecase))
}

#[derive(Debug, Deserialize)]
pub struct SubscriptionCheckoutRequest {
    pub plan: String,
    #[serde(default)]
    pub auto_renew: bool,
}

#[derive(Debug, Deserialize)]
pub struct BoostCheckoutRequest {
    pub listing_id: Uuid,
    pub duration_days: i64,
}

fn outcome_response(outcome: CheckoutOutcome) -> Response {
    match outcome {
        CheckoutOutcome::Session(session) => Json(json!({
            "session_id": session.session_id,
            "redirect_url": session.redirect_url,
        }))
        .into_response(),
        CheckoutOutcome::Activated => Json(json!({ "activated": true })).into_response(),
    }
}

pub async fn start_subscription_checkout(
    State(checkout_usecase): State<Arc<Checkout>>,
    auth_account: AuthAccount,
    Json(payload): Json<SubscriptionCheckoutRequest>,
) -> Response {
    match checkout_usecase
        .start_subscription_checkout(auth_account.requester(), &payload.plan, payload.auto_renew)
        .await
    {
        Ok(outcome) => outcome_response(outcome),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

pub async fn start_boost_checkout(
    State(checkout_usecase): State<Arc<Checkout>>,
    auth_account: AuthAccount,
    Json(payload): Json<BoostCheckoutRequest>,
) -> Response {
    match checkout_usecase
        .start_boost_checkout(
            auth_account.requester(),
            payload.listing_id,
            payload.duration_days,
        )
        .await
    {
        Ok(outcome) => outcome_response(outcome),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

pub async fn get_session_status(
    State(checkout_usecase): State<Arc<Checkout>>,
    _auth_account: AuthAccount,
    Path(session_id): Path<String>,
) -> Response {
    match checkout_usecase.get_session_status(&session_id).await {
        Ok(status) => Json(status).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::checkout::CheckoutSessionDto;
    use serde_json::Value;

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn gateway_session_answers_with_session_id_and_redirect_url() {
        let body = body_json(outcome_response(CheckoutOutcome::Session(
            CheckoutSessionDto {
                session_id: "cs_1".to_string(),
                redirect_url: "https://checkout.stripe.com/pay/cs_1".to_string(),
            },
        )))
        .await;

        assert_eq!(body["session_id"], "cs_1");
        assert_eq!(body["redirect_url"], "https://checkout.stripe.com/pay/cs_1");
        assert!(body.get("activated").is_none());
    }

    #[tokio::test]
    async fn free_tier_answers_with_activated_true() {
        let body = body_json(outcome_response(CheckoutOutcome::Activated)).await;

        assert_eq!(body["activated"], true);
        assert!(body.get("session_id").is_none());
    }

    #[test]
    fn subscription_request_takes_the_plan_field() {
        let request: SubscriptionCheckoutRequest =
            serde_json::from_value(json!({ "plan": "plus" })).unwrap();
        assert_eq!(request.plan, "plus");
        assert!(!request.auto_renew);
    }
}
