use std::sync::Arc;

use serde_json::json;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::domain::entities::webhook_events::NewProcessedWebhookEventEntity;
use crate::domain::repositories::{
    accounts::AccountRepository, listings::ListingRepository, payments::PaymentRepository,
    plans::PlanRepository, webhook_events::WebhookEventRepository,
};
use crate::domain::value_objects::webhooks::{WebhookEventKind, WebhookOutcome};
use crate::payments::gateway::PaymentGateway;
use crate::usecases::reconciler::{EntitlementReconciler, ReconcileError};

/// Events older than this are purged; the gateway stops redelivering long
/// before the window closes.
const EVENT_RETENTION_DAYS: i64 = 30;

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("payment gateway is not configured")]
    GatewayUnavailable,
    #[error("webhook signature verification failed")]
    InvalidSignature,
    #[error("invalid webhook payload: {0}")]
    InvalidPayload(String),
    #[error(transparent)]
    Retryable(#[from] anyhow::Error),
}

impl WebhookError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        match self {
            WebhookError::GatewayUnavailable => axum::http::StatusCode::SERVICE_UNAVAILABLE,
            WebhookError::InvalidSignature => axum::http::StatusCode::BAD_REQUEST,
            WebhookError::InvalidPayload(_) => axum::http::StatusCode::BAD_REQUEST,
            WebhookError::Retryable(_) => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Front door for gateway deliveries: verifies the signature, drops replays by
/// event id, and hands confirmed checkouts to the reconciler. Non-2xx answers
/// make the gateway redeliver, so only storage failures are surfaced as errors.
pub struct PaymentWebhookUseCase<A, L, Pay, P, E, G>
where
    A: AccountRepository + Send + Sync + 'static,
    L: ListingRepository + Send + Sync + 'static,
    Pay: PaymentRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
    E: WebhookEventRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    event_repo: Arc<E>,
    gateway: Option<Arc<G>>,
    reconciler: Arc<EntitlementReconciler<A, L, Pay, P>>,
}

impl<A, L, Pay, P, E, G> PaymentWebhookUseCase<A, L, Pay, P, E, G>
where
    A: AccountRepository + Send + Sync + 'static,
    L: ListingRepository + Send + Sync + 'static,
    Pay: PaymentRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
    E: WebhookEventRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    pub fn new(
        event_repo: Arc<E>,
        gateway: Option<Arc<G>>,
        reconciler: Arc<EntitlementReconciler<A, L, Pay, P>>,
    ) -> Self {
        Self {
            event_repo,
            gateway,
            reconciler,
        }
    }

    pub async fn handle_delivery(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<WebhookOutcome, WebhookError> {
        let Some(gateway) = self.gateway.as_ref() else {
            warn!("webhook delivery received but no payment gateway is configured");
            return Err(WebhookError::GatewayUnavailable);
        };

        let event = gateway
            .verify_webhook_signature(payload, signature)
            .map_err(|err| {
                warn!(error = %err, "webhook signature rejected");
                WebhookError::InvalidSignature
            })?;

        let event_id = event
            .id
            .clone()
            .ok_or_else(|| WebhookError::InvalidPayload("event is missing an id".to_string()))?;

        if self.event_repo.find_by_event_id(&event_id).await?.is_some() {
            info!(%event_id, event_type = %event.type_, "webhook event already processed");
            return Ok(WebhookOutcome::Duplicate);
        }

        let outcome = match WebhookEventKind::from_event_type(&event.type_) {
            WebhookEventKind::CheckoutCompleted => {
                let session = event.checkout_session().ok_or_else(|| {
                    WebhookError::InvalidPayload(
                        "checkout.session.completed carries no session object".to_string(),
                    )
                })?;
                match self.reconciler.apply_checkout_completed(&session).await {
                    Ok(()) => WebhookOutcome::Processed,
                    Err(ReconcileError::Invalid(reason)) => {
                        // Redelivery cannot fix a malformed event; ack it so
                        // the gateway stops retrying.
                        warn!(%event_id, %reason, "acknowledging unreconcilable checkout event");
                        WebhookOutcome::Ignored
                    }
                    Err(ReconcileError::Storage(err)) => {
                        error!(%event_id, error = ?err, "storage failed mid-reconcile, asking for redelivery");
                        return Err(WebhookError::Retryable(err));
                    }
                }
            }
            WebhookEventKind::SubscriptionUpdated | WebhookEventKind::SubscriptionDeleted => {
                // Subscription lifecycle is read lazily from stored expiry
                // timestamps; these events only need acknowledging.
                info!(%event_id, event_type = %event.type_, "acknowledged subscription lifecycle event");
                WebhookOutcome::Processed
            }
            WebhookEventKind::Unhandled => {
                info!(%event_id, event_type = %event.type_, "ignoring unhandled webhook event type");
                WebhookOutcome::Ignored
            }
        };

        let recorded = self
            .event_repo
            .record(NewProcessedWebhookEventEntity {
                event_id: event_id.clone(),
                event_type: event.type_.clone(),
                metadata: json!({
                    "livemode": event.livemode,
                    "created": event.created,
                }),
            })
            .await?;
        if !recorded {
            // Lost the insert race to a concurrent delivery of the same
            // event. The work above is idempotent, so this is benign.
            info!(%event_id, "concurrent delivery recorded this event first");
        }

        let event_repo = Arc::clone(&self.event_repo);
        tokio::spawn(async move {
            match event_repo.purge_older_than_days(EVENT_RETENTION_DAYS).await {
                Ok(purged) if purged > 0 => {
                    info!(purged, "purged expired webhook event records")
                }
                Ok(_) => {}
                Err(err) => warn!(error = ?err, "webhook event purge failed"),
            }
        });

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::config_model::Billing;
    use crate::domain::entities::webhook_events::ProcessedWebhookEventEntity;
    use crate::domain::repositories::accounts::MockAccountRepository;
    use crate::domain::repositories::listings::MockListingRepository;
    use crate::domain::repositories::payments::MockPaymentRepository;
    use crate::domain::repositories::plans::MockPlanRepository;
    use crate::domain::repositories::webhook_events::MockWebhookEventRepository;
    use crate::payments::gateway::MockPaymentGateway;
    use crate::payments::stripe_client::{StripeEvent, StripeEventData};
    use crate::usecases::plan_catalog::PlanCatalog;
    use chrono::Utc;
    use serde_json::json;
    use uuid::Uuid;

    fn reconciler() -> Arc<
        EntitlementReconciler<
            MockAccountRepository,
            MockListingRepository,
            MockPaymentRepository,
            MockPlanRepository,
        >,
    > {
        Arc::new(EntitlementReconciler::new(
            Arc::new(MockAccountRepository::new()),
            Arc::new(MockListingRepository::new()),
            Arc::new(MockPaymentRepository::new()),
            Arc::new(PlanCatalog::new(Arc::new(MockPlanRepository::new()))),
            Billing {
                currency: "usd".to_string(),
                boost_rate_per_day: 5,
            },
        ))
    }

    fn checkout_event(event_id: &str, payment_status: &str) -> StripeEvent {
        StripeEvent {
            id: Some(event_id.to_string()),
            type_: "checkout.session.completed".to_string(),
            created: Some(Utc::now().timestamp()),
            livemode: Some(false),
            data: StripeEventData {
                object: json!({
                    "id": "cs_1",
                    "payment_status": payment_status,
                    "metadata": {
                        "account_id": Uuid::new_v4().to_string(),
                        "purpose": "boost",
                    },
                }),
            },
        }
    }

    fn verified_gateway(event: StripeEvent) -> MockPaymentGateway {
        let mut gateway = MockPaymentGateway::new();
        gateway
            .expect_verify_webhook_signature()
            .returning(move |_, _| Ok(event.clone()));
        gateway
    }

    fn allow_purge(event_repo: &mut MockWebhookEventRepository) {
        event_repo
            .expect_purge_older_than_days()
            .returning(|_| Box::pin(async { Ok(0) }));
    }

    #[tokio::test]
    async fn fresh_event_is_processed_and_recorded() {
        let mut event_repo = MockWebhookEventRepository::new();
        event_repo
            .expect_find_by_event_id()
            .returning(|_| Box::pin(async { Ok(None) }));
        event_repo
            .expect_record()
            .withf(|event| event.event_id == "evt_1")
            .times(1)
            .returning(|_| Box::pin(async { Ok(true) }));
        allow_purge(&mut event_repo);

        // Unpaid session: the reconciler acknowledges it without touching
        // any repository.
        let gateway = verified_gateway(checkout_event("evt_1", "unpaid"));
        let usecase = PaymentWebhookUseCase::new(
            Arc::new(event_repo),
            Some(Arc::new(gateway)),
            reconciler(),
        );

        let outcome = usecase.handle_delivery(b"{}", "t=1,v1=sig").await.unwrap();
        assert_eq!(outcome, WebhookOutcome::Processed);
    }

    #[tokio::test]
    async fn replayed_event_id_short_circuits() {
        let mut event_repo = MockWebhookEventRepository::new();
        event_repo.expect_find_by_event_id().returning(|id| {
            let id = id.to_string();
            Box::pin(async move {
                Ok(Some(ProcessedWebhookEventEntity {
                    id: Uuid::new_v4(),
                    event_id: id,
                    event_type: "checkout.session.completed".to_string(),
                    processed_at: Utc::now(),
                    metadata: json!({}),
                }))
            })
        });

        let gateway = verified_gateway(checkout_event("evt_1", "paid"));
        let usecase = PaymentWebhookUseCase::new(
            Arc::new(event_repo),
            Some(Arc::new(gateway)),
            reconciler(),
        );

        let outcome = usecase.handle_delivery(b"{}", "t=1,v1=sig").await.unwrap();
        assert_eq!(outcome, WebhookOutcome::Duplicate);
    }

    #[tokio::test]
    async fn missing_gateway_fails_closed() {
        let usecase: PaymentWebhookUseCase<_, _, _, _, _, MockPaymentGateway> =
            PaymentWebhookUseCase::new(
                Arc::new(MockWebhookEventRepository::new()),
                None,
                reconciler(),
            );

        let err = usecase.handle_delivery(b"{}", "t=1,v1=sig").await.unwrap_err();
        assert!(matches!(err, WebhookError::GatewayUnavailable));
        assert_eq!(err.status_code().as_u16(), 503);
    }

    #[tokio::test]
    async fn bad_signature_is_rejected_before_any_lookup() {
        let mut gateway = MockPaymentGateway::new();
        gateway
            .expect_verify_webhook_signature()
            .returning(|_, _| Err(anyhow::anyhow!("signature mismatch")));

        let usecase = PaymentWebhookUseCase::new(
            Arc::new(MockWebhookEventRepository::new()),
            Some(Arc::new(gateway)),
            reconciler(),
        );

        let err = usecase.handle_delivery(b"{}", "t=1,v1=bad").await.unwrap_err();
        assert!(matches!(err, WebhookError::InvalidSignature));
        assert_eq!(err.status_code().as_u16(), 400);
    }

    #[tokio::test]
    async fn unhandled_event_type_is_recorded_but_ignored() {
        let mut event_repo = MockWebhookEventRepository::new();
        event_repo
            .expect_find_by_event_id()
            .returning(|_| Box::pin(async { Ok(None) }));
        event_repo
            .expect_record()
            .withf(|event| event.event_id == "evt_9" && event.event_type == "invoice.created")
            .times(1)
            .returning(|_| Box::pin(async { Ok(true) }));
        allow_purge(&mut event_repo);

        let event = StripeEvent {
            id: Some("evt_9".to_string()),
            type_: "invoice.created".to_string(),
            created: None,
            livemode: None,
            data: StripeEventData { object: json!({}) },
        };

        let usecase = PaymentWebhookUseCase::new(
            Arc::new(event_repo),
            Some(Arc::new(verified_gateway(event))),
            reconciler(),
        );

        let outcome = usecase.handle_delivery(b"{}", "t=1,v1=sig").await.unwrap();
        assert_eq!(outcome, WebhookOutcome::Ignored);
    }

    #[tokio::test]
    async fn losing_the_record_race_is_still_a_success() {
        let mut event_repo = MockWebhookEventRepository::new();
        event_repo
            .expect_find_by_event_id()
            .returning(|_| Box::pin(async { Ok(None) }));
        event_repo
            .expect_record()
            .returning(|_| Box::pin(async { Ok(false) }));
        allow_purge(&mut event_repo);

        let gateway = verified_gateway(checkout_event("evt_2", "unpaid"));
        let usecase = PaymentWebhookUseCase::new(
            Arc::new(event_repo),
            Some(Arc::new(gateway)),
            reconciler(),
        );

        let outcome = usecase.handle_delivery(b"{}", "t=1,v1=sig").await.unwrap();
        assert_eq!(outcome, WebhookOutcome::Processed);
    }

    #[tokio::test]
    async fn subscription_lifecycle_events_are_acknowledged() {
        let mut event_repo = MockWebhookEventRepository::new();
        event_repo
            .expect_find_by_event_id()
            .returning(|_| Box::pin(async { Ok(None) }));
        event_repo
            .expect_record()
            .withf(|event| event.event_type == "customer.subscription.deleted")
            .times(1)
            .returning(|_| Box::pin(async { Ok(true) }));
        allow_purge(&mut event_repo);

        let event = StripeEvent {
            id: Some("evt_3".to_string()),
            type_: "customer.subscription.deleted".to_string(),
            created: None,
            livemode: Some(true),
            data: StripeEventData { object: json!({}) },
        };

        let usecase = PaymentWebhookUseCase::new(
            Arc::new(event_repo),
            Some(Arc::new(verified_gateway(event))),
            reconciler(),
        );

        let outcome = usecase.handle_delivery(b"{}", "t=1,v1=sig").await.unwrap();
        assert_eq!(outcome, WebhookOutcome::Processed);
    }
}
