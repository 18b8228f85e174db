use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::config_model::Billing;
use crate::domain::entities::listing_boosts::NewListingBoostEntity;
use crate::domain::entities::payments::NewPaymentEntity;
use crate::domain::repositories::{
    accounts::AccountRepository, listings::ListingRepository, payments::PaymentRepository,
    plans::PlanRepository,
};
use crate::domain::value_objects::boosts::GATEWAY_BOOST_PRIORITY;
use crate::domain::value_objects::checkout::CheckoutMetadata;
use crate::domain::value_objects::enums::{
    boost_types::BoostType, payment_methods::PaymentMethod, payment_purposes::PaymentPurpose,
    payment_statuses::PaymentStatus,
};
use crate::payments::stripe_client::StripeCheckoutSession;
use crate::usecases::plan_catalog::PlanCatalog;

#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The event is malformed beyond repair. Redelivery would not help, so
    /// callers log it and acknowledge the delivery.
    #[error("invalid gateway event: {0}")]
    Invalid(String),
    /// Storage was unavailable mid-application. Callers surface a failure so
    /// the gateway redelivers; the transaction-id probe makes the retry safe.
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

pub type ReconcileResult<T> = std::result::Result<T, ReconcileError>;

/// Translates a confirmed gateway event into account and listing mutations.
/// State may have drifted since checkout was opened, so everything is
/// re-verified against fresh storage reads before any entitlement is granted.
pub struct EntitlementReconciler<A, L, Pay, P>
where
    A: AccountRepository + Send + Sync + 'static,
    L: ListingRepository + Send + Sync + 'static,
    Pay: PaymentRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
{
    account_repo: Arc<A>,
    listing_repo: Arc<L>,
    payment_repo: Arc<Pay>,
    plan_catalog: Arc<PlanCatalog<P>>,
    billing: Billing,
}

impl<A, L, Pay, P> EntitlementReconciler<A, L, Pay, P>
where
    A: AccountRepository + Send + Sync + 'static,
    L: ListingRepository + Send + Sync + 'static,
    Pay: PaymentRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
{
    pub fn new(
        account_repo: Arc<A>,
        listing_repo: Arc<L>,
        payment_repo: Arc<Pay>,
        plan_catalog: Arc<PlanCatalog<P>>,
        billing: Billing,
    ) -> Self {
        Self {
            account_repo,
            listing_repo,
            payment_repo,
            plan_catalog,
            billing,
        }
    }

    pub async fn apply_checkout_completed(
        &self,
        session: &StripeCheckoutSession,
    ) -> ReconcileResult<()> {
        if session.payment_status.as_deref() != Some("paid") {
            info!(
                session_id = ?session.id,
                payment_status = ?session.payment_status,
                "reconciler: checkout completed without payment, nothing to apply"
            );
            return Ok(());
        }

        let metadata_map = session
            .metadata
            .as_ref()
            .ok_or_else(|| ReconcileError::Invalid("missing session metadata".to_string()))?;
        let metadata = CheckoutMetadata::from_map(metadata_map)
            .map_err(ReconcileError::Invalid)?;

        let transaction_id = session
            .payment_intent
            .clone()
            .or_else(|| session.id.clone())
            .ok_or_else(|| {
                ReconcileError::Invalid("session carries no transaction reference".to_string())
            })?;

        // Defense-in-depth on top of the event-id guard: a completed payment
        // for this transaction means the event was already applied.
        if self
            .payment_repo
            .find_completed_by_transaction_id(&transaction_id)
            .await?
            .is_some()
        {
            info!(
                %transaction_id,
                account_id = %metadata.account_id,
                "reconciler: transaction already applied, skipping"
            );
            return Ok(());
        }

        match metadata.purpose {
            PaymentPurpose::Boost => self.apply_boost(&metadata, session, &transaction_id).await,
            PaymentPurpose::Subscription => {
                self.apply_subscription(&metadata, session, &transaction_id)
                    .await
            }
        }
    }

    async fn apply_boost(
        &self,
        metadata: &CheckoutMetadata,
        session: &StripeCheckoutSession,
        transaction_id: &str,
    ) -> ReconcileResult<()> {
        let listing_id = metadata
            .listing_id
            .ok_or_else(|| ReconcileError::Invalid("boost metadata missing listing_id".to_string()))?;
        let duration_days = metadata.duration_days.ok_or_else(|| {
            ReconcileError::Invalid("boost metadata missing duration_days".to_string())
        })?;

        let Some(account) = self.account_repo.find_by_id(metadata.account_id).await? else {
            warn!(
                account_id = %metadata.account_id,
                %listing_id,
                %transaction_id,
                "reconciler: paying account no longer exists, dropping event"
            );
            return Ok(());
        };

        let amount_minor = session.amount_total.unwrap_or(0);
        let listing = self.listing_repo.find_by_id(listing_id).await?;

        // The listing may have been deleted, sold, or re-owned between
        // checkout and settlement. The charge is still auditable.
        let skip_reason = match &listing {
            None => Some("listing_missing"),
            Some(listing) if listing.owner_id != account.id => Some("owner_changed"),
            Some(listing) if listing.is_terminal() => Some("listing_terminal"),
            Some(_) => None,
        };

        if let Some(reason) = skip_reason {
            warn!(
                account_id = %account.id,
                %listing_id,
                %transaction_id,
                skip_reason = reason,
                "reconciler: recording payment without activating boost"
            );
            self.record_boost_payment(account.id, amount_minor, transaction_id, listing_id, Some(reason))
                .await?;
            return Ok(());
        }

        let now = Utc::now();
        let expiry = now + Duration::days(duration_days);
        let activated = self
            .listing_repo
            .activate_boost_if_inactive(listing_id, expiry, GATEWAY_BOOST_PRIORITY, now)
            .await?;

        if !activated {
            warn!(
                account_id = %account.id,
                %listing_id,
                %transaction_id,
                "reconciler: listing became boosted concurrently, recording payment only"
            );
            self.record_boost_payment(
                account.id,
                amount_minor,
                transaction_id,
                listing_id,
                Some("already_boosted"),
            )
            .await?;
            return Ok(());
        }

        self.listing_repo
            .record_boost(NewListingBoostEntity {
                listing_id,
                boosted_by: account.id,
                boost_type: BoostType::Paid.to_string(),
                duration_days: duration_days as i32,
                expires_at: expiry,
                payment_method: Some(PaymentMethod::Stripe.to_string()),
                transaction_id: Some(transaction_id.to_string()),
            })
            .await?;

        self.record_boost_payment(account.id, amount_minor, transaction_id, listing_id, None)
            .await?;
        self.account_repo
            .add_total_spent(account.id, amount_minor)
            .await?;

        info!(
            account_id = %account.id,
            %listing_id,
            %transaction_id,
            %expiry,
            priority = GATEWAY_BOOST_PRIORITY,
            "reconciler: boost entitlement applied"
        );

        Ok(())
    }

    async fn record_boost_payment(
        &self,
        account_id: Uuid,
        amount_minor: i64,
        transaction_id: &str,
        listing_id: Uuid,
        skip_reason: Option<&str>,
    ) -> ReconcileResult<()> {
        let mut metadata = json!({ "listing_id": listing_id.to_string() });
        if let Some(reason) = skip_reason {
            metadata["skip_reason"] = json!(reason);
        }

        self.payment_repo
            .record_payment(NewPaymentEntity {
                account_id,
                amount_minor,
                currency: self.billing.currency.clone(),
                method: PaymentMethod::Stripe.to_string(),
                transaction_id: Some(transaction_id.to_string()),
                purpose: PaymentPurpose::Boost.to_string(),
                status: PaymentStatus::Completed.to_string(),
                metadata,
            })
            .await?;

        Ok(())
    }

    async fn apply_subscription(
        &self,
        metadata: &CheckoutMetadata,
        session: &StripeCheckoutSession,
        transaction_id: &str,
    ) -> ReconcileResult<()> {
        let plan_name = metadata.plan_name.as_deref().ok_or_else(|| {
            ReconcileError::Invalid("subscription metadata missing plan_name".to_string())
        })?;

        let Some(account) = self.account_repo.find_by_id(metadata.account_id).await? else {
            warn!(
                account_id = %metadata.account_id,
                %transaction_id,
                "reconciler: paying account no longer exists, dropping event"
            );
            return Ok(());
        };

        let Some(plan) = self.plan_catalog.find_active(plan_name).await? else {
            warn!(
                account_id = %account.id,
                plan_name,
                %transaction_id,
                "reconciler: plan vanished between checkout and settlement"
            );
            self.payment_repo
                .record_payment(NewPaymentEntity {
                    account_id: account.id,
                    amount_minor: session.amount_total.unwrap_or(0),
                    currency: self.billing.currency.clone(),
                    method: PaymentMethod::Stripe.to_string(),
                    transaction_id: Some(transaction_id.to_string()),
                    purpose: PaymentPurpose::Subscription.to_string(),
                    status: PaymentStatus::Completed.to_string(),
                    metadata: json!({ "plan_name": plan_name, "skip_reason": "plan_missing" }),
                })
                .await?;
            return Ok(());
        };

        let now = Utc::now();
        let ends_at = now + Duration::days(plan.duration_days.into());
        let auto_renew = metadata.auto_renew.unwrap_or(false);

        self.account_repo
            .activate_subscription(account.id, plan.name.clone(), now, ends_at, auto_renew)
            .await?;

        if plan.boost_credits > 0 {
            let balance = self
                .account_repo
                .grant_boost_credits(account.id, plan.boost_credits)
                .await?;
            info!(
                account_id = %account.id,
                granted = plan.boost_credits,
                balance,
                "reconciler: plan boost credits granted"
            );
        }

        let amount_minor = session.amount_total.unwrap_or(plan.price_minor);
        self.payment_repo
            .record_payment(NewPaymentEntity {
                account_id: account.id,
                amount_minor,
                currency: self.billing.currency.clone(),
                method: PaymentMethod::Stripe.to_string(),
                transaction_id: Some(transaction_id.to_string()),
                purpose: PaymentPurpose::Subscription.to_string(),
                status: PaymentStatus::Completed.to_string(),
                metadata: json!({ "plan_name": plan.name, "auto_renew": auto_renew }),
            })
            .await?;
        self.account_repo
            .add_total_spent(account.id, amount_minor)
            .await?;

        info!(
            account_id = %account.id,
            plan_name = %plan.name,
            %transaction_id,
            %ends_at,
            auto_renew,
            "reconciler: subscription entitlement applied"
        );

        Ok(())
    }
}
