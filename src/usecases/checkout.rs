use std::sync::Arc;

use chrono::{Duration, Utc};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::config_model::Billing;
use crate::domain::repositories::{
    accounts::AccountRepository, listings::ListingRepository, plans::PlanRepository,
};
use crate::domain::value_objects::boosts::{CREDIT_MINOR_VALUE, MAX_BOOST_DAYS, MIN_BOOST_DAYS};
use crate::domain::value_objects::checkout::{
    CheckoutMetadata, CheckoutOutcome, CheckoutSessionDto, SessionStatusDto,
};
use crate::domain::value_objects::enums::payment_purposes::PaymentPurpose;
use crate::domain::value_objects::iam::Requester;
use crate::payments::gateway::{CheckoutSessionRequest, PaymentGateway};
use crate::usecases::plan_catalog::PlanCatalog;

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("plan not found or inactive: {0}")]
    PlanNotFound(String),
    #[error("plan is not available for this role")]
    PlanNotAllowed,
    #[error("an identical subscription is already active")]
    SubscriptionAlreadyActive,
    #[error("invalid boost duration: {0} days")]
    InvalidDuration(i64),
    #[error("listing not found")]
    ListingNotFound,
    #[error("only the listing owner can boost it")]
    NotOwner,
    #[error("listing is sold or deleted")]
    ListingUnavailable,
    #[error("listing is already boosted")]
    AlreadyBoosted,
    #[error("account not found")]
    AccountNotFound,
    #[error("payment gateway is not configured")]
    GatewayUnavailable,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CheckoutError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            CheckoutError::PlanNotFound(_)
            | CheckoutError::InvalidDuration(_)
            | CheckoutError::ListingUnavailable => StatusCode::BAD_REQUEST,
            CheckoutError::PlanNotAllowed | CheckoutError::NotOwner => StatusCode::FORBIDDEN,
            CheckoutError::SubscriptionAlreadyActive | CheckoutError::AlreadyBoosted => {
                StatusCode::CONFLICT
            }
            CheckoutError::ListingNotFound | CheckoutError::AccountNotFound => {
                StatusCode::NOT_FOUND
            }
            CheckoutError::GatewayUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            CheckoutError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, CheckoutError>;

/// Decides whether a purchase needs the gateway and, if so, opens a session.
/// Apart from the free-tier bypass, nothing is persisted here; entitlements
/// are only granted once the gateway confirms settlement.
pub struct CheckoutUseCase<A, L, P, G>
where
    A: AccountRepository + Send + Sync + 'static,
    L: ListingRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
    G: PaymentGateway + 'static,
{
    account_repo: Arc<A>,
    listing_repo: Arc<L>,
    plan_catalog: Arc<PlanCatalog<P>>,
    gateway: Option<Arc<G>>,
    billing: Billing,
}

impl<A, L, P, G> CheckoutUseCase<A, L, P, G>
where
    A: AccountRepository + Send + Sync + 'static,
    L: ListingRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
    G: PaymentGateway + 'static,
{
    pub fn new(
        account_repo: Arc<A>,
        listing_repo: Arc<L>,
        plan_catalog: Arc<PlanCatalog<P>>,
        gateway: Option<Arc<G>>,
        billing: Billing,
    ) -> Self {
        Self {
            account_repo,
            listing_repo,
            plan_catalog,
            gateway,
            billing,
        }
    }

    fn gateway(&self) -> UseCaseResult<&Arc<G>> {
        self.gateway.as_ref().ok_or_else(|| {
            let err = CheckoutError::GatewayUnavailable;
            warn!(
                status = err.status_code().as_u16(),
                "checkout: gateway unconfigured, failing closed"
            );
            err
        })
    }

    pub async fn start_subscription_checkout(
        &self,
        requester: Requester,
        plan_name: &str,
        auto_renew: bool,
    ) -> UseCaseResult<CheckoutOutcome> {
        info!(
            account_id = %requester.account_id,
            plan_name,
            auto_renew,
            "checkout: subscription checkout requested"
        );

        let plan = self
            .plan_catalog
            .find_active(plan_name)
            .await
            .map_err(|err| {
                error!(plan_name, db_error = ?err, "checkout: failed to resolve plan");
                CheckoutError::Internal(err)
            })?
            .ok_or_else(|| {
                let err = CheckoutError::PlanNotFound(plan_name.to_string());
                warn!(
                    plan_name,
                    status = err.status_code().as_u16(),
                    "checkout: unknown or inactive plan"
                );
                err
            })?;

        if !plan.allows_role(&requester.role.to_string()) {
            let err = CheckoutError::PlanNotAllowed;
            warn!(
                account_id = %requester.account_id,
                plan_name,
                role = %requester.role,
                status = err.status_code().as_u16(),
                "checkout: plan not allowed for role"
            );
            return Err(err);
        }

        let account = self
            .account_repo
            .find_by_id(requester.account_id)
            .await
            .map_err(CheckoutError::Internal)?
            .ok_or(CheckoutError::AccountNotFound)?;

        let now = Utc::now();
        if account.has_active_plan(&plan.name, now) {
            let err = CheckoutError::SubscriptionAlreadyActive;
            warn!(
                account_id = %account.id,
                plan_name,
                status = err.status_code().as_u16(),
                "checkout: identical subscription already active"
            );
            return Err(err);
        }

        if plan.is_free() {
            return self
                .activate_free_plan(account.id, &plan.name, plan.duration_days, plan.boost_credits)
                .await;
        }

        let gateway = self.gateway()?;
        let metadata = CheckoutMetadata {
            account_id: account.id,
            purpose: PaymentPurpose::Subscription,
            listing_id: None,
            duration_days: Some(plan.duration_days.into()),
            plan_name: Some(plan.name.clone()),
            auto_renew: Some(auto_renew),
        };

        let session = gateway
            .create_checkout_session(CheckoutSessionRequest {
                amount_minor: plan.price_minor,
                currency: self.billing.currency.clone(),
                description: format!(
                    "{} subscription ({} days)",
                    plan.display_name, plan.duration_days
                ),
                metadata: metadata.to_map(),
            })
            .await
            .map_err(|err| {
                error!(
                    account_id = %account.id,
                    plan_name,
                    error = ?err,
                    "checkout: gateway session creation failed"
                );
                CheckoutError::Internal(err)
            })?;

        info!(
            account_id = %account.id,
            plan_name,
            session_id = %session.session_id,
            "checkout: subscription checkout session created"
        );

        Ok(CheckoutOutcome::Session(CheckoutSessionDto {
            session_id: session.session_id,
            redirect_url: session.redirect_url,
        }))
    }

    async fn activate_free_plan(
        &self,
        account_id: Uuid,
        plan_name: &str,
        duration_days: i32,
        boost_credits: i32,
    ) -> UseCaseResult<CheckoutOutcome> {
        let now = Utc::now();
        let ends_at = now + Duration::days(duration_days.into());

        self.account_repo
            .activate_subscription(account_id, plan_name.to_string(), now, ends_at, false)
            .await
            .map_err(|err| {
                error!(
                    %account_id,
                    plan_name,
                    db_error = ?err,
                    "checkout: failed to activate free plan"
                );
                CheckoutError::Internal(err)
            })?;

        if boost_credits > 0 {
            self.account_repo
                .grant_boost_credits(account_id, boost_credits)
                .await
                .map_err(CheckoutError::Internal)?;
        }

        info!(
            %account_id,
            plan_name,
            %ends_at,
            "checkout: free plan activated without gateway session"
        );

        Ok(CheckoutOutcome::Activated)
    }

    pub async fn start_boost_checkout(
        &self,
        requester: Requester,
        listing_id: Uuid,
        duration_days: i64,
    ) -> UseCaseResult<CheckoutOutcome> {
        info!(
            account_id = %requester.account_id,
            %listing_id,
            duration_days,
            "checkout: boost checkout requested"
        );

        if !(MIN_BOOST_DAYS..=MAX_BOOST_DAYS).contains(&duration_days) {
            let err = CheckoutError::InvalidDuration(duration_days);
            warn!(
                %listing_id,
                duration_days,
                status = err.status_code().as_u16(),
                "checkout: boost duration out of range"
            );
            return Err(err);
        }

        let listing = self
            .listing_repo
            .find_by_id(listing_id)
            .await
            .map_err(CheckoutError::Internal)?
            .ok_or(CheckoutError::ListingNotFound)?;

        if listing.owner_id != requester.account_id && !requester.is_admin() {
            let err = CheckoutError::NotOwner;
            warn!(
                account_id = %requester.account_id,
                %listing_id,
                owner_id = %listing.owner_id,
                status = err.status_code().as_u16(),
                "checkout: boost requested by non-owner"
            );
            return Err(err);
        }

        if listing.is_terminal() {
            let err = CheckoutError::ListingUnavailable;
            warn!(
                %listing_id,
                listing_status = %listing.status,
                status = err.status_code().as_u16(),
                "checkout: listing in terminal state"
            );
            return Err(err);
        }

        let now = Utc::now();
        if listing.boost_active(now) {
            let err = CheckoutError::AlreadyBoosted;
            warn!(
                %listing_id,
                boost_expiry = ?listing.boost_expiry,
                status = err.status_code().as_u16(),
                "checkout: listing already actively boosted"
            );
            return Err(err);
        }

        let gateway = self.gateway()?;
        let amount_minor = self.billing.boost_rate_per_day * duration_days * CREDIT_MINOR_VALUE;
        let metadata = CheckoutMetadata {
            account_id: requester.account_id,
            purpose: PaymentPurpose::Boost,
            listing_id: Some(listing_id),
            duration_days: Some(duration_days),
            plan_name: None,
            auto_renew: None,
        };

        let session = gateway
            .create_checkout_session(CheckoutSessionRequest {
                amount_minor,
                currency: self.billing.currency.clone(),
                description: format!("Listing boost ({} days)", duration_days),
                metadata: metadata.to_map(),
            })
            .await
            .map_err(|err| {
                error!(
                    account_id = %requester.account_id,
                    %listing_id,
                    error = ?err,
                    "checkout: gateway session creation failed"
                );
                CheckoutError::Internal(err)
            })?;

        info!(
            account_id = %requester.account_id,
            %listing_id,
            session_id = %session.session_id,
            amount_minor,
            "checkout: boost checkout session created"
        );

        Ok(CheckoutOutcome::Session(CheckoutSessionDto {
            session_id: session.session_id,
            redirect_url: session.redirect_url,
        }))
    }

    /// Used by the client after redirect-back; webhook delivery is
    /// asynchronous and may lag the user's return, so this reads the live
    /// session state plus (for boosts) the listing's current boost status.
    pub async fn get_session_status(&self, session_id: &str) -> UseCaseResult<SessionStatusDto> {
        let gateway = self.gateway()?;
        let session = gateway
            .retrieve_checkout_session(session_id)
            .await
            .map_err(|err| {
                error!(
                    session_id,
                    error = ?err,
                    "checkout: failed to retrieve gateway session"
                );
                CheckoutError::Internal(err)
            })?;

        let metadata = session
            .metadata
            .as_ref()
            .and_then(|map| CheckoutMetadata::from_map(map).ok());
        let purpose = metadata.as_ref().map(|m| m.purpose.to_string());

        let mut boost = None;
        if let Some(metadata) = &metadata {
            if metadata.purpose == PaymentPurpose::Boost {
                if let Some(listing_id) = metadata.listing_id {
                    let listing = self
                        .listing_repo
                        .find_by_id(listing_id)
                        .await
                        .map_err(CheckoutError::Internal)?;

                    if let Some(listing) = listing {
                        boost = Some(listing.boost_status(Utc::now()));

                        // Tracking the redirect-back view must never fail the
                        // request; it runs off the request path.
                        let listing_repo = Arc::clone(&self.listing_repo);
                        tokio::spawn(async move {
                            if let Err(err) = listing_repo.increment_view_count(listing_id).await {
                                warn!(
                                    %listing_id,
                                    error = ?err,
                                    "checkout: view tracking failed"
                                );
                            }
                        });
                    }
                }
            }
        }

        Ok(SessionStatusDto {
            session_id: session_id.to_string(),
            payment_status: session
                .payment_status
                .unwrap_or_else(|| "unknown".to_string()),
            purpose,
            boost,
        })
    }
}
