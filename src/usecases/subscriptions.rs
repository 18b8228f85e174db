use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::repositories::accounts::AccountRepository;
use crate::domain::value_objects::iam::Requester;
use crate::domain::value_objects::subscriptions::SubscriptionDto;

#[derive(Debug, Error)]
pub enum SubscriptionError {
    #[error("account not found")]
    AccountNotFound,
    #[error("no active subscription")]
    NoActiveSubscription,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl SubscriptionError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        match self {
            SubscriptionError::AccountNotFound => axum::http::StatusCode::NOT_FOUND,
            SubscriptionError::NoActiveSubscription => axum::http::StatusCode::CONFLICT,
            SubscriptionError::Internal(_) => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Read side of the subscription state machine plus renewal suppression.
/// Expiry is evaluated lazily against the stored timestamps; nothing here
/// writes an "expired" state.
pub struct SubscriptionUseCase<A>
where
    A: AccountRepository + Send + Sync + 'static,
{
    account_repo: Arc<A>,
}

impl<A> SubscriptionUseCase<A>
where
    A: AccountRepository + Send + Sync + 'static,
{
    pub fn new(account_repo: Arc<A>) -> Self {
        Self { account_repo }
    }

    pub async fn current_subscription(
        &self,
        requester: Requester,
    ) -> Result<Option<SubscriptionDto>, SubscriptionError> {
        let account = self
            .account_repo
            .find_by_id(requester.account_id)
            .await?
            .ok_or(SubscriptionError::AccountNotFound)?;

        Ok(account.subscription_dto(Utc::now()))
    }

    /// Suppresses the next renewal. The already-paid period keeps running
    /// until its stored end timestamp.
    pub async fn cancel_auto_renew(&self, requester: Requester) -> Result<(), SubscriptionError> {
        let account = self
            .account_repo
            .find_by_id(requester.account_id)
            .await?
            .ok_or(SubscriptionError::AccountNotFound)?;

        if !account.subscription_active(Utc::now()) {
            let err = SubscriptionError::NoActiveSubscription;
            warn!(
                account_id = %account.id,
                status = err.status_code().as_u16(),
                "subscriptions: auto-renew cancel without active subscription"
            );
            return Err(err);
        }

        self.account_repo.cancel_auto_renew(account.id).await?;
        info!(
            account_id = %account.id,
            ends_at = ?account.subscription_ends_at,
            "subscriptions: auto-renew cancelled, period runs to its end"
        );
        Ok(())
    }
}
