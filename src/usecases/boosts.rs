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
};
use crate::domain::value_objects::boosts::{
    ADMIN_BOOST_PRIORITY, AdminBoostResult, AdminChargeOutcome, CREDIT_MINOR_VALUE,
    CreditBoostOutcome, GATEWAY_BOOST_PRIORITY, ListingBoostStatusDto, MAX_BOOST_DAYS,
    MIN_BOOST_DAYS,
};
use crate::domain::value_objects::enums::{
    boost_types::BoostType, payment_methods::PaymentMethod, payment_purposes::PaymentPurpose,
    payment_statuses::PaymentStatus,
};
use crate::domain::value_objects::iam::Requester;

#[derive(Debug, Error)]
pub enum BoostError {
    #[error("boost duration must be between {MIN_BOOST_DAYS} and {MAX_BOOST_DAYS} days")]
    InvalidDuration,
    #[error("listing not found")]
    ListingNotFound,
    #[error("only the listing owner can boost it")]
    NotOwner,
    #[error("administrator privileges required")]
    Forbidden,
    #[error("listing is not available for boosting")]
    ListingUnavailable,
    #[error("listing already has an active boost")]
    AlreadyBoosted,
    #[error("account not found")]
    AccountNotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl BoostError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        match self {
            BoostError::InvalidDuration => axum::http::StatusCode::BAD_REQUEST,
            BoostError::ListingNotFound => axum::http::StatusCode::NOT_FOUND,
            BoostError::NotOwner => axum::http::StatusCode::FORBIDDEN,
            BoostError::Forbidden => axum::http::StatusCode::FORBIDDEN,
            BoostError::ListingUnavailable => axum::http::StatusCode::BAD_REQUEST,
            BoostError::AlreadyBoosted => axum::http::StatusCode::CONFLICT,
            BoostError::AccountNotFound => axum::http::StatusCode::NOT_FOUND,
            BoostError::Internal(_) => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Boosts funded outside the payment gateway: the owner's credit balance, or
/// an administrator grant.
pub struct BoostUseCase<A, L, Pay>
where
    A: AccountRepository + Send + Sync + 'static,
    L: ListingRepository + Send + Sync + 'static,
    Pay: PaymentRepository + Send + Sync + 'static,
{
    account_repo: Arc<A>,
    listing_repo: Arc<L>,
    payment_repo: Arc<Pay>,
    billing: Billing,
}

impl<A, L, Pay> BoostUseCase<A, L, Pay>
where
    A: AccountRepository + Send + Sync + 'static,
    L: ListingRepository + Send + Sync + 'static,
    Pay: PaymentRepository + Send + Sync + 'static,
{
    pub fn new(
        account_repo: Arc<A>,
        listing_repo: Arc<L>,
        payment_repo: Arc<Pay>,
        billing: Billing,
    ) -> Self {
        Self {
            account_repo,
            listing_repo,
            payment_repo,
            billing,
        }
    }

    /// Spends the requester's credit balance on a boost. An insufficient
    /// balance is not an error: callers bridge the shortfall into a gateway
    /// checkout instead.
    pub async fn boost_with_credits(
        &self,
        requester: Requester,
        listing_id: Uuid,
        duration_days: i64,
    ) -> Result<CreditBoostOutcome, BoostError> {
        if !(MIN_BOOST_DAYS..=MAX_BOOST_DAYS).contains(&duration_days) {
            return Err(BoostError::InvalidDuration);
        }

        let listing = self
            .listing_repo
            .find_by_id(listing_id)
            .await?
            .ok_or(BoostError::ListingNotFound)?;
        if listing.owner_id != requester.account_id {
            return Err(BoostError::NotOwner);
        }
        if listing.is_terminal() {
            return Err(BoostError::ListingUnavailable);
        }

        let now = Utc::now();
        if listing.boost_active(now) {
            return Err(BoostError::AlreadyBoosted);
        }

        let account = self
            .account_repo
            .find_by_id(requester.account_id)
            .await?
            .ok_or(BoostError::AccountNotFound)?;

        let cost = self.billing.boost_rate_per_day * duration_days;
        let balance = i64::from(account.boost_credits);
        if balance < cost {
            info!(
                account_id = %account.id,
                %listing_id,
                cost,
                balance,
                "credit balance insufficient for boost, deferring to checkout"
            );
            return Ok(CreditBoostOutcome::PaymentRequired {
                cost,
                balance,
                shortfall: cost - balance,
            });
        }

        let Some(remaining_credits) = self
            .account_repo
            .debit_boost_credits_if_sufficient(account.id, cost as i32)
            .await?
        else {
            // The balance moved under us between the read and the debit.
            // Answer with the balance as it stands now, not the stale read.
            warn!(
                account_id = %account.id,
                %listing_id,
                cost,
                "credit debit lost a concurrent balance change"
            );
            let balance = self
                .account_repo
                .find_by_id(account.id)
                .await?
                .map(|account| i64::from(account.boost_credits))
                .unwrap_or(0);
            return Ok(CreditBoostOutcome::PaymentRequired {
                cost,
                balance,
                shortfall: (cost - balance).max(0),
            });
        };

        let expiry = now + Duration::days(duration_days);
        let activated = self
            .listing_repo
            .activate_boost_if_inactive(listing_id, expiry, GATEWAY_BOOST_PRIORITY, now)
            .await?;
        if !activated {
            // A competing boost landed first; hand the credits back.
            warn!(
                account_id = %account.id,
                %listing_id,
                refunded = cost,
                "boost activation lost a race, refunding credits"
            );
            self.account_repo
                .grant_boost_credits(account.id, cost as i32)
                .await?;
            return Err(BoostError::AlreadyBoosted);
        }

        self.listing_repo
            .record_boost(NewListingBoostEntity {
                listing_id,
                boosted_by: account.id,
                boost_type: BoostType::Credits.to_string(),
                duration_days: duration_days as i32,
                expires_at: expiry,
                payment_method: Some(PaymentMethod::Credits.to_string()),
                transaction_id: None,
            })
            .await?;
        self.payment_repo
            .record_payment(NewPaymentEntity {
                account_id: account.id,
                amount_minor: cost * CREDIT_MINOR_VALUE,
                currency: self.billing.currency.clone(),
                method: PaymentMethod::Credits.to_string(),
                transaction_id: None,
                purpose: PaymentPurpose::Boost.to_string(),
                status: PaymentStatus::Completed.to_string(),
                metadata: json!({
                    "listing_id": listing_id.to_string(),
                    "credits_spent": cost,
                }),
            })
            .await?;

        info!(
            account_id = %account.id,
            %listing_id,
            %expiry,
            remaining_credits,
            "listing boosted with credits"
        );

        Ok(CreditBoostOutcome::Activated {
            expiry,
            priority: GATEWAY_BOOST_PRIORITY,
            remaining_credits,
        })
    }

    /// Administrator promotion. Overwrites any active boost at a higher
    /// priority. Optionally tries to charge the owner's credits; when those
    /// fall short, the boost still lands and a pending payment entry is left
    /// for follow-up.
    pub async fn admin_boost(
        &self,
        requester: Requester,
        listing_id: Uuid,
        duration_days: i64,
        priority: Option<i32>,
        charge_owner: bool,
    ) -> Result<AdminBoostResult, BoostError> {
        if !requester.is_admin() {
            return Err(BoostError::Forbidden);
        }
        if !(MIN_BOOST_DAYS..=MAX_BOOST_DAYS).contains(&duration_days) {
            return Err(BoostError::InvalidDuration);
        }

        let listing = self
            .listing_repo
            .find_by_id(listing_id)
            .await?
            .ok_or(BoostError::ListingNotFound)?;
        if listing.is_terminal() {
            return Err(BoostError::ListingUnavailable);
        }

        let priority = priority.unwrap_or(ADMIN_BOOST_PRIORITY);
        let expiry = Utc::now() + Duration::days(duration_days);

        self.listing_repo
            .force_activate_boost(listing_id, expiry, priority)
            .await?;
        self.listing_repo
            .record_boost(NewListingBoostEntity {
                listing_id,
                boosted_by: requester.account_id,
                boost_type: BoostType::Admin.to_string(),
                duration_days: duration_days as i32,
                expires_at: expiry,
                payment_method: charge_owner.then(|| PaymentMethod::Credits.to_string()),
                transaction_id: None,
            })
            .await?;

        let charge = if charge_owner {
            self.charge_owner_for_boost(listing.owner_id, listing_id, duration_days)
                .await?
        } else {
            AdminChargeOutcome::NotCharged
        };

        info!(
            admin_id = %requester.account_id,
            %listing_id,
            %expiry,
            priority,
            ?charge,
            "administrator boost applied"
        );

        Ok(AdminBoostResult {
            expiry,
            priority,
            charge,
        })
    }

    async fn charge_owner_for_boost(
        &self,
        owner_id: Uuid,
        listing_id: Uuid,
        duration_days: i64,
    ) -> Result<AdminChargeOutcome, BoostError> {
        let cost = self.billing.boost_rate_per_day * duration_days;

        if let Some(remaining_credits) = self
            .account_repo
            .debit_boost_credits_if_sufficient(owner_id, cost as i32)
            .await?
        {
            self.payment_repo
                .record_payment(NewPaymentEntity {
                    account_id: owner_id,
                    amount_minor: cost * CREDIT_MINOR_VALUE,
                    currency: self.billing.currency.clone(),
                    method: PaymentMethod::Credits.to_string(),
                    transaction_id: None,
                    purpose: PaymentPurpose::Boost.to_string(),
                    status: PaymentStatus::Completed.to_string(),
                    metadata: json!({
                        "listing_id": listing_id.to_string(),
                        "credits_spent": cost,
                        "charged_by_admin": true,
                    }),
                })
                .await?;
            return Ok(AdminChargeOutcome::Charged { remaining_credits });
        }

        let amount_minor = cost * CREDIT_MINOR_VALUE;
        warn!(
            %owner_id,
            %listing_id,
            amount_minor,
            "owner credits insufficient for admin boost charge, recording pending payment"
        );
        self.payment_repo
            .record_payment(NewPaymentEntity {
                account_id: owner_id,
                amount_minor,
                currency: self.billing.currency.clone(),
                method: PaymentMethod::Admin.to_string(),
                transaction_id: None,
                purpose: PaymentPurpose::Boost.to_string(),
                status: PaymentStatus::Pending.to_string(),
                metadata: json!({
                    "listing_id": listing_id.to_string(),
                    "reason": "admin_boost_charge",
                }),
            })
            .await?;

        Ok(AdminChargeOutcome::PendingPayment { amount_minor })
    }

    /// Administrator removal of an active boost.
    pub async fn remove_boost(
        &self,
        requester: Requester,
        listing_id: Uuid,
    ) -> Result<(), BoostError> {
        let listing = self
            .listing_repo
            .find_by_id(listing_id)
            .await?
            .ok_or(BoostError::ListingNotFound)?;
        if !requester.is_admin() && listing.owner_id != requester.account_id {
            return Err(BoostError::NotOwner);
        }

        self.listing_repo.remove_boost(listing_id).await?;
        info!(requester_id = %requester.account_id, %listing_id, "boost removed");
        Ok(())
    }

    /// Read-side boost status, evaluated lazily against the current clock.
    pub async fn boost_status(
        &self,
        listing_id: Uuid,
    ) -> Result<ListingBoostStatusDto, BoostError> {
        let listing = self
            .listing_repo
            .find_by_id(listing_id)
            .await?
            .ok_or(BoostError::ListingNotFound)?;
        Ok(listing.boost_status(Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{accounts::AccountEntity, listings::ListingEntity};
    use crate::domain::repositories::accounts::MockAccountRepository;
    use crate::domain::repositories::listings::MockListingRepository;
    use crate::domain::repositories::payments::MockPaymentRepository;
    use crate::domain::value_objects::enums::account_roles::AccountRole;
    use mockall::predicate::eq;

    fn billing() -> Billing {
        Billing {
            currency: "usd".to_string(),
            boost_rate_per_day: 5,
        }
    }

    fn owner(account_id: Uuid) -> Requester {
        Requester {
            account_id,
            role: AccountRole::User,
        }
    }

    fn admin() -> Requester {
        Requester {
            account_id: Uuid::new_v4(),
            role: AccountRole::Admin,
        }
    }

    fn account_with_credits(id: Uuid, credits: i32) -> AccountEntity {
        let now = Utc::now();
        AccountEntity {
            id,
            email: "seller@example.com".to_string(),
            role: "user".to_string(),
            boost_credits: credits,
            total_spent_minor: 0,
            subscription_plan: None,
            subscription_starts_at: None,
            subscription_ends_at: None,
            subscription_is_active: false,
            subscription_auto_renew: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn active_listing(id: Uuid, owner_id: Uuid) -> ListingEntity {
        let now = Utc::now();
        ListingEntity {
            id,
            owner_id,
            title: "Road bike".to_string(),
            status: "active".to_string(),
            is_boosted: false,
            boost_expiry: None,
            boost_priority: 0,
            view_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn usecase(
        account_repo: MockAccountRepository,
        listing_repo: MockListingRepository,
        payment_repo: MockPaymentRepository,
    ) -> BoostUseCase<MockAccountRepository, MockListingRepository, MockPaymentRepository> {
        BoostUseCase::new(
            Arc::new(account_repo),
            Arc::new(listing_repo),
            Arc::new(payment_repo),
            billing(),
        )
    }

    #[tokio::test]
    async fn sufficient_credits_activate_the_boost() {
        let account_id = Uuid::new_v4();
        let listing_id = Uuid::new_v4();

        let mut account_repo = MockAccountRepository::new();
        let account = account_with_credits(account_id, 40);
        account_repo.expect_find_by_id().returning(move |_| {
            let account = account.clone();
            Box::pin(async move { Ok(Some(account)) })
        });
        account_repo
            .expect_debit_boost_credits_if_sufficient()
            .with(eq(account_id), eq(35))
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(Some(5)) }));

        let mut listing_repo = MockListingRepository::new();
        let listing = active_listing(listing_id, account_id);
        listing_repo.expect_find_by_id().returning(move |_| {
            let listing = listing.clone();
            Box::pin(async move { Ok(Some(listing)) })
        });
        listing_repo
            .expect_activate_boost_if_inactive()
            .withf(move |id, _, priority, _| *id == listing_id && *priority == GATEWAY_BOOST_PRIORITY)
            .times(1)
            .returning(|_, _, _, _| Box::pin(async { Ok(true) }));
        listing_repo
            .expect_record_boost()
            .withf(|boost| boost.boost_type == "credits" && boost.duration_days == 7)
            .times(1)
            .returning(|_| Box::pin(async { Ok(Uuid::new_v4()) }));

        let mut payment_repo = MockPaymentRepository::new();
        payment_repo
            .expect_record_payment()
            .withf(move |payment| {
                payment.account_id == account_id
                    && payment.amount_minor == 3500
                    && payment.method == "credits"
                    && payment.status == "completed"
            })
            .times(1)
            .returning(|_| Box::pin(async { Ok(Uuid::new_v4()) }));

        let outcome = usecase(account_repo, listing_repo, payment_repo)
            .boost_with_credits(owner(account_id), listing_id, 7)
            .await
            .unwrap();

        match outcome {
            CreditBoostOutcome::Activated {
                priority,
                remaining_credits,
                ..
            } => {
                assert_eq!(priority, GATEWAY_BOOST_PRIORITY);
                assert_eq!(remaining_credits, 5);
            }
            other => panic!("expected activation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn insufficient_credits_defer_to_checkout_without_debit() {
        let account_id = Uuid::new_v4();
        let listing_id = Uuid::new_v4();

        let mut account_repo = MockAccountRepository::new();
        let account = account_with_credits(account_id, 10);
        account_repo.expect_find_by_id().returning(move |_| {
            let account = account.clone();
            Box::pin(async move { Ok(Some(account)) })
        });

        let mut listing_repo = MockListingRepository::new();
        let listing = active_listing(listing_id, account_id);
        listing_repo.expect_find_by_id().returning(move |_| {
            let listing = listing.clone();
            Box::pin(async move { Ok(Some(listing)) })
        });

        let outcome = usecase(account_repo, listing_repo, MockPaymentRepository::new())
            .boost_with_credits(owner(account_id), listing_id, 7)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            CreditBoostOutcome::PaymentRequired {
                cost: 35,
                balance: 10,
                shortfall: 25,
            }
        );
    }

    #[tokio::test]
    async fn lost_debit_race_reports_the_fresh_balance() {
        let account_id = Uuid::new_v4();
        let listing_id = Uuid::new_v4();

        let mut account_repo = MockAccountRepository::new();
        let before = account_with_credits(account_id, 40);
        account_repo.expect_find_by_id().times(1).returning(move |_| {
            let account = before.clone();
            Box::pin(async move { Ok(Some(account)) })
        });
        account_repo
            .expect_debit_boost_credits_if_sufficient()
            .with(eq(account_id), eq(35))
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(None) }));
        let after = account_with_credits(account_id, 12);
        account_repo.expect_find_by_id().times(1).returning(move |_| {
            let account = after.clone();
            Box::pin(async move { Ok(Some(account)) })
        });

        let mut listing_repo = MockListingRepository::new();
        let listing = active_listing(listing_id, account_id);
        listing_repo.expect_find_by_id().returning(move |_| {
            let listing = listing.clone();
            Box::pin(async move { Ok(Some(listing)) })
        });

        let outcome = usecase(account_repo, listing_repo, MockPaymentRepository::new())
            .boost_with_credits(owner(account_id), listing_id, 7)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            CreditBoostOutcome::PaymentRequired {
                cost: 35,
                balance: 12,
                shortfall: 23,
            }
        );
    }

    #[tokio::test]
    async fn lost_activation_race_refunds_the_debit() {
        let account_id = Uuid::new_v4();
        let listing_id = Uuid::new_v4();

        let mut account_repo = MockAccountRepository::new();
        let account = account_with_credits(account_id, 40);
        account_repo.expect_find_by_id().returning(move |_| {
            let account = account.clone();
            Box::pin(async move { Ok(Some(account)) })
        });
        account_repo
            .expect_debit_boost_credits_if_sufficient()
            .returning(|_, _| Box::pin(async { Ok(Some(5)) }));
        account_repo
            .expect_grant_boost_credits()
            .with(eq(account_id), eq(35))
            .times(1)
            .returning(|_, amount| Box::pin(async move { Ok(amount + 5) }));

        let mut listing_repo = MockListingRepository::new();
        let listing = active_listing(listing_id, account_id);
        listing_repo.expect_find_by_id().returning(move |_| {
            let listing = listing.clone();
            Box::pin(async move { Ok(Some(listing)) })
        });
        listing_repo
            .expect_activate_boost_if_inactive()
            .returning(|_, _, _, _| Box::pin(async { Ok(false) }));

        let err = usecase(account_repo, listing_repo, MockPaymentRepository::new())
            .boost_with_credits(owner(account_id), listing_id, 7)
            .await
            .unwrap_err();
        assert!(matches!(err, BoostError::AlreadyBoosted));
    }

    #[tokio::test]
    async fn credit_boost_rejects_non_owner() {
        let listing_id = Uuid::new_v4();

        let mut listing_repo = MockListingRepository::new();
        let listing = active_listing(listing_id, Uuid::new_v4());
        listing_repo.expect_find_by_id().returning(move |_| {
            let listing = listing.clone();
            Box::pin(async move { Ok(Some(listing)) })
        });

        let err = usecase(
            MockAccountRepository::new(),
            listing_repo,
            MockPaymentRepository::new(),
        )
        .boost_with_credits(owner(Uuid::new_v4()), listing_id, 7)
        .await
        .unwrap_err();
        assert!(matches!(err, BoostError::NotOwner));
        assert_eq!(err.status_code().as_u16(), 403);
    }

    #[tokio::test]
    async fn admin_boost_without_credits_leaves_pending_payment() {
        let owner_id = Uuid::new_v4();
        let listing_id = Uuid::new_v4();

        let mut account_repo = MockAccountRepository::new();
        account_repo
            .expect_debit_boost_credits_if_sufficient()
            .with(eq(owner_id), eq(35))
            .returning(|_, _| Box::pin(async { Ok(None) }));

        let mut listing_repo = MockListingRepository::new();
        let listing = active_listing(listing_id, owner_id);
        listing_repo.expect_find_by_id().returning(move |_| {
            let listing = listing.clone();
            Box::pin(async move { Ok(Some(listing)) })
        });
        listing_repo
            .expect_force_activate_boost()
            .withf(move |id, _, priority| *id == listing_id && *priority == ADMIN_BOOST_PRIORITY)
            .times(1)
            .returning(|_, _, _| Box::pin(async { Ok(()) }));
        listing_repo
            .expect_record_boost()
            .withf(|boost| boost.boost_type == "admin")
            .times(1)
            .returning(|_| Box::pin(async { Ok(Uuid::new_v4()) }));

        let mut payment_repo = MockPaymentRepository::new();
        payment_repo
            .expect_record_payment()
            .withf(move |payment| {
                payment.account_id == owner_id
                    && payment.amount_minor == 3500
                    && payment.status == "pending"
                    && payment.method == "admin"
            })
            .times(1)
            .returning(|_| Box::pin(async { Ok(Uuid::new_v4()) }));

        let result = usecase(account_repo, listing_repo, payment_repo)
            .admin_boost(admin(), listing_id, 7, None, true)
            .await
            .unwrap();

        assert_eq!(result.priority, ADMIN_BOOST_PRIORITY);
        assert_eq!(
            result.charge,
            AdminChargeOutcome::PendingPayment { amount_minor: 3500 }
        );
    }

    #[tokio::test]
    async fn admin_boost_charges_credits_when_available() {
        let owner_id = Uuid::new_v4();
        let listing_id = Uuid::new_v4();

        let mut account_repo = MockAccountRepository::new();
        account_repo
            .expect_debit_boost_credits_if_sufficient()
            .returning(|_, _| Box::pin(async { Ok(Some(15)) }));

        let mut listing_repo = MockListingRepository::new();
        let listing = active_listing(listing_id, owner_id);
        listing_repo.expect_find_by_id().returning(move |_| {
            let listing = listing.clone();
            Box::pin(async move { Ok(Some(listing)) })
        });
        listing_repo
            .expect_force_activate_boost()
            .returning(|_, _, _| Box::pin(async { Ok(()) }));
        listing_repo
            .expect_record_boost()
            .returning(|_| Box::pin(async { Ok(Uuid::new_v4()) }));

        let mut payment_repo = MockPaymentRepository::new();
        payment_repo
            .expect_record_payment()
            .withf(|payment| payment.status == "completed" && payment.method == "credits")
            .times(1)
            .returning(|_| Box::pin(async { Ok(Uuid::new_v4()) }));

        let result = usecase(account_repo, listing_repo, payment_repo)
            .admin_boost(admin(), listing_id, 10, Some(120), true)
            .await
            .unwrap();

        assert_eq!(result.priority, 120);
        assert_eq!(
            result.charge,
            AdminChargeOutcome::Charged {
                remaining_credits: 15
            }
        );
    }

    #[tokio::test]
    async fn admin_boost_requires_admin_role() {
        let err = usecase(
            MockAccountRepository::new(),
            MockListingRepository::new(),
            MockPaymentRepository::new(),
        )
        .admin_boost(owner(Uuid::new_v4()), Uuid::new_v4(), 7, None, false)
        .await
        .unwrap_err();
        assert!(matches!(err, BoostError::Forbidden));
    }
}
