use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::accounts::AccountEntity;

#[async_trait]
#[automock]
pub trait AccountRepository {
    async fn find_by_id(&self, account_id: Uuid) -> Result<Option<AccountEntity>>;

    async fn activate_subscription(
        &self,
        account_id: Uuid,
        plan_name: String,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
        auto_renew: bool,
    ) -> Result<()>;

    /// Suppresses the next renewal only; the already-paid period stays active.
    async fn cancel_auto_renew(&self, account_id: Uuid) -> Result<()>;

    /// Atomic increment against the latest persisted balance. Returns the new
    /// balance.
    async fn grant_boost_credits(&self, account_id: Uuid, amount: i32) -> Result<i32>;

    /// Conditional atomic debit: succeeds only while `boost_credits >= amount`
    /// holds in storage, so a concurrent grant and debit cannot clobber each
    /// other. Returns the remaining balance, or `None` when insufficient.
    async fn debit_boost_credits_if_sufficient(
        &self,
        account_id: Uuid,
        amount: i32,
    ) -> Result<Option<i32>>;

    async fn add_total_spent(&self, account_id: Uuid, amount_minor: i64) -> Result<()>;
}
