use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{RunQueryDsl, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{entities::accounts::AccountEntity, repositories::accounts::AccountRepository},
    infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::accounts},
};

pub struct AccountPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl AccountPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl AccountRepository for AccountPostgres {
    async fn find_by_id(&self, account_id: Uuid) -> Result<Option<AccountEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = accounts::table
            .find(account_id)
            .select(AccountEntity::as_select())
            .first::<AccountEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn activate_subscription(
        &self,
        account_id: Uuid,
        plan_name: String,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
        auto_renew: bool,
    ) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(accounts::table)
            .filter(accounts::id.eq(account_id))
            .set((
                accounts::subscription_plan.eq(Some(plan_name)),
                accounts::subscription_starts_at.eq(Some(starts_at)),
                accounts::subscription_ends_at.eq(Some(ends_at)),
                accounts::subscription_is_active.eq(true),
                accounts::subscription_auto_renew.eq(auto_renew),
                accounts::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn cancel_auto_renew(&self, account_id: Uuid) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(accounts::table)
            .filter(accounts::id.eq(account_id))
            .set((
                accounts::subscription_auto_renew.eq(false),
                accounts::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn grant_boost_credits(&self, account_id: Uuid, amount: i32) -> Result<i32> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let balance = update(accounts::table)
            .filter(accounts::id.eq(account_id))
            .set((
                accounts::boost_credits.eq(accounts::boost_credits + amount),
                accounts::updated_at.eq(Utc::now()),
            ))
            .returning(accounts::boost_credits)
            .get_result::<i32>(&mut conn)?;

        Ok(balance)
    }

    async fn debit_boost_credits_if_sufficient(
        &self,
        account_id: Uuid,
        amount: i32,
    ) -> Result<Option<i32>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        // The balance guard lives in the WHERE clause so the read and the
        // decrement are one statement.
        let balance = update(accounts::table)
            .filter(accounts::id.eq(account_id))
            .filter(accounts::boost_credits.ge(amount))
            .set((
                accounts::boost_credits.eq(accounts::boost_credits - amount),
                accounts::updated_at.eq(Utc::now()),
            ))
            .returning(accounts::boost_credits)
            .get_result::<i32>(&mut conn)
            .optional()?;

        Ok(balance)
    }

    async fn add_total_spent(&self, account_id: Uuid, amount_minor: i64) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(accounts::table)
            .filter(accounts::id.eq(account_id))
            .set((
                accounts::total_spent_minor.eq(accounts::total_spent_minor + amount_minor),
                accounts::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(())
    }
}
