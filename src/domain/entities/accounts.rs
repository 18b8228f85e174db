use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::value_objects::subscriptions::SubscriptionDto;
use crate::infrastructure::postgres::schema::accounts;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = accounts)]
pub struct AccountEntity {
    pub id: Uuid,
    pub email: String,
    pub role: String,
    pub boost_credits: i32,
    pub total_spent_minor: i64,
    pub subscription_plan: Option<String>,
    pub subscription_starts_at: Option<DateTime<Utc>>,
    pub subscription_ends_at: Option<DateTime<Utc>>,
    pub subscription_is_active: bool,
    pub subscription_auto_renew: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AccountEntity {
    /// Subscription activity is derived from the stored end date against the
    /// given clock; there is no separately maintained status to drift.
    pub fn subscription_active(&self, now: DateTime<Utc>) -> bool {
        self.subscription_is_active
            && self
                .subscription_ends_at
                .map(|ends_at| ends_at > now)
                .unwrap_or(false)
    }

    pub fn has_active_plan(&self, plan_name: &str, now: DateTime<Utc>) -> bool {
        self.subscription_active(now)
            && self
                .subscription_plan
                .as_deref()
                .map(|plan| plan == plan_name)
                .unwrap_or(false)
    }

    pub fn subscription_dto(&self, now: DateTime<Utc>) -> Option<SubscriptionDto> {
        let plan = self.subscription_plan.clone()?;
        let starts_at = self.subscription_starts_at?;
        let ends_at = self.subscription_ends_at?;
        Some(SubscriptionDto {
            plan,
            starts_at,
            ends_at,
            is_active: self.subscription_active(now),
            auto_renew: self.subscription_auto_renew,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn account_with_subscription(ends_at: DateTime<Utc>) -> AccountEntity {
        let now = Utc::now();
        AccountEntity {
            id: Uuid::new_v4(),
            email: "seller@example.com".to_string(),
            role: "user".to_string(),
            boost_credits: 0,
            total_spent_minor: 0,
            subscription_plan: Some("plus".to_string()),
            subscription_starts_at: Some(ends_at - Duration::days(30)),
            subscription_ends_at: Some(ends_at),
            subscription_is_active: true,
            subscription_auto_renew: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn subscription_is_active_strictly_before_end_date() {
        let ends_at = Utc::now() + Duration::days(3);
        let account = account_with_subscription(ends_at);

        assert!(account.subscription_active(ends_at - Duration::seconds(1)));
        assert!(!account.subscription_active(ends_at));
        assert!(!account.subscription_active(ends_at + Duration::seconds(1)));
    }

    #[test]
    fn cancelled_auto_renew_keeps_paid_period_active() {
        let ends_at = Utc::now() + Duration::days(10);
        let mut account = account_with_subscription(ends_at);
        account.subscription_auto_renew = false;

        assert!(account.subscription_active(Utc::now()));
        assert!(account.has_active_plan("plus", Utc::now()));
    }

    #[test]
    fn account_without_subscription_is_never_active() {
        let now = Utc::now();
        let mut account = account_with_subscription(now + Duration::days(1));
        account.subscription_plan = None;
        account.subscription_ends_at = None;

        assert!(!account.subscription_active(now));
        assert!(account.subscription_dto(now).is_none());
    }
}
