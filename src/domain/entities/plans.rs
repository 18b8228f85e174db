use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::plans;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = plans)]
pub struct PlanEntity {
    pub id: Uuid,
    pub name: String,
    pub display_name: String,
    pub price_minor: i64,
    pub duration_days: i32,
    pub features: serde_json::Value,
    pub max_listings: i32,
    pub boost_credits: i32,
    pub allowed_roles: serde_json::Value,
    pub is_active: bool,
    pub visible: bool,
}

impl PlanEntity {
    pub fn is_free(&self) -> bool {
        self.price_minor == 0
    }

    pub fn allows_role(&self, role: &str) -> bool {
        match self.allowed_roles.as_array() {
            Some(roles) => roles.iter().any(|value| value.as_str() == Some(role)),
            // A plan without an explicit allow-list is open to everyone.
            None => true,
        }
    }
}
