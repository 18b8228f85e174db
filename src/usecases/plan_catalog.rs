use std::sync::Arc;

use anyhow::Result;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use crate::domain::entities::plans::PlanEntity;
use crate::domain::repositories::plans::PlanRepository;

/// Immutable builtin plan table. A stored plan row with the same name always
/// wins; this table is never mutated at runtime.
pub fn builtin_plans() -> Vec<PlanEntity> {
    vec![
        PlanEntity {
            id: Uuid::from_u128(0xB001),
            name: "free".to_string(),
            display_name: "Free".to_string(),
            price_minor: 0,
            duration_days: 30,
            features: json!({"featured_badge": false, "priority_support": false}),
            max_listings: 5,
            boost_credits: 0,
            allowed_roles: json!(["user", "admin"]),
            is_active: true,
            visible: true,
        },
        PlanEntity {
            id: Uuid::from_u128(0xB002),
            name: "plus".to_string(),
            display_name: "Plus".to_string(),
            price_minor: 900,
            duration_days: 30,
            features: json!({"featured_badge": true, "priority_support": false}),
            max_listings: 20,
            boost_credits: 5,
            allowed_roles: json!(["user", "admin"]),
            is_active: true,
            visible: true,
        },
        PlanEntity {
            id: Uuid::from_u128(0xB003),
            name: "pro".to_string(),
            display_name: "Pro".to_string(),
            price_minor: 2900,
            duration_days: 30,
            features: json!({"featured_badge": true, "priority_support": true}),
            max_listings: 100,
            boost_credits: 20,
            allowed_roles: json!(["user", "admin"]),
            is_active: true,
            visible: true,
        },
    ]
}

/// Plan lookups go through storage first and fall back to the builtin table,
/// so deployments can override pricing without a code change.
pub struct PlanCatalog<P>
where
    P: PlanRepository + Send + Sync + 'static,
{
    plan_repo: Arc<P>,
}

impl<P> PlanCatalog<P>
where
    P: PlanRepository + Send + Sync + 'static,
{
    pub fn new(plan_repo: Arc<P>) -> Self {
        Self { plan_repo }
    }

    pub async fn find_active(&self, name: &str) -> Result<Option<PlanEntity>> {
        if let Some(plan) = self.plan_repo.find_active_plan_by_name(name).await? {
            debug!(plan_name = name, "plan_catalog: using stored plan");
            return Ok(Some(plan));
        }

        debug!(plan_name = name, "plan_catalog: falling back to builtin table");
        Ok(builtin_plans()
            .into_iter()
            .find(|plan| plan.name == name && plan.is_active))
    }

    pub async fn list_visible(&self) -> Result<Vec<PlanEntity>> {
        let mut plans = self.plan_repo.list_visible_plans().await?;

        for builtin in builtin_plans() {
            if builtin.visible && !plans.iter().any(|plan| plan.name == builtin.name) {
                plans.push(builtin);
            }
        }

        Ok(plans)
    }
}
