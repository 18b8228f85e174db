use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::entities::plans::PlanEntity;

#[async_trait]
#[automock]
pub trait PlanRepository {
    async fn find_active_plan_by_name(&self, name: &str) -> Result<Option<PlanEntity>>;
    async fn list_visible_plans(&self) -> Result<Vec<PlanEntity>>;
}
