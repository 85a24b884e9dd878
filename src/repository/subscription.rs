use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, EntityTrait, FromQueryResult, Set};
use uuid::Uuid;

use super::query::{list_query, total_cost_query, update_query};
use super::{SeaOrmSubscriptionRepository, SubscriptionRepository};
use crate::entities::subscription_entity as subscriptions;
use crate::error::AppResult;
use crate::models::{Subscription, SubscriptionChanges, SubscriptionFilter, TotalCostFilter};

#[derive(Debug, FromQueryResult)]
struct TotalCostRow {
    total_cost: i64,
}

#[async_trait]
impl SubscriptionRepository for SeaOrmSubscriptionRepository {
    async fn create(&self, subscription: &Subscription) -> AppResult<()> {
        subscriptions::ActiveModel {
            id: Set(subscription.id),
            service_name: Set(subscription.service_name.clone()),
            price: Set(subscription.price),
            user_id: Set(subscription.user_id),
            start_date: Set(subscription.start_date),
            end_date: Set(subscription.end_date),
            created_at: Set(subscription.created_at),
            updated_at: Set(subscription.updated_at),
        }
        .insert(&self.db)
        .await?;
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Subscription>> {
        let model = subscriptions::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Subscription::from))
    }

    async fn update(
        &self,
        id: Uuid,
        changes: &SubscriptionChanges,
        updated_at: DateTime<Utc>,
    ) -> AppResult<u64> {
        if changes.is_empty() {
            return Ok(0);
        }
        let result = update_query(id, changes, updated_at).exec(&self.db).await?;
        Ok(result.rows_affected)
    }

    async fn delete(&self, id: Uuid) -> AppResult<u64> {
        let result = subscriptions::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected)
    }

    async fn list(&self, filter: &SubscriptionFilter) -> AppResult<Vec<Subscription>> {
        let models = list_query(filter).all(&self.db).await?;
        Ok(models.into_iter().map(Subscription::from).collect())
    }

    async fn total_cost(&self, filter: &TotalCostFilter) -> AppResult<i64> {
        let total = total_cost_query(filter)
            .into_model::<TotalCostRow>()
            .one(&self.db)
            .await?
            .map(|r| r.total_cost)
            .unwrap_or(0);
        Ok(total)
    }
}
