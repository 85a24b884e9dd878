use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{Subscription, SubscriptionChanges, SubscriptionFilter, TotalCostFilter};

pub mod query;
pub mod subscription;
#[cfg(test)]
pub mod test;

/// Storage operations for subscriptions.
///
/// Absence is reported as `Ok(None)` or as zero affected rows; only
/// store failures come back as errors.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    async fn create(&self, subscription: &Subscription) -> AppResult<()>;
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Subscription>>;
    /// Writes only the fields present in `changes`, plus `updated_at`.
    /// Returns the number of rows updated.
    async fn update(
        &self,
        id: Uuid,
        changes: &SubscriptionChanges,
        updated_at: DateTime<Utc>,
    ) -> AppResult<u64>;
    /// Returns the number of rows deleted.
    async fn delete(&self, id: Uuid) -> AppResult<u64>;
    /// Matching subscriptions, most recently created first.
    async fn list(&self, filter: &SubscriptionFilter) -> AppResult<Vec<Subscription>>;
    /// Sum of `price` over matching subscriptions, 0 when nothing matches.
    async fn total_cost(&self, filter: &TotalCostFilter) -> AppResult<i64>;
}

/// Repository backed by sea-orm and Postgres.
///
/// `DatabaseConnection` wraps a connection pool and is cheap to clone.
#[derive(Clone)]
pub struct SeaOrmSubscriptionRepository {
    db: DatabaseConnection,
}

impl SeaOrmSubscriptionRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}
