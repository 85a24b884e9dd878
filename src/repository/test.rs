use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{Subscription, SubscriptionChanges, SubscriptionFilter, TotalCostFilter};
use crate::repository::SubscriptionRepository;
use crate::utils::first_of_next_month;

/// Simple in-memory repository used for unit tests.
///
/// Mirrors the filtering rules of the SQL statements in `repository::query`.
#[derive(Default)]
pub struct TestRepository {
    rows: Mutex<Vec<Subscription>>,
    failing: bool,
    concurrent_delete: bool,
}

impl TestRepository {
    /// Every call fails as if the database were unreachable.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Default::default()
        }
    }

    /// Reads succeed, but every update or delete finds its row already
    /// removed, as if another request deleted it first.
    pub fn concurrent_delete() -> Self {
        Self {
            concurrent_delete: true,
            ..Default::default()
        }
    }

    pub fn rows(&self) -> Vec<Subscription> {
        self.rows.lock().unwrap().clone()
    }

    fn remove(&self, id: Uuid) {
        self.rows.lock().unwrap().retain(|s| s.id != id);
    }

    fn check(&self) -> AppResult<()> {
        if self.failing {
            return Err(AppError::DatabaseError(sea_orm::DbErr::Custom(
                "connection refused".to_string(),
            )));
        }
        Ok(())
    }

    fn matches(filter: &SubscriptionFilter, s: &Subscription) -> bool {
        if let Some(user_id) = filter.user_id
            && s.user_id != user_id
        {
            return false;
        }
        if let Some(name) = &filter.service_name
            && !s
                .service_name
                .to_lowercase()
                .contains(&name.to_lowercase())
        {
            return false;
        }
        true
    }

    fn in_period(filter: &TotalCostFilter, s: &Subscription) -> bool {
        if let Some(start) = filter.start_date
            && s.end_date.is_some_and(|end| end < start)
        {
            return false;
        }
        if let Some(end) = filter.end_date
            && s.start_date >= first_of_next_month(end)
        {
            return false;
        }
        true
    }
}

#[async_trait]
impl SubscriptionRepository for TestRepository {
    async fn create(&self, subscription: &Subscription) -> AppResult<()> {
        self.check()?;
        self.rows.lock().unwrap().push(subscription.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Subscription>> {
        self.check()?;
        Ok(self.rows.lock().unwrap().iter().find(|s| s.id == id).cloned())
    }

    async fn update(
        &self,
        id: Uuid,
        changes: &SubscriptionChanges,
        updated_at: DateTime<Utc>,
    ) -> AppResult<u64> {
        self.check()?;
        if changes.is_empty() {
            return Ok(0);
        }
        if self.concurrent_delete {
            self.remove(id);
        }
        let mut rows = self.rows.lock().unwrap();
        let Some(row) = rows.iter_mut().find(|s| s.id == id) else {
            return Ok(0);
        };
        if let Some(name) = &changes.service_name {
            row.service_name = name.clone();
        }
        if let Some(price) = changes.price {
            row.price = price;
        }
        if let Some(start_date) = changes.start_date {
            row.start_date = start_date;
        }
        if let Some(end_date) = changes.end_date {
            row.end_date = end_date;
        }
        row.updated_at = updated_at;
        Ok(1)
    }

    async fn delete(&self, id: Uuid) -> AppResult<u64> {
        self.check()?;
        if self.concurrent_delete {
            self.remove(id);
        }
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|s| s.id != id);
        Ok((before - rows.len()) as u64)
    }

    async fn list(&self, filter: &SubscriptionFilter) -> AppResult<Vec<Subscription>> {
        self.check()?;
        let mut items: Vec<Subscription> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|s| Self::matches(filter, s))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn total_cost(&self, filter: &TotalCostFilter) -> AppResult<i64> {
        self.check()?;
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|s| Self::matches(&filter.subscription, s) && Self::in_period(filter, s))
            .map(|s| i64::from(s.price))
            .sum())
    }
}
