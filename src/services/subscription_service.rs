use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::repository::SubscriptionRepository;
use crate::utils::parse_month_year_field;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct SubscriptionService {
    repo: Arc<dyn SubscriptionRepository>,
}

impl SubscriptionService {
    pub fn new(repo: Arc<dyn SubscriptionRepository>) -> Self {
        Self { repo }
    }

    pub async fn create_subscription(
        &self,
        request: CreateSubscriptionRequest,
    ) -> AppResult<Subscription> {
        validate_service_name(&request.service_name)?;
        validate_price(request.price)?;

        let start_date = parse_month_year_field("start date", &request.start_date)?;
        // an empty end date means the subscription is ongoing
        let end_date = request
            .end_date
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|s| parse_month_year_field("end date", s))
            .transpose()?;
        validate_period(start_date, end_date)?;

        let now = Utc::now();
        let subscription = Subscription {
            id: Uuid::new_v4(),
            service_name: request.service_name,
            price: request.price,
            user_id: request.user_id,
            start_date,
            end_date,
            created_at: now,
            updated_at: now,
        };

        self.repo.create(&subscription).await?;
        log::info!(
            "Created subscription {} for user {}",
            subscription.id,
            subscription.user_id
        );

        Ok(subscription)
    }

    pub async fn get_subscription(&self, id: Uuid) -> AppResult<Subscription> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("subscription not found".to_string()))
    }

    /// Applies a partial update.
    ///
    /// The existence check and the write are separate statements; a row
    /// deleted in between is reported as `NotFound` through the affected
    /// row count.
    pub async fn update_subscription(
        &self,
        id: Uuid,
        request: UpdateSubscriptionRequest,
    ) -> AppResult<()> {
        let current = self.get_subscription(id).await?;

        let changes = SubscriptionChanges::try_from(request)?;
        if changes.is_empty() {
            return Err(AppError::ValidationError("no fields to update".to_string()));
        }

        let start_date = changes.start_date.unwrap_or(current.start_date);
        let end_date = changes.end_date.unwrap_or(current.end_date);
        validate_period(start_date, end_date)?;

        let updated = self.repo.update(id, &changes, Utc::now()).await?;
        if updated == 0 {
            return Err(AppError::NotFound("subscription not found".to_string()));
        }
        log::info!("Updated subscription {id}");

        Ok(())
    }

    pub async fn delete_subscription(&self, id: Uuid) -> AppResult<()> {
        self.get_subscription(id).await?;

        let deleted = self.repo.delete(id).await?;
        if deleted == 0 {
            return Err(AppError::NotFound("subscription not found".to_string()));
        }
        log::info!("Deleted subscription {id}");

        Ok(())
    }

    pub async fn list_subscriptions(
        &self,
        filter: &SubscriptionFilter,
    ) -> AppResult<Vec<Subscription>> {
        self.repo.list(filter).await
    }

    pub async fn get_total_cost(&self, filter: &TotalCostFilter) -> AppResult<i64> {
        self.repo.total_cost(filter).await
    }
}
