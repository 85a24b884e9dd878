use crate::entities::subscription_entity;
use crate::error::{AppError, AppResult};
use crate::utils::month_year::serde_month_year;
use crate::utils::parse_month_year_field;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: Uuid,
    #[schema(example = "Netflix")]
    pub service_name: String,
    #[schema(example = 15)]
    pub price: i32,
    pub user_id: Uuid,
    #[serde(serialize_with = "serde_month_year::serialize")]
    #[schema(value_type = String, example = "01-2024")]
    pub start_date: NaiveDate,
    #[serde(serialize_with = "serde_month_year::option::serialize")]
    #[schema(value_type = Option<String>, example = "12-2024")]
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<subscription_entity::Model> for Subscription {
    fn from(m: subscription_entity::Model) -> Self {
        Self {
            id: m.id,
            service_name: m.service_name,
            price: m.price,
            user_id: m.user_id,
            start_date: m.start_date,
            end_date: m.end_date,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubscriptionRequest {
    #[schema(example = "Netflix")]
    pub service_name: String,
    #[schema(example = 15)]
    pub price: i32,
    pub user_id: Uuid,
    #[schema(example = "01-2024")]
    pub start_date: String, // MM-YYYY
    #[schema(example = "12-2024")]
    pub end_date: Option<String>,
}

/// Partial update body. `endDate: ""` clears the end date; a missing field is left alone.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSubscriptionRequest {
    #[schema(example = "Netflix Premium")]
    pub service_name: Option<String>,
    #[schema(example = 20)]
    pub price: Option<i32>,
    #[schema(example = "02-2024")]
    pub start_date: Option<String>,
    #[schema(example = "")]
    pub end_date: Option<String>,
}

/// Parsed form of [`UpdateSubscriptionRequest`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionChanges {
    pub service_name: Option<String>,
    pub price: Option<i32>,
    pub start_date: Option<NaiveDate>,
    /// `Some(None)` clears the end date.
    pub end_date: Option<Option<NaiveDate>>,
}

impl SubscriptionChanges {
    pub fn is_empty(&self) -> bool {
        self.service_name.is_none()
            && self.price.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
    }
}

impl TryFrom<UpdateSubscriptionRequest> for SubscriptionChanges {
    type Error = AppError;

    fn try_from(req: UpdateSubscriptionRequest) -> AppResult<Self> {
        if let Some(name) = &req.service_name {
            validate_service_name(name)?;
        }
        if let Some(price) = req.price {
            validate_price(price)?;
        }

        let start_date = req
            .start_date
            .as_deref()
            .map(|s| parse_month_year_field("start date", s))
            .transpose()?;

        let end_date = match req.end_date.as_deref() {
            None => None,
            Some("") => Some(None),
            Some(s) => Some(Some(parse_month_year_field("end date", s)?)),
        };

        Ok(Self {
            service_name: req.service_name,
            price: req.price,
            start_date,
            end_date,
        })
    }
}

/// Width of the `service_name` column, in characters.
pub const MAX_SERVICE_NAME_LEN: usize = 255;

pub fn validate_service_name(name: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::ValidationError(
            "service name must not be empty".to_string(),
        ));
    }
    if name.chars().count() > MAX_SERVICE_NAME_LEN {
        return Err(AppError::ValidationError(format!(
            "service name must be at most {MAX_SERVICE_NAME_LEN} characters"
        )));
    }
    Ok(())
}

pub fn validate_price(price: i32) -> AppResult<()> {
    if price <= 0 {
        return Err(AppError::ValidationError(
            "price must be a positive integer".to_string(),
        ));
    }
    Ok(())
}

/// Rejects intervals that end before they start.
pub fn validate_period(start_date: NaiveDate, end_date: Option<NaiveDate>) -> AppResult<()> {
    if let Some(end_date) = end_date
        && end_date < start_date
    {
        return Err(AppError::ValidationError(
            "end date must not be before start date".to_string(),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionFilter {
    pub user_id: Option<Uuid>,
    /// Case-insensitive substring of the service name.
    pub service_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TotalCostFilter {
    pub subscription: SubscriptionFilter,
    /// First month of the period.
    pub start_date: Option<NaiveDate>,
    /// Last month of the period, inclusive.
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SubscriptionQuery {
    pub user_id: Option<String>,
    pub service_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TotalCostQuery {
    pub user_id: Option<String>,
    pub service_name: Option<String>,
    pub start_date: Option<String>, // MM-YYYY
    pub end_date: Option<String>,   // MM-YYYY
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn parse_user_id(value: Option<String>) -> AppResult<Option<Uuid>> {
    non_empty(value)
        .map(|v| {
            Uuid::parse_str(&v).map_err(|_| AppError::ValidationError("invalid user id".to_string()))
        })
        .transpose()
}

impl TryFrom<SubscriptionQuery> for SubscriptionFilter {
    type Error = AppError;

    fn try_from(query: SubscriptionQuery) -> AppResult<Self> {
        Ok(Self {
            user_id: parse_user_id(query.user_id)?,
            service_name: non_empty(query.service_name),
        })
    }
}

impl TryFrom<TotalCostQuery> for TotalCostFilter {
    type Error = AppError;

    fn try_from(query: TotalCostQuery) -> AppResult<Self> {
        let start_date = non_empty(query.start_date)
            .map(|s| parse_month_year_field("start date", &s))
            .transpose()?;
        let end_date = non_empty(query.end_date)
            .map(|s| parse_month_year_field("end date", &s))
            .transpose()?;

        Ok(Self {
            subscription: SubscriptionFilter {
                user_id: parse_user_id(query.user_id)?,
                service_name: non_empty(query.service_name),
            },
            start_date,
            end_date,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TotalCostResponse {
    #[schema(example = 45)]
    pub total_cost: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month(year: i32, month: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, 1).unwrap()
    }

    #[test]
    fn test_changes_distinguish_clear_from_absent() {
        let absent = SubscriptionChanges::try_from(UpdateSubscriptionRequest {
            price: Some(10),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(absent.end_date, None);

        let cleared = SubscriptionChanges::try_from(UpdateSubscriptionRequest {
            end_date: Some(String::new()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(cleared.end_date, Some(None));
        assert!(!cleared.is_empty());

        let set = SubscriptionChanges::try_from(UpdateSubscriptionRequest {
            end_date: Some("06-2024".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(set.end_date, Some(Some(month(2024, 6))));
    }

    #[test]
    fn test_changes_from_json_body() {
        let req: UpdateSubscriptionRequest =
            serde_json::from_str(r#"{"serviceName":"Spotify","endDate":""}"#).unwrap();
        let changes = SubscriptionChanges::try_from(req).unwrap();
        assert_eq!(changes.service_name.as_deref(), Some("Spotify"));
        assert_eq!(changes.end_date, Some(None));
        assert_eq!(changes.price, None);
    }

    #[test]
    fn test_changes_reject_bad_input() {
        let bad_date = SubscriptionChanges::try_from(UpdateSubscriptionRequest {
            start_date: Some("2024-01".into()),
            ..Default::default()
        });
        assert!(matches!(bad_date, Err(AppError::ValidationError(_))));

        let bad_price = SubscriptionChanges::try_from(UpdateSubscriptionRequest {
            price: Some(0),
            ..Default::default()
        });
        assert!(matches!(bad_price, Err(AppError::ValidationError(_))));
    }

    #[test]
    fn test_service_name_length() {
        assert!(validate_service_name(&"ё".repeat(MAX_SERVICE_NAME_LEN)).is_ok());

        let too_long = validate_service_name(&"a".repeat(MAX_SERVICE_NAME_LEN + 1));
        assert!(matches!(too_long, Err(AppError::ValidationError(_))));

        let via_update = SubscriptionChanges::try_from(UpdateSubscriptionRequest {
            service_name: Some("x".repeat(300)),
            ..Default::default()
        });
        assert!(matches!(via_update, Err(AppError::ValidationError(_))));
    }

    #[test]
    fn test_empty_changes() {
        let changes = SubscriptionChanges::try_from(UpdateSubscriptionRequest::default()).unwrap();
        assert!(changes.is_empty());
    }

    #[test]
    fn test_validate_period() {
        assert!(validate_period(month(2024, 3), None).is_ok());
        assert!(validate_period(month(2024, 3), Some(month(2024, 3))).is_ok());
        assert!(validate_period(month(2024, 3), Some(month(2024, 2))).is_err());
    }

    #[test]
    fn test_total_cost_query_parsing() {
        let filter = TotalCostFilter::try_from(TotalCostQuery {
            user_id: Some(String::new()),
            service_name: Some("net".into()),
            start_date: Some("03-2024".into()),
            end_date: Some("05-2024".into()),
        })
        .unwrap();
        assert_eq!(filter.subscription.user_id, None);
        assert_eq!(filter.subscription.service_name.as_deref(), Some("net"));
        assert_eq!(filter.start_date, Some(month(2024, 3)));
        assert_eq!(filter.end_date, Some(month(2024, 5)));

        let bad_user = TotalCostFilter::try_from(TotalCostQuery {
            user_id: Some("not-a-uuid".into()),
            ..Default::default()
        });
        assert!(matches!(bad_user, Err(AppError::ValidationError(msg)) if msg == "invalid user id"));
    }

    #[test]
    fn test_subscription_serializes_month_year() {
        let now = Utc::now();
        let sub = Subscription {
            id: Uuid::new_v4(),
            service_name: "Netflix".into(),
            price: 15,
            user_id: Uuid::new_v4(),
            start_date: month(2024, 1),
            end_date: None,
            created_at: now,
            updated_at: now,
        };
        let value = serde_json::to_value(&sub).unwrap();
        assert_eq!(value["serviceName"], "Netflix");
        assert_eq!(value["startDate"], "01-2024");
        assert!(value["endDate"].is_null());
    }
}
