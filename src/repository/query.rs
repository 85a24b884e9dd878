//! Statement builders for the subscriptions table.
//!
//! Every optional filter or update field contributes one clause; values are
//! always bound as parameters. The builders are free of I/O so the rendered
//! SQL can be checked without a database.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::sea_query::{Expr, Func, Keyword, SimpleExpr};
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Select, UpdateMany,
};
use uuid::Uuid;

use crate::entities::subscription_entity::{Column, Entity};
use crate::models::{SubscriptionChanges, SubscriptionFilter, TotalCostFilter};
use crate::utils::first_of_next_month;

pub const TOTAL_COST_ALIAS: &str = "total_cost";

/// Escapes LIKE wildcards so user input matches literally.
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

pub fn subscription_condition(filter: &SubscriptionFilter) -> Condition {
    let mut condition = Condition::all();

    if let Some(user_id) = filter.user_id {
        condition = condition.add(Column::UserId.eq(user_id));
    }

    if let Some(name) = &filter.service_name {
        let pattern = format!("%{}%", escape_like(&name.to_lowercase()));
        condition = condition
            .add(Expr::expr(Func::lower(Expr::col((Entity, Column::ServiceName)))).like(pattern));
    }

    condition
}

/// Subscriptions active at some point between `start` and the end of the `end` month.
/// A missing end date means the subscription is still running.
pub fn period_condition(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Condition {
    let mut condition = Condition::all();

    if let Some(start) = start {
        condition = condition.add(
            Condition::any()
                .add(Column::EndDate.is_null())
                .add(Column::EndDate.gte(start)),
        );
    }

    if let Some(end) = end {
        condition = condition.add(Column::StartDate.lt(first_of_next_month(end)));
    }

    condition
}

/// Column assignments for a partial update; `updated_at` is always last.
pub fn update_assignments(
    changes: &SubscriptionChanges,
    updated_at: DateTime<Utc>,
) -> Vec<(Column, SimpleExpr)> {
    let mut assignments = Vec::new();

    if let Some(name) = &changes.service_name {
        assignments.push((Column::ServiceName, Expr::value(name.clone())));
    }
    if let Some(price) = changes.price {
        assignments.push((Column::Price, Expr::value(price)));
    }
    if let Some(start_date) = changes.start_date {
        assignments.push((Column::StartDate, Expr::value(start_date)));
    }
    match changes.end_date {
        Some(Some(end_date)) => assignments.push((Column::EndDate, Expr::value(end_date))),
        Some(None) => assignments.push((Column::EndDate, SimpleExpr::Keyword(Keyword::Null))),
        None => {}
    }

    assignments.push((Column::UpdatedAt, Expr::value(updated_at)));
    assignments
}

pub fn update_query(
    id: Uuid,
    changes: &SubscriptionChanges,
    updated_at: DateTime<Utc>,
) -> UpdateMany<Entity> {
    update_assignments(changes, updated_at)
        .into_iter()
        .fold(Entity::update_many(), |query, (column, value)| {
            query.col_expr(column, value)
        })
        .filter(Column::Id.eq(id))
}

pub fn list_query(filter: &SubscriptionFilter) -> Select<Entity> {
    Entity::find()
        .filter(subscription_condition(filter))
        .order_by_desc(Column::CreatedAt)
}

pub fn total_cost_query(filter: &TotalCostFilter) -> Select<Entity> {
    let total = SimpleExpr::from(Func::coalesce([
        Expr::col((Entity, Column::Price)).sum(),
        Expr::val(0i64).into(),
    ]));

    Entity::find()
        .select_only()
        .column_as(total, TOTAL_COST_ALIAS)
        .filter(subscription_condition(&filter.subscription))
        .filter(period_condition(filter.start_date, filter.end_date))
}
