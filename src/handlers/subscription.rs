use crate::error::AppError;
use crate::models::*;
use crate::services::SubscriptionService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use uuid::Uuid;

fn parse_subscription_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::ValidationError("invalid subscription id".to_string()))
}

#[utoipa::path(
    post,
    path = "/subscriptions",
    tag = "subscriptions",
    request_body = CreateSubscriptionRequest,
    responses(
        (status = 201, description = "Subscription created", body = Subscription),
        (status = 400, description = "Invalid body or date", body = ErrorResponse),
        (status = 500, description = "Storage error", body = ErrorResponse)
    )
)]
pub async fn create_subscription(
    service: web::Data<SubscriptionService>,
    request: web::Json<CreateSubscriptionRequest>,
) -> Result<HttpResponse> {
    match service.create_subscription(request.into_inner()).await {
        Ok(subscription) => Ok(HttpResponse::Created().json(subscription)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/subscriptions/{id}",
    tag = "subscriptions",
    params(
        ("id" = Uuid, Path, description = "Subscription ID")
    ),
    responses(
        (status = 200, description = "Subscription found", body = Subscription),
        (status = 400, description = "Invalid subscription id", body = ErrorResponse),
        (status = 404, description = "Subscription not found", body = ErrorResponse),
        (status = 500, description = "Storage error", body = ErrorResponse)
    )
)]
pub async fn get_subscription(
    service: web::Data<SubscriptionService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let id = match parse_subscription_id(&path) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match service.get_subscription(id).await {
        Ok(subscription) => Ok(HttpResponse::Ok().json(subscription)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/subscriptions/{id}",
    tag = "subscriptions",
    params(
        ("id" = Uuid, Path, description = "Subscription ID")
    ),
    request_body = UpdateSubscriptionRequest,
    responses(
        (status = 200, description = "Subscription updated", body = MessageResponse),
        (status = 400, description = "Invalid id, body or date", body = ErrorResponse),
        (status = 404, description = "Subscription not found", body = ErrorResponse),
        (status = 500, description = "Storage error", body = ErrorResponse)
    )
)]
pub async fn update_subscription(
    service: web::Data<SubscriptionService>,
    path: web::Path<String>,
    request: web::Json<UpdateSubscriptionRequest>,
) -> Result<HttpResponse> {
    let id = match parse_subscription_id(&path) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match service.update_subscription(id, request.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(MessageResponse::new(
            "subscription updated successfully",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/subscriptions/{id}",
    tag = "subscriptions",
    params(
        ("id" = Uuid, Path, description = "Subscription ID")
    ),
    responses(
        (status = 200, description = "Subscription deleted", body = MessageResponse),
        (status = 400, description = "Invalid subscription id", body = ErrorResponse),
        (status = 404, description = "Subscription not found", body = ErrorResponse),
        (status = 500, description = "Storage error", body = ErrorResponse)
    )
)]
pub async fn delete_subscription(
    service: web::Data<SubscriptionService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let id = match parse_subscription_id(&path) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match service.delete_subscription(id).await {
        Ok(()) => Ok(HttpResponse::Ok().json(MessageResponse::new(
            "subscription deleted successfully",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/subscriptions",
    tag = "subscriptions",
    params(
        ("user_id" = Option<Uuid>, Query, description = "Owner user ID"),
        ("service_name" = Option<String>, Query, description = "Case-insensitive service name fragment")
    ),
    responses(
        (status = 200, description = "Matching subscriptions, newest first", body = [Subscription]),
        (status = 400, description = "Invalid user id", body = ErrorResponse),
        (status = 500, description = "Storage error", body = ErrorResponse)
    )
)]
pub async fn list_subscriptions(
    service: web::Data<SubscriptionService>,
    query: web::Query<SubscriptionQuery>,
) -> Result<HttpResponse> {
    let filter = match SubscriptionFilter::try_from(query.into_inner()) {
        Ok(filter) => filter,
        Err(e) => return Ok(e.error_response()),
    };

    match service.list_subscriptions(&filter).await {
        Ok(subscriptions) => Ok(HttpResponse::Ok().json(subscriptions)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/subscriptions/total-cost",
    tag = "subscriptions",
    params(
        ("user_id" = Option<Uuid>, Query, description = "Owner user ID"),
        ("service_name" = Option<String>, Query, description = "Case-insensitive service name fragment"),
        ("start_date" = Option<String>, Query, description = "First month of the period (MM-YYYY)"),
        ("end_date" = Option<String>, Query, description = "Last month of the period (MM-YYYY)")
    ),
    responses(
        (status = 200, description = "Total cost of matching subscriptions", body = TotalCostResponse),
        (status = 400, description = "Invalid user id or date", body = ErrorResponse),
        (status = 500, description = "Storage error", body = ErrorResponse)
    )
)]
pub async fn get_total_cost(
    service: web::Data<SubscriptionService>,
    query: web::Query<TotalCostQuery>,
) -> Result<HttpResponse> {
    let filter = match TotalCostFilter::try_from(query.into_inner()) {
        Ok(filter) => filter,
        Err(e) => return Ok(e.error_response()),
    };

    match service.get_total_cost(&filter).await {
        Ok(total_cost) => Ok(HttpResponse::Ok().json(TotalCostResponse { total_cost })),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn subscription_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/subscriptions")
            .route("", web::post().to(create_subscription))
            .route("", web::get().to(list_subscriptions))
            .route("/total-cost", web::get().to(get_total_cost))
            .route("/{id}", web::get().to(get_subscription))
            .route("/{id}", web::put().to(update_subscription))
            .route("/{id}", web::delete().to(delete_subscription)),
    );
}
