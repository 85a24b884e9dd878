use actix_web::web;

use crate::error::AppError;

pub mod subscription;

pub use subscription::subscription_config;

/// Routes JSON body errors through `AppError` so they answer `{"error": ...}` with 400.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into())
}

/// Same treatment for query strings that fail to deserialize.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into())
}
