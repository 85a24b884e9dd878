use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::models::ErrorResponse;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Config error: {0}")]
    ConfigError(#[from] config::ConfigError),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DatabaseError(_) | AppError::ConfigError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::ValidationError(msg) => {
                log::warn!("Validation error: {msg}");
                msg.clone()
            }
            AppError::NotFound(msg) => msg.clone(),
            AppError::DatabaseError(err) => {
                log::error!("Database error: {err}");
                "database error".to_string()
            }
            AppError::ConfigError(err) => {
                log::error!("Config error: {err}");
                "internal server error".to_string()
            }
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse { error: message })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::ValidationError("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::NotFound("gone".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::DatabaseError(sea_orm::DbErr::Custom("boom".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[actix_web::test]
    async fn test_database_error_hides_details() {
        let resp = AppError::DatabaseError(sea_orm::DbErr::Custom("password=secret".into()))
            .error_response();
        let body = to_bytes(resp.into_body()).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["error"], "database error");
    }

    #[actix_web::test]
    async fn test_validation_error_body() {
        let resp = AppError::ValidationError("invalid subscription id".into()).error_response();
        let body = to_bytes(resp.into_body()).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value, serde_json::json!({ "error": "invalid subscription id" }));
    }
}
