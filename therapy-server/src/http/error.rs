//! API error types with IntoResponse
//!
//! Errors are converted to JSON responses with appropriate status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::db::DbError;
use crate::models::ValidationError;

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Validation failed outside a form (400)
    Validation(ValidationError),

    /// Resource not found (404)
    NotFound { resource: &'static str, id: String },

    /// Database error (500, logged)
    Database(DbError),
}

impl ApiError {
    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::Validation(e) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "validation_error",
                    "message": e.to_string()
                }),
            ),
            Self::NotFound { resource, id } => (
                StatusCode::NOT_FOUND,
                json!({
                    "error": "not_found",
                    "message": format!("{} '{}' not found", resource, id)
                }),
            ),
            Self::Database(e) => {
                tracing::error!(error = %e, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "internal_error",
                        "message": "an internal error occurred"
                    }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound { resource, id } => Self::NotFound { resource, id },
            _ => Self::Database(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn validation_error_is_400() {
        let err = ApiError::from(ValidationError::Empty { field: "short_name" });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_stub_is_404_with_message() {
        let response = ApiError::from(DbError::not_found("stub", 42)).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "not_found");
        assert_eq!(json["message"], "stub '42' not found");
    }

    #[tokio::test]
    async fn database_error_hides_cause() {
        let response = ApiError::from(DbError::Sqlx(sqlx::Error::PoolTimedOut)).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "internal_error");
        assert_eq!(json["message"], "an internal error occurred");
    }
}
