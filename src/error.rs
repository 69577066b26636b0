//! Application error types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::routes::ErrorResponse;
use crate::store::StoreError;

/// Errors surfaced by the services and returned by handlers.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    DuplicateSlug(String),

    #[error("{0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("storage error")]
    Storage(#[source] StoreError),

    /// Failures outside storage (hashing, token signing, task joins).
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// `"<what> not found"`.
    pub fn not_found(what: &str) -> Self {
        AppError::NotFound(format!("{} not found", what))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    /// Translate a storage error, using `duplicate` as the user-facing
    /// message when a unique constraint rejected the write.
    pub fn from_store(err: StoreError, duplicate: &str) -> Self {
        match err {
            StoreError::UniqueViolation(constraint) => {
                tracing::debug!(constraint = %constraint, "unique constraint rejected write");
                AppError::DuplicateSlug(duplicate.to_string())
            }
            StoreError::ForeignKeyViolation(_) => AppError::not_found("Content type"),
            other => AppError::Storage(other),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DuplicateSlug(_) => StatusCode::BAD_REQUEST,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Storage(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::from_store(err, "Slug already exists")
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Storage failures are logged in full but never leak to the client.
        let error = match &self {
            AppError::Storage(e) => {
                tracing::error!(error = %e, "storage error");
                "Internal server error".to_string()
            }
            AppError::Internal(detail) => {
                tracing::error!(error = %detail, "internal error");
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        };

        (
            status,
            Json(ErrorResponse {
                error,
                message: None,
            }),
        )
            .into_response()
    }
}

/// Result type alias using AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_violation_becomes_duplicate_slug() {
        let err = AppError::from_store(
            StoreError::UniqueViolation("content_items_slug_key".to_string()),
            "Content item with this slug already exists",
        );
        assert!(matches!(err, AppError::DuplicateSlug(_)));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Content item with this slug already exists");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::not_found("Content item").status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(AppError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::validation("Title is required").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Storage(StoreError::Corrupt("bad schema".to_string())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_storage_error_body_is_generic() {
        let res = AppError::Storage(StoreError::Corrupt("secret detail".to_string()))
            .into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Internal server error");
        assert!(!String::from_utf8_lossy(&bytes).contains("secret detail"));
    }
}
