/**
 * Routes Module
 * API route handlers
 */
use axum::{
    extract::{FromRequest, Request},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::AppError;

pub mod auth;
pub mod content_items;
pub mod content_types;
pub mod health;
pub mod public;
pub mod settings;
pub mod social;

/// Error body shared by every handler.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Body of successful deletes and logouts.
#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// JSON body extractor whose rejections use the shared error body.
///
/// Malformed JSON, a wrong content type or a field of the wrong shape all
/// answer 400 with `{"error": ...}` instead of axum's plain-text reply.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => {
                let detail = rejection.body_text();
                tracing::debug!(error = %detail, "rejected request body");
                Err(AppError::validation(format!("Invalid request body: {}", detail)))
            }
        }
    }
}
