use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::classify::InferenceError;
use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
/// Every variant renders as `{"error": "<message>"}`; internal detail is logged, never returned.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Inference error: {0}")]
    Inference(#[from] InferenceError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// An upstream call failed; the payload is the message shown to the client.
    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::InvalidCredentials => {
                let body = Json(json!({
                    "success": false,
                    "error": "Invalid credentials."
                }));
                return (StatusCode::UNAUTHORIZED, body).into_response();
            }
            AppError::Inference(e) => {
                tracing::error!("Error during prediction: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Prediction failed.".to_string(),
                )
            }
            AppError::Llm(e) => {
                tracing::error!("Error generating suggestions: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to generate suggestions.".to_string(),
                )
            }
            AppError::Upstream(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Returns the trimmed user story, or the 400 every story endpoint answers with when it is absent.
pub fn require_user_story(user_story: Option<String>) -> Result<String, AppError> {
    match user_story.map(|s| s.trim().to_string()) {
        Some(story) if !story.is_empty() => Ok(story),
        _ => Err(AppError::Validation("User story is required.".to_string())),
    }
}
