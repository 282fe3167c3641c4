//! Axum route handlers for suggestion generation.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::{require_user_story, AppError};
use crate::state::AppState;
use crate::suggestions::generator::{generate_suggestions, improve_user_story, violated_criteria};

#[derive(Debug, Deserialize)]
pub struct SuggestionsRequest {
    pub user_story: Option<String>,
    pub well_formed_prediction: Option<i64>,
    pub ambiguity_prediction: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ImproveRequest {
    pub user_story: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    pub suggestions: Vec<String>,
}

/// POST /suggestions
///
/// Suggestions for whichever criteria the caller's predictions mark as violated.
/// A story that passes both criteria gets an empty list.
pub async fn handle_suggestions(
    State(state): State<AppState>,
    payload: Result<Json<SuggestionsRequest>, JsonRejection>,
) -> Result<Json<SuggestionsResponse>, AppError> {
    let Json(request) = payload?;
    let user_story = require_user_story(request.user_story)?;

    let violations =
        violated_criteria(request.well_formed_prediction, request.ambiguity_prediction);
    let suggestions = generate_suggestions(state.llm.as_ref(), &user_story, &violations).await?;

    Ok(Json(SuggestionsResponse { suggestions }))
}

/// POST /api/improve-user-story
pub async fn handle_improve_user_story(
    State(state): State<AppState>,
    payload: Result<Json<ImproveRequest>, JsonRejection>,
) -> Result<Json<SuggestionsResponse>, AppError> {
    let Json(request) = payload?;
    let user_story = require_user_story(request.user_story)?;

    let suggestions = improve_user_story(state.llm.as_ref(), &user_story).await?;

    Ok(Json(SuggestionsResponse { suggestions }))
}
