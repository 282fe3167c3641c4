//! Axum route handlers for the prediction endpoints.

use std::sync::Arc;

use anyhow::anyhow;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::classify::{Prediction, StoryClassifier};
use crate::errors::{require_user_story, AppError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub user_story: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WellFormedResponse {
    pub well_formed_prediction: u8,
    pub outcome_text: String,
}

#[derive(Debug, Serialize)]
pub struct AmbiguityResponse {
    pub ambiguity_prediction: u8,
    pub outcome_text: String,
}

#[derive(Debug, Serialize)]
pub struct CombinedResponse {
    pub well_formed_prediction: u8,
    pub well_formed_outcome: String,
    pub ambiguity_prediction: u8,
    pub ambiguity_outcome: String,
}

/// Runs a classifier on the blocking pool; encoder inference is CPU-bound.
pub async fn run_classifier(
    classifier: Arc<dyn StoryClassifier>,
    user_story: String,
) -> Result<Prediction, AppError> {
    let criterion = classifier.criterion();
    let prediction = tokio::task::spawn_blocking(move || classifier.predict(&user_story))
        .await
        .map_err(|e| anyhow!("{criterion:?} classifier task failed: {e}"))??;
    Ok(prediction)
}

/// POST /predict/well-formed
pub async fn handle_predict_well_formed(
    State(state): State<AppState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<WellFormedResponse>, AppError> {
    let Json(request) = payload?;
    let user_story = require_user_story(request.user_story)?;

    let prediction = run_classifier(state.well_formed.clone(), user_story).await?;

    Ok(Json(WellFormedResponse {
        well_formed_prediction: prediction.label,
        outcome_text: prediction.outcome_text,
    }))
}

/// POST /predict/ambiguity
pub async fn handle_predict_ambiguity(
    State(state): State<AppState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<AmbiguityResponse>, AppError> {
    let Json(request) = payload?;
    let user_story = require_user_story(request.user_story)?;

    let prediction = run_classifier(state.ambiguity.clone(), user_story).await?;

    Ok(Json(AmbiguityResponse {
        ambiguity_prediction: prediction.label,
        outcome_text: prediction.outcome_text,
    }))
}

/// POST /predict
///
/// Both criteria in one round trip; the two classifiers run concurrently.
pub async fn handle_predict_all(
    State(state): State<AppState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<CombinedResponse>, AppError> {
    let Json(request) = payload?;
    let user_story = require_user_story(request.user_story)?;

    let (well_formed, ambiguity) = tokio::try_join!(
        run_classifier(state.well_formed.clone(), user_story.clone()),
        run_classifier(state.ambiguity.clone(), user_story),
    )?;

    Ok(Json(CombinedResponse {
        well_formed_prediction: well_formed.label,
        well_formed_outcome: well_formed.outcome_text,
        ambiguity_prediction: ambiguity.label,
        ambiguity_outcome: ambiguity.outcome_text,
    }))
}
