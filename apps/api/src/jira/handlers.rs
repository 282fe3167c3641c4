use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::errors::AppError;
use crate::jira::{JiraCredentials, UserStory};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct UserStoriesQuery {
    pub jira_url: Option<String>,
    pub jira_project_key: Option<String>,
    pub username: Option<String>,
    pub api_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyCredentialsRequest {
    pub email: Option<String>,
    pub api_token: Option<String>,
    pub jira_domain: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VerifyCredentialsResponse {
    pub success: bool,
}

/// Blank values count as missing; a missing value falls back to the configured default.
fn pick(value: Option<String>, fallback: &Option<String>) -> Option<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .or_else(|| fallback.clone())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// GET /api/user-stories
///
/// Returns every story in the project as a bare JSON array. Partial Jira failures yield
/// the stories fetched before the failure.
pub async fn handle_get_user_stories(
    State(state): State<AppState>,
    query: Result<Query<UserStoriesQuery>, QueryRejection>,
) -> Result<Json<Vec<UserStory>>, AppError> {
    let Query(query) = query?;
    let defaults = &state.jira_defaults;
    let (Some(jira_url), Some(project_key), Some(username), Some(api_token)) = (
        pick(query.jira_url, &defaults.base_url),
        pick(query.jira_project_key, &defaults.project_key),
        pick(query.username, &defaults.email),
        pick(query.api_token, &defaults.api_token),
    ) else {
        return Err(AppError::Validation(
            "Missing required parameters".to_string(),
        ));
    };

    let credentials = JiraCredentials::new(&jira_url, &username, &api_token);
    let stories = state
        .jira
        .fetch_user_stories(&credentials, project_key.trim())
        .await;
    Ok(Json(stories))
}

/// POST /verify-credentials
pub async fn handle_verify_credentials(
    State(state): State<AppState>,
    payload: Result<Json<VerifyCredentialsRequest>, JsonRejection>,
) -> Result<Json<VerifyCredentialsResponse>, AppError> {
    let Json(request) = payload?;

    let (Some(email), Some(api_token), Some(jira_domain)) = (
        non_blank(request.email),
        non_blank(request.api_token),
        non_blank(request.jira_domain),
    ) else {
        return Err(AppError::Validation(
            "Missing required credentials.".to_string(),
        ));
    };

    let credentials = JiraCredentials::new(&jira_domain, &email, &api_token);
    match state.jira.verify_credentials(&credentials).await {
        Ok(true) => Ok(Json(VerifyCredentialsResponse { success: true })),
        Ok(false) => Err(AppError::InvalidCredentials),
        Err(e) => {
            error!("Error verifying credentials: {e}");
            Err(AppError::Upstream("Verification failed.".to_string()))
        }
    }
}
