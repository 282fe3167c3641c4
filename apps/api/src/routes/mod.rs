pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::classify::handlers as classify;
use crate::jira::handlers as jira;
use crate::state::AppState;
use crate::suggestions::handlers as suggestions;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Classification
        .route("/predict", post(classify::handle_predict_all))
        .route(
            "/predict/well-formed",
            post(classify::handle_predict_well_formed),
        )
        .route(
            "/predict/ambiguity",
            post(classify::handle_predict_ambiguity),
        )
        // Suggestions
        .route("/suggestions", post(suggestions::handle_suggestions))
        .route(
            "/api/improve-user-story",
            post(suggestions::handle_improve_user_story),
        )
        // Jira
        .route("/api/user-stories", get(jira::handle_get_user_stories))
        .route(
            "/verify-credentials",
            post(jira::handle_verify_credentials),
        )
        .with_state(state)
}
