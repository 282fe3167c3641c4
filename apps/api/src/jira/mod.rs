// Jira proxy: pulls a project's user stories for batch analysis and checks credentials.
// Callers supply the Jira site and credentials per request; nothing is stored.

pub mod adf;
pub mod client;
pub mod handlers;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use client::JiraClient;

#[derive(Debug, Error)]
pub enum JiraError {
    #[error("failed to call Jira: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Jira responded with {status}: {body}")]
    Status { status: u16, body: String },
}

/// Basic-auth credentials for one Jira site.
#[derive(Debug, Clone, PartialEq)]
pub struct JiraCredentials {
    pub base_url: String,
    pub email: String,
    pub api_token: String,
}

impl JiraCredentials {
    pub fn new(base_url: &str, email: &str, api_token: &str) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            email: email.to_string(),
            api_token: api_token.to_string(),
        }
    }
}

/// A Jira story flattened to the shape the analysis frontend consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserStory {
    pub key: String,
    pub summary: String,
    pub description: String,
    pub status: String,
}

/// The Jira operations the service depends on. Carried in `AppState` as `Arc<dyn IssueTracker>`.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Pages through every story in `project_key`. A failing page ends the walk early and
    /// the stories gathered so far are returned.
    async fn fetch_user_stories(
        &self,
        credentials: &JiraCredentials,
        project_key: &str,
    ) -> Vec<UserStory>;

    /// `Ok(true)` when Jira accepts the credentials, `Ok(false)` when it answers with any
    /// other status, `Err` when Jira cannot be reached.
    async fn verify_credentials(&self, credentials: &JiraCredentials) -> Result<bool, JiraError>;
}

/// Trims trailing slashes and assumes https when the caller passed a bare domain.
fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}
