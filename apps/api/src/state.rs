use std::sync::Arc;

use crate::classify::StoryClassifier;
use crate::config::JiraDefaults;
use crate::jira::IssueTracker;
use crate::llm_client::TextGenerator;

/// Shared application state injected into all route handlers via Axum extractors.
/// Every collaborator is read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub well_formed: Arc<dyn StoryClassifier>,
    pub ambiguity: Arc<dyn StoryClassifier>,
    pub llm: Arc<dyn TextGenerator>,
    pub jira: Arc<dyn IssueTracker>,
    /// Fallbacks for `/api/user-stories` query parameters.
    pub jira_defaults: JiraDefaults,
}
