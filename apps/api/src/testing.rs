//! Fakes for the injected collaborators and helpers to drive the real router in tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_TYPE, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use crate::classify::{Criterion, InferenceError, Prediction, StoryClassifier};
use crate::config::JiraDefaults;
use crate::jira::{IssueTracker, JiraCredentials, JiraError, UserStory};
use crate::llm_client::{LlmError, TextGenerator};
use crate::routes::build_router;
use crate::state::AppState;

/// Answers every story with a fixed label, or fails when no label is set.
pub struct FakeClassifier {
    criterion: Criterion,
    label: Option<u8>,
}

impl StoryClassifier for FakeClassifier {
    fn criterion(&self) -> Criterion {
        self.criterion
    }

    fn predict(&self, _user_story: &str) -> Result<Prediction, InferenceError> {
        match self.label {
            Some(label) => Ok(Prediction::new(self.criterion, label)),
            None => Err(InferenceError::Runtime("fake encoder failure".to_string())),
        }
    }
}

/// Records every prompt and returns canned completions, or an API error when none are set.
#[derive(Default)]
pub struct FakeGenerator {
    reply: Option<Vec<String>>,
    calls: Mutex<Vec<(String, u32)>>,
}

impl FakeGenerator {
    pub fn calls(&self) -> Vec<(String, u32)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn generate(&self, prompt: &str, max_new_tokens: u32) -> Result<Vec<String>, LlmError> {
        self.calls
            .lock()
            .unwrap()
            .push((prompt.to_string(), max_new_tokens));
        self.reply.clone().ok_or(LlmError::Api {
            status: 503,
            message: "fake backend down".to_string(),
        })
    }

    fn model(&self) -> &str {
        "fake"
    }
}

/// Serves a fixed story list; `valid = None` simulates an unreachable Jira.
pub struct FakeTracker {
    stories: Vec<UserStory>,
    valid: Option<bool>,
    last: Mutex<Option<(String, String)>>,
}

impl FakeTracker {
    /// `(base_url, project_key)` of the last fetch.
    pub fn last_request(&self) -> Option<(String, String)> {
        self.last.lock().unwrap().clone()
    }
}

#[async_trait]
impl IssueTracker for FakeTracker {
    async fn fetch_user_stories(
        &self,
        credentials: &JiraCredentials,
        project_key: &str,
    ) -> Vec<UserStory> {
        *self.last.lock().unwrap() =
            Some((credentials.base_url.clone(), project_key.to_string()));
        self.stories.clone()
    }

    async fn verify_credentials(&self, _credentials: &JiraCredentials) -> Result<bool, JiraError> {
        self.valid.ok_or(JiraError::Status {
            status: 502,
            body: "unreachable".to_string(),
        })
    }
}

pub fn story(key: &str) -> UserStory {
    UserStory {
        key: key.to_string(),
        summary: format!("Summary of {key}"),
        description: "As a user, I want to log in.".to_string(),
        status: "To Do".to_string(),
    }
}

/// Builder over the fakes. Defaults: both criteria pass, the LLM answers one completion,
/// Jira has no stories and accepts any credentials.
pub struct TestApp {
    pub well_formed: Arc<FakeClassifier>,
    pub ambiguity: Arc<FakeClassifier>,
    pub llm: Arc<FakeGenerator>,
    pub tracker: Arc<FakeTracker>,
    pub jira_defaults: JiraDefaults,
}

impl TestApp {
    pub fn new() -> Self {
        Self {
            well_formed: Arc::new(FakeClassifier {
                criterion: Criterion::WellFormed,
                label: Some(1),
            }),
            ambiguity: Arc::new(FakeClassifier {
                criterion: Criterion::Ambiguity,
                label: Some(1),
            }),
            llm: Arc::new(FakeGenerator {
                reply: Some(vec!["Enhancing clarity: name the persona.".to_string()]),
                ..Default::default()
            }),
            tracker: Arc::new(FakeTracker {
                stories: Vec::new(),
                valid: Some(true),
                last: Mutex::new(None),
            }),
            jira_defaults: JiraDefaults::default(),
        }
    }

    /// `None` makes the classifier fail.
    pub fn with_labels(mut self, well_formed: Option<u8>, ambiguity: Option<u8>) -> Self {
        self.well_formed = Arc::new(FakeClassifier {
            criterion: Criterion::WellFormed,
            label: well_formed,
        });
        self.ambiguity = Arc::new(FakeClassifier {
            criterion: Criterion::Ambiguity,
            label: ambiguity,
        });
        self
    }

    /// `None` makes the LLM fail.
    pub fn with_llm_reply(mut self, reply: Option<Vec<&str>>) -> Self {
        self.llm = Arc::new(FakeGenerator {
            reply: reply.map(|texts| texts.into_iter().map(str::to_string).collect()),
            ..Default::default()
        });
        self
    }

    pub fn with_stories(mut self, stories: Vec<UserStory>) -> Self {
        self.tracker = Arc::new(FakeTracker {
            stories,
            valid: self.tracker.valid,
            last: Mutex::new(None),
        });
        self
    }

    pub fn with_valid_credentials(mut self, valid: bool) -> Self {
        self.tracker = Arc::new(FakeTracker {
            stories: self.tracker.stories.clone(),
            valid: Some(valid),
            last: Mutex::new(None),
        });
        self
    }

    pub fn with_unreachable_jira(mut self) -> Self {
        self.tracker = Arc::new(FakeTracker {
            stories: self.tracker.stories.clone(),
            valid: None,
            last: Mutex::new(None),
        });
        self
    }

    pub fn with_jira_defaults(mut self, defaults: JiraDefaults) -> Self {
        self.jira_defaults = defaults;
        self
    }

    pub fn router(&self) -> Router {
        build_router(AppState {
            well_formed: self.well_formed.clone(),
            ambiguity: self.ambiguity.clone(),
            llm: self.llm.clone(),
            jira: self.tracker.clone(),
            jira_defaults: self.jira_defaults.clone(),
        })
    }
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, body)
}

pub async fn get(router: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::get(uri).body(Body::empty()).unwrap();
    send(router, request).await
}

pub async fn post_json(router: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    post_raw(router, uri, &body.to_string()).await
}

pub async fn post_raw(router: Router, uri: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::post(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(router, request).await
}
