use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::ACCEPT, Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use super::adf;
use super::{IssueTracker, JiraCredentials, JiraError, UserStory};

/// Jira caps search pages at 100 issues.
pub const PAGE_SIZE: u32 = 100;
const SEARCH_FIELDS: &str = "summary,description,status";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    issues: Vec<Issue>,
    /// Absent on some deployments; paging then runs until a short or empty page.
    #[serde(default)]
    total: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct Issue {
    key: String,
    #[serde(default)]
    fields: IssueFields,
}

#[derive(Debug, Default, Deserialize)]
struct IssueFields {
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    description: Value,
    #[serde(default)]
    status: Option<IssueStatus>,
}

#[derive(Debug, Deserialize)]
struct IssueStatus {
    name: String,
}

impl From<Issue> for UserStory {
    fn from(issue: Issue) -> Self {
        UserStory {
            key: issue.key,
            summary: issue.fields.summary.unwrap_or_default(),
            description: adf::to_plain_text(&issue.fields.description),
            status: issue
                .fields
                .status
                .map(|s| s.name)
                .unwrap_or_default(),
        }
    }
}

/// reqwest-backed Jira REST v3 client. The site is chosen per call from the credentials.
#[derive(Clone)]
pub struct JiraClient {
    http: Client,
}

impl JiraClient {
    pub fn new() -> Result<Self, JiraError> {
        Ok(Self {
            http: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
        })
    }

    fn story_jql(project_key: &str) -> String {
        format!("project = {project_key} AND issuetype = Story ORDER BY created DESC")
    }

    async fn fetch_page(
        &self,
        credentials: &JiraCredentials,
        jql: &str,
        start_at: u32,
    ) -> Result<SearchPage, JiraError> {
        let start_at = start_at.to_string();
        let max_results = PAGE_SIZE.to_string();
        let response = self
            .http
            .get(format!("{}/rest/api/3/search", credentials.base_url))
            .basic_auth(&credentials.email, Some(&credentials.api_token))
            .header(ACCEPT, "application/json")
            .query(&[
                ("jql", jql),
                ("fields", SEARCH_FIELDS),
                ("maxResults", max_results.as_str()),
                ("startAt", start_at.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response>".to_string());
            return Err(JiraError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl IssueTracker for JiraClient {
    async fn fetch_user_stories(
        &self,
        credentials: &JiraCredentials,
        project_key: &str,
    ) -> Vec<UserStory> {
        let jql = Self::story_jql(project_key);
        let mut stories = Vec::new();
        let mut start_at: u32 = 0;
        let mut previous_first_key: Option<String> = None;

        loop {
            let page = match self.fetch_page(credentials, &jql, start_at).await {
                Ok(page) => page,
                Err(e) => {
                    error!("An error occurred while fetching stories: {e}");
                    break;
                }
            };

            let fetched = page.issues.len() as u32;
            if fetched == 0 {
                break;
            }
            // A server that ignores startAt serves the same page forever.
            let first_key = page.issues.first().map(|issue| issue.key.clone());
            if first_key.is_some() && first_key == previous_first_key {
                warn!("Jira repeated the page before offset {start_at}; stopping pagination");
                break;
            }
            previous_first_key = first_key;
            debug!("Fetched {fetched} issues from {project_key} at offset {start_at}");

            stories.extend(page.issues.into_iter().map(UserStory::from));
            start_at += fetched;

            let exhausted = match page.total {
                Some(total) => start_at >= total,
                None => fetched < PAGE_SIZE,
            };
            if exhausted {
                break;
            }
        }

        info!("Fetched {} user stories from {}", stories.len(), project_key);
        stories
    }

    async fn verify_credentials(&self, credentials: &JiraCredentials) -> Result<bool, JiraError> {
        let response = self
            .http
            .get(format!("{}/rest/api/3/myself", credentials.base_url))
            .basic_auth(&credentials.email, Some(&credentials.api_token))
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        debug!("Jira credential check answered {status}");
        Ok(status == StatusCode::OK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{basic_auth, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn issue(key: &str) -> Value {
        json!({
            "key": key,
            "fields": {
                "summary": format!("Story {key}"),
                "description": {
                    "type": "doc",
                    "version": 1,
                    "content": [{"type": "paragraph", "content": [
                        {"type": "text", "text": "As a user, I want things."}
                    ]}]
                },
                "status": {"name": "To Do"}
            }
        })
    }

    fn page(keys: &[&str], total: u32) -> ResponseTemplate {
        let issues: Vec<Value> = keys.iter().map(|k| issue(k)).collect();
        ResponseTemplate::new(200).set_body_json(json!({
            "startAt": 0,
            "maxResults": 100,
            "total": total,
            "issues": issues
        }))
    }

    fn credentials(server: &MockServer) -> JiraCredentials {
        JiraCredentials::new(&server.uri(), "dev@acme.test", "token-123")
    }

    #[tokio::test]
    async fn test_fetch_flattens_issues() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/api/3/search"))
            .and(basic_auth("dev@acme.test", "token-123"))
            .and(query_param(
                "jql",
                "project = SHOP AND issuetype = Story ORDER BY created DESC",
            ))
            .and(query_param("fields", "summary,description,status"))
            .and(query_param("maxResults", "100"))
            .and(query_param("startAt", "0"))
            .respond_with(page(&["SHOP-1"], 1))
            .expect(1)
            .mount(&server)
            .await;

        let client = JiraClient::new().unwrap();
        let stories = client.fetch_user_stories(&credentials(&server), "SHOP").await;
        assert_eq!(
            stories,
            vec![UserStory {
                key: "SHOP-1".to_string(),
                summary: "Story SHOP-1".to_string(),
                description: "As a user, I want things.".to_string(),
                status: "To Do".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_fetch_pages_until_total_reached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("startAt", "0"))
            .respond_with(page(&["SHOP-1", "SHOP-2"], 3))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("startAt", "2"))
            .respond_with(page(&["SHOP-3"], 3))
            .expect(1)
            .mount(&server)
            .await;

        let client = JiraClient::new().unwrap();
        let stories = client.fetch_user_stories(&credentials(&server), "SHOP").await;
        let keys: Vec<&str> = stories.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec!["SHOP-1", "SHOP-2", "SHOP-3"]);
    }

    #[tokio::test]
    async fn test_fetch_zero_issues_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(page(&[], 0))
            .expect(1)
            .mount(&server)
            .await;

        let client = JiraClient::new().unwrap();
        assert!(client
            .fetch_user_stories(&credentials(&server), "SHOP")
            .await
            .is_empty());
    }

    #[tokio::test]
    async fn test_fetch_stops_at_empty_page_even_if_total_is_larger() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("startAt", "0"))
            .respond_with(page(&["SHOP-1"], 50))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("startAt", "1"))
            .respond_with(page(&[], 50))
            .expect(1)
            .mount(&server)
            .await;

        let client = JiraClient::new().unwrap();
        let stories = client.fetch_user_stories(&credentials(&server), "SHOP").await;
        assert_eq!(stories.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_returns_partial_results_after_failed_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("startAt", "0"))
            .respond_with(page(&["SHOP-1", "SHOP-2"], 10))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("startAt", "2"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(1)
            .mount(&server)
            .await;

        let client = JiraClient::new().unwrap();
        let stories = client.fetch_user_stories(&credentials(&server), "SHOP").await;
        assert_eq!(stories.len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_without_total_stops_on_short_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "issues": [issue("SHOP-9")]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = JiraClient::new().unwrap();
        let stories = client.fetch_user_stories(&credentials(&server), "SHOP").await;
        assert_eq!(stories.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_stops_when_server_repeats_full_page() {
        let server = MockServer::start().await;
        let issues: Vec<Value> = (1..=PAGE_SIZE).map(|n| issue(&format!("SHOP-{n}"))).collect();
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "issues": issues })))
            .expect(2)
            .mount(&server)
            .await;

        let client = JiraClient::new().unwrap();
        let stories = client.fetch_user_stories(&credentials(&server), "SHOP").await;
        assert_eq!(stories.len(), PAGE_SIZE as usize);
    }

    #[tokio::test]
    async fn test_missing_fields_default_to_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total": 1,
                "issues": [{"key": "SHOP-5", "fields": {"summary": "Bare", "description": null}}]
            })))
            .mount(&server)
            .await;

        let client = JiraClient::new().unwrap();
        let stories = client.fetch_user_stories(&credentials(&server), "SHOP").await;
        assert_eq!(stories[0].description, "");
        assert_eq!(stories[0].status, "");
    }

    #[tokio::test]
    async fn test_verify_credentials_accepts_200() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/api/3/myself"))
            .and(basic_auth("dev@acme.test", "token-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accountId": "abc"})))
            .mount(&server)
            .await;

        let client = JiraClient::new().unwrap();
        assert!(client.verify_credentials(&credentials(&server)).await.unwrap());
    }

    #[tokio::test]
    async fn test_verify_credentials_rejects_401() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/api/3/myself"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = JiraClient::new().unwrap();
        assert!(!client.verify_credentials(&credentials(&server)).await.unwrap());
    }

    #[tokio::test]
    async fn test_verify_credentials_unreachable_is_error() {
        let client = JiraClient::new().unwrap();
        let credentials = JiraCredentials::new("http://127.0.0.1:1", "a@b.c", "t");
        assert!(client.verify_credentials(&credentials).await.is_err());
    }
}
