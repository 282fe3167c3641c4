/// LLM Client — the single point of entry for all text-generation calls.
///
/// ARCHITECTURAL RULE: No other module may call an inference endpoint directly.
/// Suggestion code depends on the `TextGenerator` trait; the backend is picked from config.
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

use crate::config::LlmProvider;

pub mod huggingface;
pub mod ollama;

pub use huggingface::HuggingFaceClient;
pub use ollama::OllamaClient;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Opaque text completion: prompt and token budget in, raw completions out.
/// Output is never parsed or validated by callers.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, max_new_tokens: u32) -> Result<Vec<String>, LlmError>;

    /// Model identifier, for logging.
    fn model(&self) -> &str;
}

/// Builds the configured backend.
pub fn from_provider(provider: &LlmProvider) -> Result<Arc<dyn TextGenerator>, LlmError> {
    let generator: Arc<dyn TextGenerator> = match provider {
        LlmProvider::HuggingFace {
            api_key,
            api_url,
            model,
        } => Arc::new(HuggingFaceClient::new(
            api_url.clone(),
            model.clone(),
            api_key.clone(),
        )?),
        LlmProvider::Ollama { base_url, model } => {
            Arc::new(OllamaClient::new(base_url.clone(), model.clone())?)
        }
    };
    Ok(generator)
}

fn http_client() -> Result<Client, LlmError> {
    Ok(Client::builder().timeout(REQUEST_TIMEOUT).build()?)
}

/// Turns a non-2xx response into `LlmError::Api`, preferring the provider's `error` field.
async fn api_error(response: reqwest::Response) -> LlmError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or(body);
    LlmError::Api { status, message }
}
