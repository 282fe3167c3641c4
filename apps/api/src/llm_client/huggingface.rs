//! Hugging Face Inference API text-generation backend.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{api_error, http_client, LlmError, TextGenerator};

#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    inputs: &'a str,
    parameters: GenerationParameters,
}

#[derive(Debug, Serialize)]
struct GenerationParameters {
    max_new_tokens: u32,
    return_full_text: bool,
}

#[derive(Debug, Deserialize)]
struct Generation {
    generated_text: String,
}

/// The endpoint answers with a list for batched pipelines and a bare object otherwise.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GenerationResponse {
    Batch(Vec<Generation>),
    Single(Generation),
}

#[derive(Clone)]
pub struct HuggingFaceClient {
    client: Client,
    api_url: String,
    model: String,
    api_key: String,
}

impl HuggingFaceClient {
    pub fn new(api_url: String, model: String, api_key: String) -> Result<Self, LlmError> {
        Ok(Self {
            client: http_client()?,
            api_url: api_url.trim_end_matches('/').to_string(),
            model,
            api_key,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/{}", self.api_url, self.model)
    }
}

#[async_trait]
impl TextGenerator for HuggingFaceClient {
    async fn generate(&self, prompt: &str, max_new_tokens: u32) -> Result<Vec<String>, LlmError> {
        let request_body = GenerationRequest {
            inputs: prompt,
            parameters: GenerationParameters {
                max_new_tokens,
                return_full_text: false,
            },
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let body = response.text().await?;
        let texts: Vec<String> = match serde_json::from_str::<GenerationResponse>(&body)? {
            GenerationResponse::Batch(generations) => generations
                .into_iter()
                .map(|g| g.generated_text)
                .collect(),
            GenerationResponse::Single(generation) => vec![generation.generated_text],
        };

        debug!(
            "Text generation succeeded: model={}, max_new_tokens={}, completions={}",
            self.model,
            max_new_tokens,
            texts.len()
        );
        Ok(texts)
    }

    fn model(&self) -> &str {
        &self.model
    }
}
