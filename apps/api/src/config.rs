use std::path::PathBuf;

use anyhow::{bail, Context, Result};

const DEFAULT_HF_MODEL: &str = "mistralai/Mistral-7B-Instruct-v0.3";
const DEFAULT_HF_API_URL: &str = "https://api-inference.huggingface.co/models";
const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const DEFAULT_OLLAMA_MODEL: &str = "llama2";

/// Which text-generation backend serves suggestion prompts.
#[derive(Debug, Clone, PartialEq)]
pub enum LlmProvider {
    HuggingFace { api_key: String, api_url: String, model: String },
    Ollama { base_url: String, model: String },
}

/// Optional Jira defaults used when `/api/user-stories` omits a query parameter.
#[derive(Debug, Clone, Default)]
pub struct JiraDefaults {
    pub base_url: Option<String>,
    pub project_key: Option<String>,
    pub email: Option<String>,
    pub api_token: Option<String>,
}

/// Application configuration loaded from environment variables.
/// Fails at startup if a required variable is missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub model_dir: PathBuf,
    pub max_sequence_length: usize,
    pub llm: LlmProvider,
    pub jira: JiraDefaults,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            model_dir: PathBuf::from(env_or("MODEL_DIR", "models")),
            max_sequence_length: parse_max_sequence_length(&env_or("MAX_SEQUENCE_LENGTH", "512"))?,
            llm: llm_provider_from_env()?,
            jira: JiraDefaults {
                base_url: optional_env("JIRA_API_URL"),
                project_key: optional_env("JIRA_PROJECT_KEY"),
                email: optional_env("JIRA_API_EMAIL"),
                api_token: optional_env("JIRA_API_TOKEN"),
            },
        })
    }
}

fn llm_provider_from_env() -> Result<LlmProvider> {
    let provider = env_or("LLM_PROVIDER", "huggingface");
    match provider.to_ascii_lowercase().as_str() {
        "huggingface" | "hf" => Ok(LlmProvider::HuggingFace {
            api_key: require_env("HF_API_KEY")?,
            api_url: env_or("HF_API_URL", DEFAULT_HF_API_URL),
            model: env_or("HF_MODEL", DEFAULT_HF_MODEL),
        }),
        "ollama" => Ok(LlmProvider::Ollama {
            base_url: env_or("OLLAMA_URL", DEFAULT_OLLAMA_URL),
            model: env_or("OLLAMA_MODEL", DEFAULT_OLLAMA_MODEL),
        }),
        other => bail!("LLM_PROVIDER must be 'huggingface' or 'ollama', got '{other}'"),
    }
}

fn parse_max_sequence_length(raw: &str) -> Result<usize> {
    let length = raw
        .parse::<usize>()
        .context("MAX_SEQUENCE_LENGTH must be a positive integer")?;
    if length == 0 {
        bail!("MAX_SEQUENCE_LENGTH must be a positive integer, got 0");
    }
    Ok(length)
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Treats unset and blank variables the same way.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    optional_env(key).unwrap_or_else(|| default.to_string())
}
