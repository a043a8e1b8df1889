//! Client for a local Ollama server.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::http::{check_status, non_empty};
use crate::provider::{HttpSettings, Provider};
use crate::retry::retry_with_backoff;

pub const OLLAMA_DEFAULT_URL: &str = "http://localhost:11434";
pub const OLLAMA_DEFAULT_MODEL: &str = "llama2";

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OllamaProvider {
    client: Client,
    base_url: String,
    model: String,
    model_name: String,
    settings: HttpSettings,
}

impl OllamaProvider {
    /// Blank `base_url` or `model` fall back to the local defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, model: &str, settings: HttpSettings) -> Result<Self, ProviderError> {
        let base_url = if base_url.trim().is_empty() {
            OLLAMA_DEFAULT_URL
        } else {
            base_url.trim()
        };
        let model = if model.trim().is_empty() {
            OLLAMA_DEFAULT_MODEL
        } else {
            model.trim()
        };
        Ok(Self {
            client: settings.client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            model_name: format!("ollama/{model}"),
            settings,
        })
    }

    async fn query_once(&self, prompt: &str) -> Result<String, ProviderError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };
        let response = self.client.post(&url).json(&body).send().await?;
        let response = check_status("ollama", response).await?;
        let parsed: GenerateResponse = response.json().await?;
        non_empty(parsed.response, &self.model_name)
    }
}

#[async_trait]
impl Provider for OllamaProvider {
    async fn query(&self, prompt: &str) -> Result<String, ProviderError> {
        retry_with_backoff(
            "ollama",
            self.settings.max_retries,
            self.settings.backoff_base_ms,
            || self.query_once(prompt),
        )
        .await
    }

    /// Calls `GET /api/tags`; any failure counts as unavailable.
    async fn is_available(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);
        match self.client.get(&url).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                tracing::debug!(error = %e, url, "ollama availability check failed");
                false
            }
        }
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
