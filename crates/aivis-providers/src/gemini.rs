//! Client for the Google Gemini `generateContent` API.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::http::{check_status, non_empty};
use crate::provider::{HttpSettings, Provider};
use crate::retry::retry_with_backoff;

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const GEMINI_DEFAULT_MODEL: &str = "gemini-1.5-flash";

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GeminiProvider {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    settings: HttpSettings,
}

impl GeminiProvider {
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the HTTP client cannot be built.
    pub fn new(api_key: &str, settings: HttpSettings) -> Result<Self, ProviderError> {
        Ok(Self {
            client: settings.client()?,
            base_url: GEMINI_BASE_URL.to_string(),
            api_key: api_key.to_string(),
            model: GEMINI_DEFAULT_MODEL.to_string(),
            settings,
        })
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    async fn query_once(&self, prompt: &str) -> Result<String, ProviderError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        let body = GenerateRequest {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
        };
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(redact_key)?;
        let response = check_status("gemini", response).await?;
        let parsed: GenerateResponse = response.json().await.map_err(redact_key)?;

        // Multi-part candidates are concatenated in order.
        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<String>()
            });
        non_empty(text, &self.model)
    }
}

/// The API key travels in the query string; keep it out of error messages.
fn redact_key(e: reqwest::Error) -> ProviderError {
    ProviderError::Http(e.without_url())
}

#[async_trait]
impl Provider for GeminiProvider {
    async fn query(&self, prompt: &str) -> Result<String, ProviderError> {
        if self.api_key.is_empty() {
            return Err(ProviderError::NotConfigured("gemini API key".to_string()));
        }
        retry_with_backoff(
            "gemini",
            self.settings.max_retries,
            self.settings.backoff_base_ms,
            || self.query_once(prompt),
        )
        .await
    }

    async fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
