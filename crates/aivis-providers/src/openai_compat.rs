//! Client for OpenAI-style `chat/completions` endpoints.
//!
//! OpenAI, Groq and OpenRouter all speak this protocol, so one client serves
//! all three; the constructors differ only in base URL, default model and the
//! name recorded on each response.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::http::{check_status, non_empty};
use crate::provider::{HttpSettings, Provider};
use crate::retry::retry_with_backoff;

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

const OPENAI_DEFAULT_MODEL: &str = "gpt-3.5-turbo";
const GROQ_DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
const OPENROUTER_DEFAULT_MODEL: &str = "google/gemini-2.0-flash-001";

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    error: Option<ApiErrorBody>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[derive(Debug, Clone)]
pub struct OpenAiCompatibleProvider {
    client: Client,
    provider: &'static str,
    base_url: String,
    api_key: String,
    model: String,
    model_name: String,
    /// Extra headers some gateways ask for (OpenRouter attribution).
    extra_headers: Vec<(&'static str, &'static str)>,
    settings: HttpSettings,
}

impl OpenAiCompatibleProvider {
    /// Build a client for an arbitrary compatible endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the HTTP client cannot be built.
    pub fn new(
        provider: &'static str,
        base_url: &str,
        api_key: &str,
        model: &str,
        settings: HttpSettings,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            client: settings.client()?,
            provider,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            model_name: model.to_string(),
            extra_headers: Vec::new(),
            settings,
        })
    }

    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the HTTP client cannot be built.
    pub fn openai(api_key: &str, settings: HttpSettings) -> Result<Self, ProviderError> {
        Self::new(
            "openai",
            OPENAI_BASE_URL,
            api_key,
            OPENAI_DEFAULT_MODEL,
            settings,
        )
    }

    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the HTTP client cannot be built.
    pub fn groq(api_key: &str, settings: HttpSettings) -> Result<Self, ProviderError> {
        let mut p = Self::new("groq", GROQ_BASE_URL, api_key, GROQ_DEFAULT_MODEL, settings)?;
        p.model_name = "groq-llama-3.3-70b".to_string();
        Ok(p)
    }

    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the HTTP client cannot be built.
    pub fn openrouter(api_key: &str, settings: HttpSettings) -> Result<Self, ProviderError> {
        let mut p = Self::new(
            "openrouter",
            OPENROUTER_BASE_URL,
            api_key,
            OPENROUTER_DEFAULT_MODEL,
            settings,
        )?;
        p.model_name = format!("openrouter-{OPENROUTER_DEFAULT_MODEL}");
        p.extra_headers = vec![
            ("HTTP-Referer", "https://aivis.local"),
            ("X-Title", "aivis"),
        ];
        Ok(p)
    }

    /// Same endpoint and credentials, different model.
    #[must_use]
    pub fn with_model(mut self, model: &str, model_name: &str) -> Self {
        self.model = model.to_string();
        self.model_name = model_name.to_string();
        self
    }

    /// Point at a different base URL (used to target mock servers in tests).
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    async fn query_once(&self, prompt: &str) -> Result<String, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let mut request = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body);
        for (name, value) in &self.extra_headers {
            request = request.header(*name, *value);
        }

        let response = check_status(self.provider, request.send().await?).await?;
        let parsed: ChatResponse = response.json().await?;

        if let Some(err) = parsed.error {
            return Err(ProviderError::Api {
                provider: self.provider.to_string(),
                message: err.message,
            });
        }

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content);
        non_empty(text, &self.model_name)
    }
}

#[async_trait]
impl Provider for OpenAiCompatibleProvider {
    async fn query(&self, prompt: &str) -> Result<String, ProviderError> {
        if self.api_key.is_empty() {
            return Err(ProviderError::NotConfigured(format!(
                "{} API key",
                self.provider
            )));
        }
        retry_with_backoff(
            self.provider,
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
        &self.model_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_recorded_model_names() {
        let s = HttpSettings::default();
        assert_eq!(
            OpenAiCompatibleProvider::openai("k", s).unwrap().model_name(),
            "gpt-3.5-turbo"
        );
        assert_eq!(
            OpenAiCompatibleProvider::groq("k", s).unwrap().model_name(),
            "groq-llama-3.3-70b"
        );
        assert_eq!(
            OpenAiCompatibleProvider::openrouter("k", s)
                .unwrap()
                .model_name(),
            "openrouter-google/gemini-2.0-flash-001"
        );
    }

    #[test]
    fn with_model_overrides_name() {
        let p = OpenAiCompatibleProvider::openrouter("k", HttpSettings::default())
            .unwrap()
            .with_model("qwen/qwen3-coder:free", "Qwen3 Coder");
        assert_eq!(p.model_name(), "Qwen3 Coder");
        assert_eq!(p.model, "qwen/qwen3-coder:free");
    }

    #[tokio::test]
    async fn missing_key_is_unavailable() {
        let p = OpenAiCompatibleProvider::openai("", HttpSettings::default()).unwrap();
        assert!(!p.is_available().await);
        assert!(matches!(
            p.query("hi").await,
            Err(ProviderError::NotConfigured(_))
        ));
    }
}
