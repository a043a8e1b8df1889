use std::time::Duration;

use async_trait::async_trait;

use crate::error::ProviderError;

/// A text-generation backend.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Send `prompt` and return the generated text.
    async fn query(&self, prompt: &str) -> Result<String, ProviderError>;

    /// Whether the backend is configured and reachable enough to try.
    async fn is_available(&self) -> bool;

    /// Identifier recorded alongside every response this provider produces.
    fn model_name(&self) -> &str;
}

/// HTTP client settings shared by all provider clients.
#[derive(Debug, Clone, Copy)]
pub struct HttpSettings {
    pub timeout: Duration,
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl HttpSettings {
    #[must_use]
    pub fn from_app_config(config: &aivis_core::AppConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.provider_timeout_secs),
            max_retries: config.provider_max_retries,
            ..Self::default()
        }
    }

    pub(crate) fn client(&self) -> Result<reqwest::Client, ProviderError> {
        Ok(reqwest::Client::builder().timeout(self.timeout).build()?)
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            max_retries: 2,
            backoff_base_ms: 1_000,
        }
    }
}
