use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limited by {provider}")]
    RateLimited {
        provider: String,
        retry_after_secs: Option<u64>,
    },

    #[error("unexpected HTTP status {status} from {provider}: {body}")]
    UnexpectedStatus {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("{provider} API error: {message}")]
    Api { provider: String, message: String },

    #[error("empty response from {model}")]
    EmptyResponse { model: String },

    #[error("{0} is not configured")]
    NotConfigured(String),
}

impl ProviderError {
    /// Transient failures worth another attempt after a back-off delay:
    /// timeouts, connection failures and 5xx responses.
    #[must_use]
    pub fn is_retriable(&self) -> bool {
        match self {
            ProviderError::Http(e) => {
                e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
            }
            ProviderError::UnexpectedStatus { status, .. } => *status >= 500,
            ProviderError::RateLimited { .. }
            | ProviderError::Api { .. }
            | ProviderError::EmptyResponse { .. }
            | ProviderError::NotConfigured(_) => false,
        }
    }
}
