//! Response handling shared by the provider clients.

use reqwest::header::RETRY_AFTER;
use reqwest::{Response, StatusCode};

use crate::error::ProviderError;

const MAX_ERROR_BODY_CHARS: usize = 500;

/// Map non-success statuses onto [`ProviderError`]; pass successful responses through.
pub(crate) async fn check_status(
    provider: &str,
    response: Response,
) -> Result<Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        return Err(ProviderError::RateLimited {
            provider: provider.to_string(),
            retry_after_secs,
        });
    }

    let body = response.text().await.unwrap_or_default();
    Err(ProviderError::UnexpectedStatus {
        provider: provider.to_string(),
        status: status.as_u16(),
        body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
    })
}

/// Reject missing or whitespace-only generations.
pub(crate) fn non_empty(text: Option<String>, model: &str) -> Result<String, ProviderError> {
    match text {
        Some(t) if !t.trim().is_empty() => Ok(t),
        _ => Err(ProviderError::EmptyResponse {
            model: model.to_string(),
        }),
    }
}
