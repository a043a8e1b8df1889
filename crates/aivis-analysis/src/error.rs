use std::time::Duration;

use aivis_core::BrandId;
use aivis_gate::GateError;
use aivis_providers::ProviderError;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("rate limited; retry in {}s", .wait.as_millis().div_ceil(1000).max(1))]
    RateLimited { wait: Duration },

    #[error("an analysis for brand {brand_id} is already running")]
    AlreadyInFlight { brand_id: BrandId },

    #[error("no AI provider configured")]
    ProviderUnavailable,

    #[error("empty response from {model}")]
    EmptyResponse { model: String },

    #[error("brand {0} not found")]
    BrandNotFound(BrandId),

    #[error("provider error: {0}")]
    Provider(ProviderError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("failed to read lexicon file {path}: {source}")]
    LexiconIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse lexicon file: {0}")]
    LexiconParse(#[from] serde_yaml::Error),
}

impl From<GateError> for AnalysisError {
    fn from(err: GateError) -> Self {
        match err {
            GateError::RateLimited { wait } => AnalysisError::RateLimited { wait },
            GateError::AlreadyInFlight { brand_id } => AnalysisError::AlreadyInFlight { brand_id },
        }
    }
}

impl From<ProviderError> for AnalysisError {
    /// Provider rate limiting and empty generations surface as the
    /// pipeline's own variants; everything else stays wrapped.
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::RateLimited {
                retry_after_secs, ..
            } => AnalysisError::RateLimited {
                wait: Duration::from_secs(retry_after_secs.unwrap_or(60)),
            },
            ProviderError::EmptyResponse { model } => AnalysisError::EmptyResponse { model },
            ProviderError::NotConfigured(_) => AnalysisError::ProviderUnavailable,
            other => AnalysisError::Provider(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_errors_map_to_matching_variants() {
        let err: AnalysisError = GateError::RateLimited {
            wait: Duration::from_secs(12),
        }
        .into();
        assert_eq!(err.to_string(), "rate limited; retry in 12s");

        let err: AnalysisError = GateError::AlreadyInFlight { brand_id: 4 }.into();
        assert!(matches!(err, AnalysisError::AlreadyInFlight { brand_id: 4 }));
    }

    #[test]
    fn sub_second_wait_rounds_up_in_message() {
        let err = AnalysisError::RateLimited {
            wait: Duration::from_millis(300),
        };
        assert_eq!(err.to_string(), "rate limited; retry in 1s");
    }

    #[test]
    fn fractional_wait_rounds_up_in_message() {
        let err = AnalysisError::RateLimited {
            wait: Duration::from_millis(1900),
        };
        assert_eq!(err.to_string(), "rate limited; retry in 2s");
    }

    #[test]
    fn provider_rate_limit_uses_retry_after() {
        let err: AnalysisError = ProviderError::RateLimited {
            provider: "groq".to_string(),
            retry_after_secs: Some(30),
        }
        .into();
        assert!(matches!(
            err,
            AnalysisError::RateLimited { wait } if wait == Duration::from_secs(30)
        ));
    }

    #[test]
    fn provider_empty_response_maps_through() {
        let err: AnalysisError = ProviderError::EmptyResponse {
            model: "m".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "empty response from m");
    }

    #[test]
    fn other_provider_errors_stay_wrapped() {
        let err: AnalysisError = ProviderError::Api {
            provider: "openai".to_string(),
            message: "boom".to_string(),
        }
        .into();
        assert!(matches!(err, AnalysisError::Provider(_)));
    }
}
