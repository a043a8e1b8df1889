//! Provider selection from application config.

use std::sync::Arc;

use aivis_core::AppConfig;

use crate::catalog::{GROQ_MODEL, OPENROUTER_MODELS};
use crate::error::ProviderError;
use crate::gemini::GeminiProvider;
use crate::ollama::OllamaProvider;
use crate::openai_compat::OpenAiCompatibleProvider;
use crate::provider::{HttpSettings, Provider};

/// Order in which keyed providers are tried when none is named explicitly.
const FALLBACK_ORDER: [&str; 4] = ["openrouter", "groq", "gemini", "openai"];

/// Pick the provider for analysis runs.
///
/// An explicit `AIVIS_AI_PROVIDER` wins when it is usable; otherwise the first
/// provider with an API key in [`FALLBACK_ORDER`] is used. Returns `Ok(None)`
/// when nothing is configured.
///
/// # Errors
///
/// Returns [`ProviderError::Http`] if an HTTP client cannot be built.
pub fn provider_from_config(
    config: &AppConfig,
) -> Result<Option<Arc<dyn Provider>>, ProviderError> {
    let settings = HttpSettings::from_app_config(config);

    if let Some(kind) = config.ai_provider.as_deref() {
        if let Some(provider) = build_named(kind, config, settings)? {
            tracing::info!(
                provider = kind,
                model = provider.model_name(),
                "using configured AI provider"
            );
            return Ok(Some(provider));
        }
        tracing::warn!(
            provider = kind,
            "configured AI provider is not usable; trying fallbacks"
        );
    }

    for kind in FALLBACK_ORDER {
        if let Some(provider) = build_named(kind, config, settings)? {
            tracing::info!(
                provider = kind,
                model = provider.model_name(),
                "using auto-detected AI provider"
            );
            return Ok(Some(provider));
        }
    }

    tracing::warn!(
        "no AI provider configured (set OPENROUTER_API_KEY, GROQ_API_KEY, GEMINI_API_KEY, or OPENAI_API_KEY)"
    );
    Ok(None)
}

fn build_named(
    kind: &str,
    config: &AppConfig,
    settings: HttpSettings,
) -> Result<Option<Arc<dyn Provider>>, ProviderError> {
    let provider = match kind {
        "ollama" => shared(OllamaProvider::new(
            &config.ollama_url,
            &config.ollama_model,
            settings,
        )?),
        "openai" => match config.openai_api_key.as_deref() {
            Some(key) => shared(OpenAiCompatibleProvider::openai(key, settings)?),
            None => None,
        },
        "groq" => match config.groq_api_key.as_deref() {
            Some(key) => shared(OpenAiCompatibleProvider::groq(key, settings)?),
            None => None,
        },
        "openrouter" => match config.openrouter_api_key.as_deref() {
            Some(key) => shared(OpenAiCompatibleProvider::openrouter(key, settings)?),
            None => None,
        },
        "gemini" => match config.gemini_api_key.as_deref() {
            Some(key) => shared(GeminiProvider::new(key, settings)?),
            None => None,
        },
        other => {
            tracing::warn!(provider = other, "unknown AI provider name");
            None
        }
    };
    Ok(provider)
}

fn shared<P: Provider + 'static>(provider: P) -> Option<Arc<dyn Provider>> {
    Some(Arc::new(provider))
}

/// Every model available for a comparison run: the OpenRouter catalog when an
/// OpenRouter key is set, plus Groq when a Groq key is set.
///
/// # Errors
///
/// Returns [`ProviderError::Http`] if an HTTP client cannot be built.
pub fn comparison_providers(config: &AppConfig) -> Result<Vec<Arc<dyn Provider>>, ProviderError> {
    let settings = HttpSettings::from_app_config(config);
    let mut providers: Vec<Arc<dyn Provider>> = Vec::new();

    if let Some(key) = config.openrouter_api_key.as_deref() {
        let base = OpenAiCompatibleProvider::openrouter(key, settings)?;
        for model in OPENROUTER_MODELS {
            providers.push(Arc::new(base.clone().with_model(model.id, model.name)));
        }
    }

    if let Some(key) = config.groq_api_key.as_deref() {
        let groq = OpenAiCompatibleProvider::groq(key, settings)?;
        providers.push(Arc::new(groq.with_model(GROQ_MODEL.id, GROQ_MODEL.name)));
    }

    Ok(providers)
}
