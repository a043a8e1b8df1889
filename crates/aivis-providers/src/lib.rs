//! Text-generation provider clients.
//!
//! Every backend implements [`Provider`]; the analysis pipeline only ever sees
//! `Arc<dyn Provider>`. [`select`] picks a backend from [`aivis_core::AppConfig`].

pub mod catalog;
pub mod error;
pub mod gemini;
pub mod ollama;
pub mod openai_compat;
pub mod provider;
pub mod select;

mod http;
mod retry;

pub use catalog::{ModelInfo, GROQ_MODEL, OPENROUTER_MODELS};
pub use error::ProviderError;
pub use gemini::GeminiProvider;
pub use ollama::OllamaProvider;
pub use openai_compat::OpenAiCompatibleProvider;
pub use provider::{HttpSettings, Provider};
pub use select::{comparison_providers, provider_from_config};
