use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub brands_path: PathBuf,
    pub lexicon_path: Option<PathBuf>,
    pub ai_provider: Option<String>,
    pub openai_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub groq_api_key: Option<String>,
    pub openrouter_api_key: Option<String>,
    pub ollama_url: String,
    pub ollama_model: String,
    pub provider_timeout_secs: u64,
    pub provider_max_retries: u32,
    pub rate_min_interval_ms: u64,
    pub rate_max_per_minute: u32,
    pub in_flight_timeout_secs: u64,
    pub max_prompts_per_run: usize,
    pub inter_call_delay_ms: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |key: &Option<String>| key.as_ref().map(|_| "[redacted]");
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("brands_path", &self.brands_path)
            .field("lexicon_path", &self.lexicon_path)
            .field("ai_provider", &self.ai_provider)
            .field("openai_api_key", &redact(&self.openai_api_key))
            .field("gemini_api_key", &redact(&self.gemini_api_key))
            .field("groq_api_key", &redact(&self.groq_api_key))
            .field("openrouter_api_key", &redact(&self.openrouter_api_key))
            .field("ollama_url", &self.ollama_url)
            .field("ollama_model", &self.ollama_model)
            .field("provider_timeout_secs", &self.provider_timeout_secs)
            .field("provider_max_retries", &self.provider_max_retries)
            .field("rate_min_interval_ms", &self.rate_min_interval_ms)
            .field("rate_max_per_minute", &self.rate_max_per_minute)
            .field("in_flight_timeout_secs", &self.in_flight_timeout_secs)
            .field("max_prompts_per_run", &self.max_prompts_per_run)
            .field("inter_call_delay_ms", &self.inter_call_delay_ms)
            .finish()
    }
}
