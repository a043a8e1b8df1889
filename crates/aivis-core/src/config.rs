use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can use a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    // Blank values count as unset so `.env` templates with `KEY=` stay harmless.
    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|v| !v.trim().is_empty())
    };

    let env = parse_environment(&or_default("AIVIS_ENV", "development"))?;
    let log_level = or_default("AIVIS_LOG_LEVEL", "info");
    let brands_path = PathBuf::from(or_default("AIVIS_BRANDS_PATH", "./config/brands.yaml"));
    let lexicon_path = optional("AIVIS_LEXICON_PATH").map(PathBuf::from);

    let ai_provider = optional("AIVIS_AI_PROVIDER").map(|p| p.trim().to_lowercase());
    let openai_api_key = optional("OPENAI_API_KEY");
    let gemini_api_key = optional("GEMINI_API_KEY").or_else(|| optional("GOOGLE_API_KEY"));
    let groq_api_key = optional("GROQ_API_KEY");
    let openrouter_api_key = optional("OPENROUTER_API_KEY");
    let ollama_url = or_default("OLLAMA_URL", "http://localhost:11434");
    let ollama_model = or_default("OLLAMA_MODEL", "llama2");

    let provider_timeout_secs = parse_num(
        "AIVIS_PROVIDER_TIMEOUT_SECS",
        &or_default("AIVIS_PROVIDER_TIMEOUT_SECS", "60"),
    )?;
    let provider_max_retries = parse_num(
        "AIVIS_PROVIDER_MAX_RETRIES",
        &or_default("AIVIS_PROVIDER_MAX_RETRIES", "2"),
    )?;
    let rate_min_interval_ms = parse_num(
        "AIVIS_RATE_MIN_INTERVAL_MS",
        &or_default("AIVIS_RATE_MIN_INTERVAL_MS", "2000"),
    )?;
    let rate_max_per_minute: u32 = parse_num(
        "AIVIS_RATE_MAX_PER_MINUTE",
        &or_default("AIVIS_RATE_MAX_PER_MINUTE", "10"),
    )?;
    let in_flight_timeout_secs = parse_num(
        "AIVIS_IN_FLIGHT_TIMEOUT_SECS",
        &or_default("AIVIS_IN_FLIGHT_TIMEOUT_SECS", "300"),
    )?;
    let max_prompts_per_run: usize = parse_num(
        "AIVIS_MAX_PROMPTS_PER_RUN",
        &or_default("AIVIS_MAX_PROMPTS_PER_RUN", "6"),
    )?;
    let inter_call_delay_ms = parse_num(
        "AIVIS_INTER_CALL_DELAY_MS",
        &or_default("AIVIS_INTER_CALL_DELAY_MS", "500"),
    )?;

    if rate_max_per_minute == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "AIVIS_RATE_MAX_PER_MINUTE".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    if max_prompts_per_run == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "AIVIS_MAX_PROMPTS_PER_RUN".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    Ok(AppConfig {
        env,
        log_level,
        brands_path,
        lexicon_path,
        ai_provider,
        openai_api_key,
        gemini_api_key,
        groq_api_key,
        openrouter_api_key,
        ollama_url,
        ollama_model,
        provider_timeout_secs,
        provider_max_retries,
        rate_min_interval_ms,
        rate_max_per_minute,
        in_flight_timeout_secs,
        max_prompts_per_run,
        inter_call_delay_ms,
    })
}

fn parse_num<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "AIVIS_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}
