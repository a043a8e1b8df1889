//! Shared domain types and configuration for the aivis workspace.

pub mod app_config;
pub mod brands;
pub mod config;
pub mod types;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use brands::{load_brands, parse_brands, BrandConfig, BrandsFile, PromptConfig};
pub use config::{load_app_config, load_app_config_from_env};
pub use types::{
    BrandId, BrandProfile, ConfidenceLevel, DetectedMention, EntityType, MetricSnapshot, Prompt,
    PromptId, ResponseText, Sentiment,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read brands file {path}: {source}")]
    BrandsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse brands file: {0}")]
    BrandsFileParse(#[from] serde_yaml::Error),

    #[error("brands file validation failed: {0}")]
    Validation(String),
}
