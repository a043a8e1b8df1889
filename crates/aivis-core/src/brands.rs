use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::types::{BrandId, BrandProfile, Prompt, PromptId};
use crate::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandConfig {
    pub name: String,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub competitors: Vec<String>,
}

impl BrandConfig {
    /// Generate a URL-safe slug from the brand name.
    #[must_use]
    pub fn slug(&self) -> String {
        self.name
            .to_lowercase()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' {
                    c
                } else if c == ' ' {
                    '-'
                } else {
                    '\0'
                }
            })
            .filter(|&c| c != '\0')
            .collect::<String>()
            .split('-')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("-")
    }

    /// Build the read-only profile the analysis pipeline consumes.
    #[must_use]
    pub fn to_profile(&self, id: BrandId) -> BrandProfile {
        BrandProfile {
            id,
            name: self.name.trim().to_string(),
            industry: self.industry.clone().unwrap_or_default(),
            aliases: self.aliases.iter().map(|a| a.trim().to_string()).collect(),
            competitors: self
                .competitors
                .iter()
                .map(|c| c.trim().to_string())
                .collect(),
        }
    }
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptConfig {
    pub template: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

#[derive(Debug, Deserialize)]
pub struct BrandsFile {
    pub brands: Vec<BrandConfig>,
    #[serde(default)]
    pub prompts: Vec<PromptConfig>,
}

impl BrandsFile {
    /// Profiles keyed by 1-based position in the file.
    #[must_use]
    pub fn profiles(&self) -> Vec<BrandProfile> {
        self.brands
            .iter()
            .zip(1..)
            .map(|(b, id)| b.to_profile(id))
            .collect()
    }

    /// Prompts keyed by 1-based position in the file.
    #[must_use]
    pub fn prompt_list(&self) -> Vec<Prompt> {
        self.prompts
            .iter()
            .zip(1..)
            .map(|(p, id): (&PromptConfig, PromptId)| Prompt {
                id,
                template: p.template.clone(),
                active: p.active,
            })
            .collect()
    }
}

/// Load and validate the brands configuration from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_brands(path: &Path) -> Result<BrandsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::BrandsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_brands(&content)
}

/// Parse and validate brands YAML that is already in memory.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_brands(content: &str) -> Result<BrandsFile, ConfigError> {
    let brands_file: BrandsFile =
        serde_yaml::from_str(content).map_err(ConfigError::BrandsFileParse)?;

    validate_brands(&brands_file)?;

    Ok(brands_file)
}

fn validate_brands(brands_file: &BrandsFile) -> Result<(), ConfigError> {
    let mut seen_names = HashSet::new();
    let mut seen_slugs = HashSet::new();

    for brand in &brands_file.brands {
        if brand.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "brand name must be non-empty".to_string(),
            ));
        }

        if brand.aliases.iter().any(|a| a.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "brand '{}' has an empty alias",
                brand.name
            )));
        }

        if brand.competitors.iter().any(|c| c.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "brand '{}' has an empty competitor name",
                brand.name
            )));
        }

        let lower_name = brand.name.trim().to_lowercase();
        if brand
            .competitors
            .iter()
            .any(|c| c.trim().to_lowercase() == lower_name)
        {
            return Err(ConfigError::Validation(format!(
                "brand '{}' lists itself as a competitor",
                brand.name
            )));
        }

        if !seen_names.insert(lower_name) {
            return Err(ConfigError::Validation(format!(
                "duplicate brand name: '{}'",
                brand.name
            )));
        }

        let slug = brand.slug();
        if !seen_slugs.insert(slug.clone()) {
            return Err(ConfigError::Validation(format!(
                "duplicate brand slug: '{}' (from brand '{}')",
                slug, brand.name
            )));
        }
    }

    if brands_file.prompts.iter().any(|p| p.template.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "prompt template must be non-empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[path = "brands_test.rs"]
mod tests;
