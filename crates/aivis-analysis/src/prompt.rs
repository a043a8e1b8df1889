//! Prompt template rendering.

use std::sync::LazyLock;

use aivis_core::BrandProfile;
use regex::{Captures, Regex};

static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\{(brand|category|competitor|use_case)\}").expect("valid placeholder regex")
});

const DEFAULT_CATEGORY: &str = "Technology";
const DEFAULT_COMPETITOR: &str = "similar products";
const DEFAULT_USE_CASE: &str = "general business use";

/// Fill `{brand}`, `{category}`, `{competitor}` and `{use_case}` in a prompt
/// template. Placeholders match case-insensitively; unknown ones are left alone.
#[must_use]
pub fn render_prompt(template: &str, profile: &BrandProfile) -> String {
    let category = match profile.industry.trim() {
        "" => DEFAULT_CATEGORY,
        industry => industry,
    };
    let competitor = profile
        .competitors
        .first()
        .map_or(DEFAULT_COMPETITOR, String::as_str);

    PLACEHOLDER_RE
        .replace_all(template, |caps: &Captures<'_>| {
            match caps[1].to_ascii_lowercase().as_str() {
                "brand" => profile.name.clone(),
                "category" => category.to_string(),
                "competitor" => competitor.to_string(),
                _ => DEFAULT_USE_CASE.to_string(),
            }
        })
        .into_owned()
}
