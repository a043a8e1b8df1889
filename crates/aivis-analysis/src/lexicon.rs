//! Word lists driving sentiment and recommendation detection.
//!
//! A [`Lexicon`] is plain immutable data handed to the classifiers at
//! construction time. The built-in English lists are used unless a YAML
//! override is configured via `AIVIS_LEXICON_PATH`; any list missing from the
//! override keeps its default.

use std::path::Path;

use serde::Deserialize;

use crate::error::AnalysisError;

const POSITIVE: &[&str] = &[
    "best",
    "excellent",
    "great",
    "amazing",
    "outstanding",
    "fantastic",
    "superior",
    "recommended",
    "top",
    "leading",
    "preferred",
    "favorite",
    "powerful",
    "efficient",
    "reliable",
    "innovative",
    "impressive",
    "love",
    "perfect",
    "awesome",
    "brilliant",
    "exceptional",
    "superb",
    "highly recommended",
    "top-rated",
    "must-have",
    "game-changer",
];

const NEGATIVE: &[&str] = &[
    "worst",
    "terrible",
    "awful",
    "poor",
    "bad",
    "disappointing",
    "inferior",
    "avoid",
    "limited",
    "outdated",
    "slow",
    "expensive",
    "complicated",
    "confusing",
    "unreliable",
    "buggy",
    "frustrating",
    "hate",
    "horrible",
    "dreadful",
    "useless",
    "overpriced",
    "lacking",
    "not recommended",
    "stay away",
    "problems",
    "issues",
    "fails",
];

const NEGATION: &[&str] = &[
    "not", "no", "never", "neither", "nobody", "nothing", "nowhere", "hardly", "barely", "doesn't",
    "don't", "didn't", "won't", "isn't", "aren't", "wasn't", "weren't", "hasn't", "haven't",
    "hadn't",
];

const RECOMMENDATION: &[&str] = &[
    "i recommend",
    "i'd recommend",
    "we recommend",
    "i strongly recommend",
    "highly recommend",
    "my recommendation is",
    "is the best choice",
    "is the best option",
    "is my top pick",
    "is my top choice",
    "you should use",
    "you should go with",
    "go with",
    "i suggest",
    "i'd suggest",
    "the best option is",
    "the best choice is",
    "top pick",
    "first choice",
    "stands out as",
    "is ideal for",
    "is perfect for",
];

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| (*w).to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Lexicon {
    pub positive: Vec<String>,
    pub negative: Vec<String>,
    pub negation: Vec<String>,
    pub recommendation: Vec<String>,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self {
            positive: owned(POSITIVE),
            negative: owned(NEGATIVE),
            negation: owned(NEGATION),
            recommendation: owned(RECOMMENDATION),
        }
    }
}

impl Lexicon {
    /// Parse a YAML override. Lists absent from the document keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::LexiconParse`] if the YAML is malformed.
    pub fn from_yaml(content: &str) -> Result<Self, AnalysisError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// # Errors
    ///
    /// Returns [`AnalysisError::LexiconIo`] if the file cannot be read, or
    /// [`AnalysisError::LexiconParse`] if it is not valid YAML.
    pub fn load(path: &Path) -> Result<Self, AnalysisError> {
        let content = std::fs::read_to_string(path).map_err(|source| AnalysisError::LexiconIo {
            path: path.display().to_string(),
            source,
        })?;
        let lexicon = Self::from_yaml(&content)?;
        tracing::info!(
            path = %path.display(),
            positive = lexicon.positive.len(),
            negative = lexicon.negative.len(),
            "loaded lexicon override"
        );
        Ok(lexicon)
    }

    /// The configured override when a path is given, otherwise the defaults.
    ///
    /// # Errors
    ///
    /// See [`Lexicon::load`].
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, AnalysisError> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }
}
