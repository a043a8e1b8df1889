use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type BrandId = i64;
pub type PromptId = i64;

/// Whether a mention refers to the tracked brand or one of its competitors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Brand,
    Competitor,
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityType::Brand => write!(f, "brand"),
            EntityType::Competitor => write!(f, "competitor"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    /// Numeric value on the 1-5 scale used by the relative sentiment index.
    #[must_use]
    pub fn value(self) -> f64 {
        match self {
            Sentiment::Positive => 5.0,
            Sentiment::Neutral => 3.0,
            Sentiment::Negative => 1.0,
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sentiment::Positive => write!(f, "positive"),
            Sentiment::Neutral => write!(f, "neutral"),
            Sentiment::Negative => write!(f, "negative"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfidenceLevel::Low => write!(f, "low"),
            ConfidenceLevel::Medium => write!(f, "medium"),
            ConfidenceLevel::High => write!(f, "high"),
        }
    }
}

/// Read-only view of a tracked brand for the duration of one analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandProfile {
    pub id: BrandId,
    pub name: String,
    pub industry: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub competitors: Vec<String>,
}

impl BrandProfile {
    /// Every name the scanner should look for: the brand name, each alias,
    /// then each competitor.
    pub fn candidates(&self) -> impl Iterator<Item = (&str, EntityType)> {
        std::iter::once((self.name.as_str(), EntityType::Brand))
            .chain(self.aliases.iter().map(|a| (a.as_str(), EntityType::Brand)))
            .chain(
                self.competitors
                    .iter()
                    .map(|c| (c.as_str(), EntityType::Competitor)),
            )
    }
}

/// One piece of generated text and the model that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseText {
    pub text: String,
    pub model_name: String,
    pub created_at: DateTime<Utc>,
}

impl ResponseText {
    #[must_use]
    pub fn new(text: impl Into<String>, model_name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            text: text.into(),
            model_name: model_name.into(),
            created_at,
        }
    }
}

/// A fully annotated brand or competitor occurrence within one response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedMention {
    pub entity_name: String,
    pub entity_type: EntityType,
    pub sentiment: Sentiment,
    pub context_snippet: String,
    /// Offset of the match start, in chars of the original response.
    pub char_position: usize,
    pub is_recommendation: bool,
    /// 1-based order among brand mentions; `None` for competitors.
    pub position_rank: Option<u32>,
}

/// Aggregate visibility metrics for one completed analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSnapshot {
    pub brand_id: BrandId,
    pub snapshot_date: DateTime<Utc>,

    pub normalized_mention_rate: f64,
    pub weighted_position_score: f64,
    pub recommendation_rate: f64,
    pub relative_sentiment_index: f64,

    pub visibility_score: f64,
    pub citation_share: f64,

    pub confidence_score: f64,
    pub confidence_level: ConfidenceLevel,

    pub mention_count: usize,
    pub positive_count: usize,
    pub neutral_count: usize,
    pub negative_count: usize,

    pub response_count: usize,
    pub category_avg_sentiment: f64,
}

impl MetricSnapshot {
    /// Snapshot for a run in which no response succeeded.
    #[must_use]
    pub fn empty(brand_id: BrandId, snapshot_date: DateTime<Utc>) -> Self {
        Self {
            brand_id,
            snapshot_date,
            normalized_mention_rate: 0.0,
            weighted_position_score: 0.0,
            recommendation_rate: 0.0,
            relative_sentiment_index: 0.0,
            visibility_score: 0.0,
            citation_share: 0.0,
            confidence_score: 0.0,
            confidence_level: ConfidenceLevel::Low,
            mention_count: 0,
            positive_count: 0,
            neutral_count: 0,
            negative_count: 0,
            response_count: 0,
            category_avg_sentiment: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    pub id: PromptId,
    pub template: String,
    pub active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> BrandProfile {
        BrandProfile {
            id: 1,
            name: "Acme".to_string(),
            industry: "CRM".to_string(),
            aliases: vec!["Acme Corp".to_string()],
            competitors: vec!["Globex".to_string(), "Initech".to_string()],
        }
    }

    #[test]
    fn candidates_lists_brand_aliases_then_competitors() {
        let p = profile();
        let candidates: Vec<_> = p.candidates().collect();
        assert_eq!(
            candidates,
            vec![
                ("Acme", EntityType::Brand),
                ("Acme Corp", EntityType::Brand),
                ("Globex", EntityType::Competitor),
                ("Initech", EntityType::Competitor),
            ]
        );
    }

    #[test]
    fn sentiment_values_follow_five_point_scale() {
        assert_eq!(Sentiment::Positive.value(), 5.0);
        assert_eq!(Sentiment::Neutral.value(), 3.0);
        assert_eq!(Sentiment::Negative.value(), 1.0);
    }

    #[test]
    fn enums_serialize_lowercase() {
        assert_eq!(
            serde_json::to_string(&EntityType::Competitor).unwrap(),
            "\"competitor\""
        );
        assert_eq!(
            serde_json::to_string(&ConfidenceLevel::High).unwrap(),
            "\"high\""
        );
        assert_eq!(Sentiment::Negative.to_string(), "negative");
    }

    #[test]
    fn empty_snapshot_is_low_confidence() {
        let snap = MetricSnapshot::empty(7, Utc::now());
        assert_eq!(snap.confidence_level, ConfidenceLevel::Low);
        assert_eq!(snap.visibility_score, 0.0);
        assert_eq!(snap.response_count, 0);
    }
}
