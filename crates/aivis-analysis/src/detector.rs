//! Mention detection: scan, classify, flag recommendations, rank.

use aivis_core::{BrandProfile, DetectedMention};

use crate::lexicon::Lexicon;
use crate::ranker::rank_positions;
use crate::recommendation::RecommendationDetector;
use crate::scanner::scan;
use crate::sentiment::SentimentClassifier;
use crate::text::fold;

#[derive(Debug, Clone, Default)]
pub struct MentionDetector {
    sentiment: SentimentClassifier,
    recommendation: RecommendationDetector,
}

impl MentionDetector {
    #[must_use]
    pub fn new(lexicon: &Lexicon) -> Self {
        Self {
            sentiment: SentimentClassifier::new(lexicon),
            recommendation: RecommendationDetector::new(lexicon),
        }
    }

    /// Every brand and competitor mention in `text`, annotated and ordered by
    /// offset.
    ///
    /// Each mention's sentiment comes from its own context snippet, so one
    /// response can rate the brand positively and a competitor negatively.
    #[must_use]
    pub fn detect_mentions(&self, text: &str, profile: &BrandProfile) -> Vec<DetectedMention> {
        let scanned = scan(text, profile.candidates());
        if scanned.is_empty() {
            return Vec::new();
        }

        let offsets = self.recommendation.phrase_offsets(&fold(text));
        let mut mentions: Vec<DetectedMention> = scanned
            .into_iter()
            .map(|m| DetectedMention {
                sentiment: self
                    .sentiment
                    .classify(&m.context_snippet, m.span_in_snippet.clone()),
                is_recommendation: RecommendationDetector::is_recommended(
                    &offsets,
                    m.char_position,
                ),
                entity_name: m.entity_name,
                entity_type: m.entity_type,
                context_snippet: m.context_snippet,
                char_position: m.char_position,
                position_rank: None,
            })
            .collect();

        rank_positions(&mut mentions);
        tracing::debug!(
            brand_id = profile.id,
            mentions = mentions.len(),
            "detected mentions"
        );
        mentions
    }
}

#[cfg(test)]
mod tests {
    use aivis_core::{EntityType, Sentiment};

    use super::*;

    fn acme() -> BrandProfile {
        BrandProfile {
            id: 1,
            name: "Acme".to_string(),
            industry: "CRM software".to_string(),
            aliases: vec![],
            competitors: vec!["Globex".to_string()],
        }
    }

    #[test]
    fn scenario_response_is_fully_annotated() {
        let text = "I recommend Acme because it's the best choice, unlike Globex which has issues.";
        let mentions = MentionDetector::default().detect_mentions(text, &acme());
        assert_eq!(mentions.len(), 2);

        let brand = &mentions[0];
        assert_eq!(brand.entity_name, "Acme");
        assert_eq!(brand.entity_type, EntityType::Brand);
        assert_eq!(brand.char_position, 12);
        assert_eq!(brand.position_rank, Some(1));
        assert_eq!(brand.sentiment, Sentiment::Positive);
        assert!(brand.is_recommendation);

        let competitor = &mentions[1];
        assert_eq!(competitor.entity_name, "Globex");
        assert_eq!(competitor.entity_type, EntityType::Competitor);
        assert_eq!(competitor.position_rank, None);
        assert_eq!(competitor.sentiment, Sentiment::Negative);
    }

    #[test]
    fn no_candidates_found_is_empty() {
        let mentions =
            MentionDetector::default().detect_mentions("Nothing relevant here.", &acme());
        assert!(mentions.is_empty());
    }

    #[test]
    fn brand_mentions_ranked_across_aliases() {
        let mut profile = acme();
        profile.aliases = vec!["Acme Cloud".to_string()];
        let text = "Globex first, then Acme Cloud, and later plain Acme again.";
        let mentions = MentionDetector::default().detect_mentions(text, &profile);

        let ranks: Vec<(&str, Option<u32>)> = mentions
            .iter()
            .map(|m| (m.entity_name.as_str(), m.position_rank))
            .collect();
        // "Acme" inside "Acme Cloud" is a separate mention at the same offset.
        assert_eq!(
            ranks,
            vec![
                ("Globex", None),
                ("Acme", Some(1)),
                ("Acme Cloud", Some(2)),
                ("Acme", Some(3)),
            ]
        );
    }

    #[test]
    fn custom_lexicon_is_respected() {
        let lexicon = Lexicon {
            positive: vec!["stellar".to_string()],
            negative: vec![],
            negation: vec![],
            recommendation: vec!["pick".to_string()],
        };
        let detector = MentionDetector::new(&lexicon);
        let mentions = detector.detect_mentions("Pick Acme, it is stellar and the best", &acme());
        assert_eq!(mentions[0].sentiment, Sentiment::Positive);
        assert!(mentions[0].is_recommendation);
    }
}
