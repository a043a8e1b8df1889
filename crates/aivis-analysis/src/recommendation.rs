//! Recommendation-phrase proximity detection.

use crate::lexicon::Lexicon;
use crate::text::{compile_terms, find_words};

/// A phrase counts only if it starts within this many chars of the mention.
pub const PROXIMITY_WINDOW: usize = 150;

/// How far the mention may precede the phrase start and still count.
pub const MAX_LEAD: usize = 50;

#[derive(Debug, Clone)]
pub struct RecommendationDetector {
    phrases: Vec<Vec<char>>,
}

impl RecommendationDetector {
    #[must_use]
    pub fn new(lexicon: &Lexicon) -> Self {
        Self {
            phrases: compile_terms(&lexicon.recommendation),
        }
    }

    /// Start offsets of every phrase occurrence in a folded response.
    pub(crate) fn phrase_offsets(&self, folded: &[char]) -> Vec<usize> {
        let mut offsets: Vec<usize> = self
            .phrases
            .iter()
            .flat_map(|p| find_words(folded, p))
            .collect();
        offsets.sort_unstable();
        offsets.dedup();
        offsets
    }

    /// Whether any phrase at one of `offsets` qualifies the mention at `position`.
    #[must_use]
    pub fn is_recommended(offsets: &[usize], position: usize) -> bool {
        offsets
            .iter()
            .any(|&p| p.abs_diff(position) < PROXIMITY_WINDOW && position + MAX_LEAD >= p)
    }
}

impl Default for RecommendationDetector {
    fn default() -> Self {
        Self::new(&Lexicon::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::fold;

    fn recommended(text: &str, position: usize) -> bool {
        let detector = RecommendationDetector::default();
        let offsets = detector.phrase_offsets(&fold(text));
        RecommendationDetector::is_recommended(&offsets, position)
    }

    #[test]
    fn phrase_just_before_mention_qualifies() {
        assert!(recommended("I recommend Acme for this", 12));
    }

    #[test]
    fn mention_far_from_phrase_does_not_qualify() {
        let text = format!("I recommend it. {}Acme", "x ".repeat(80));
        let position = text.find("Acme").unwrap();
        assert!(position > PROXIMITY_WINDOW);
        assert!(!recommended(&text, position));
    }

    #[test]
    fn mention_may_lead_phrase_by_small_margin() {
        // "Acme" at 0, "is the best choice" at 5.
        assert!(recommended("Acme is the best choice here", 0));
    }

    #[test]
    fn mention_leading_by_more_than_margin_does_not_qualify() {
        let text = format!("Acme {}is my top pick", "y ".repeat(30));
        assert!(!recommended(&text, 0));
    }

    #[test]
    fn phrases_match_case_insensitively_on_word_boundaries() {
        assert!(recommended("YOU SHOULD GO WITH Acme", 19));
        // "ago with" is not "go with".
        assert!(!recommended("Years ago with Acme", 15));
    }

    #[test]
    fn no_phrases_means_no_recommendation() {
        assert!(!recommended("Acme exists", 0));
    }
}
