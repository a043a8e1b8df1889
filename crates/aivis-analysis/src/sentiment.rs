//! Lexicon sentiment classification with negation handling.
//!
//! A mention is classified from its context snippet. Scoring first looks at
//! the clause holding the mention (delimited by `. ! ? ; , :` or a newline),
//! so that "best for Acme, unlike Globex which has issues" rates the two
//! names differently. A clause without any lexicon hit falls back to the
//! whole snippet.

use std::ops::Range;

use aivis_core::Sentiment;

use crate::lexicon::Lexicon;
use crate::text::{compile_terms, find_words, fold};

/// Chars before a lexicon hit searched for a negation marker.
pub const NEGATION_WINDOW: usize = 30;

fn is_clause_break(c: char) -> bool {
    matches!(c, '.' | '!' | '?' | ';' | ',' | ':' | '\n')
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Tally {
    positive: usize,
    negative: usize,
}

impl Tally {
    fn is_empty(self) -> bool {
        self.positive == 0 && self.negative == 0
    }

    fn verdict(self) -> Sentiment {
        match self.positive.cmp(&self.negative) {
            std::cmp::Ordering::Greater => Sentiment::Positive,
            std::cmp::Ordering::Less => Sentiment::Negative,
            std::cmp::Ordering::Equal => Sentiment::Neutral,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SentimentClassifier {
    positive: Vec<Vec<char>>,
    negative: Vec<Vec<char>>,
    negation: Vec<Vec<char>>,
}

impl SentimentClassifier {
    #[must_use]
    pub fn new(lexicon: &Lexicon) -> Self {
        Self {
            positive: compile_terms(&lexicon.positive),
            negative: compile_terms(&lexicon.negative),
            negation: compile_terms(&lexicon.negation),
        }
    }

    /// Classify the mention occupying `span` (char range) of `snippet`.
    #[must_use]
    pub fn classify(&self, snippet: &str, span: Range<usize>) -> Sentiment {
        let chars = fold(snippet);
        let negations = self.negation_spans(&chars);

        let clause = clause_around(&chars, span);
        let focused = self.tally(&chars, &clause, &negations);
        if !focused.is_empty() {
            return focused.verdict();
        }
        self.tally(&chars, &(0..chars.len()), &negations).verdict()
    }

    /// Classify a whole piece of text with no mention focus.
    #[must_use]
    pub fn classify_text(&self, text: &str) -> Sentiment {
        let chars = fold(text);
        let negations = self.negation_spans(&chars);
        self.tally(&chars, &(0..chars.len()), &negations).verdict()
    }

    fn negation_spans(&self, chars: &[char]) -> Vec<Range<usize>> {
        self.negation
            .iter()
            .flat_map(|term| find_words(chars, term).into_iter().map(|s| s..s + term.len()))
            .collect()
    }

    /// Count lexicon hits lying entirely inside `within`. A negation marker
    /// ending inside the window before a hit flips that hit's polarity.
    fn tally(&self, chars: &[char], within: &Range<usize>, negations: &[Range<usize>]) -> Tally {
        let negated = |hit: usize| {
            let window_start = hit.saturating_sub(NEGATION_WINDOW);
            negations
                .iter()
                .any(|n| n.start >= window_start && n.end <= hit)
        };

        let mut tally = Tally::default();
        for (terms, is_positive) in [(&self.positive, true), (&self.negative, false)] {
            for term in terms {
                for hit in find_words(chars, term) {
                    if hit < within.start || hit + term.len() > within.end {
                        continue;
                    }
                    if is_positive != negated(hit) {
                        tally.positive += 1;
                    } else {
                        tally.negative += 1;
                    }
                }
            }
        }
        tally
    }
}

impl Default for SentimentClassifier {
    fn default() -> Self {
        Self::new(&Lexicon::default())
    }
}

/// The clause of `chars` containing `span`, searching outward from the span's
/// edges for the nearest clause break.
fn clause_around(chars: &[char], span: Range<usize>) -> Range<usize> {
    let start = chars[..span.start.min(chars.len())]
        .iter()
        .rposition(|c| is_clause_break(*c))
        .map_or(0, |i| i + 1);
    let end_from = span.end.min(chars.len());
    let end = chars[end_from..]
        .iter()
        .position(|c| is_clause_break(*c))
        .map_or(chars.len(), |i| end_from + i);
    start..end
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(snippet: &str, name: &str) -> Sentiment {
        let classifier = SentimentClassifier::default();
        let chars: Vec<char> = snippet.chars().collect();
        let name_chars: Vec<char> = name.chars().collect();
        let start = chars
            .windows(name_chars.len())
            .position(|w| w == name_chars.as_slice())
            .expect("name present in snippet");
        classifier.classify(snippet, start..start + name_chars.len())
    }

    #[test]
    fn positive_term_classifies_positive() {
        assert_eq!(
            classify("Acme is an excellent and reliable tool", "Acme"),
            Sentiment::Positive
        );
    }

    #[test]
    fn negative_term_classifies_negative() {
        assert_eq!(
            classify("Globex is slow and buggy", "Globex"),
            Sentiment::Negative
        );
    }

    #[test]
    fn no_terms_is_neutral() {
        assert_eq!(classify("Acme was founded in 2010", "Acme"), Sentiment::Neutral);
    }

    #[test]
    fn negation_flips_positive_to_negative() {
        assert_eq!(classify("Acme is not the best", "Acme"), Sentiment::Negative);
    }

    #[test]
    fn negation_flips_negative_to_positive() {
        assert_eq!(
            classify("Acme is never slow", "Acme"),
            Sentiment::Positive
        );
    }

    #[test]
    fn negation_outside_window_is_ignored() {
        // "not" ends more than 30 chars before "best".
        assert_eq!(
            classify(
                "Acme is not cheap but after a lengthy trial it is the best",
                "Acme"
            ),
            Sentiment::Positive
        );
    }

    #[test]
    fn negation_must_be_a_whole_word() {
        // "note" and "knot" contain "not" but do not negate.
        assert_eq!(
            classify("Acme, note the knot, great", "Acme"),
            Sentiment::Positive
        );
    }

    #[test]
    fn clause_focus_separates_brand_and_competitor() {
        let snippet = "I recommend Acme because it's the best choice, unlike Globex which has issues.";
        assert_eq!(classify(snippet, "Acme"), Sentiment::Positive);
        assert_eq!(classify(snippet, "Globex"), Sentiment::Negative);
    }

    #[test]
    fn empty_clause_falls_back_to_snippet() {
        assert_eq!(
            classify("Acme. It is excellent.", "Acme"),
            Sentiment::Positive
        );
    }

    #[test]
    fn tie_is_neutral() {
        assert_eq!(
            classify("Acme is great but expensive", "Acme"),
            Sentiment::Neutral
        );
    }

    #[test]
    fn curly_apostrophe_negation() {
        assert_eq!(
            classify("Acme doesn’t feel reliable", "Acme"),
            Sentiment::Negative
        );
    }

    #[test]
    fn classify_text_uses_whole_input() {
        let classifier = SentimentClassifier::default();
        assert_eq!(
            classifier.classify_text("Great, great, but awful."),
            Sentiment::Positive
        );
    }
}
