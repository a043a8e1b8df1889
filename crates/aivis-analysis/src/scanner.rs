//! Entity mention scanning.

use std::ops::Range;

use aivis_core::EntityType;

use crate::text::{find_words, fold};

/// Chars of context captured on each side of a match.
pub const SNIPPET_RADIUS: usize = 50;

const ELLIPSIS: &str = "...";

/// One raw occurrence of a candidate name, before annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedMention {
    /// The candidate as configured, not the matched text.
    pub entity_name: String,
    pub entity_type: EntityType,
    /// Char offset of the match start in the full response.
    pub char_position: usize,
    pub context_snippet: String,
    /// Char range of the match inside `context_snippet`.
    pub span_in_snippet: Range<usize>,
}

/// Find every word-bounded, case-insensitive occurrence of each candidate.
///
/// Occurrences are returned grouped by candidate in the order given, and
/// within a candidate by ascending offset. Blank candidates are skipped.
/// Overlapping matches from different candidates are all kept.
pub fn scan<'a>(
    text: &str,
    candidates: impl IntoIterator<Item = (&'a str, EntityType)>,
) -> Vec<ScannedMention> {
    let original: Vec<char> = text.chars().collect();
    let folded = fold(text);
    let mut found = Vec::new();

    for (name, entity_type) in candidates {
        let name = name.trim();
        let needle = fold(name);
        if needle.is_empty() {
            continue;
        }
        for start in find_words(&folded, &needle) {
            found.push(capture(&original, name, entity_type, start, needle.len()));
        }
    }
    found
}

fn capture(
    original: &[char],
    name: &str,
    entity_type: EntityType,
    start: usize,
    len: usize,
) -> ScannedMention {
    let end = start + len;
    let ctx_start = start.saturating_sub(SNIPPET_RADIUS);
    let ctx_end = (end + SNIPPET_RADIUS).min(original.len());

    let mut snippet = String::new();
    let mut lead = 0;
    if ctx_start > 0 {
        snippet.push_str(ELLIPSIS);
        lead = ELLIPSIS.len();
    }
    snippet.extend(&original[ctx_start..ctx_end]);
    if ctx_end < original.len() {
        snippet.push_str(ELLIPSIS);
    }

    let offset = lead + (start - ctx_start);
    ScannedMention {
        entity_name: name.to_string(),
        entity_type,
        char_position: start,
        context_snippet: snippet,
        span_in_snippet: offset..offset + len,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(found: &[ScannedMention]) -> Vec<(&str, usize)> {
        found
            .iter()
            .map(|m| (m.entity_name.as_str(), m.char_position))
            .collect()
    }

    #[test]
    fn does_not_match_inside_larger_words() {
        let found = scan(
            "AcmeX is not Acme, and SuperAcme is neither.",
            [("Acme", EntityType::Brand)],
        );
        assert_eq!(names(&found), vec![("Acme", 13)]);
    }

    #[test]
    fn matching_is_case_insensitive_and_keeps_configured_name() {
        let found = scan("ACME and acme", [("Acme", EntityType::Brand)]);
        assert_eq!(names(&found), vec![("Acme", 0), ("Acme", 9)]);
    }

    #[test]
    fn alias_and_name_overlap_both_reported() {
        let found = scan(
            "Try Acme CRM today.",
            [("Acme", EntityType::Brand), ("Acme CRM", EntityType::Brand)],
        );
        assert_eq!(names(&found), vec![("Acme", 4), ("Acme CRM", 4)]);
    }

    #[test]
    fn blank_candidates_are_ignored() {
        let found = scan("anything", [("  ", EntityType::Competitor)]);
        assert!(found.is_empty());
    }

    #[test]
    fn short_text_snippet_has_no_ellipsis() {
        let found = scan("Use Globex.", [("Globex", EntityType::Competitor)]);
        assert_eq!(found[0].context_snippet, "Use Globex.");
        assert_eq!(found[0].span_in_snippet, 4..10);
    }

    #[test]
    fn long_text_snippet_is_clipped_with_markers() {
        let text = format!("{}Acme{}", "a ".repeat(40), " b".repeat(40));
        let found = scan(&text, [("Acme", EntityType::Brand)]);
        let m = &found[0];
        assert_eq!(m.char_position, 80);
        assert!(m.context_snippet.starts_with("..."));
        assert!(m.context_snippet.ends_with("..."));
        // 3 + 50 + 4 + 50 + 3
        assert_eq!(m.context_snippet.chars().count(), 110);

        let span: String = m
            .context_snippet
            .chars()
            .skip(m.span_in_snippet.start)
            .take(m.span_in_snippet.len())
            .collect();
        assert_eq!(span, "Acme");
    }

    #[test]
    fn offsets_count_chars_not_bytes() {
        let found = scan("Ça marche: Acme", [("Acme", EntityType::Brand)]);
        assert_eq!(found[0].char_position, 11);
    }
}
