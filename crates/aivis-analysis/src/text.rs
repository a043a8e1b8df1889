//! Char-level matching helpers shared by the scanner and classifiers.
//!
//! All offsets are char indices, never byte offsets, so positions stay valid
//! for any Unicode input.

/// Case-fold a single char without changing the char count.
///
/// Typographic apostrophes fold to `'` so "doesn’t" matches "doesn't".
pub(crate) fn fold_char(c: char) -> char {
    match c {
        '\u{2019}' | '\u{2018}' => '\'',
        _ => c.to_lowercase().next().unwrap_or(c),
    }
}

/// Case-folded chars of `text`, one output char per input char.
pub(crate) fn fold(text: &str) -> Vec<char> {
    text.chars().map(fold_char).collect()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric()
}

/// Start offsets of every occurrence of `needle` in `haystack` that is not
/// immediately preceded or followed by a letter or digit.
///
/// Both inputs are expected to be folded already. Occurrences may overlap.
pub(crate) fn find_words(haystack: &[char], needle: &[char]) -> Vec<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return Vec::new();
    }

    let mut hits = Vec::new();
    for start in 0..=haystack.len() - needle.len() {
        let end = start + needle.len();
        if haystack[start..end] != *needle {
            continue;
        }
        let clear_before = start == 0 || !is_word_char(haystack[start - 1]);
        let clear_after = end == haystack.len() || !is_word_char(haystack[end]);
        if clear_before && clear_after {
            hits.push(start);
        }
    }
    hits
}

/// Fold and drop blank entries from a configured term list.
pub(crate) fn compile_terms(terms: &[String]) -> Vec<Vec<char>> {
    terms
        .iter()
        .map(|t| fold(t.trim()))
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn respects_word_boundaries() {
        let hay = fold("AcmeX and Acme, plus xAcme and acme");
        let needle = fold("Acme");
        assert_eq!(find_words(&hay, &needle), vec![10, 31]);
    }

    #[test]
    fn digits_count_as_word_chars() {
        let hay = fold("Acme2 Acme 2Acme");
        assert_eq!(find_words(&hay, &fold("acme")), vec![6]);
    }

    #[test]
    fn offsets_are_char_based() {
        let hay = fold("Ünïcode — Acme");
        assert_eq!(find_words(&hay, &fold("acme")), vec![10]);
    }

    #[test]
    fn curly_apostrophe_folds_to_straight() {
        let hay = fold("it doesn’t scale");
        assert_eq!(find_words(&hay, &fold("doesn't")), vec![3]);
    }

    #[test]
    fn empty_needle_matches_nothing() {
        assert!(find_words(&fold("anything"), &[]).is_empty());
    }

    #[test]
    fn compile_terms_drops_blanks() {
        let terms = vec!["Best".to_string(), "  ".to_string(), " top ".to_string()];
        assert_eq!(compile_terms(&terms), vec![fold("best"), fold("top")]);
    }
}
