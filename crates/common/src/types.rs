//! Small shared helpers for ingredient string identity.

/// Canonical lookup key for a raw ingredient string.
///
/// Raw ingredients are compared by trimmed, lowercased equality — "1 cup
/// Flour " and "1 cup flour" are the same ingredient for cache and dedup
/// purposes, but remain distinct strings to the caller.
pub fn ingredient_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Last whitespace-separated word of a term, if the term has more than one.
///
/// Used as the single broadening fallback for catalog lookups ("fresh basil"
/// → "basil"). Returns `None` for single-word terms so the caller never
/// re-queries the same string.
pub fn last_word(term: &str) -> Option<&str> {
    let mut words = term.split_whitespace();
    let first = words.next()?;
    let last = words.last();
    match last {
        Some(w) if w != first => Some(w),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingredient_key_trims_and_lowercases() {
        assert_eq!(ingredient_key("  1 cup Flour "), "1 cup flour");
        assert_eq!(ingredient_key("garlic"), "garlic");
    }

    #[test]
    fn test_last_word_multi() {
        assert_eq!(last_word("olive oil"), Some("oil"));
        assert_eq!(last_word("low sodium chicken broth"), Some("broth"));
    }

    #[test]
    fn test_last_word_single() {
        assert_eq!(last_word("garlic"), None);
        assert_eq!(last_word(""), None);
        assert_eq!(last_word("  basil  "), None);
    }
}
