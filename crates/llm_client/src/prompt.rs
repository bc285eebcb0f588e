//! Prompt construction and line-oriented response parsing.

use common::{Error, Result};

/// Fixed instruction block for the simplification request.
///
/// Compound culinary terms stay as two words — "olive oil" collapsed to
/// "oil" stops matching the right catalog picture.
pub const SYSTEM_PROMPT: &str = "\
You simplify recipe ingredient lines into short image-search terms.

For each numbered ingredient line, output the core ingredient as a 1-2 word \
search term, one per line, in the same order, with no numbering and no other \
text.

Rules:
- singular, lowercase, ingredient only
- strip quantities, units, preparation verbs, and parenthetical notes
- keep compound culinary terms together when splitting them would lose \
meaning: \"olive oil\", \"soy sauce\", \"rice vinegar\" stay two words
- never output an empty line";

/// Enumerate the miss list into the user prompt.
pub fn build_prompt(raw: &[String]) -> String {
    let mut prompt =
        String::from("Simplify these ingredient lines into search terms:\n\n");
    for (i, ingredient) in raw.iter().enumerate() {
        prompt.push_str(&format!("{}. {}\n", i + 1, ingredient));
    }
    prompt
}

/// Strip any leading enumeration markup the model added anyway.
fn strip_enumeration(line: &str) -> &str {
    let trimmed = line.trim();

    // Bullet markers.
    if let Some(rest) = trimmed.strip_prefix("- ").or_else(|| trimmed.strip_prefix("* ")) {
        return rest.trim();
    }

    // "12." / "12)" numbering.
    let digits = trimmed.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let after = &trimmed[digits..];
        if let Some(rest) = after.strip_prefix('.').or_else(|| after.strip_prefix(')')) {
            return rest.trim();
        }
    }

    trimmed
}

/// Parse the response into exactly `expected` terms, line *i* aligned with
/// input *i*. Any other shape is a total-batch failure by design — a partial
/// parse could silently misalign terms with ingredients.
pub fn parse_terms(text: &str, expected: usize) -> Result<Vec<String>> {
    let terms: Vec<String> = text
        .lines()
        .map(strip_enumeration)
        .filter(|line| !line.is_empty())
        .map(|line| line.to_lowercase())
        .collect();

    if terms.len() != expected {
        return Err(Error::MalformedCompletion(format!(
            "expected {} terms, got {}",
            expected,
            terms.len()
        )));
    }

    Ok(terms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_prompt_enumerates_in_order() {
        let raw = vec!["2 tbsp olive oil".to_string(), "3 cloves garlic".to_string()];
        let prompt = build_prompt(&raw);
        assert!(prompt.contains("1. 2 tbsp olive oil\n"));
        assert!(prompt.contains("2. 3 cloves garlic\n"));
    }

    #[test]
    fn test_parse_plain_lines() {
        let terms = parse_terms("olive oil\nbroth\ngarlic\n", 3).unwrap();
        assert_eq!(terms, vec!["olive oil", "broth", "garlic"]);
    }

    #[test]
    fn test_parse_strips_enumeration_markup() {
        let terms = parse_terms("1. olive oil\n2) broth\n- garlic\n* Flour", 4).unwrap();
        assert_eq!(terms, vec!["olive oil", "broth", "garlic", "flour"]);
    }

    #[test]
    fn test_parse_skips_blank_lines() {
        let terms = parse_terms("\nolive oil\n\ngarlic\n\n", 2).unwrap();
        assert_eq!(terms, vec!["olive oil", "garlic"]);
    }

    #[test]
    fn test_parse_count_mismatch_is_error() {
        assert!(parse_terms("olive oil\ngarlic", 3).is_err());
        assert!(parse_terms("", 1).is_err());
        assert!(parse_terms("a\nb\nc", 2).is_err());
    }
}
