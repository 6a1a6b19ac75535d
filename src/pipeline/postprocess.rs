//! Post-processing: model reply → [`StudyMaterial`], and input truncation.
//!
//! Models are told not to wrap their JSON in Markdown fences and routinely do
//! it anyway. We strip one outer fence (with or without a language tag) and
//! parse what remains. Anything else is left alone: there is no repair pass
//! and no second attempt.

use crate::error::StudyError;
use crate::material::StudyMaterial;
use once_cell::sync::Lazy;
use regex::Regex;

static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```[A-Za-z]*[ \t]*\r?\n(.*?)\r?\n?```$").unwrap());

/// Remove one outer ```` ``` ```` / ```` ```json ```` fence, if present.
pub fn strip_code_fences(input: &str) -> &str {
    let trimmed = input.trim();
    match RE_OUTER_FENCES.captures(trimmed) {
        Some(caps) => caps.get(1).map_or(trimmed, |m| m.as_str().trim()),
        None => trimmed,
    }
}

/// Parse a raw model reply into study material.
pub fn parse_study_material(raw: &str) -> Result<StudyMaterial, StudyError> {
    let body = strip_code_fences(raw);
    serde_json::from_str(body).map_err(|e| StudyError::InvalidGeneratorOutput {
        detail: e.to_string(),
    })
}

/// Cut `text` to at most `max_chars` characters.
///
/// Returns the kept prefix and whether anything was dropped. Counts chars,
/// not bytes, so multi-byte text is never split mid-character.
pub fn truncate_chars(text: &str, max_chars: usize) -> (&str, bool) {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => (&text[..byte_idx], true),
        None => (text, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
  "flashcards": [{"question": "What is ATP?", "answer": "Energy currency"}],
  "quiz": [{"question": "ATP stands for?", "options": ["A) Adenosine triphosphate", "B) Acetyl", "C) Amino", "D) None"], "answer": "A"}],
  "summary": "ATP stores energy."
}"#;

    #[test]
    fn test_strip_fences_json_tag() {
        let input = format!("```json\n{BODY}\n```");
        assert_eq!(strip_code_fences(&input), BODY);
    }

    #[test]
    fn test_strip_fences_no_lang() {
        let input = format!("```\n{BODY}\n```\n");
        assert_eq!(strip_code_fences(&input), BODY);
    }

    #[test]
    fn test_no_fences_passthrough() {
        assert_eq!(strip_code_fences(BODY), BODY);
    }

    #[test]
    fn fenced_and_bare_parse_equal() {
        let bare = parse_study_material(BODY).unwrap();
        let fenced = parse_study_material(&format!("```json\n{BODY}\n```")).unwrap();
        let crlf = parse_study_material(&format!("```json\r\n{BODY}\r\n```")).unwrap();
        assert_eq!(bare, fenced);
        assert_eq!(bare, crlf);
        assert_eq!(bare.quiz[0].correct_option(), Some(0));
    }

    #[test]
    fn prose_is_a_format_error() {
        let err = parse_study_material("Sure! Here are your flashcards: ...").unwrap_err();
        assert!(matches!(err, StudyError::InvalidGeneratorOutput { .. }));
    }

    #[test]
    fn json_array_is_a_format_error() {
        let err = parse_study_material("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, StudyError::InvalidGeneratorOutput { .. }));
    }

    #[test]
    fn truncation_counts_chars() {
        assert_eq!(truncate_chars("hello", 10), ("hello", false));
        assert_eq!(truncate_chars("hello", 5), ("hello", false));
        assert_eq!(truncate_chars("hello", 3), ("hel", true));
        assert_eq!(truncate_chars("héllo", 2), ("hé", true));
        assert_eq!(truncate_chars("", 0), ("", false));
    }
}
