//! Prompts for study-material generation.
//!
//! Every prompt lives here so the wording can be changed (and inspected by
//! tests) without touching the call or parsing logic. Callers can override
//! the system prompt via [`crate::config::GenerationConfig::system_prompt`].

/// Default system prompt.
pub const DEFAULT_SYSTEM_PROMPT: &str = r#"You are a study assistant. You turn a student's notes into study material.
You answer with a single JSON object and nothing else: no prose, no explanations."#;

/// Template for the user message. `{text}` is replaced with the notes.
pub const GENERATION_TEMPLATE: &str = r#"Create study material from the notes below.

Return ONLY a JSON object with exactly this shape:

{
  "flashcards": [
    { "question": "...", "answer": "..." }
  ],
  "quiz": [
    {
      "question": "...",
      "options": ["A) ...", "B) ...", "C) ...", "D) ..."],
      "answer": "A"
    }
  ],
  "summary": "..."
}

Rules:
- 5 to 8 flashcards.
- 3 to 5 quiz questions, each with exactly 4 options labelled "A) ", "B) ", "C) ", "D) ".
- "answer" is the single letter of the one correct option.
- "summary" is 3 to 5 sentences.
- Do NOT wrap the JSON in ``` fences.

Notes:
"""
{text}
""""#;

/// Build the user message for the given (already truncated) text.
pub fn generation_prompt(text: &str) -> String {
    GENERATION_TEMPLATE.replace("{text}", text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_text_once() {
        let p = generation_prompt("photosynthesis converts light");
        assert_eq!(p.matches("photosynthesis converts light").count(), 1);
        assert!(!p.contains("{text}"));
    }

    #[test]
    fn prompt_names_every_field() {
        for field in ["\"flashcards\"", "\"quiz\"", "\"options\"", "\"answer\"", "\"summary\""] {
            assert!(GENERATION_TEMPLATE.contains(field), "missing {field}");
        }
    }
}
