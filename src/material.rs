//! Study material produced by the generator, plus its plain-text renderings.
//!
//! The JSON shape is fixed by the prompt in [`crate::prompts`]. Fields are
//! read with optional-field semantics: a reply missing `quiz` yields an empty
//! quiz rather than an error, but a reply where `quiz` is a string is a format
//! error. Counts (5–8 cards, 3–5 questions) and the answer-letter invariant
//! are requested from the model and not re-checked here.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// One question/answer flashcard.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Flashcard {
    pub question: String,
    pub answer: String,
}

/// One multiple-choice question.
///
/// `options` are expected to be prefixed with their letter ("A) …"), and
/// `answer` to be the single letter of the correct one.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizItem {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
}

impl QuizItem {
    /// Index of the option whose text starts with the answer letter.
    pub fn correct_option(&self) -> Option<usize> {
        let answer = self.answer.trim();
        if answer.is_empty() {
            return None;
        }
        self.options.iter().position(|o| o.trim_start().starts_with(answer))
    }

    /// Whether choosing option `index` answers the question correctly.
    pub fn is_correct(&self, index: usize) -> bool {
        self.correct_option() == Some(index)
    }

    /// Question, options and answer as copied to the clipboard.
    pub fn clipboard_text(&self) -> String {
        format!(
            "{}\n{}\nAnswer: {}",
            self.question,
            self.options.join("\n"),
            self.answer
        )
    }
}

/// The flashcards/quiz/summary triple.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyMaterial {
    pub flashcards: Vec<Flashcard>,
    pub quiz: Vec<QuizItem>,
    pub summary: String,
}

impl StudyMaterial {
    /// Render the whole material as plain text for download.
    ///
    /// This is a one-way rendering; there is no parser for it.
    pub fn to_plain_text(&self) -> String {
        let mut out = String::new();

        out.push_str("FLASHCARDS\n==========\n\n");
        for (i, card) in self.flashcards.iter().enumerate() {
            let _ = writeln!(out, "{}. Q: {}", i + 1, card.question);
            let _ = writeln!(out, "   A: {}\n", card.answer);
        }

        out.push_str("QUIZ\n====\n\n");
        for (i, item) in self.quiz.iter().enumerate() {
            let _ = writeln!(out, "{}. {}", i + 1, item.question);
            for opt in &item.options {
                let _ = writeln!(out, "   {opt}");
            }
            let _ = writeln!(out, "   Answer: {}\n", item.answer);
        }

        out.push_str("SUMMARY\n=======\n\n");
        out.push_str(self.summary.trim());
        out.push('\n');
        out
    }
}

/// Result of one generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOutcome {
    pub material: StudyMaterial,
    /// True when the input exceeded the character budget and was cut.
    pub truncated: bool,
    /// Number of characters actually sent to the model.
    pub submitted_chars: usize,
}
