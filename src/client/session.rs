//! Client view state machine.
//!
//! ```text
//!            select_file            begin_generation
//!   Idle ───────────────▶ Selected ─────────────────▶ Generating
//!    ▲                       ▲                          │      │
//!    │ reset                 │ select_file     succeeded│      │failed
//!    │                       │                          ▼      ▼
//!    └──────────────────── Ready ◀──────────────┐    Ready   Failed
//!                                                └── begin_generation (retry)
//! ```
//!
//! The session owns no I/O. Requests are issued by
//! [`crate::client::http::StudyClient`], which moves the session through
//! `Generating` and back. Clipboard and download side effects are returned
//! as [`Effect`] values for the host UI to carry out.

use crate::material::{Flashcard, QuizItem, StudyMaterial};

/// Colour scheme preference, passed in at session start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Explicit session configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Base URL of the study service, e.g. `http://localhost:5000`.
    pub api_base: String,
    pub theme: Theme,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:5000".to_string(),
            theme: Theme::default(),
        }
    }
}

/// A file chosen by the user, not yet uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub file_name: String,
    /// Declared MIME type, if the host knows it.
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl SelectedFile {
    pub fn new(file_name: impl Into<String>, content_type: Option<&str>, data: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.map(str::to_string),
            data,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Flashcards,
    Quiz,
    Summary,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Flashcards, Tab::Quiz, Tab::Summary];

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Flashcards => "Flashcards",
            Tab::Quiz => "Quiz",
            Tab::Summary => "Summary",
        }
    }
}

/// Which side of a flashcard is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CardFace {
    #[default]
    Unrevealed,
    Revealed,
}

/// Answer state of one quiz question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizAnswer {
    Unanswered { selected: Option<usize> },
    Submitted { selected: usize },
}

impl Default for QuizAnswer {
    fn default() -> Self {
        QuizAnswer::Unanswered { selected: None }
    }
}

/// Side effects the host UI must perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Clipboard(String),
    Download { file_name: String, contents: String },
}

/// The tabbed result view held in [`SessionState::Ready`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResultView {
    material: StudyMaterial,
    truncated: bool,
    tab: Tab,
    card_index: usize,
    card_faces: Vec<CardFace>,
    question_index: usize,
    answers: Vec<QuizAnswer>,
    download_name: String,
}

impl ResultView {
    fn new(material: StudyMaterial, truncated: bool, source_name: &str) -> Self {
        let card_faces = vec![CardFace::default(); material.flashcards.len()];
        let answers = vec![QuizAnswer::default(); material.quiz.len()];
        Self {
            material,
            truncated,
            tab: Tab::default(),
            card_index: 0,
            card_faces,
            question_index: 0,
            answers,
            download_name: download_name_for(source_name),
        }
    }

    pub fn material(&self) -> &StudyMaterial {
        &self.material
    }

    /// Whether the source text was cut before generation.
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn select_tab(&mut self, tab: Tab) {
        self.tab = tab;
    }

    // ── Navigation (applies to the active tab) ───────────────────────────

    fn len_and_index(&mut self) -> Option<(usize, &mut usize)> {
        match self.tab {
            Tab::Flashcards => Some((self.material.flashcards.len(), &mut self.card_index)),
            Tab::Quiz => Some((self.material.quiz.len(), &mut self.question_index)),
            Tab::Summary => None,
        }
    }

    pub fn next(&mut self) {
        if let Some((len, idx)) = self.len_and_index() {
            if *idx + 1 < len {
                *idx += 1;
            }
        }
    }

    pub fn previous(&mut self) {
        if let Some((_, idx)) = self.len_and_index() {
            *idx = idx.saturating_sub(1);
        }
    }

    /// Jump to item `index`, clamped to the last item.
    pub fn jump_to(&mut self, index: usize) {
        if let Some((len, idx)) = self.len_and_index() {
            *idx = index.min(len.saturating_sub(1));
        }
    }

    /// Current index and item count for the active tab.
    pub fn position(&self) -> Option<(usize, usize)> {
        match self.tab {
            Tab::Flashcards => Some((self.card_index, self.material.flashcards.len())),
            Tab::Quiz => Some((self.question_index, self.material.quiz.len())),
            Tab::Summary => None,
        }
    }

    // ── Flashcards ───────────────────────────────────────────────────────

    pub fn current_card(&self) -> Option<(&Flashcard, CardFace)> {
        let card = self.material.flashcards.get(self.card_index)?;
        Some((card, self.card_faces[self.card_index]))
    }

    /// Turn the current card over.
    pub fn flip_card(&mut self) {
        if let Some(face) = self.card_faces.get_mut(self.card_index) {
            *face = match face {
                CardFace::Unrevealed => CardFace::Revealed,
                CardFace::Revealed => CardFace::Unrevealed,
            };
        }
    }

    // ── Quiz ─────────────────────────────────────────────────────────────

    pub fn current_question(&self) -> Option<(&QuizItem, QuizAnswer)> {
        let item = self.material.quiz.get(self.question_index)?;
        Some((item, self.answers[self.question_index]))
    }

    /// Select option `option` for the current question. Ignored once submitted
    /// or when out of range.
    pub fn choose_option(&mut self, option: usize) {
        let Some(item) = self.material.quiz.get(self.question_index) else {
            return;
        };
        if option >= item.options.len() {
            return;
        }
        if let Some(answer @ QuizAnswer::Unanswered { .. }) =
            self.answers.get_mut(self.question_index)
        {
            *answer = QuizAnswer::Unanswered {
                selected: Some(option),
            };
        }
    }

    /// Submit the selected option. Returns whether it was correct, or None
    /// when nothing is selected or the question was already submitted.
    pub fn submit_answer(&mut self) -> Option<bool> {
        let idx = self.question_index;
        let item = self.material.quiz.get(idx)?;
        match self.answers.get(idx).copied()? {
            QuizAnswer::Unanswered {
                selected: Some(selected),
            } => {
                self.answers[idx] = QuizAnswer::Submitted { selected };
                Some(item.is_correct(selected))
            }
            _ => None,
        }
    }

    /// Number of submitted questions answered correctly.
    pub fn score(&self) -> usize {
        self.answers
            .iter()
            .zip(&self.material.quiz)
            .filter(|(a, q)| matches!(a, QuizAnswer::Submitted { selected } if q.is_correct(*selected)))
            .count()
    }

    // ── Side effects ─────────────────────────────────────────────────────

    /// Copy the item under view: the current card, the current question, or
    /// the summary.
    pub fn copy_current(&self) -> Option<Effect> {
        let text = match self.tab {
            Tab::Flashcards => {
                let card = self.material.flashcards.get(self.card_index)?;
                format!("Q: {}\nA: {}", card.question, card.answer)
            }
            Tab::Quiz => self.material.quiz.get(self.question_index)?.clipboard_text(),
            Tab::Summary => self.material.summary.clone(),
        };
        Some(Effect::Clipboard(text))
    }

    /// The whole material as a downloadable text file.
    pub fn download(&self) -> Effect {
        Effect::Download {
            file_name: self.download_name.clone(),
            contents: self.material.to_plain_text(),
        }
    }
}

fn download_name_for(source_name: &str) -> String {
    let stem = std::path::Path::new(source_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("study");
    format!("{stem}-study-material.txt")
}

/// Top-level session state.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Idle,
    Selected { file: SelectedFile },
    Generating { file: SelectedFile },
    Ready { file: SelectedFile, view: ResultView },
    Failed { file: SelectedFile, message: String },
}

/// One user's session.
#[derive(Debug, Clone)]
pub struct StudySession {
    config: SessionConfig,
    state: SessionState,
}

impl StudySession {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            state: SessionState::Idle,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn toggle_theme(&mut self) {
        self.config.theme = match self.config.theme {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        };
    }

    pub fn is_generating(&self) -> bool {
        matches!(self.state, SessionState::Generating { .. })
    }

    /// Whether the generate trigger is enabled.
    pub fn can_generate(&self) -> bool {
        matches!(
            self.state,
            SessionState::Selected { .. } | SessionState::Ready { .. } | SessionState::Failed { .. }
        )
    }

    pub fn error(&self) -> Option<&str> {
        match self.state {
            SessionState::Failed { ref message, .. } => Some(message),
            _ => None,
        }
    }

    pub fn view(&self) -> Option<&ResultView> {
        match self.state {
            SessionState::Ready { ref view, .. } => Some(view),
            _ => None,
        }
    }

    pub fn view_mut(&mut self) -> Option<&mut ResultView> {
        match self.state {
            SessionState::Ready { ref mut view, .. } => Some(view),
            _ => None,
        }
    }

    /// Choose a file. Discards any previous result or error.
    /// Ignored while a request is in flight.
    pub fn select_file(&mut self, file: SelectedFile) -> bool {
        if self.is_generating() {
            return false;
        }
        self.state = SessionState::Selected { file };
        true
    }

    /// Enter `Generating` and hand back the file to upload.
    ///
    /// Returns None (and changes nothing) when the trigger is disabled:
    /// no file chosen, or a request already in flight.
    pub fn begin_generation(&mut self) -> Option<SelectedFile> {
        if !self.can_generate() {
            return None;
        }
        let file = match std::mem::replace(&mut self.state, SessionState::Idle) {
            SessionState::Selected { file }
            | SessionState::Ready { file, .. }
            | SessionState::Failed { file, .. } => file,
            // can_generate() excluded every other state
            other => {
                self.state = other;
                return None;
            }
        };
        self.state = SessionState::Generating { file: file.clone() };
        Some(file)
    }

    /// Both requests succeeded. Ignored unless generating.
    pub fn generation_succeeded(&mut self, material: StudyMaterial, truncated: bool) {
        if let Some(file) = self.take_generating_file() {
            let view = ResultView::new(material, truncated, &file.file_name);
            self.state = SessionState::Ready { file, view };
        }
    }

    /// Either request failed. Ignored unless generating.
    pub fn generation_failed(&mut self, message: impl Into<String>) {
        if let Some(file) = self.take_generating_file() {
            self.state = SessionState::Failed {
                file,
                message: message.into(),
            };
        }
    }

    /// Leave `Generating`, handing back its file. Any other state is kept.
    fn take_generating_file(&mut self) -> Option<SelectedFile> {
        if !self.is_generating() {
            return None;
        }
        match std::mem::replace(&mut self.state, SessionState::Idle) {
            SessionState::Generating { file } => Some(file),
            other => {
                self.state = other;
                None
            }
        }
    }

    /// Back to `Idle`. Ignored while a request is in flight.
    pub fn reset(&mut self) {
        if !self.is_generating() {
            self.state = SessionState::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file() -> SelectedFile {
        SelectedFile::new("biology notes.txt", Some("text/plain"), b"cells".to_vec())
    }

    fn material() -> StudyMaterial {
        StudyMaterial {
            flashcards: (0..5)
                .map(|i| Flashcard {
                    question: format!("Q{i}"),
                    answer: format!("A{i}"),
                })
                .collect(),
            quiz: (0..3)
                .map(|i| QuizItem {
                    question: format!("Question {i}"),
                    options: vec![
                        "A) one".into(),
                        "B) two".into(),
                        "C) three".into(),
                        "D) four".into(),
                    ],
                    answer: "C".into(),
                })
                .collect(),
            summary: "Cells are small. They divide.".into(),
        }
    }

    fn ready() -> StudySession {
        let mut s = StudySession::new(SessionConfig::default());
        s.select_file(file());
        s.begin_generation().unwrap();
        s.generation_succeeded(material(), false);
        s
    }

    #[test]
    fn idle_cannot_generate() {
        let mut s = StudySession::new(SessionConfig::default());
        assert!(!s.can_generate());
        assert!(s.begin_generation().is_none());
        assert_eq!(s.state(), &SessionState::Idle);
    }

    #[test]
    fn happy_path_reaches_ready_on_flashcards() {
        let s = ready();
        let view = s.view().unwrap();
        assert_eq!(view.tab(), Tab::Flashcards);
        assert_eq!(view.position(), Some((0, 5)));
        assert!(!view.truncated());
    }

    #[test]
    fn second_trigger_while_generating_is_noop() {
        let mut s = StudySession::new(SessionConfig::default());
        s.select_file(file());
        assert!(s.begin_generation().is_some());
        assert!(s.begin_generation().is_none());
        assert!(s.is_generating());
        assert!(!s.select_file(file()));
        s.reset();
        assert!(s.is_generating());
    }

    #[test]
    fn failure_then_select_clears_error() {
        let mut s = StudySession::new(SessionConfig::default());
        s.select_file(file());
        s.begin_generation();
        s.generation_failed("Upload failed");
        assert_eq!(s.error(), Some("Upload failed"));
        assert!(s.can_generate());

        s.select_file(file());
        assert_eq!(s.error(), None);
        assert!(matches!(s.state(), SessionState::Selected { .. }));
    }

    #[test]
    fn retry_from_failed_restarts_flow() {
        let mut s = StudySession::new(SessionConfig::default());
        s.select_file(file());
        s.begin_generation();
        s.generation_failed("boom");
        let again = s.begin_generation().unwrap();
        assert_eq!(again, file());
        assert_eq!(s.error(), None);
        assert!(s.is_generating());
    }

    #[test]
    fn outcomes_ignored_unless_generating() {
        let mut s = StudySession::new(SessionConfig::default());
        s.generation_succeeded(material(), false);
        assert_eq!(s.state(), &SessionState::Idle);
        s.select_file(file());
        s.generation_failed("late");
        assert!(matches!(s.state(), SessionState::Selected { .. }));
    }

    #[test]
    fn late_outcome_keeps_ready_result() {
        let mut s = ready();
        s.view_mut().unwrap().jump_to(3);

        s.generation_failed("late");
        assert_eq!(s.error(), None);
        assert_eq!(s.view().unwrap().position(), Some((3, 5)));

        s.generation_succeeded(StudyMaterial::default(), true);
        let view = s.view().unwrap();
        assert_eq!(view.material().flashcards.len(), 5);
        assert!(!view.truncated());
    }

    #[test]
    fn late_outcome_keeps_failed_message() {
        let mut s = StudySession::new(SessionConfig::default());
        s.select_file(file());
        s.begin_generation();
        s.generation_failed("first");
        s.generation_succeeded(material(), false);
        assert_eq!(s.error(), Some("first"));
    }

    #[test]
    fn reset_returns_to_idle() {
        let mut s = ready();
        s.reset();
        assert_eq!(s.state(), &SessionState::Idle);
        assert!(s.view().is_none());
    }

    #[test]
    fn navigation_clamps() {
        let mut s = ready();
        let v = s.view_mut().unwrap();
        v.previous();
        assert_eq!(v.position(), Some((0, 5)));
        v.jump_to(99);
        assert_eq!(v.position(), Some((4, 5)));
        v.next();
        assert_eq!(v.position(), Some((4, 5)));
        v.select_tab(Tab::Summary);
        assert_eq!(v.position(), None);
        v.next();
        v.select_tab(Tab::Flashcards);
        assert_eq!(v.position(), Some((4, 5)));
    }

    #[test]
    fn card_faces_are_independent() {
        let mut s = ready();
        let v = s.view_mut().unwrap();
        v.flip_card();
        assert_eq!(v.current_card().unwrap().1, CardFace::Revealed);
        v.next();
        assert_eq!(v.current_card().unwrap().1, CardFace::Unrevealed);
        v.previous();
        assert_eq!(v.current_card().unwrap().1, CardFace::Revealed);
        v.flip_card();
        assert_eq!(v.current_card().unwrap().1, CardFace::Unrevealed);
    }

    #[test]
    fn quiz_select_then_submit() {
        let mut s = ready();
        let v = s.view_mut().unwrap();
        v.select_tab(Tab::Quiz);

        assert_eq!(v.submit_answer(), None);
        v.choose_option(0);
        v.choose_option(2);
        assert_eq!(
            v.current_question().unwrap().1,
            QuizAnswer::Unanswered { selected: Some(2) }
        );
        assert_eq!(v.submit_answer(), Some(true));
        assert_eq!(v.submit_answer(), None);

        v.choose_option(1);
        assert_eq!(
            v.current_question().unwrap().1,
            QuizAnswer::Submitted { selected: 2 }
        );

        v.next();
        v.choose_option(7);
        assert_eq!(
            v.current_question().unwrap().1,
            QuizAnswer::Unanswered { selected: None }
        );
        v.choose_option(0);
        assert_eq!(v.submit_answer(), Some(false));
        assert_eq!(v.score(), 1);
    }

    #[test]
    fn copy_follows_active_tab() {
        let mut s = ready();
        let v = s.view_mut().unwrap();
        assert_eq!(v.copy_current(), Some(Effect::Clipboard("Q: Q0\nA: A0".into())));
        v.select_tab(Tab::Quiz);
        match v.copy_current() {
            Some(Effect::Clipboard(text)) => assert!(text.ends_with("Answer: C")),
            other => panic!("unexpected {other:?}"),
        }
        v.select_tab(Tab::Summary);
        assert_eq!(
            v.copy_current(),
            Some(Effect::Clipboard("Cells are small. They divide.".into()))
        );
    }

    #[test]
    fn download_is_named_after_source() {
        let s = ready();
        match s.view().unwrap().download() {
            Effect::Download {
                file_name,
                contents,
            } => {
                assert_eq!(file_name, "biology notes-study-material.txt");
                assert!(contents.contains("SUMMARY"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn theme_toggles() {
        let mut s = StudySession::new(SessionConfig::default());
        assert_eq!(s.config().theme, Theme::Light);
        s.toggle_theme();
        assert_eq!(s.config().theme, Theme::Dark);
    }
}
