//! Client side of the study tool: the view state machine and the HTTP
//! transport that drives it.

pub mod http;
pub mod session;

pub use http::StudyClient;
pub use session::{
    CardFace, Effect, QuizAnswer, ResultView, SelectedFile, SessionConfig, SessionState,
    StudySession, Tab, Theme,
};
