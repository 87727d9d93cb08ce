use serde::{Deserialize, Serialize};

/// Explicit interaction state, replacing rerun-on-interaction UI semantics
/// with a small state machine over discrete user actions.
///
/// Legal transitions:
/// - `Browsing` --recommend--> `ShowingRecommendation`
/// - `ShowingRecommendation` --recommend--> `ShowingRecommendation`
/// - `ShowingRecommendation` --start_chat--> `Chatting`
/// - any --reset--> `Browsing`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Browsing,
    ShowingRecommendation,
    Chatting,
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Browsing => write!(f, "browsing"),
            Self::ShowingRecommendation => write!(f, "showing_recommendation"),
            Self::Chatting => write!(f, "chatting"),
        }
    }
}
