use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One question/answer exchange with the recommended paper.
///
/// Turns are append-only: once created they are never mutated, and the
/// transcript they belong to is cleared only on session reset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub question: String,
    pub answer: String,
    pub asked_at: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            asked_at: Utc::now(),
        }
    }
}
