//! Session, recommendation, and chat DTOs for the v1 API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{ConversationTurn, Recommendation};
use crate::services::Session;

/// Request body for `POST /v1/sessions/{sessionId}/recommend`.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecommendRequest {
    /// Free-text query to match against the corpus.
    pub query: String,
}

/// Request body for `POST /v1/sessions/{sessionId}/chat`.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    /// Follow-up question for the recommended paper.
    pub question: String,
}

/// The recommended paper with its confidence and summary.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationDto {
    pub title: String,
    pub author: String,
    pub url: String,
    pub pmid: String,
    /// Rendered confidence, e.g. `"High: 0.68"`.
    pub confidence: String,
    /// Raw mean relevance score behind the label.
    pub confidence_score: f64,
    pub summary: String,
}

impl From<Recommendation> for RecommendationDto {
    fn from(rec: Recommendation) -> Self {
        Self {
            confidence: rec.confidence.render(),
            confidence_score: rec.confidence.score,
            title: rec.title,
            author: rec.author,
            url: rec.url,
            pmid: rec.pmid,
            summary: rec.summary,
        }
    }
}

/// One transcript entry.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TurnDto {
    pub question: String,
    pub answer: String,
    #[schema(value_type = String)]
    pub asked_at: DateTime<Utc>,
}

impl From<ConversationTurn> for TurnDto {
    fn from(turn: ConversationTurn) -> Self {
        Self {
            question: turn.question,
            answer: turn.answer,
            asked_at: turn.asked_at,
        }
    }
}

/// Full session view: FSM phase, current recommendation, transcript.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub session_id: String,
    /// One of `browsing`, `showing_recommendation`, `chatting`.
    pub phase: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<RecommendationDto>,
    pub transcript: Vec<TurnDto>,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        Self {
            session_id: session.id,
            phase: session.phase.to_string(),
            recommendation: session.recommendation.map(Into::into),
            transcript: session.transcript.into_iter().map(Into::into).collect(),
        }
    }
}

/// Response for `POST /v1/sessions/{sessionId}/chat`.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub question: String,
    pub answer: String,
    #[schema(value_type = String)]
    pub asked_at: DateTime<Utc>,
    /// Transcript length after this turn; grows by exactly one per ask.
    pub transcript_length: usize,
}

/// Response for `DELETE /v1/sessions/{sessionId}`.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSessionResponse {
    pub deleted: bool,
}
