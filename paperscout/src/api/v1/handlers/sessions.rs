//! v1 Session handlers: the FSM surface for recommendation and chat.

use axum::extract::{Path, State};

use crate::api::v1::dto::sessions::{
    ChatRequest, ChatResponse, DeleteSessionResponse, RecommendRequest, SessionResponse,
};
use crate::api::v1::response::{ApiError, ApiResponse, ErrorCode};
use crate::api::AppState;
use crate::models::SessionPhase;

/// `POST /api/v1/sessions`
///
/// Creates a fresh session in the `browsing` phase.
#[utoipa::path(
    post,
    path = "/api/v1/sessions",
    tag = "sessions",
    responses(
        (status = 200, description = "Session created", body = SessionResponse),
    )
)]
pub async fn create_session(State(state): State<AppState>) -> ApiResponse<SessionResponse> {
    let session = state.sessions.create();
    ApiResponse::success(session.into())
}

/// `GET /api/v1/sessions/{sessionId}`
#[utoipa::path(
    get,
    path = "/api/v1/sessions/{sessionId}",
    tag = "sessions",
    params(("sessionId" = String, Path, description = "Session identifier")),
    responses(
        (status = 200, description = "Session state", body = SessionResponse),
        (status = 404, description = "Unknown session", body = ApiError),
    )
)]
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResponse<SessionResponse> {
    match state.sessions.get(&session_id) {
        Ok(session) => ApiResponse::success(session.into()),
        Err(e) => e.into(),
    }
}

/// `DELETE /api/v1/sessions/{sessionId}`
///
/// Resets the interaction: drops the session and clears the page-image
/// cache (cache entries live for the session's lifetime only).
#[utoipa::path(
    delete,
    path = "/api/v1/sessions/{sessionId}",
    tag = "sessions",
    params(("sessionId" = String, Path, description = "Session identifier")),
    responses(
        (status = 200, description = "Session deleted", body = DeleteSessionResponse),
        (status = 404, description = "Unknown session", body = ApiError),
    )
)]
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResponse<DeleteSessionResponse> {
    match state.sessions.remove(&session_id) {
        Ok(()) => {
            state.pages.cache().clear();
            ApiResponse::success(DeleteSessionResponse { deleted: true })
        }
        Err(e) => e.into(),
    }
}

/// `POST /api/v1/sessions/{sessionId}/recommend`
///
/// Runs the full pipeline: plurality vote, catalog lookup, confidence
/// scoring and summary generation. Moves the session to
/// `showing_recommendation`.
#[utoipa::path(
    post,
    path = "/api/v1/sessions/{sessionId}/recommend",
    tag = "sessions",
    params(("sessionId" = String, Path, description = "Session identifier")),
    request_body = RecommendRequest,
    responses(
        (status = 200, description = "Recommendation ready", body = SessionResponse),
        (status = 404, description = "Unknown session, or no matching papers", body = ApiError),
        (status = 409, description = "Session is in the chatting phase", body = ApiError),
        (status = 502, description = "A backing service failed", body = ApiError),
    )
)]
pub async fn recommend(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    axum::Json(req): axum::Json<RecommendRequest>,
) -> ApiResponse<SessionResponse> {
    if req.query.trim().is_empty() {
        return ApiResponse::error(ErrorCode::InvalidRequest, "Query cannot be empty");
    }

    // Cheap phase check before the expensive pipeline; the store revalidates
    // on commit.
    let session = match state.sessions.get(&session_id) {
        Ok(session) => session,
        Err(e) => return e.into(),
    };
    if session.phase == SessionPhase::Chatting {
        return ApiResponse::error(
            ErrorCode::Conflict,
            "Cannot request a new recommendation while chatting; reset the session first",
        );
    }

    let recommendation = match state.recommender.recommend(&req.query).await {
        Ok(recommendation) => recommendation,
        Err(e) => return e.into(),
    };

    match state.sessions.set_recommendation(&session_id, recommendation) {
        Ok(session) => ApiResponse::success(session.into()),
        Err(e) => e.into(),
    }
}

/// `POST /api/v1/sessions/{sessionId}/chat:start`
///
/// Switches from viewing the recommendation to chatting with the paper.
#[utoipa::path(
    post,
    path = "/api/v1/sessions/{sessionId}/chat:start",
    tag = "sessions",
    params(("sessionId" = String, Path, description = "Session identifier")),
    responses(
        (status = 200, description = "Chat started", body = SessionResponse),
        (status = 404, description = "Unknown session", body = ApiError),
        (status = 409, description = "No recommendation to chat with", body = ApiError),
    )
)]
pub async fn start_chat(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResponse<SessionResponse> {
    match state.sessions.start_chat(&session_id) {
        Ok(session) => ApiResponse::success(session.into()),
        Err(e) => e.into(),
    }
}

/// `POST /api/v1/sessions/{sessionId}/chat`
///
/// One retrieval-augmented turn with the recommended paper. Appends exactly
/// one entry to the transcript.
#[utoipa::path(
    post,
    path = "/api/v1/sessions/{sessionId}/chat",
    tag = "sessions",
    params(("sessionId" = String, Path, description = "Session identifier")),
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Answer for this turn", body = ChatResponse),
        (status = 404, description = "Unknown session", body = ApiError),
        (status = 409, description = "Session is not in the chatting phase", body = ApiError),
        (status = 502, description = "A backing service failed", body = ApiError),
    )
)]
pub async fn chat(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    axum::Json(req): axum::Json<ChatRequest>,
) -> ApiResponse<ChatResponse> {
    if req.question.trim().is_empty() {
        return ApiResponse::error(ErrorCode::InvalidRequest, "Question cannot be empty");
    }

    let session = match state.sessions.get(&session_id) {
        Ok(session) => session,
        Err(e) => return e.into(),
    };

    if session.phase != SessionPhase::Chatting {
        return ApiResponse::error(
            ErrorCode::Conflict,
            "Start a chat before asking questions",
        );
    }

    let Some(recommendation) = session.recommendation else {
        return ApiResponse::error(ErrorCode::Conflict, "Session has no recommended paper");
    };

    let turn = match state
        .conversation
        .ask(&recommendation.pmid, &session.transcript, &req.question)
        .await
    {
        Ok(turn) => turn,
        Err(e) => return e.into(),
    };

    match state.sessions.append_turn(&session_id, turn.clone()) {
        Ok(session) => ApiResponse::success(ChatResponse {
            question: turn.question,
            answer: turn.answer,
            asked_at: turn.asked_at,
            transcript_length: session.transcript.len(),
        }),
        Err(e) => e.into(),
    }
}
