use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PaperscoutError {
    /// The combined-corpus search returned no usable hits for the query.
    #[error("No matching papers found for the query")]
    NoSearchResults,

    /// A recommended title has no row in the metadata catalog.
    #[error("No catalog metadata for paper: {0}")]
    MetadataNotFound(String),

    /// The scoring search did not surface the recommended paper, so the
    /// mean relevance is undefined.
    #[error("Scoring search returned no hits for recommended paper: {0}")]
    EmptyScoreSet(String),

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Metadata catalog error: {0}")]
    Catalog(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("LLM unavailable: {0}")]
    LlmUnavailable(String),

    #[error("LLM rate limit exceeded, retry after {retry_after:?} seconds")]
    LlmRateLimit { retry_after: Option<u64> },

    #[error("API rate limit exceeded, retry after {retry_after:?} seconds")]
    ApiRateLimit { retry_after: Option<u64> },

    #[error("API authentication error: {0}")]
    ApiAuth(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for PaperscoutError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            PaperscoutError::NoSearchResults => (StatusCode::NOT_FOUND, self.to_string()),
            PaperscoutError::MetadataNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            PaperscoutError::EmptyScoreSet(_) => (StatusCode::CONFLICT, self.to_string()),
            PaperscoutError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            PaperscoutError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            PaperscoutError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            PaperscoutError::VectorStore(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            PaperscoutError::Archive(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            PaperscoutError::Embedding(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            PaperscoutError::Catalog(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            PaperscoutError::Llm(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            PaperscoutError::LlmUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            PaperscoutError::LlmRateLimit { .. } => {
                (StatusCode::TOO_MANY_REQUESTS, self.to_string())
            }
            PaperscoutError::ApiRateLimit { .. } => {
                (StatusCode::TOO_MANY_REQUESTS, self.to_string())
            }
            PaperscoutError::ApiAuth(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            PaperscoutError::Http(e) => (StatusCode::BAD_GATEWAY, e.to_string()),
            PaperscoutError::Json(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            PaperscoutError::Csv(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            PaperscoutError::Io(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            PaperscoutError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({
            "error": message,
            "code": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, PaperscoutError>;
