use axum::Json;
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

use crate::api::AppState;

use super::dto;
use super::handlers;
use super::response;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Paperscout API",
        version = "1.0.0",
        description = "Retrieval-augmented paper recommendation and chat over a fixed PubMed corpus.",
    ),
    paths(
        handlers::health::health_check,
        handlers::papers::list_papers,
        handlers::papers::list_covers,
        handlers::papers::get_paper_pages,
        handlers::papers::get_page_image,
        handlers::sessions::create_session,
        handlers::sessions::get_session,
        handlers::sessions::delete_session,
        handlers::sessions::recommend,
        handlers::sessions::start_chat,
        handlers::sessions::chat,
    ),
    components(schemas(
        // Response envelope
        response::ErrorCode,
        response::ApiError,
        // Papers
        dto::papers::PaperDto,
        dto::papers::ListPapersResponse,
        dto::papers::CoversResponse,
        dto::papers::PaperPagesResponse,
        // Sessions
        dto::sessions::RecommendRequest,
        dto::sessions::ChatRequest,
        dto::sessions::RecommendationDto,
        dto::sessions::TurnDto,
        dto::sessions::SessionResponse,
        dto::sessions::ChatResponse,
        dto::sessions::DeleteSessionResponse,
        // Health
        handlers::health::HealthData,
        handlers::health::CatalogStatus,
        handlers::health::EmbeddingsStatus,
        handlers::health::LlmStatus,
        handlers::health::SessionsStatus,
    )),
    tags(
        (name = "health", description = "Service health"),
        (name = "papers", description = "Catalog and page images"),
        (name = "sessions", description = "Recommendation and chat sessions"),
    )
)]
struct ApiDoc;

/// `GET /api/v1/openapi.json`
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Redoc UI mounted at `/api/v1/docs`.
pub fn redoc_router() -> axum::Router<AppState> {
    axum::Router::new().merge(Redoc::with_url("/docs", ApiDoc::openapi()))
}
