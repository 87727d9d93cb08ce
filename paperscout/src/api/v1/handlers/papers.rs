//! v1 Paper catalog and page-image handlers.

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::api::v1::dto::papers::{CoversResponse, ListPapersResponse, PaperDto, PaperPagesResponse};
use crate::api::v1::response::{ApiError, ApiResponse, ErrorCode};
use crate::api::AppState;

/// `GET /api/v1/papers`
///
/// Lists every catalog row.
#[utoipa::path(
    get,
    path = "/api/v1/papers",
    tag = "papers",
    responses(
        (status = 200, description = "Catalog rows", body = ListPapersResponse),
    )
)]
pub async fn list_papers(State(state): State<AppState>) -> ApiResponse<ListPapersResponse> {
    let papers = state.catalog.papers().iter().map(PaperDto::from).collect();
    ApiResponse::success(ListPapersResponse { papers })
}

/// `GET /api/v1/papers/covers`
///
/// First-page image keys for every paper, for the browsing gallery.
#[utoipa::path(
    get,
    path = "/api/v1/papers/covers",
    tag = "papers",
    responses(
        (status = 200, description = "Cover image keys", body = CoversResponse),
        (status = 502, description = "Archive unavailable", body = ApiError),
    )
)]
pub async fn list_covers(State(state): State<AppState>) -> ApiResponse<CoversResponse> {
    match state.pages.first_page_keys().await {
        Ok(keys) => ApiResponse::success(CoversResponse { keys }),
        Err(e) => e.into(),
    }
}

/// `GET /api/v1/papers/{pmid}/pages`
///
/// Page count and derived page-image keys for one paper.
#[utoipa::path(
    get,
    path = "/api/v1/papers/{pmid}/pages",
    tag = "papers",
    params(("pmid" = String, Path, description = "PubMed identifier")),
    responses(
        (status = 200, description = "Page listing", body = PaperPagesResponse),
        (status = 404, description = "Unknown PMID", body = ApiError),
    )
)]
pub async fn get_paper_pages(
    State(state): State<AppState>,
    Path(pmid): Path<String>,
) -> ApiResponse<PaperPagesResponse> {
    if state.catalog.by_pmid(&pmid).is_none() {
        return ApiResponse::error(ErrorCode::NotFound, format!("Unknown PMID: {pmid}"));
    }

    let keys = match state.pages.page_keys(&pmid).await {
        Ok(keys) => keys,
        Err(e) => return e.into(),
    };

    ApiResponse::success(PaperPagesResponse {
        pmid,
        page_count: keys.len(),
        keys,
    })
}

/// `GET /api/v1/papers/{pmid}/pages/{page}`
///
/// One page image as raw JPEG bytes, served through the page cache. Errors
/// use the JSON envelope.
#[utoipa::path(
    get,
    path = "/api/v1/papers/{pmid}/pages/{page}",
    tag = "papers",
    params(
        ("pmid" = String, Path, description = "PubMed identifier"),
        ("page" = u32, Path, description = "1-based page number"),
    ),
    responses(
        (status = 200, description = "JPEG page image", content_type = "image/jpeg"),
        (status = 404, description = "Unknown PMID or page", body = ApiError),
    )
)]
pub async fn get_page_image(
    State(state): State<AppState>,
    Path((pmid, page)): Path<(String, u32)>,
) -> Response {
    if state.catalog.by_pmid(&pmid).is_none() {
        return ApiResponse::<()>::error(ErrorCode::NotFound, format!("Unknown PMID: {pmid}"))
            .into_response();
    }

    if page == 0 {
        return ApiResponse::<()>::error(ErrorCode::InvalidRequest, "Pages are numbered from 1")
            .into_response();
    }

    match state.pages.fetch_page(&pmid, page).await {
        Ok(bytes) => (
            [(header::CONTENT_TYPE, "image/jpeg")],
            bytes.as_ref().clone(),
        )
            .into_response(),
        Err(e) => ApiResponse::<()>::from(e).into_response(),
    }
}
