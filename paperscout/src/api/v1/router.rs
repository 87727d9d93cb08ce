use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::api::AppState;

use super::handlers;
use super::middleware::v1_auth_middleware;

pub fn v1_router(state: AppState) -> Router<AppState> {
    let papers = Router::new()
        .route("/", get(handlers::papers::list_papers))
        .route("/covers", get(handlers::papers::list_covers))
        .route("/{pmid}/pages", get(handlers::papers::get_paper_pages))
        .route("/{pmid}/pages/{page}", get(handlers::papers::get_page_image));

    let sessions = Router::new()
        .route("/", post(handlers::sessions::create_session))
        .route(
            "/{sessionId}",
            get(handlers::sessions::get_session).delete(handlers::sessions::delete_session),
        )
        .route("/{sessionId}/recommend", post(handlers::sessions::recommend))
        .route("/{sessionId}/chat:start", post(handlers::sessions::start_chat))
        .route("/{sessionId}/chat", post(handlers::sessions::chat));

    let public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/openapi.json", get(super::openapi::openapi_json))
        .merge(super::openapi::redoc_router());

    let protected_routes = Router::new()
        .nest("/papers", papers)
        .nest("/sessions", sessions)
        .route_layer(middleware::from_fn_with_state(state, v1_auth_middleware));

    Router::new().merge(public_routes).merge(protected_routes)
}
