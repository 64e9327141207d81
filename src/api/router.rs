//! Triage API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/medical-ai/`.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::types::ApiContext;

/// Build the triage API router.
///
/// Endpoint handlers use `State<ApiContext>`. CORS stays permissive: the
/// web clients are served from other origins and the API carries no
/// cookie-based auth to protect.
pub fn triage_api_router(ctx: ApiContext) -> Router {
    let routes = Router::new()
        .route("/initialize", post(endpoints::consult::initialize))
        .route("/message", post(endpoints::consult::message))
        .route("/health", get(endpoints::health::check))
        .route("/dashboard", get(endpoints::dashboard::snapshot))
        .with_state(ctx);

    Router::new()
        .nest("/api/medical-ai", routes)
        .layer(CorsLayer::permissive())
}
