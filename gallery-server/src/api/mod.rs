//! HTTP API
//!
//! One module per resource area, each exporting its own `router()`.

use axum::Router;
use http::{HeaderName, HeaderValue};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::core::ServerState;

pub mod categories;
pub mod health;
pub mod orders;
pub mod payment;
pub mod photos;

/// Custom request ID generator
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Build a router with all routes registered (no middleware)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(photos::router())
        .merge(categories::router())
        .merge(orders::router())
        .merge(payment::router())
        .merge(health::router())
}

/// Build the fully configured application
///
/// Watermarked previews are served statically under /previews. Originals are
/// deliberately not mounted anywhere.
pub fn build_app(state: &ServerState) -> Router<ServerState> {
    build_router()
        .nest_service("/previews", ServeDir::new(state.config.previews_dir()))
        // CORS - the storefront frontend runs on a different origin in dev
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static("x-request-id"),
            XRequestId,
        ))
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            "x-request-id",
        )))
}
