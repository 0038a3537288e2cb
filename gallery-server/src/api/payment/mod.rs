//! Payment API module

mod handler;

pub use handler::{notify, sign};

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/payment/sign", post(handler::sign))
        .route("/api/payment/notify", post(handler::notify))
}
