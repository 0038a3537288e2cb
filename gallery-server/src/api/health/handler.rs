use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use crate::core::ServerState;

/// GET /api/health - liveness probe with payment provisioning status
pub async fn health(State(state): State<ServerState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "payment_configured": state.payment.can_sign(),
    }))
}
