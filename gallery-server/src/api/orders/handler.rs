//! Order API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::utils::validation::validate_required_text;
use shared::AppResult;
use shared::models::{Order, OrderCreate, OrderStatus};

#[derive(Debug, Deserialize)]
pub struct AttachReference {
    pub reference: String,
}

/// POST /api/orders - create a pending order
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<OrderCreate>,
) -> AppResult<Json<Order>> {
    let order = state.orders.create_order(payload).await?;
    Ok(Json(order))
}

/// GET /api/orders - list orders, newest first
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Order>>> {
    let orders = state.orders.list_orders().await?;
    Ok(Json(orders))
}

/// GET /api/orders/{id} - fetch one order
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    let order = state.orders.get_order(&id).await?;
    Ok(Json(order))
}

/// POST /api/orders/{id}/checkout - signed parameter set for the hosted checkout
pub async fn checkout(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Map<String, serde_json::Value>>> {
    let order = state.orders.get_order(&id).await?;
    if order.status != OrderStatus::Pending {
        return Err(shared::AppError::invalid_request(format!(
            "order is {}, only pending orders can check out",
            order.status
        )));
    }
    let params = state.payment.signed_checkout(&order)?;
    Ok(Json(params))
}

/// POST /api/orders/{id}/cancel - buyer-side cancellation
pub async fn cancel(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    let order = state.orders.mark_cancelled(&id).await?;
    Ok(Json(order))
}

/// POST /api/orders/{id}/provider-reference - record the provider's order id
pub async fn attach_provider_reference(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<AttachReference>,
) -> AppResult<Json<Order>> {
    validate_required_text("reference", &payload.reference, 128)?;
    let order = state
        .orders
        .attach_provider_reference(&id, payload.reference.trim())
        .await?;
    Ok(Json(order))
}
