//! Payment API Handlers
//!
//! `/notify` always acknowledges with 200 "OK". The provider retries on any
//! other status, so processing failures are logged and swallowed; the order
//! state machine makes replays harmless.

use axum::Json;
use axum::extract::State;
use serde_json::{Map, Value, json};

use crate::core::ServerState;
use shared::{AppError, AppResult, ErrorCode};

/// POST /api/payment/sign - sign a checkout payload for the provider
pub async fn sign(
    State(state): State<ServerState>,
    Json(payload): Json<Map<String, Value>>,
) -> AppResult<Json<Value>> {
    if payload.is_empty() {
        return Err(AppError::validation("payload must not be empty"));
    }
    let signature = state.payment.sign_payload(&payload).map_err(AppError::from)?;
    Ok(Json(json!({ "signature": signature })))
}

/// POST /api/payment/notify - provider callback
pub async fn notify(State(state): State<ServerState>, body: String) -> &'static str {
    if let Err(err) = process_notification(&state, &body).await {
        tracing::warn!("Payment notification not applied: {err}");
    }
    "OK"
}

async fn process_notification(state: &ServerState, body: &str) -> AppResult<()> {
    let payload = parse_notification(body)?;

    state.payment.verify_notification(&payload).map_err(AppError::from)?;

    let order = locate_order(state, &payload).await?;

    if let Some(reference) = field(&payload, "provider_order_id") {
        // A reference conflict is suspicious but must not block the ack
        if let Err(err) = state
            .orders
            .attach_provider_reference(&order.id, reference)
            .await
            && err.code != ErrorCode::ProviderReferenceConflict
        {
            return Err(err);
        }
    }

    let status = field(&payload, "status").unwrap_or_default().to_ascii_lowercase();
    match status.as_str() {
        "completed" | "success" | "paid" => {
            state.orders.mark_completed(&order.id).await?;
        }
        "failed" | "error" | "expired" => {
            state.orders.mark_failed(&order.id).await?;
        }
        "cancelled" | "canceled" => {
            state.orders.mark_cancelled(&order.id).await?;
        }
        other => {
            tracing::info!(order_id = %order.id, status = %other, "Ignoring notification status");
        }
    }
    Ok(())
}

/// Find the order by our id, falling back to the provider's reference
async fn locate_order(
    state: &ServerState,
    payload: &Map<String, Value>,
) -> AppResult<shared::models::Order> {
    if let Some(id) = field(payload, "order_id") {
        return state.orders.get_order(id).await;
    }
    if let Some(reference) = field(payload, "provider_order_id")
        && let Some(order) = state.orders.find_by_provider_reference(reference).await?
    {
        return Ok(order);
    }
    Err(AppError::invalid_request(
        "notification names no known order",
    ))
}

fn field<'a>(payload: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    payload.get(key).and_then(|v| v.as_str())
}

/// The provider posts either a JSON object or a form-urlencoded body
fn parse_notification(body: &str) -> AppResult<Map<String, Value>> {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        return value
            .as_object()
            .cloned()
            .ok_or_else(|| AppError::invalid_request("notification is not a JSON object"));
    }
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(body).map_err(|e| {
        AppError::invalid_request(format!("notification is neither JSON nor form data: {e}"))
    })?;
    if pairs.is_empty() {
        return Err(AppError::invalid_request("notification body is empty"));
    }
    Ok(pairs
        .into_iter()
        .map(|(k, v)| (k, Value::String(v)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_notification_json() {
        let payload =
            parse_notification(r#"{"order_id": "a1b2c3d4", "status": "completed"}"#).unwrap();
        assert_eq!(field(&payload, "order_id"), Some("a1b2c3d4"));
        assert_eq!(field(&payload, "status"), Some("completed"));
    }

    #[test]
    fn test_parse_notification_form() {
        let payload =
            parse_notification("order_id=a1b2c3d4&status=completed&signature=aGk%3D").unwrap();
        assert_eq!(field(&payload, "order_id"), Some("a1b2c3d4"));
        assert_eq!(field(&payload, "status"), Some("completed"));
        // Percent-escapes come back decoded
        assert_eq!(field(&payload, "signature"), Some("aGk="));
    }

    #[test]
    fn test_parse_notification_rejects_non_object_json() {
        assert!(parse_notification(r#""just a string""#).is_err());
        assert!(parse_notification("").is_err());
    }
}
