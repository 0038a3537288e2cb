//! Checkout flow integration tests
//!
//! Exercises order creation, provider signing and the terminal transition
//! rules end to end.

use axum::extract::State;
use gallery_server::api::payment;
use gallery_server::{Config, ErrorCode, NotificationVerdict, PaymentBridge, ServerState};
use rsa::RsaPrivateKey;
use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
use rust_decimal::Decimal;
use serde_json::{Map, Value, json};
use shared::models::{Category, OrderCreate, OrderStatus};
use shared::util::now_millis;
use std::io::Cursor;
use tempfile::TempDir;

use gallery_server::db::repository::CategoryRepository;

async fn test_state() -> (TempDir, ServerState) {
    let dir = TempDir::new().expect("tempdir");
    let config = Config::with_overrides(dir.path().to_string_lossy().to_string(), 0);
    let state = ServerState::initialize(&config).await.expect("state");
    (dir, state)
}

fn png_bytes() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(400, 300, image::Rgb([90, 90, 90]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .expect("png encode");
    buf
}

async fn seed_two_photos(state: &ServerState) -> Vec<String> {
    CategoryRepository::new(state.get_db())
        .create(Category {
            name: "wedding".into(),
            created_at: now_millis(),
        })
        .await
        .expect("category");

    let mut ids = Vec::new();
    for name in ["a.png", "b.png"] {
        let photo = state
            .ingest
            .ingest_photo(name, &png_bytes(), "wedding", Some(Decimal::new(599, 2)))
            .await
            .expect("ingest");
        ids.push(photo.id);
    }
    ids
}

fn signing_bridge() -> PaymentBridge {
    let mut rng = rand::thread_rng();
    let private = RsaPrivateKey::new(&mut rng, 2048).expect("keygen");
    let private_pem = private.to_pkcs8_pem(LineEnding::LF).unwrap().to_string();
    let public_pem = private
        .to_public_key()
        .to_public_key_pem(LineEnding::LF)
        .unwrap();
    PaymentBridge::new(Some(&private_pem), Some(&public_pem), false).expect("bridge")
}

fn as_map(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}

#[tokio::test]
async fn order_totals_are_server_computed() {
    let (_dir, state) = test_state().await;
    let ids = seed_two_photos(&state).await;

    let order = state
        .orders
        .create_order(OrderCreate {
            photo_ids: ids.clone(),
            total_amount: Some(Decimal::new(1198, 2)),
            buyer_email: Some("buyer@example.com".into()),
        })
        .await
        .expect("order");

    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.total_amount, Decimal::new(1198, 2));
    assert_eq!(order.photo_ids, ids);

    // A wrong claimed total is rejected
    let err = state
        .orders
        .create_order(OrderCreate {
            photo_ids: ids.clone(),
            total_amount: Some(Decimal::new(1, 2)),
            buyer_email: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::OrderTotalMismatch);
}

#[tokio::test]
async fn order_rejects_bad_requests() {
    let (_dir, state) = test_state().await;
    let ids = seed_two_photos(&state).await;

    let err = state
        .orders
        .create_order(OrderCreate {
            photo_ids: vec![],
            total_amount: None,
            buyer_email: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::OrderEmpty);

    let err = state
        .orders
        .create_order(OrderCreate {
            photo_ids: vec!["missing0".into()],
            total_amount: None,
            buyer_email: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PhotoNotFound);

    let err = state
        .orders
        .create_order(OrderCreate {
            photo_ids: ids,
            total_amount: None,
            buyer_email: Some("not-an-email".into()),
        })
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationFailed);
}

#[tokio::test]
async fn signed_notification_completes_order() {
    let (_dir, state) = test_state().await;
    let ids = seed_two_photos(&state).await;
    let bridge = signing_bridge();

    let order = state
        .orders
        .create_order(OrderCreate {
            photo_ids: ids,
            total_amount: None,
            buyer_email: None,
        })
        .await
        .unwrap();

    // Provider callback payload, signed over the canonical form
    let mut payload = as_map(json!({
        "order_id": order.id,
        "provider_order_id": "MP-1001",
        "amount": "11.98",
        "status": "completed",
    }));
    let signature = bridge.sign_payload(&payload).unwrap();
    payload.insert("signature".into(), Value::String(signature));

    assert_eq!(
        bridge.verify_notification(&payload).unwrap(),
        NotificationVerdict::Verified
    );

    let order = state
        .orders
        .attach_provider_reference(&order.id, "MP-1001")
        .await
        .unwrap();
    assert_eq!(order.provider_reference.as_deref(), Some("MP-1001"));

    let order = state.orders.mark_completed(&order.id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Completed);

    // Replayed notification: same transition is a no-op
    let order = state.orders.mark_completed(&order.id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Completed);

    // Conflicting transition after completion is rejected
    let err = state.orders.mark_failed(&order.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::OrderInvalidTransition);

    // The order is findable through the provider reference
    let found = state
        .orders
        .find_by_provider_reference("MP-1001")
        .await
        .unwrap()
        .expect("lookup by reference");
    assert_eq!(found.id, order.id);
}

#[tokio::test]
async fn provider_reference_is_write_once() {
    let (_dir, state) = test_state().await;
    let ids = seed_two_photos(&state).await;

    let order = state
        .orders
        .create_order(OrderCreate {
            photo_ids: ids,
            total_amount: None,
            buyer_email: None,
        })
        .await
        .unwrap();

    state
        .orders
        .attach_provider_reference(&order.id, "MP-1")
        .await
        .unwrap();

    // Same reference again is fine
    state
        .orders
        .attach_provider_reference(&order.id, "MP-1")
        .await
        .unwrap();

    // A different one is a conflict
    let err = state
        .orders
        .attach_provider_reference(&order.id, "MP-2")
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ProviderReferenceConflict);
}

#[tokio::test]
async fn cancel_is_terminal() {
    let (_dir, state) = test_state().await;
    let ids = seed_two_photos(&state).await;

    let order = state
        .orders
        .create_order(OrderCreate {
            photo_ids: ids,
            total_amount: None,
            buyer_email: None,
        })
        .await
        .unwrap();

    let order = state.orders.mark_cancelled(&order.id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Cancelled);

    let err = state.orders.mark_completed(&order.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::OrderInvalidTransition);

    // Repeating the cancellation stays idempotent
    let order = state.orders.mark_cancelled(&order.id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Cancelled);
}

/// State whose bridge verifies against the same keypair `signer` signs with
async fn signed_state() -> (TempDir, ServerState, PaymentBridge) {
    let dir = TempDir::new().expect("tempdir");
    let mut rng = rand::thread_rng();
    let private = RsaPrivateKey::new(&mut rng, 2048).expect("keygen");
    let private_pem = private.to_pkcs8_pem(LineEnding::LF).unwrap().to_string();
    let public_pem = private
        .to_public_key()
        .to_public_key_pem(LineEnding::LF)
        .unwrap();

    let key_path = dir.path().join("provider.key");
    let cert_path = dir.path().join("provider.pub");
    std::fs::write(&key_path, &private_pem).unwrap();
    std::fs::write(&cert_path, &public_pem).unwrap();

    let mut config = Config::with_overrides(dir.path().to_string_lossy().to_string(), 0);
    config.payment_private_key_path = Some(key_path.to_string_lossy().to_string());
    config.payment_public_cert_path = Some(cert_path.to_string_lossy().to_string());
    let state = ServerState::initialize(&config).await.expect("state");

    let signer = PaymentBridge::new(Some(&private_pem), Some(&public_pem), false).expect("bridge");
    (dir, state, signer)
}

#[tokio::test]
async fn notify_always_acknowledges_ok() {
    let (_dir, state, signer) = signed_state().await;
    let ids = seed_two_photos(&state).await;

    let order = state
        .orders
        .create_order(OrderCreate {
            photo_ids: ids,
            total_amount: None,
            buyer_email: None,
        })
        .await
        .unwrap();

    // Signed as "failed", delivered as "completed": signature does not match
    let mut payload = as_map(json!({
        "order_id": order.id,
        "status": "failed",
    }));
    let signature = signer.sign_payload(&payload).unwrap();
    payload.insert("signature".into(), Value::String(signature));
    payload.insert("status".into(), Value::String("completed".into()));
    let body = serde_json::to_string(&payload).unwrap();

    let ack = payment::notify(State(state.clone()), body).await;
    assert_eq!(ack, "OK");
    let untouched = state.orders.get_order(&order.id).await.unwrap();
    assert_eq!(untouched.status, OrderStatus::Pending);

    // A correctly signed notification completes the order
    let mut payload = as_map(json!({
        "order_id": order.id,
        "provider_order_id": "MP-7",
        "status": "completed",
    }));
    let signature = signer.sign_payload(&payload).unwrap();
    payload.insert("signature".into(), Value::String(signature));
    let body = serde_json::to_string(&payload).unwrap();

    assert_eq!(payment::notify(State(state.clone()), body.clone()).await, "OK");
    let completed = state.orders.get_order(&order.id).await.unwrap();
    assert_eq!(completed.status, OrderStatus::Completed);
    assert_eq!(completed.provider_reference.as_deref(), Some("MP-7"));

    // Replay of the same notification: still 200 "OK", status unchanged
    assert_eq!(payment::notify(State(state.clone()), body).await, "OK");
    let replayed = state.orders.get_order(&order.id).await.unwrap();
    assert_eq!(replayed.status, OrderStatus::Completed);
}

#[tokio::test]
async fn notify_accepts_form_encoded_bodies() {
    let (_dir, state, signer) = signed_state().await;
    let ids = seed_two_photos(&state).await;

    let order = state
        .orders
        .create_order(OrderCreate {
            photo_ids: ids,
            total_amount: None,
            buyer_email: None,
        })
        .await
        .unwrap();

    let payload = as_map(json!({
        "order_id": order.id,
        "status": "cancelled",
    }));
    let signature = signer.sign_payload(&payload).unwrap();
    let body = serde_urlencoded::to_string([
        ("order_id", order.id.as_str()),
        ("status", "cancelled"),
        ("signature", signature.as_str()),
    ])
    .unwrap();

    assert_eq!(payment::notify(State(state.clone()), body).await, "OK");
    let cancelled = state.orders.get_order(&order.id).await.unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
}

#[tokio::test]
async fn unprovisioned_payment_refuses_to_sign() {
    let bridge = PaymentBridge::new(None, None, false).unwrap();
    let payload = as_map(json!({"order_id": "x"}));
    let err: shared::AppError = bridge.sign_payload(&payload).unwrap_err().into();
    assert_eq!(err.code, ErrorCode::PaymentNotConfigured);
}
