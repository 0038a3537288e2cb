//! Payment bridge: payload signing and notification verification

use super::canonical::{SIGNATURE_KEY, build_canonical};
use super::crypto::{SigningKey, VerifyingKey};
use super::PaymentError;
use crate::core::Config;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::{Map, Value};

/// Outcome of checking an incoming provider notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationVerdict {
    /// Signature present and valid against the provider key
    Verified,
    /// Accepted without verification (explicitly enabled, dev only)
    Unverified,
}

/// Holds the key material for the provider integration
///
/// Both keys are optional: a storefront can run without payments provisioned
/// and the affected endpoints answer 503 until keys are supplied.
pub struct PaymentBridge {
    signing_key: Option<SigningKey>,
    verifying_key: Option<VerifyingKey>,
    allow_unverified: bool,
    merchant_id: Option<String>,
    currency: String,
    base_url: String,
}

impl PaymentBridge {
    pub fn new(
        signing_pem: Option<&str>,
        verifying_pem: Option<&str>,
        allow_unverified: bool,
    ) -> Result<Self, PaymentError> {
        let signing_key = signing_pem.map(SigningKey::from_pem).transpose()?;
        let verifying_key = verifying_pem.map(VerifyingKey::from_pem).transpose()?;
        Ok(Self {
            signing_key,
            verifying_key,
            allow_unverified,
            merchant_id: None,
            currency: "EUR".into(),
            base_url: "http://localhost:3000".into(),
        })
    }

    /// Set the merchant account and callback base URL for checkout params
    pub fn with_merchant(
        mut self,
        merchant_id: Option<String>,
        currency: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        self.merchant_id = merchant_id;
        self.currency = currency.into();
        self.base_url = base_url.into();
        self
    }

    /// Load key material from the paths in `config`
    pub fn from_config(config: &Config) -> Result<Self, PaymentError> {
        let signing_pem = read_key_file(config.payment_private_key_path.as_deref())?;
        let verifying_pem = read_key_file(config.payment_public_cert_path.as_deref())?;

        // Unverified notifications are a development convenience only
        let allow_unverified = config.payment_allow_unverified && !config.is_production();
        if config.payment_allow_unverified && config.is_production() {
            tracing::warn!("PAYMENT_ALLOW_UNVERIFIED ignored in production");
        }

        match (&signing_pem, &verifying_pem) {
            (Some(_), Some(_)) => tracing::info!("Payment bridge configured (sign + verify)"),
            (Some(_), None) => tracing::warn!("Payment bridge has no provider certificate"),
            (None, _) => tracing::warn!("Payment bridge not provisioned, checkout disabled"),
        }

        Ok(Self::new(
            signing_pem.as_deref(),
            verifying_pem.as_deref(),
            allow_unverified,
        )?
        .with_merchant(
            config.payment_merchant_id.clone(),
            config.payment_currency.clone(),
            config.public_base_url.trim_end_matches('/').to_string(),
        ))
    }

    pub fn can_sign(&self) -> bool {
        self.signing_key.is_some()
    }

    /// Sign a checkout payload; returns the base64 signature
    pub fn sign_payload(&self, payload: &Map<String, Value>) -> Result<String, PaymentError> {
        let key = self.signing_key.as_ref().ok_or(PaymentError::NotConfigured)?;
        let canonical = build_canonical(payload);
        let sig = key.sign(canonical.as_bytes())?;
        Ok(BASE64.encode(sig))
    }

    /// Build the outbound checkout parameter set for a pending order
    ///
    /// Requires both the merchant id and the signing key; the returned map
    /// already carries the `signature` field.
    pub fn signed_checkout(
        &self,
        order: &shared::models::Order,
    ) -> Result<Map<String, Value>, PaymentError> {
        let merchant_id = self.merchant_id.as_ref().ok_or(PaymentError::NotConfigured)?;

        let mut params = Map::new();
        params.insert("merchant_id".into(), Value::String(merchant_id.clone()));
        params.insert("order_id".into(), Value::String(order.id.clone()));
        params.insert(
            "amount".into(),
            Value::String(format!("{:.2}", order.total_amount.round_dp(2))),
        );
        params.insert("currency".into(), Value::String(self.currency.clone()));
        if let Some(email) = &order.buyer_email {
            params.insert("customer_email".into(), Value::String(email.clone()));
        }
        params.insert(
            "notify_url".into(),
            Value::String(format!("{}/api/payment/notify", self.base_url)),
        );
        params.insert(
            "return_url".into(),
            Value::String(format!("{}/checkout/result", self.base_url)),
        );
        params.insert(
            "timestamp".into(),
            Value::String(chrono::Utc::now().timestamp().to_string()),
        );

        let signature = self.sign_payload(&params)?;
        params.insert(SIGNATURE_KEY.into(), Value::String(signature));
        Ok(params)
    }

    /// Check the signature on an incoming provider notification
    pub fn verify_notification(
        &self,
        payload: &Map<String, Value>,
    ) -> Result<NotificationVerdict, PaymentError> {
        let Some(key) = &self.verifying_key else {
            if self.allow_unverified {
                tracing::warn!("Accepting unverified payment notification");
                return Ok(NotificationVerdict::Unverified);
            }
            return Err(PaymentError::NotConfigured);
        };

        let signature = extract_signature(payload).ok_or_else(|| {
            PaymentError::SignatureInvalid("notification carries no signature".into())
        })?;
        let sig_bytes = BASE64
            .decode(signature)
            .map_err(|e| PaymentError::SignatureInvalid(format!("bad base64: {e}")))?;

        let canonical = build_canonical(payload);
        key.verify(canonical.as_bytes(), &sig_bytes)?;
        Ok(NotificationVerdict::Verified)
    }
}

fn extract_signature(payload: &Map<String, Value>) -> Option<&str> {
    payload
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(SIGNATURE_KEY))
        .and_then(|(_, v)| v.as_str())
}

fn read_key_file(path: Option<&str>) -> Result<Option<String>, PaymentError> {
    match path {
        Some(p) => std::fs::read_to_string(p)
            .map(Some)
            .map_err(|e| PaymentError::InvalidKey(format!("cannot read {p}: {e}"))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsa::RsaPrivateKey;
    use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
    use serde_json::json;

    fn test_bridge(allow_unverified: bool) -> PaymentBridge {
        let mut rng = rand::thread_rng();
        let private = RsaPrivateKey::new(&mut rng, 2048).unwrap();
        let private_pem = private.to_pkcs8_pem(LineEnding::LF).unwrap().to_string();
        let public_pem = private
            .to_public_key()
            .to_public_key_pem(LineEnding::LF)
            .unwrap();
        PaymentBridge::new(Some(&private_pem), Some(&public_pem), allow_unverified).unwrap()
    }

    fn payload(value: serde_json::Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_sign_then_verify_notification() {
        let bridge = test_bridge(false);
        let mut p = payload(json!({"order_id": "x1", "amount": "11.98", "status": "COMPLETED"}));
        let signature = bridge.sign_payload(&p).unwrap();
        p.insert("signature".into(), Value::String(signature));

        assert_eq!(
            bridge.verify_notification(&p).unwrap(),
            NotificationVerdict::Verified
        );
    }

    #[test]
    fn test_signature_key_casing_accepted() {
        let bridge = test_bridge(false);
        let mut p = payload(json!({"order_id": "x1", "amount": "5.99"}));
        let signature = bridge.sign_payload(&p).unwrap();
        p.insert("Signature".into(), Value::String(signature));

        assert_eq!(
            bridge.verify_notification(&p).unwrap(),
            NotificationVerdict::Verified
        );
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let bridge = test_bridge(false);
        let mut p = payload(json!({"order_id": "x1", "amount": "11.98"}));
        let signature = bridge.sign_payload(&p).unwrap();
        p.insert("signature".into(), Value::String(signature));
        p.insert("amount".into(), Value::String("0.01".into()));

        assert!(matches!(
            bridge.verify_notification(&p).unwrap_err(),
            PaymentError::SignatureInvalid(_)
        ));
    }

    #[test]
    fn test_missing_signature_rejected() {
        let bridge = test_bridge(false);
        let p = payload(json!({"order_id": "x1"}));
        assert!(matches!(
            bridge.verify_notification(&p).unwrap_err(),
            PaymentError::SignatureInvalid(_)
        ));
    }

    #[test]
    fn test_unprovisioned_bridge() {
        let bridge = PaymentBridge::new(None, None, false).unwrap();
        assert!(!bridge.can_sign());
        assert!(matches!(
            bridge.sign_payload(&Map::new()).unwrap_err(),
            PaymentError::NotConfigured
        ));
        assert!(matches!(
            bridge.verify_notification(&Map::new()).unwrap_err(),
            PaymentError::NotConfigured
        ));
    }

    #[test]
    fn test_signed_checkout_params() {
        use rust_decimal::Decimal;
        use shared::models::{Order, OrderStatus};

        let bridge = test_bridge(false).with_merchant(
            Some("M123".into()),
            "EUR",
            "https://shop.example.com",
        );
        let order = Order {
            id: "11111111-2222-3333-4444-555555555555".into(),
            photo_ids: vec!["a1b2c3d4".into()],
            total_amount: Decimal::new(1198, 2),
            buyer_email: Some("buyer@example.com".into()),
            status: OrderStatus::Pending,
            provider_reference: None,
            created_at: 0,
            updated_at: 0,
        };

        let params = bridge.signed_checkout(&order).unwrap();
        assert_eq!(params["amount"], "11.98");
        assert_eq!(params["currency"], "EUR");
        assert_eq!(
            params["notify_url"],
            "https://shop.example.com/api/payment/notify"
        );
        assert!(params.contains_key("signature"));

        // The embedded signature validates as a notification would
        assert_eq!(
            bridge.verify_notification(&params).unwrap(),
            NotificationVerdict::Verified
        );
    }

    #[test]
    fn test_checkout_requires_merchant() {
        use rust_decimal::Decimal;
        use shared::models::{Order, OrderStatus};

        let bridge = test_bridge(false);
        let order = Order {
            id: "x".into(),
            photo_ids: vec![],
            total_amount: Decimal::ZERO,
            buyer_email: None,
            status: OrderStatus::Pending,
            provider_reference: None,
            created_at: 0,
            updated_at: 0,
        };
        assert!(matches!(
            bridge.signed_checkout(&order).unwrap_err(),
            PaymentError::NotConfigured
        ));
    }

    #[test]
    fn test_unverified_mode() {
        let bridge = PaymentBridge::new(None, None, true).unwrap();
        let p = payload(json!({"order_id": "x1"}));
        assert_eq!(
            bridge.verify_notification(&p).unwrap(),
            NotificationVerdict::Unverified
        );
    }
}
