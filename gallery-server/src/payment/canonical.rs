//! Canonical string construction for signing and verification
//!
//! Both sides of the provider integration must serialize a payload to the
//! exact same byte string before hashing. The rules:
//!
//! 1. drop any `signature` key, compared case-insensitively
//! 2. sort the remaining keys lexicographically
//! 3. render each value raw (strings unquoted, scalars as written)
//! 4. join `key=value` pairs with `&`

use serde_json::{Map, Value};

/// Key excluded from the canonical form
pub const SIGNATURE_KEY: &str = "signature";

/// Build the canonical signing string for a flat payload
pub fn build_canonical(payload: &Map<String, Value>) -> String {
    let mut keys: Vec<&String> = payload
        .keys()
        .filter(|k| !k.eq_ignore_ascii_case(SIGNATURE_KEY))
        .collect();
    keys.sort();

    keys.into_iter()
        .map(|k| format!("{}={}", k, render_value(&payload[k])))
        .collect::<Vec<_>>()
        .join("&")
}

/// Render a JSON value without adding quotes around strings
fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_keys_sorted() {
        let p = payload(json!({"b": "2", "a": "1", "c": "3"}));
        assert_eq!(build_canonical(&p), "a=1&b=2&c=3");
    }

    #[test]
    fn test_key_order_does_not_matter() {
        let first = payload(json!({"amount": "11.98", "currency": "EUR", "order_id": "x1"}));
        let second = payload(json!({"order_id": "x1", "amount": "11.98", "currency": "EUR"}));
        assert_eq!(build_canonical(&first), build_canonical(&second));
    }

    #[test]
    fn test_signature_dropped_case_insensitively() {
        for key in ["signature", "Signature", "SIGNATURE"] {
            let mut p = payload(json!({"amount": "5.99"}));
            p.insert(key.to_string(), Value::String("deadbeef".into()));
            assert_eq!(build_canonical(&p), "amount=5.99");
        }
    }

    #[test]
    fn test_values_rendered_raw() {
        let p = payload(json!({"amount": 11.98, "count": 2, "ok": true, "note": "two words"}));
        assert_eq!(build_canonical(&p), "amount=11.98&count=2&note=two words&ok=true");
    }

    #[test]
    fn test_empty_payload() {
        let p = payload(json!({}));
        assert_eq!(build_canonical(&p), "");
    }
}
