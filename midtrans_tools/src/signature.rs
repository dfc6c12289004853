//! Midtrans notification signatures.
//!
//! Every HTTP notification carries a `signature_key` field, computed as
//! `SHA512(order_id + status_code + gross_amount + server_key)` and hex encoded. The `gross_amount` is hashed exactly
//! as Midtrans formatted it in the notification (e.g. `"100000.00"`), so it is taken from the raw JSON rather than a
//! parsed amount.
use log::*;
use serde_json::Value;
use sha2::{Digest, Sha512};
use subtle::ConstantTimeEq;

fn signature_digest(order_id: &str, status_code: &str, gross_amount: &str, server_key: &str) -> Vec<u8> {
    let mut hasher = Sha512::new();
    hasher.update(order_id.as_bytes());
    hasher.update(status_code.as_bytes());
    hasher.update(gross_amount.as_bytes());
    hasher.update(server_key.as_bytes());
    hasher.finalize().to_vec()
}

pub fn signature_key(order_id: &str, status_code: &str, gross_amount: &str, server_key: &str) -> String {
    hex::encode(signature_digest(order_id, status_code, gross_amount, server_key))
}

fn field_as_string(payload: &Value, field: &str) -> Option<String> {
    match &payload[field] {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Checks the `signature_key` of a raw notification payload against the server key.
///
/// Returns false if any of the signed fields, or the signature itself, is missing. The signature is hex decoded and the
/// digests are compared in constant time, so either hex case is accepted.
pub fn verify_signature_key(payload: &Value, server_key: &str) -> bool {
    let fields = ["order_id", "status_code", "gross_amount"].map(|f| field_as_string(payload, f));
    let [Some(order_id), Some(status_code), Some(gross_amount)] = fields else {
        debug!("🔐️ Notification is missing one or more signed fields");
        return false;
    };
    let Some(signature) = payload["signature_key"].as_str() else {
        debug!("🔐️ Notification for order {order_id} has no signature_key");
        return false;
    };
    let Ok(given) = hex::decode(signature) else {
        debug!("🔐️ Notification for order {order_id} has a signature_key that is not hex encoded");
        return false;
    };
    let expected = signature_digest(&order_id, &status_code, &gross_amount, server_key);
    // Slices of different lengths compare unequal
    expected.as_slice().ct_eq(given.as_slice()).into()
}
