//! Request token generation for the T-Bank API.
//!
//! Every signed POST operation carries a `Token` field: a SHA-256 digest over
//! the scalar request parameters plus the merchant's secret. The gateway
//! recomputes the same digest on its side, so the canonicalization below is an
//! external wire contract and must be reproduced exactly:
//!
//! 1. Drop the `Token` field itself, and every value that is not a JSON
//!    string, number, or boolean (nested `Receipt`/`DATA` objects and `Shops`
//!    arrays never participate).
//! 2. Insert `Password = secret`.
//! 3. Sort keys lexicographically, concatenate the stringified values in that
//!    order with no separator.
//! 4. SHA-256 over the UTF-8 bytes, lowercase hex.
//!
//! A mismatch anywhere does not crash: the gateway simply rejects the request
//! with an authentication error.

use std::collections::BTreeMap;

use serde_json::Value;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::transport::RequestParams;

/// Generates the request token for `params` under the given signing secret.
///
/// Deterministic: the result depends only on the scalar key→value subset of
/// `params`, never on insertion order.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use tbank_payments::generate_token;
///
/// let params = json!({
///     "TerminalKey": "TestTerminal",
///     "Amount": 10000,
///     "OrderId": "order-123",
/// });
///
/// let token = generate_token(params.as_object().unwrap(), "TestPassword");
/// assert_eq!(token.len(), 64);
/// ```
#[must_use]
pub fn generate_token(params: &RequestParams, secret: &str) -> String {
    // BTreeMap keeps keys in byte order, which is the sort the gateway uses.
    let mut fields: BTreeMap<&str, String> = params
        .iter()
        .filter(|(key, _)| key.as_str() != "Token")
        .filter_map(|(key, value)| scalar_to_string(value).map(|s| (key.as_str(), s)))
        .collect();
    fields.insert("Password", secret.to_owned());

    let concatenated: String = fields.values().map(String::as_str).collect();

    let mut hasher = Sha256::new();
    hasher.update(concatenated.as_bytes());
    hex::encode(hasher.finalize())
}

/// Checks a gateway notification signature in constant time.
///
/// Recomputes the token over `notification` with the configured secret and
/// compares it against `received_token`. Callers must reject any notification
/// for which this returns `false` before acting on its contents.
#[must_use]
pub fn verify_signature(notification: &RequestParams, secret: &str, received_token: &str) -> bool {
    let calculated = generate_token(notification, secret);
    calculated.as_bytes().ct_eq(received_token.as_bytes()).into()
}

/// Stringifies a scalar JSON value the way the gateway expects.
///
/// Strings pass verbatim, numbers use their JSON text (integers carry no
/// decimal point), booleans become `true`/`false`. Nulls, objects, and arrays
/// are excluded from signing entirely.
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Object(_) | Value::Array(_) => None,
    }
}
