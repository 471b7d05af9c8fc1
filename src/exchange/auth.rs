//! Request signing for the futures REST dialect

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::common::errors::{RelayError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the API key on signed requests
pub const API_KEY_HEADER: &str = "X-MBX-APIKEY";

/// Sign a url-encoded query string with HMAC-SHA256
///
/// # Arguments
/// * `secret` - API secret, used as raw bytes
/// * `query` - Exact query/body string sent to the server, without `signature`
///
/// Returns the lowercase hex digest to append as `&signature=`.
pub fn sign_query(secret: &str, query: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| RelayError::Authentication(format!("Failed to create HMAC: {}", e)))?;
    mac.update(query.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Append `timestamp` and `recvWindow`, then the signature, to a query
pub fn signed_query(secret: &str, query: &str, timestamp_ms: i64, recv_window: u64) -> Result<String> {
    let mut payload = String::from(query);
    if !payload.is_empty() {
        payload.push('&');
    }
    payload.push_str(&format!("timestamp={}&recvWindow={}", timestamp_ms, recv_window));

    let signature = sign_query(secret, &payload)?;
    Ok(format!("{}&signature={}", payload, signature))
}
