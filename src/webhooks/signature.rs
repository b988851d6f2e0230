//! Webhook delivery signature verification (HMAC-SHA256).
//!
//! The hosting service signs each delivery with a shared secret and sends the
//! signature as `X-Hub-Signature-256: sha256=<hex>`. A delivery whose
//! signature does not verify is treated as coming from an invalid sender and
//! rejected before any admission work.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Computes the HMAC-SHA256 signature of a delivery body.
///
/// Exposed so tests can produce correctly signed requests.
pub fn compute_signature(body: &[u8], secret: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts any key length");
    mac.update(body);
    mac.finalize().into_bytes().to_vec()
}

/// Renders a signature as the sender's header value, `sha256=<hex>`.
pub fn format_signature_header(signature: &[u8]) -> String {
    format!("sha256={}", hex::encode(signature))
}

/// Verifies a delivery signature against the body and shared secret.
///
/// Returns false for malformed headers (wrong prefix, bad hex) as well as for
/// signature mismatches; never panics. Comparison is constant-time via the
/// HMAC library.
pub fn verify_signature(body: &[u8], signature_header: &str, secret: &[u8]) -> bool {
    let Some(hex_sig) = signature_header.strip_prefix("sha256=") else {
        return false;
    };
    let Ok(expected) = hex::decode(hex_sig) else {
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(secret) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}
