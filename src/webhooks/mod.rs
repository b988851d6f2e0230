//! Webhook payload handling.
//!
//! This module provides:
//! - Signature verification for webhook deliveries (HMAC-SHA256)
//! - Typed extraction of release fields from raw payloads

pub mod payload;
pub mod signature;

pub use payload::{PayloadError, ReleaseNotification};
pub use signature::{compute_signature, format_signature_header, verify_signature};
