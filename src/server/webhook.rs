//! Webhook endpoint handler.
//!
//! Accepts release-notification deliveries, verifies the sender signature
//! when a secret is configured, and hands each event to the release router.
//! The router writes the acknowledgment onto the event; if it leaves the
//! response slot unset (discarded event or delegated success) the transport
//! answers with its default 202.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{debug, warn};

use crate::intake::{EventResponse, NotificationEvent};
use crate::types::DeliveryId;
use crate::webhooks::verify_signature;

use super::AppState;

/// Header carrying the delivery ID.
const HEADER_DELIVERY: &str = "x-github-delivery";
/// Header carrying the payload signature.
const HEADER_SIGNATURE: &str = "x-hub-signature-256";

/// Transport-level rejections, produced before the event reaches the router.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Missing required header.
    #[error("missing required header: {0}")]
    MissingHeader(&'static str),

    /// Body is not valid JSON.
    #[error("invalid JSON body: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Signature missing or failed verification.
    #[error("event sender is not authorized")]
    InvalidSender,
}

impl WebhookError {
    fn status(&self) -> StatusCode {
        match self {
            WebhookError::MissingHeader(_) | WebhookError::InvalidJson(_) => {
                StatusCode::BAD_REQUEST
            }
            WebhookError::InvalidSender => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = EventResponse {
            status: status.as_u16(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Webhook handler.
///
/// # Request
///
/// - Method: POST
/// - Required header: `X-GitHub-Delivery` (delivery id)
/// - Required header when a secret is configured: `X-Hub-Signature-256`
/// - Body: JSON notification payload
///
/// # Response
///
/// - 202 Accepted: event discarded or admitted (delegated success)
/// - 400 Bad Request: missing header or invalid JSON
/// - 403 Forbidden: signature missing/invalid
/// - 404/409/500: admission outcome, body `{status, message}`
pub async fn webhook_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, WebhookError> {
    let delivery_id = DeliveryId::new(get_header(&headers, HEADER_DELIVERY)?);

    // Verify the sender before parsing or any admission work.
    if let Some(secret) = app_state.webhook_secret() {
        let signature = headers
            .get(HEADER_SIGNATURE)
            .and_then(|value| value.to_str().ok());
        let verified =
            signature.is_some_and(|header| verify_signature(&body, header, secret));
        if !verified {
            warn!(delivery_id = %delivery_id, "rejecting delivery with invalid signature");
            return Err(WebhookError::InvalidSender);
        }
    }

    let payload: serde_json::Value = serde_json::from_slice(&body)?;

    debug!(delivery_id = %delivery_id, "received notification event");

    let mut event = NotificationEvent::new(delivery_id, payload);
    app_state.router().handle(&mut event).await;

    Ok(match event.response() {
        Some(response) => {
            let status = StatusCode::from_u16(response.status)
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, Json(response.clone())).into_response()
        }
        // No response written: discarded or delegated success.
        None => (StatusCode::ACCEPTED, "Accepted").into_response(),
    })
}

/// Extracts a required header value as a string.
fn get_header(headers: &HeaderMap, name: &'static str) -> Result<String, WebhookError> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string())
        .ok_or(WebhookError::MissingHeader(name))
}
