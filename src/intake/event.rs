//! Inbound notification events.
//!
//! A [`NotificationEvent`] pairs the sender's immutable payload with a
//! response slot the intake layer fills in before the transport acknowledges
//! the delivery. The transport creates the event, hands it to the router, and
//! discards it after acknowledgment; events are never persisted.

use serde::Serialize;
use serde_json::Value;

use crate::types::DeliveryId;

/// The HTTP-style acknowledgment written onto an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventResponse {
    /// Status code mirrored to the transport (e.g. 409).
    pub status: u16,
    /// Human-readable description of the outcome.
    pub message: String,
}

/// One inbound webhook delivery.
#[derive(Debug)]
pub struct NotificationEvent {
    delivery_id: DeliveryId,
    payload: Value,
    response: Option<EventResponse>,
}

impl NotificationEvent {
    pub fn new(delivery_id: impl Into<DeliveryId>, payload: Value) -> Self {
        NotificationEvent {
            delivery_id: delivery_id.into(),
            payload,
            response: None,
        }
    }

    pub fn delivery_id(&self) -> &DeliveryId {
        &self.delivery_id
    }

    /// The raw payload. Read-only to the intake layer.
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// Writes the terminal response for this event.
    ///
    /// The router decides when an existing response may be replaced (see the
    /// unclassified-failure rule); this method itself always overwrites.
    pub fn respond(&mut self, status: u16, message: impl Into<String>) {
        self.response = Some(EventResponse {
            status,
            message: message.into(),
        });
    }

    /// The response written so far, if any.
    pub fn response(&self) -> Option<&EventResponse> {
        self.response.as_ref()
    }
}
