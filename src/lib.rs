//! Webhook intake for hosting-service release events.
//!
//! This library admits inbound release notifications exactly once per
//! external release id: classification, in-process admission locking, durable
//! deduplication via the store's uniqueness constraint, and dispatch to the
//! downstream processor.

pub mod config;
pub mod intake;
pub mod registry;
pub mod server;
pub mod store;
pub mod types;
pub mod webhooks;
pub mod worker;
