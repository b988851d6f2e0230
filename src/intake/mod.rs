//! Event intake: classification, admission locking, and routing.
//!
//! This is the layer that turns at-least-once webhook delivery into
//! at-most-once release admission. See [`router::ReleaseRouter`] for the
//! orchestration and [`lock::AdmissionLock`] / the store's uniqueness
//! constraint for the two levels of duplicate rejection.

pub mod error;
pub mod event;
pub mod lock;
pub mod router;

pub use error::AdmissionError;
pub use event::{EventResponse, NotificationEvent};
pub use lock::{AdmissionGuard, AdmissionLock};
pub use router::ReleaseRouter;
