//! Admission error taxonomy and response-code mapping.
//!
//! Every failure mode of the admission procedure maps to a stable HTTP-style
//! status code. Errors never escape the router; they are resolved into a
//! response written onto the event.

use thiserror::Error;

use crate::store::{CommitError, StoreError};
use crate::types::ReleaseId;
use crate::webhooks::PayloadError;

/// A classified admission failure.
#[derive(Debug, Error)]
pub enum AdmissionError {
    /// A record (or an in-flight admission) already exists for this release.
    #[error("release {0} has already been received")]
    AlreadyReceived(ReleaseId),

    /// The repository is registered but not accepting new releases.
    #[error("repository {0} is disabled")]
    RepositoryDisabled(String),

    /// The caller lacks rights to the repository.
    #[error("access to repository {0} is not permitted")]
    RepositoryAccess(String),

    /// The delivery's sender is not authorized.
    #[error("event sender is not authorized")]
    InvalidSender,

    /// No registered repository matches the payload's id or name.
    #[error("no repository registered for {0}")]
    RepositoryNotFound(String),

    /// The payload lacks fields required for admission.
    #[error(transparent)]
    Payload(#[from] PayloadError),

    /// The release-record store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The committed release could not be handed to the processor queue.
    #[error("failed to enqueue release {0} for processing")]
    DispatchFailed(ReleaseId),

    /// Synchronous downstream processing failed.
    #[error("release processing failed: {0}")]
    Processing(String),
}

impl AdmissionError {
    /// The response code this failure maps to.
    ///
    /// Most specific first: duplicates and disabled repositories are
    /// conflicts (409), access-class failures are 403, an unknown repository
    /// is 404, and everything else is an unanticipated failure (500).
    pub fn status(&self) -> u16 {
        match self {
            AdmissionError::AlreadyReceived(_) | AdmissionError::RepositoryDisabled(_) => 409,
            AdmissionError::RepositoryAccess(_) | AdmissionError::InvalidSender => 403,
            AdmissionError::RepositoryNotFound(_) => 404,
            AdmissionError::Payload(_)
            | AdmissionError::Store(_)
            | AdmissionError::DispatchFailed(_)
            | AdmissionError::Processing(_) => 500,
        }
    }

    /// Whether this failure belongs to the classified taxonomy (4xx) as
    /// opposed to the unclassified 500 fallback.
    pub fn is_classified(&self) -> bool {
        self.status() < 500
    }
}

// A uniqueness violation during commit is a normal outcome of two admissions
// racing past the existence check; it resolves to AlreadyReceived, never to
// a generic failure.
impl From<CommitError> for AdmissionError {
    fn from(err: CommitError) -> Self {
        match err {
            CommitError::Conflict(id) => AdmissionError::AlreadyReceived(id),
            CommitError::Store(e) => AdmissionError::Store(e),
        }
    }
}
