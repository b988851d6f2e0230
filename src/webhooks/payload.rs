//! Typed extraction from release webhook payloads.
//!
//! The payload is an opaque JSON document owned by the hosting service. Two
//! levels of access are provided:
//!
//! 1. Lenient accessors ([`action_of`], [`is_draft`]) used for classification.
//!    Missing fields are not errors there; an event without an `action` is
//!    simply not a creation event.
//! 2. Strict extraction ([`ReleaseNotification::from_payload`]) used once an
//!    event has been classified as a release creation. Missing fields at this
//!    point are malformed-payload errors.
//!
//! Unknown or extra fields are ignored throughout.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::types::{ReleaseId, RepoGithubId};

/// Error type for payload extraction failures.
#[derive(Debug, Error)]
pub enum PayloadError {
    /// The payload does not have the expected shape.
    #[error("malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A field required for admission is absent.
    #[error("payload is missing required field: {0}")]
    MissingField(&'static str),
}

/// Returns the event's `action` string, if present.
pub fn action_of(payload: &Value) -> Option<&str> {
    payload.get("action").and_then(Value::as_str)
}

/// Returns the `release.draft` flag, defaulting to false when absent.
pub fn is_draft(payload: &Value) -> bool {
    payload
        .pointer("/release/draft")
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

/// The fields a release-creation event must carry for admission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseNotification {
    /// The hosting service's release id.
    pub release_id: ReleaseId,

    /// The release tag, e.g. "v1.0".
    pub tag: String,

    /// The hosting service's repository id.
    pub repo_id: RepoGithubId,

    /// The repository name.
    pub repo_name: String,
}

// Raw payload structures for deserialization. These match the sender's JSON
// shape; fields are Option so absence can be reported per-field rather than
// as an opaque serde error.

#[derive(Debug, Deserialize)]
struct RawPayload {
    release: Option<RawRelease>,
    repository: Option<RawRepository>,
}

#[derive(Debug, Deserialize)]
struct RawRelease {
    id: Option<u64>,
    tag_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawRepository {
    id: Option<u64>,
    name: Option<String>,
}

impl ReleaseNotification {
    /// Extracts the admission fields from a creation-event payload.
    ///
    /// Callers are expected to have classified the event first; a payload
    /// missing `release.id`, `release.tag_name`, `repository.id` or
    /// `repository.name` is an error here, not a discard.
    pub fn from_payload(payload: &Value) -> Result<Self, PayloadError> {
        let raw = RawPayload::deserialize(payload)?;

        let release = raw.release.ok_or(PayloadError::MissingField("release"))?;
        let repository = raw
            .repository
            .ok_or(PayloadError::MissingField("repository"))?;

        Ok(ReleaseNotification {
            release_id: ReleaseId(
                release.id.ok_or(PayloadError::MissingField("release.id"))?,
            ),
            tag: release
                .tag_name
                .ok_or(PayloadError::MissingField("release.tag_name"))?,
            repo_id: RepoGithubId(
                repository
                    .id
                    .ok_or(PayloadError::MissingField("repository.id"))?,
            ),
            repo_name: repository
                .name
                .ok_or(PayloadError::MissingField("repository.name"))?,
        })
    }
}
