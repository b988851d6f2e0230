//! Core domain types for the release intake service.

pub mod ids;
pub mod release;

pub use ids::{DeliveryId, ReleaseId, RepoGithubId};
pub use release::{ReleaseRecord, ReleaseStatus, Repository};
