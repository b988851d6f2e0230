//! The downstream-processor boundary.
//!
//! Admitted releases are handed to a [`ReleaseProcessor`]: asynchronously via
//! the release queue, or in-line when the service runs in synchronous mode.
//! What processing actually does (metadata extraction, archival, hosting-API
//! calls) lives behind this trait and is not part of the intake core.

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::types::ReleaseRecord;

/// Error from the downstream processing workflow.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ProcessError(pub String);

impl ProcessError {
    pub fn new(message: impl Into<String>) -> Self {
        ProcessError(message.into())
    }
}

/// Consumes an admitted release and performs the processing workflow.
#[async_trait]
pub trait ReleaseProcessor: Send + Sync {
    async fn process(&self, release: &ReleaseRecord) -> Result<(), ProcessError>;
}

/// Default processor: records the hand-off and succeeds.
///
/// Deployments substitute their own implementation; the intake layer only
/// cares that each admitted release reaches `process` exactly once.
#[derive(Debug, Default)]
pub struct LogProcessor;

#[async_trait]
impl ReleaseProcessor for LogProcessor {
    async fn process(&self, release: &ReleaseRecord) -> Result<(), ProcessError> {
        info!(
            release_id = %release.release_id,
            tag = %release.tag,
            repository = %release.repository,
            "processing release"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn log_processor_accepts_any_release() {
        let release = ReleaseRecord::received(1u64, "v1.0", 2u64);
        assert!(LogProcessor.process(&release).await.is_ok());
    }
}
