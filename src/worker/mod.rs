//! Asynchronous release processing.
//!
//! The router commits a release record and then pushes its id onto the
//! release queue; the worker drains the queue, loads the record, and drives
//! the downstream processor. Commit-before-enqueue means the worker always
//! finds a durable record for every id it receives, on this process or any
//! other consumer of the queue.
//!
//! The worker owns the status lifecycle after admission:
//! `Received → Processing → {Processed, Error}`.

pub mod processor;

pub use processor::{LogProcessor, ProcessError, ReleaseProcessor};

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::store::ReleaseStore;
use crate::types::{ReleaseId, ReleaseStatus};

/// Default capacity of the release queue.
pub const RELEASE_QUEUE_BUFFER: usize = 100;

/// Creates the bounded queue connecting the router to the worker.
pub fn release_queue(capacity: usize) -> (mpsc::Sender<ReleaseId>, mpsc::Receiver<ReleaseId>) {
    mpsc::channel(capacity)
}

/// Runs the worker loop until the queue closes or shutdown is requested.
pub async fn run_worker(
    mut queue: mpsc::Receiver<ReleaseId>,
    store: ReleaseStore,
    processor: Arc<dyn ReleaseProcessor>,
    shutdown: CancellationToken,
) {
    info!("release worker started");
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                info!("release worker shutting down");
                break;
            }
            next = queue.recv() => {
                match next {
                    Some(release_id) => {
                        process_one(&store, processor.as_ref(), release_id).await;
                    }
                    None => {
                        debug!("release queue closed, worker exiting");
                        break;
                    }
                }
            }
        }
    }
}

/// Processes one queued release id.
async fn process_one(store: &ReleaseStore, processor: &dyn ReleaseProcessor, id: ReleaseId) {
    let record = match store.find_by_release_id(id) {
        Ok(Some(record)) => record,
        Ok(None) => {
            // Commit precedes enqueue, so this indicates a bug or a store
            // wiped between the two. Skip rather than crash the loop.
            warn!(release_id = %id, "queued release has no committed record");
            return;
        }
        Err(err) => {
            warn!(release_id = %id, error = %err, "failed to load queued release");
            return;
        }
    };

    if let Err(err) = store.update_status(id, ReleaseStatus::Processing) {
        warn!(release_id = %id, error = %err, "failed to mark release as processing");
        return;
    }

    let outcome = match processor.process(&record).await {
        Ok(()) => {
            info!(release_id = %id, tag = %record.tag, "release processed");
            ReleaseStatus::Processed
        }
        Err(err) => {
            warn!(release_id = %id, error = %err, "release processing failed");
            ReleaseStatus::Error
        }
    };

    if let Err(err) = store.update_status(id, outcome) {
        warn!(release_id = %id, error = %err, "failed to record processing outcome");
    }
}
