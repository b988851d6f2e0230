//! The event router: classification, admission, dispatch.
//!
//! [`ReleaseRouter::handle`] is the single entry point for inbound
//! notification events. It never returns an error: every failure is resolved
//! into a response written onto the event, and every event receives at most
//! one terminal response from this layer.
//!
//! An admission either commits exactly one record for its release id or is
//! rejected with a classified error; the lock entry taken at the start is
//! guard-held and released on every path, including unwinds.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, instrument, trace, warn};

use crate::registry::RepositoryRegistry;
use crate::store::ReleaseStore;
use crate::types::{ReleaseId, ReleaseRecord};
use crate::webhooks::payload::{self, ReleaseNotification};
use crate::worker::ReleaseProcessor;

use super::error::AdmissionError;
use super::event::NotificationEvent;
use super::lock::AdmissionLock;

/// Actions that announce a newly created release. Everything else the sender
/// emits (pings, edits, deletions, draft churn) is discarded at intake.
const CREATION_ACTIONS: [&str; 3] = ["published", "released", "created"];

/// Routes notification events through admission and on to processing.
pub struct ReleaseRouter {
    lock: AdmissionLock,
    store: ReleaseStore,
    registry: RepositoryRegistry,
    queue: mpsc::Sender<ReleaseId>,
    processor: Arc<dyn ReleaseProcessor>,
    async_mode: bool,
}

impl ReleaseRouter {
    /// Creates a router in the default asynchronous dispatch mode.
    pub fn new(
        store: ReleaseStore,
        registry: RepositoryRegistry,
        queue: mpsc::Sender<ReleaseId>,
        processor: Arc<dyn ReleaseProcessor>,
    ) -> Self {
        ReleaseRouter {
            lock: AdmissionLock::new(),
            store,
            registry,
            queue,
            processor,
            async_mode: true,
        }
    }

    /// Switches between asynchronous (queue) and synchronous (in-line)
    /// dispatch of admitted releases.
    pub fn with_async_mode(mut self, async_mode: bool) -> Self {
        self.async_mode = async_mode;
        self
    }

    /// The router's admission lock. Exposed for observability.
    pub fn admission_lock(&self) -> &AdmissionLock {
        &self.lock
    }

    /// Handles one inbound event.
    ///
    /// Non-creation events (pings, drafts, unrecognized actions) are
    /// discarded without touching the response slot. For creation events the
    /// admission outcome decides: success also leaves the slot unset (the
    /// transport acknowledges with its default), classified failures write
    /// their taxonomy code, and anything unanticipated falls back to 500.
    #[instrument(skip(self, event), fields(delivery_id = %event.delivery_id()))]
    pub async fn handle(&self, event: &mut NotificationEvent) {
        let action = payload::action_of(event.payload());
        let is_creation_event = action.is_some_and(|a| CREATION_ACTIONS.contains(&a))
            && !payload::is_draft(event.payload());

        if !is_creation_event {
            trace!(action, "discarding non-creation event");
            return;
        }

        match self.admit(event).await {
            Ok(release_id) => {
                debug!(release_id = %release_id, "release admitted");
            }
            Err(err) => self.resolve_failure(event, err),
        }
    }

    /// Admits a creation event: at most one durable record per release id.
    async fn admit(&self, event: &NotificationEvent) -> Result<ReleaseId, AdmissionError> {
        let notification = ReleaseNotification::from_payload(event.payload())?;
        let release_id = notification.release_id;

        // Fast-path rejection of duplicate deliveries racing on this
        // process. The guard drops on every exit path below.
        let _guard = self
            .lock
            .acquire(release_id)
            .ok_or(AdmissionError::AlreadyReceived(release_id))?;

        // Durable rejection: duplicates that arrived on another process, or
        // before a restart.
        if self.store.find_by_release_id(release_id)?.is_some() {
            return Err(AdmissionError::AlreadyReceived(release_id));
        }

        let repo = self
            .registry
            .lookup(notification.repo_id, &notification.repo_name)
            .ok_or_else(|| AdmissionError::RepositoryNotFound(notification.repo_name.clone()))?;
        if !repo.enabled {
            return Err(AdmissionError::RepositoryDisabled(repo.name));
        }

        let record = ReleaseRecord::received(release_id, notification.tag, repo.github_id);
        let mut txn = self.store.begin();
        txn.stage(record.clone());

        if self.async_mode {
            // Commit must precede enqueue: the processor may pick the id up
            // on another process and has to find a durable record there.
            txn.commit()?;
            self.queue
                .send(release_id)
                .await
                .map_err(|_| AdmissionError::DispatchFailed(release_id))?;
        } else {
            self.processor
                .process(&record)
                .await
                .map_err(|err| AdmissionError::Processing(err.to_string()))?;
            txn.commit()?;
        }

        Ok(release_id)
    }

    /// Resolves an admission failure into a terminal response.
    fn resolve_failure(&self, event: &mut NotificationEvent, err: AdmissionError) {
        let status = err.status();
        if err.is_classified() {
            warn!(status, error = %err, "release admission rejected");
            event.respond(status, err.to_string());
            return;
        }

        // Unanticipated failure: still guarantee a terminal response, but
        // never clobber a classified one a prior handler already wrote.
        match event.response() {
            Some(response) if response.status >= 400 => {}
            _ => {
                warn!(error = %err, "release admission failed");
                event.respond(500, err.to_string());
            }
        }
    }
}
