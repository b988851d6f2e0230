//! In-process admission lock.
//!
//! An ephemeral set of release ids currently being admitted on this process.
//! It collapses duplicate concurrent deliveries before they reach the store;
//! it is a latency optimization only. Correctness across processes rests on
//! the store's uniqueness constraint, which holds with or without this lock.
//!
//! Acquisition hands out an RAII [`AdmissionGuard`]; the entry is removed
//! when the guard drops, so every exit path of an admission (success,
//! classified failure, or panic unwind) releases the lock.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::types::ReleaseId;

/// Concurrent set of in-flight release ids.
///
/// Owned by the router instance (constructor-injected), not process-global,
/// so independent routers (e.g. in tests) do not interfere.
#[derive(Debug, Clone, Default)]
pub struct AdmissionLock {
    in_flight: Arc<Mutex<HashSet<ReleaseId>>>,
}

impl AdmissionLock {
    pub fn new() -> Self {
        AdmissionLock::default()
    }

    /// Claims `release_id` for one admission attempt.
    ///
    /// Returns `None` if an admission for this id is already in flight on
    /// this process. The membership test and the insert happen under one
    /// mutex acquisition, so two concurrent callers can never both succeed.
    pub fn acquire(&self, release_id: ReleaseId) -> Option<AdmissionGuard> {
        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if !in_flight.insert(release_id) {
            return None;
        }
        Some(AdmissionGuard {
            release_id,
            in_flight: Arc::clone(&self.in_flight),
        })
    }

    /// Whether an admission for `release_id` is currently in flight.
    pub fn is_held(&self, release_id: ReleaseId) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains(&release_id)
    }

    /// Number of admissions currently in flight.
    pub fn in_flight(&self) -> usize {
        self.in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

/// Holds a release id's admission-lock entry until dropped.
#[derive(Debug)]
pub struct AdmissionGuard {
    release_id: ReleaseId,
    in_flight: Arc<Mutex<HashSet<ReleaseId>>>,
}

impl Drop for AdmissionGuard {
    fn drop(&mut self) {
        // Release even if another holder panicked with the mutex held.
        self.in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&self.release_id);
    }
}
