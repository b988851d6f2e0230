//! Transactional release-record store.
//!
//! The store is keyed by [`ReleaseId`] and enforces uniqueness at commit
//! time. That constraint, not the in-process admission lock, is what makes
//! deduplication correct across processes: two admissions can both pass the
//! existence check, but only one commit ever succeeds, and the loser observes
//! [`CommitError::Conflict`].
//!
//! Writes go through a unit of work: [`ReleaseStore::begin`] →
//! [`Transaction::stage`] → [`Transaction::commit`]. A commit either installs
//! every staged record or none of them.
//!
//! This implementation keeps records in process memory. It stands in for the
//! real storage engine at the same interface: point lookup, staged writes,
//! atomic commit with a uniqueness constraint.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tracing::debug;

use crate::types::{ReleaseId, ReleaseRecord, ReleaseStatus};

/// Errors from store lookups and updates.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing map is unreachable (a writer panicked while holding it).
    #[error("release store is unavailable: {0}")]
    Unavailable(&'static str),

    /// No record exists for the given release id.
    #[error("no release record for id {0}")]
    NotFound(ReleaseId),
}

/// Outcome classification for a commit.
///
/// A conflict is a routine result of concurrent admissions, not an
/// exceptional condition; callers are expected to match on it.
#[derive(Debug, Error)]
pub enum CommitError {
    /// Unique-constraint violation: a record with this release id was
    /// committed by somebody else first.
    #[error("release {0} is already recorded")]
    Conflict(ReleaseId),

    /// The store itself failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Shared handle to the release-record store.
///
/// Cloning is cheap; all clones observe the same records.
#[derive(Debug, Clone, Default)]
pub struct ReleaseStore {
    records: Arc<Mutex<HashMap<ReleaseId, ReleaseRecord>>>,
}

impl ReleaseStore {
    pub fn new() -> Self {
        ReleaseStore::default()
    }

    /// Point lookup by release id.
    pub fn find_by_release_id(&self, id: ReleaseId) -> Result<Option<ReleaseRecord>, StoreError> {
        let records = self
            .records
            .lock()
            .map_err(|_| StoreError::Unavailable("poisoned"))?;
        Ok(records.get(&id).cloned())
    }

    /// Starts a unit of work against this store.
    pub fn begin(&self) -> Transaction {
        Transaction {
            store: self.clone(),
            staged: Vec::new(),
        }
    }

    /// Rewrites the status of an existing record.
    ///
    /// Used by the downstream processor side; intake never calls this.
    pub fn update_status(&self, id: ReleaseId, status: ReleaseStatus) -> Result<(), StoreError> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| StoreError::Unavailable("poisoned"))?;
        let record = records.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        record.status = status;
        Ok(())
    }

    /// Number of committed records.
    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A pending unit of work: staged records that are not yet visible.
///
/// Dropping a transaction without committing discards the staged records
/// (rollback).
#[derive(Debug)]
pub struct Transaction {
    store: ReleaseStore,
    staged: Vec<ReleaseRecord>,
}

impl Transaction {
    /// Adds a record to the pending unit of work without committing it.
    pub fn stage(&mut self, record: ReleaseRecord) {
        self.staged.push(record);
    }

    /// The records staged so far.
    pub fn staged(&self) -> &[ReleaseRecord] {
        &self.staged
    }

    /// Durably installs all staged records, atomically.
    ///
    /// The uniqueness check and the inserts happen under one critical
    /// section, so concurrent commits for the same release id serialize:
    /// exactly one succeeds and the rest get [`CommitError::Conflict`]. On
    /// conflict nothing is installed.
    pub fn commit(self) -> Result<(), CommitError> {
        let mut records = self
            .store
            .records
            .lock()
            .map_err(|_| StoreError::Unavailable("poisoned"))?;

        for record in &self.staged {
            if records.contains_key(&record.release_id) {
                return Err(CommitError::Conflict(record.release_id));
            }
        }

        for record in self.staged {
            debug!(release_id = %record.release_id, tag = %record.tag, "committing release record");
            records.insert(record.release_id, record);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RepoGithubId;

    fn record(id: u64) -> ReleaseRecord {
        ReleaseRecord::received(id, format!("v{id}"), 7u64)
    }

    #[test]
    fn commit_makes_record_findable() {
        let store = ReleaseStore::new();
        let mut txn = store.begin();
        txn.stage(record(1));
        txn.commit().unwrap();

        let found = store.find_by_release_id(ReleaseId(1)).unwrap().unwrap();
        assert_eq!(found.tag, "v1");
        assert_eq!(found.status, ReleaseStatus::Received);
    }

    #[test]
    fn find_on_empty_store_returns_none() {
        let store = ReleaseStore::new();
        assert!(store.find_by_release_id(ReleaseId(9)).unwrap().is_none());
    }

    #[test]
    fn duplicate_commit_conflicts() {
        let store = ReleaseStore::new();

        let mut txn = store.begin();
        txn.stage(record(1));
        txn.commit().unwrap();

        let mut dup = store.begin();
        dup.stage(record(1));
        let err = dup.commit().unwrap_err();
        assert!(matches!(err, CommitError::Conflict(ReleaseId(1))));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn racing_transactions_past_the_existence_check() {
        // Both units of work observe an empty store, both stage the same id;
        // the uniqueness constraint decides the winner at commit time.
        let store = ReleaseStore::new();

        let mut a = store.begin();
        let mut b = store.begin();
        assert!(store.find_by_release_id(ReleaseId(1)).unwrap().is_none());
        a.stage(record(1));
        b.stage(record(1));

        a.commit().unwrap();
        assert!(matches!(b.commit(), Err(CommitError::Conflict(_))));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn conflicting_commit_installs_nothing() {
        let store = ReleaseStore::new();
        let mut txn = store.begin();
        txn.stage(record(1));
        txn.commit().unwrap();

        // Stages one fresh record and one conflicting record.
        let mut mixed = store.begin();
        mixed.stage(record(2));
        mixed.stage(record(1));
        assert!(mixed.commit().is_err());

        // The fresh record must not have been installed.
        assert!(store.find_by_release_id(ReleaseId(2)).unwrap().is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn dropping_a_transaction_rolls_back() {
        let store = ReleaseStore::new();
        {
            let mut txn = store.begin();
            txn.stage(record(1));
            assert_eq!(txn.staged().len(), 1);
            // dropped without commit
        }
        assert!(store.is_empty());
    }

    #[test]
    fn update_status_rewrites_existing_record() {
        let store = ReleaseStore::new();
        let mut txn = store.begin();
        txn.stage(record(1));
        txn.commit().unwrap();

        store
            .update_status(ReleaseId(1), ReleaseStatus::Processed)
            .unwrap();
        let found = store.find_by_release_id(ReleaseId(1)).unwrap().unwrap();
        assert_eq!(found.status, ReleaseStatus::Processed);
    }

    #[test]
    fn update_status_on_missing_record_errors() {
        let store = ReleaseStore::new();
        let err = store
            .update_status(ReleaseId(1), ReleaseStatus::Processing)
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(ReleaseId(1))));
    }

    #[test]
    fn concurrent_commits_for_one_id_admit_exactly_one() {
        let store = ReleaseStore::new();
        let mut handles = Vec::new();

        for _ in 0..16 {
            let store = store.clone();
            handles.push(std::thread::spawn(move || {
                let mut txn = store.begin();
                txn.stage(ReleaseRecord::received(42u64, "v1.0", 7u64));
                txn.commit()
            }));
        }

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let committed = results.iter().filter(|r| r.is_ok()).count();
        let conflicted = results
            .iter()
            .filter(|r| matches!(r, Err(CommitError::Conflict(_))))
            .count();

        assert_eq!(committed, 1);
        assert_eq!(conflicted, 15);
        assert_eq!(store.len(), 1);
        assert_eq!(
            store
                .find_by_release_id(ReleaseId(42))
                .unwrap()
                .unwrap()
                .repository,
            RepoGithubId(7)
        );
    }
}
