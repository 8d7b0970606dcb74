use common::{Job, JobId};
use parking_lot::RwLock;
use std::collections::HashSet;
use tokio::sync::Mutex;
use tracing::error;

use super::store::BookmarkStore;
use crate::error::{BookmarkError, StorageReadError};
use crate::storage::KeyValueStore;

pub const LOAD_FAILED: &str = "Failed to load bookmarks. Please try again.";
pub const UPDATE_FAILED: &str = "Failed to update bookmark. Please try again.";

#[derive(Debug, Default)]
struct Snapshot {
    jobs: Vec<Job>,
    ids: HashSet<String>,
    loading: bool,
    last_error: Option<&'static str>,
}

/// In-memory mirror of the bookmark store shared by every screen.
///
/// Starts empty; [`reload`](Self::reload) fills it from storage and
/// [`toggle`](Self::toggle) writes through the store before touching memory,
/// so the mirror only ever reflects what storage last confirmed. Membership
/// checks never hit storage.
pub struct BookmarkState<S> {
    store: BookmarkStore<S>,
    snapshot: RwLock<Snapshot>,
    ops: Mutex<()>,
}

impl<S: KeyValueStore> BookmarkState<S> {
    pub fn new(store: BookmarkStore<S>) -> Self {
        Self {
            store,
            snapshot: RwLock::new(Snapshot::default()),
            ops: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &BookmarkStore<S> {
        &self.store
    }

    /// Replace the mirror with what storage holds. On failure the previous
    /// contents stay in place and the error is returned.
    pub async fn reload(&self) -> Result<usize, StorageReadError> {
        let _op = self.ops.lock().await;
        self.snapshot.write().loading = true;

        let result = self.store.list_all().await;

        let mut snapshot = self.snapshot.write();
        snapshot.loading = false;
        match result {
            Ok(jobs) => {
                snapshot.ids = jobs.iter().map(|job| job.id.key()).collect();
                snapshot.jobs = jobs;
                snapshot.last_error = None;
                Ok(snapshot.jobs.len())
            }
            Err(err) => {
                error!(error = %err, "failed to load bookmarks");
                snapshot.last_error = Some(LOAD_FAILED);
                Err(err)
            }
        }
    }

    /// Toggle through the store, then mirror its answer.
    pub async fn toggle(&self, job: &Job) -> Result<bool, BookmarkError> {
        let _op = self.ops.lock().await;

        let bookmarked = match self.store.toggle(job).await {
            Ok(bookmarked) => bookmarked,
            Err(err) => {
                error!(job_id = %job.id, error = %err, "failed to toggle bookmark");
                self.snapshot.write().last_error = Some(UPDATE_FAILED);
                return Err(err);
            }
        };

        let key = job.id.key();
        let mut snapshot = self.snapshot.write();
        if bookmarked {
            if snapshot.ids.insert(key) {
                snapshot.jobs.push(job.clone());
            }
        } else {
            snapshot.ids.remove(&key);
            snapshot.jobs.retain(|saved| saved.id.key() != key);
        }
        snapshot.last_error = None;

        Ok(bookmarked)
    }

    pub fn is_bookmarked(&self, id: &JobId) -> bool {
        self.snapshot.read().ids.contains(&id.key())
    }

    /// Bookmarked jobs in the order they were saved.
    pub fn jobs(&self) -> Vec<Job> {
        self.snapshot.read().jobs.clone()
    }

    pub fn ids(&self) -> HashSet<String> {
        self.snapshot.read().ids.clone()
    }

    pub fn count(&self) -> usize {
        self.snapshot.read().jobs.len()
    }

    pub fn is_loading(&self) -> bool {
        self.snapshot.read().loading
    }

    pub fn last_error(&self) -> Option<&'static str> {
        self.snapshot.read().last_error
    }
}
