use common::{Job, JobId};
use std::collections::HashSet;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::error::{BookmarkError, StorageReadError, StorageWriteError};
use crate::storage::KeyValueStore;

/// Storage key holding the bookmark set: a JSON array of job snapshots in
/// bookmarking order, unique by id key.
pub const BOOKMARKS_KEY: &str = "bookmarked_jobs";

/// Persisted bookmark set. Mutations run one at a time, so a rapid second
/// toggle always sees the first one's result.
pub struct BookmarkStore<S> {
    storage: S,
    write_lock: Mutex<()>,
}

impl<S: KeyValueStore> BookmarkStore<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            write_lock: Mutex::new(()),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub async fn list_all(&self) -> Result<Vec<Job>, StorageReadError> {
        self.read().await
    }

    /// [`list_all`](Self::list_all), treating unreadable storage as empty.
    pub async fn list_or_empty(&self) -> Vec<Job> {
        self.read().await.unwrap_or_else(|err| {
            warn!(error = %err, "treating bookmarks as empty");
            Vec::new()
        })
    }

    /// Flip membership of `job`. Returns `true` when it is now bookmarked.
    pub async fn toggle(&self, job: &Job) -> Result<bool, BookmarkError> {
        let _guard = self.write_lock.lock().await;

        let mut jobs = self.read().await?;
        let key = job.id.key();
        let bookmarked = match jobs.iter().position(|saved| saved.id.key() == key) {
            Some(index) => {
                jobs.remove(index);
                false
            }
            None => {
                jobs.push(job.clone());
                true
            }
        };
        self.write(&jobs).await?;

        info!(job_id = %key, bookmarked, total = jobs.len(), "toggled bookmark");
        Ok(bookmarked)
    }

    pub async fn is_bookmarked(&self, id: &JobId) -> Result<bool, StorageReadError> {
        let key = id.key();
        Ok(self.read().await?.iter().any(|job| job.id.key() == key))
    }

    /// Drop one bookmark. Returns `false` when it was not saved.
    pub async fn remove(&self, id: &JobId) -> Result<bool, BookmarkError> {
        let _guard = self.write_lock.lock().await;

        let mut jobs = self.read().await?;
        let key = id.key();
        let before = jobs.len();
        jobs.retain(|job| job.id.key() != key);
        if jobs.len() == before {
            return Ok(false);
        }

        self.write(&jobs).await?;
        Ok(true)
    }

    pub async fn clear(&self) -> Result<(), StorageWriteError> {
        let _guard = self.write_lock.lock().await;
        self.storage.remove(BOOKMARKS_KEY).await?;
        info!("cleared bookmarks");
        Ok(())
    }

    async fn read(&self) -> Result<Vec<Job>, StorageReadError> {
        let Some(text) = self.storage.get(BOOKMARKS_KEY).await? else {
            return Ok(Vec::new());
        };
        let jobs: Vec<Job> = serde_json::from_str(&text)?;

        // Keep the first snapshot if a hand-edited file repeats an id.
        let mut seen = HashSet::new();
        Ok(jobs
            .into_iter()
            .filter(|job| seen.insert(job.id.key()))
            .collect())
    }

    async fn write(&self, jobs: &[Job]) -> Result<(), StorageWriteError> {
        let text = serde_json::to_string(jobs)?;
        self.storage.set(BOOKMARKS_KEY, &text).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use common::normalize;
    use serde_json::json;

    fn job(id: serde_json::Value, title: &str) -> Job {
        normalize(&json!({ "id": id, "title": title }))
    }

    #[tokio::test]
    async fn test_toggle_on_then_off() {
        let store = BookmarkStore::new(MemoryStore::new());
        let cook = job(json!("42"), "Cook");

        assert!(store.toggle(&cook).await.unwrap());
        let saved = store.list_all().await.unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].id, JobId::from("42"));

        assert!(!store.toggle(&cook).await.unwrap());
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_toggle_sequence_never_duplicates() {
        let store = BookmarkStore::new(MemoryStore::new());
        let jobs = [job(json!(1), "A"), job(json!(2), "B"), job(json!("1"), "A again")];

        for j in jobs.iter().chain(jobs.iter()).chain(jobs.iter().take(2)) {
            store.toggle(j).await.unwrap();
        }

        let saved = store.list_all().await.unwrap();
        let keys: HashSet<String> = saved.iter().map(|j| j.id.key()).collect();
        assert_eq!(keys.len(), saved.len());
    }

    #[tokio::test]
    async fn test_snapshot_is_not_a_live_reference() {
        let store = BookmarkStore::new(MemoryStore::new());
        let mut driver = job(json!(9), "Driver");
        store.toggle(&driver).await.unwrap();

        driver.title = "Senior Driver".to_string();

        assert_eq!(store.list_all().await.unwrap()[0].title, "Driver");
        assert!(store.is_bookmarked(&JobId::Number(9)).await.unwrap());
    }

    #[tokio::test]
    async fn test_corrupt_storage_is_a_read_error() {
        let store = BookmarkStore::new(MemoryStore::new());
        store.storage().set(BOOKMARKS_KEY, "{not json").await.unwrap();

        assert!(matches!(
            store.list_all().await,
            Err(StorageReadError::Corrupt(_))
        ));
        assert!(store.list_or_empty().await.is_empty());
        assert!(matches!(
            store.toggle(&job(json!(1), "A")).await,
            Err(BookmarkError::Read(_))
        ));
    }

    #[tokio::test]
    async fn test_remove_and_clear() {
        let store = BookmarkStore::new(MemoryStore::new());
        store.toggle(&job(json!(1), "A")).await.unwrap();
        store.toggle(&job(json!(2), "B")).await.unwrap();

        assert!(store.remove(&JobId::Number(1)).await.unwrap());
        assert!(!store.remove(&JobId::Number(1)).await.unwrap());
        assert_eq!(store.list_all().await.unwrap().len(), 1);

        store.clear().await.unwrap();
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_toggles_on_same_id_are_serialized() {
        let store = BookmarkStore::new(MemoryStore::new());
        let cook = job(json!(42), "Cook");

        let (first, second) = tokio::join!(store.toggle(&cook), store.toggle(&cook));

        assert!(first.unwrap());
        assert!(!second.unwrap());
        assert!(store.list_all().await.unwrap().is_empty());
    }
}
