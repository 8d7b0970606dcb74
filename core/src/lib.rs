//! Job board core
//!
//! Fetches pages of jobs from the upstream API, keeps the paginated list for
//! a screen, and persists bookmarked jobs on the device.

pub mod api;
pub mod bookmarks;
pub mod config;
pub mod error;
pub mod listing;
pub mod logging;
pub mod storage;

pub use api::{JobSource, JobsClient};
pub use bookmarks::{BookmarkState, BookmarkStore};
pub use error::{BookmarkError, FetchError, StorageReadError, StorageWriteError};
pub use listing::{JobList, ListState, LoadOutcome};
pub use storage::{FileStore, KeyValueStore, MemoryStore};

pub use common::{Job, JobId};
