//! Error types for fetching jobs and persisting bookmarks.

use std::io;
use thiserror::Error;

/// Page fetch failures. Every variant carries the page that was requested.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("page numbers start at 1, got {0}")]
    InvalidPage(u32),

    #[error("failed to fetch jobs page {page}: {source}")]
    Transport {
        page: u32,
        #[source]
        source: reqwest::Error,
    },

    #[error("jobs page {page} returned status {status}")]
    Status { page: u32, status: u16 },
}

impl FetchError {
    pub fn page(&self) -> u32 {
        match self {
            Self::InvalidPage(page) => *page,
            Self::Transport { page, .. } | Self::Status { page, .. } => *page,
        }
    }
}

/// A successful response that does not look like a jobs page. Logged and
/// degraded to an empty page, never returned to callers.
#[derive(Debug, Error)]
pub enum MalformedResponseError {
    #[error("response body is not JSON: {0}")]
    NotJson(#[from] serde_json::Error),

    #[error("response has no results array")]
    MissingResults,
}

#[derive(Debug, Error)]
pub enum StorageReadError {
    #[error("bookmark storage is unreadable: {0}")]
    Io(#[from] io::Error),

    #[error("bookmark storage is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum StorageWriteError {
    #[error("failed to write bookmark storage: {0}")]
    Io(#[from] io::Error),

    #[error("failed to serialize bookmarks: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum BookmarkError {
    #[error(transparent)]
    Read(#[from] StorageReadError),

    #[error(transparent)]
    Write(#[from] StorageWriteError),
}
