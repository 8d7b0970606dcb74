//! Paginated job list
//!
//! Drives fetch-and-append for one list screen. A `JobList` lives as long as
//! the screen: it owns the page cursor and the set of ids already shown, and
//! [`close`](JobList::close) ends it when the user navigates away.
//!
//! At most one fetch is in flight. Loads requested while one is running are
//! ignored; a refresh supersedes whatever is running and the superseded
//! result is dropped when it lands.

use common::Job;
use parking_lot::Mutex;
use std::collections::HashSet;
use tracing::{debug, error, info};

use crate::api::JobSource;
use crate::config::DEFAULT_PAGE_THRESHOLD;

pub const FIRST_LOAD_FAILED: &str =
    "Failed to load jobs. Please check your internet connection and try again.";
pub const MORE_LOAD_FAILED: &str = "Failed to load more jobs. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadKind {
    First,
    More,
    Refresh,
}

impl LoadKind {
    pub fn failure_message(self) -> &'static str {
        match self {
            LoadKind::More => MORE_LOAD_FAILED,
            LoadKind::First | LoadKind::Refresh => FIRST_LOAD_FAILED,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListState {
    Idle,
    Loading,
    LoadingMore,
    Refreshing,
    /// The load of this kind failed; `retry` repeats it.
    Error(LoadKind),
    Exhausted,
}

impl ListState {
    pub fn is_busy(self) -> bool {
        matches!(
            self,
            ListState::Loading | ListState::LoadingMore | ListState::Refreshing
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The page landed; `added` counts jobs that were not already listed.
    Loaded { added: usize },
    /// Rejected up front, nothing was fetched.
    Ignored,
    /// Fetched, but the list was closed or refreshed meanwhile.
    Discarded,
    /// The fetch failed; see [`JobList::error_message`].
    Failed,
}

#[derive(Debug)]
struct Cursor {
    page: u32,
    has_more: bool,
    seen: HashSet<String>,
}

impl Cursor {
    fn new() -> Self {
        Self {
            page: 1,
            has_more: true,
            seen: HashSet::new(),
        }
    }
}

#[derive(Debug)]
struct Inner {
    state: ListState,
    cursor: Cursor,
    jobs: Vec<Job>,
    loaded_once: bool,
    closed: bool,
    generation: u64,
}

#[derive(Debug, Clone, Copy)]
struct Ticket {
    kind: LoadKind,
    page: u32,
    generation: u64,
}

pub struct JobList<S> {
    source: S,
    page_threshold: usize,
    inner: Mutex<Inner>,
}

impl<S: JobSource> JobList<S> {
    pub fn new(source: S) -> Self {
        Self::with_threshold(source, DEFAULT_PAGE_THRESHOLD)
    }

    pub fn with_threshold(source: S, page_threshold: usize) -> Self {
        Self {
            source,
            page_threshold,
            inner: Mutex::new(Inner {
                state: ListState::Idle,
                cursor: Cursor::new(),
                jobs: Vec::new(),
                loaded_once: false,
                closed: false,
                generation: 0,
            }),
        }
    }

    pub async fn load_first_page(&self) -> LoadOutcome {
        let ticket = self.begin(|inner| {
            (inner.state == ListState::Idle && !inner.loaded_once)
                .then_some((LoadKind::First, ListState::Loading, 1))
        });
        self.run(ticket).await
    }

    /// Next page, when the list is idle and not exhausted.
    pub async fn load_more(&self) -> LoadOutcome {
        let ticket = self.begin(|inner| {
            (inner.state == ListState::Idle && inner.loaded_once && inner.cursor.has_more)
                .then_some((LoadKind::More, ListState::LoadingMore, inner.cursor.page))
        });
        self.run(ticket).await
    }

    /// Reload from page 1 and replace the list once the page arrives.
    pub async fn refresh(&self) -> LoadOutcome {
        let ticket = self.begin(|inner| {
            (inner.state != ListState::Refreshing)
                .then_some((LoadKind::Refresh, ListState::Refreshing, 1))
        });
        self.run(ticket).await
    }

    /// Repeat the load that failed, for the same page.
    pub async fn retry(&self) -> LoadOutcome {
        let ticket = self.begin(|inner| match inner.state {
            ListState::Error(kind) => {
                let page = if kind == LoadKind::More { inner.cursor.page } else { 1 };
                Some((kind, ListState::Loading, page))
            }
            _ => None,
        });
        self.run(ticket).await
    }

    /// Stop paginating. A fetch already in flight completes but its result is
    /// dropped, and every later load is ignored.
    pub fn close(&self) {
        let mut inner = self.inner.lock();
        inner.closed = true;
        inner.generation += 1;
        debug!("job list closed");
    }

    pub fn state(&self) -> ListState {
        self.inner.lock().state
    }

    pub fn jobs(&self) -> Vec<Job> {
        self.inner.lock().jobs.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Next page `load_more` would request.
    pub fn page(&self) -> u32 {
        self.inner.lock().cursor.page
    }

    pub fn has_more(&self) -> bool {
        self.inner.lock().cursor.has_more
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }

    pub fn error_message(&self) -> Option<&'static str> {
        match self.inner.lock().state {
            ListState::Error(kind) => Some(kind.failure_message()),
            _ => None,
        }
    }

    fn begin(
        &self,
        admit: impl FnOnce(&Inner) -> Option<(LoadKind, ListState, u32)>,
    ) -> Option<Ticket> {
        let mut inner = self.inner.lock();
        if inner.closed {
            return None;
        }
        let (kind, state, page) = admit(&*inner)?;

        if kind == LoadKind::Refresh {
            inner.generation += 1;
        }
        inner.state = state;
        Some(Ticket {
            kind,
            page,
            generation: inner.generation,
        })
    }

    async fn run(&self, ticket: Option<Ticket>) -> LoadOutcome {
        let Some(ticket) = ticket else {
            return LoadOutcome::Ignored;
        };

        let result = self.source.fetch_page(ticket.page).await;

        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        if inner.closed || inner.generation != ticket.generation {
            debug!(page = ticket.page, "discarding superseded page");
            return LoadOutcome::Discarded;
        }

        let jobs = match result {
            Ok(jobs) => jobs,
            Err(err) => {
                error!(page = ticket.page, kind = ?ticket.kind, error = %err, "failed to load jobs");
                inner.state = ListState::Error(ticket.kind);
                return LoadOutcome::Failed;
            }
        };

        if ticket.kind == LoadKind::Refresh {
            inner.jobs.clear();
            inner.cursor = Cursor::new();
        }

        let fetched = jobs.len();
        let mut added = 0;
        for job in jobs {
            if inner.cursor.seen.insert(job.id.key()) {
                inner.jobs.push(job);
                added += 1;
            }
        }

        inner.loaded_once = true;
        inner.cursor.has_more = fetched >= self.page_threshold;
        if fetched == 0 {
            inner.state = ListState::Exhausted;
        } else {
            inner.cursor.page = ticket.page + 1;
            inner.state = ListState::Idle;
        }

        info!(
            page = ticket.page,
            fetched,
            added,
            total = inner.jobs.len(),
            has_more = inner.cursor.has_more,
            "loaded jobs page"
        );
        LoadOutcome::Loaded { added }
    }
}
