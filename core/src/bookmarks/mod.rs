//! Bookmarks: the persisted set and its shared in-memory mirror.

mod state;
mod store;

pub use state::{BookmarkState, LOAD_FAILED, UPDATE_FAILED};
pub use store::{BOOKMARKS_KEY, BookmarkStore};
