//! Comparison workspace for Spark Insight.
//!
//! Holds the apps, jobs and stages a user has marked for side-by-side
//! comparison, plus the transient subset currently checked. The compare-mode
//! flag and the selected items survive restarts through a [`StateStorage`];
//! the checked subset lives only for the session.

#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod item;
mod state;
pub mod storage;
mod store;

pub use item::{ComparisonItem, ItemId, NewComparisonItem, item_key};
pub use storage::{FileStorage, MemoryStorage, StateStorage, StorageError, default_state_dir};
pub use store::{COMPARE_ITEMS_KEY, COMPARE_MODE_KEY, ComparisonWorkspace};
