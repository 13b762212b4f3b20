//! The ordered back-stack of entries and its persisted snapshot form

pub mod snapshot;
pub mod stack;

pub use snapshot::{EntryRecord, HistorySnapshot, SnapshotError};
pub use stack::{Entry, EntryId, History, NavType};
