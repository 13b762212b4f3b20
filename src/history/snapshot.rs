//! Lossless persisted form of the history
//!
//! The snapshot is the wire shape used for relaunch-intent payloads and
//! state-save payloads: an ordered list of `(screenType, instanceId,
//! navType)` records, index 0 = root. Restoring rebuilds the history with
//! identical order and nav types through a [`ScreenFactory`]. Result
//! payloads are transient and not persisted.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::history::stack::{History, NavType};
use crate::screen::ScreenFactory;

/// Errors while encoding or restoring a history snapshot
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// A snapshot must contain at least the root entry
    #[error("history snapshot contains no entries")]
    Empty,

    /// The factory does not know how to rebuild this screen type
    #[error("unknown screen type '{screen_type}' in history snapshot")]
    UnknownScreen { screen_type: String },

    /// The payload was not a valid snapshot document
    #[error("history snapshot encoding failed")]
    Encoding(#[from] serde_json::Error),
}

/// Persisted identity of one history entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryRecord {
    pub screen_type: String,
    pub instance_id: Option<String>,
    pub nav_type: NavType,
}

/// Ordered, keyed snapshot of a whole history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistorySnapshot {
    pub history: Vec<EntryRecord>,
}

impl HistorySnapshot {
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(payload: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(payload)?)
    }
}

impl History {
    /// Captures the ordered identity of every entry.
    pub fn snapshot(&self) -> HistorySnapshot {
        HistorySnapshot {
            history: self
                .entries()
                .iter()
                .map(|entry| {
                    let key = entry.key();
                    EntryRecord {
                        screen_type: key.screen_type,
                        instance_id: key.instance_id,
                        nav_type: entry.nav_type(),
                    }
                })
                .collect(),
        }
    }

    /// Rebuilds a history from a snapshot, preserving order and nav types.
    pub fn from_snapshot(
        snapshot: &HistorySnapshot,
        factory: &dyn ScreenFactory,
    ) -> Result<Self, SnapshotError> {
        if snapshot.history.is_empty() {
            return Err(SnapshotError::Empty);
        }

        let mut history = History::new();
        for record in &snapshot.history {
            let path = factory
                .create(&record.screen_type, record.instance_id.as_deref())
                .ok_or_else(|| SnapshotError::UnknownScreen {
                    screen_type: record.screen_type.clone(),
                })?;
            history.add(path, record.nav_type);
        }
        Ok(history)
    }
}
