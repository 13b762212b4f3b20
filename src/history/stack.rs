//! Ordered back-stack of navigation entries
//!
//! The history is pure data: it records which screens were reached and in
//! what order, index 0 being the root. It never touches scopes or the
//! presentation layer; the dispatcher consumes the entries it returns from
//! the kill operations to drive scope teardown.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::screen::{ScreenKey, ScreenPath};

/// How an entry participates in the stack
///
/// `Push` entries are regular stack frames; `Modal` entries overlay the frame
/// below them. Both are equal citizens for `back()` purposes, the distinction
/// is advisory for presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NavType {
    Push,
    Modal,
}

/// Identifier of one entry, unique within its history for the whole process
/// lifetime. Scope bookkeeping keys off this id; ids order by creation, so
/// a larger id means a more recently added entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(u64);

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One occurrence of a screen in the history
#[derive(Debug, Clone)]
pub struct Entry {
    id: EntryId,
    path: ScreenPath,
    nav_type: NavType,
    received_result: Option<Value>,
}

impl Entry {
    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn path(&self) -> &ScreenPath {
        &self.path
    }

    pub fn key(&self) -> ScreenKey {
        self.path.key()
    }

    pub fn nav_type(&self) -> NavType {
        self.nav_type
    }

    /// Result payload delivered by a `back(result)` that revealed this entry.
    pub fn received_result(&self) -> Option<&Value> {
        self.received_result.as_ref()
    }
}

/// The ordered back-stack, index 0 = root
#[derive(Debug, Default)]
pub struct History {
    entries: Vec<Entry>,
    next_id: u64,
}

impl History {
    /// Creates an empty history. The navigator guarantees a root entry is
    /// installed before anything is presented.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a history holding only `root` as a push entry.
    pub fn with_root(root: ScreenPath) -> Self {
        let mut history = Self::new();
        history.add(root, NavType::Push);
        history
    }

    /// Appends an entry and returns a copy of it. Never removes anything.
    pub fn add(&mut self, path: ScreenPath, nav_type: NavType) -> Entry {
        let entry = Entry {
            id: EntryId(self.next_id),
            path,
            nav_type,
            received_result: None,
        };
        self.next_id += 1;
        self.entries.push(entry.clone());
        entry
    }

    /// Removes and returns the top entry, unless only the root remains.
    pub fn kill(&mut self) -> Option<Entry> {
        if self.can_kill() {
            self.entries.pop()
        } else {
            None
        }
    }

    /// Removes every entry including the root, top first. Used only when the
    /// whole stack is about to be replaced.
    pub fn kill_all(&mut self) -> Vec<Entry> {
        let mut killed = std::mem::take(&mut self.entries);
        killed.reverse();
        killed
    }

    /// Removes every entry except the root, top first.
    pub fn kill_all_but_root(&mut self) -> Vec<Entry> {
        if self.entries.len() <= 1 {
            return Vec::new();
        }
        let mut killed = self.entries.split_off(1);
        killed.reverse();
        killed
    }

    /// Whether `kill` would remove anything: true iff more than the root is
    /// on the stack.
    pub fn can_kill(&self) -> bool {
        self.entries.len() > 1
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top(&self) -> Option<&Entry> {
        self.entries.last()
    }

    pub fn root(&self) -> Option<&Entry> {
        self.entries.first()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Attaches a result payload to the current top entry, making it visible
    /// to the screen revealed by a back navigation.
    pub fn deliver_result(&mut self, result: Value) {
        if let Some(top) = self.entries.last_mut() {
            top.received_result = Some(result);
        }
    }

    /// The entries currently shown: the topmost push entry plus the
    /// contiguous run of modal overlays above it, bottom first.
    pub fn visible(&self) -> &[Entry] {
        let mut start = self.entries.len();
        for (index, entry) in self.entries.iter().enumerate().rev() {
            start = index;
            if entry.nav_type == NavType::Push {
                break;
            }
        }
        &self.entries[start..]
    }
}
