//! Navigable destination identity and scope configuration capability
//!
//! A [`Screen`] names a destination through a stable type identifier plus an
//! optional instance identifier, and gets a chance to register its own
//! dependencies into the resource scope that will own it. A [`ScreenPath`] is
//! the cheap-clone handle that actually travels through the history stack;
//! path-level parameters live inside the concrete screen value.

use std::fmt;
use std::sync::Arc;

use crate::scope::{ScopeBuilder, ScopeError, ScopeRef};

/// A navigable destination.
///
/// Implementations are immutable: identity comes from [`Screen::screen_type`]
/// and [`Screen::instance_id`], and any path-level parameters (an item id, a
/// query, ...) are fields of the implementing type.
pub trait Screen {
    /// Stable type identifier, unique per screen kind.
    ///
    /// This string is what gets persisted in a history snapshot, so it must
    /// not change between processes.
    fn screen_type(&self) -> &str;

    /// Disambiguates two instances of the same screen kind (e.g. two detail
    /// screens for different items). `None` when the kind alone is identity.
    fn instance_id(&self) -> Option<String> {
        None
    }

    /// Registers this screen's dependencies into the scope that will own it.
    ///
    /// `parent` is the navigation scope the new scope will hang under; a
    /// screen can look up shared services there. Returning an error aborts
    /// the whole transition before any teardown happens.
    fn configure_scope(
        &self,
        builder: &mut ScopeBuilder,
        parent: ScopeRef<'_>,
    ) -> Result<(), ScopeError> {
        let _ = (builder, parent);
        Ok(())
    }
}

/// Value identity of a screen: `(screen_type, instance_id)`.
///
/// Two paths are the same destination exactly when their keys are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScreenKey {
    pub screen_type: String,
    pub instance_id: Option<String>,
}

impl ScreenKey {
    pub fn new(screen_type: impl Into<String>, instance_id: Option<String>) -> Self {
        Self {
            screen_type: screen_type.into(),
            instance_id,
        }
    }
}

impl fmt::Display for ScreenKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.instance_id {
            Some(id) => write!(f, "{}:{}", self.screen_type, id),
            None => write!(f, "{}", self.screen_type),
        }
    }
}

/// Shared handle to a [`Screen`]; the unit pushed, shown and replaced.
#[derive(Clone)]
pub struct ScreenPath {
    screen: Arc<dyn Screen>,
}

impl ScreenPath {
    pub fn new(screen: impl Screen + 'static) -> Self {
        Self {
            screen: Arc::new(screen),
        }
    }

    pub fn screen(&self) -> &dyn Screen {
        self.screen.as_ref()
    }

    /// Value identity of the underlying screen.
    pub fn key(&self) -> ScreenKey {
        ScreenKey::new(self.screen.screen_type(), self.screen.instance_id())
    }
}

impl fmt::Debug for ScreenPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ScreenPath").field(&self.key()).finish()
    }
}

impl PartialEq for ScreenPath {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for ScreenPath {}

/// Ordered list of paths for multi-push and whole-stack installs.
///
/// Index 0 is the bottom of the segment; the last path ends up on top.
#[derive(Debug, Clone, Default)]
pub struct ScreenStack {
    paths: Vec<ScreenPath>,
}

impl ScreenStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: ScreenPath) -> Self {
        self.paths.push(path);
        self
    }

    pub fn push(&mut self, path: ScreenPath) {
        self.paths.push(path);
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn paths(&self) -> &[ScreenPath] {
        &self.paths
    }

    pub fn into_paths(self) -> Vec<ScreenPath> {
        self.paths
    }
}

impl From<ScreenPath> for ScreenStack {
    fn from(path: ScreenPath) -> Self {
        Self { paths: vec![path] }
    }
}

impl FromIterator<ScreenPath> for ScreenStack {
    fn from_iter<I: IntoIterator<Item = ScreenPath>>(iter: I) -> Self {
        Self {
            paths: iter.into_iter().collect(),
        }
    }
}

/// Reconstructs paths from their persisted identity during snapshot restore.
///
/// The factory is the inverse of [`ScreenPath::key`]: given the stable type
/// identifier and optional instance identifier it must produce a path that is
/// the same destination. Required whenever stack restoration is enabled.
pub trait ScreenFactory {
    /// Returns `None` when the screen type is unknown, which fails the
    /// restore as a whole.
    fn create(&self, screen_type: &str, instance_id: Option<&str>) -> Option<ScreenPath>;
}
