//! Hierarchical navigation engine for screen-stack applications
//!
//! `stacknav` manages what is currently shown, in what order it was reached,
//! and how control flows when the user moves forward, backward, or jumps.
//! It owns the back-stack state machine and the per-screen resource scopes,
//! while actual view construction and animation stay with the hosting shell.
//!
//! The layers, leaves first:
//! - [`screen`]: identity of a navigable destination and its scope capability
//! - [`scope`]: arena-based tree of per-screen resource containers
//! - [`history`]: the ordered back-stack and its persisted snapshot form
//! - [`nav`]: the navigator facade, transition dispatcher, chains and the
//!   lifecycle bridge consumed by the hosting shell

pub mod history;
pub mod nav;
pub mod screen;
pub mod scope;

pub use history::{Entry, EntryId, History, HistorySnapshot, NavType, SnapshotError};
pub use nav::{
    ChainStep, Config, DispatchError, LifecycleDelegate, NavigationChain, Navigator,
    NavigatorError, Presenter, TransitionDirection, Transitions, VisibleEntry,
};
pub use screen::{Screen, ScreenFactory, ScreenKey, ScreenPath, ScreenStack};
pub use scope::{ScopeArena, ScopeBuilder, ScopeError, ScopeId, ScopeRef};
