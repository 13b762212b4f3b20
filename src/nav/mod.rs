//! Navigation orchestration layer
//!
//! This module coordinates the history stack, the scope tree and the
//! presentation collaborator: the navigator facade validates and mutates,
//! the dispatcher sequences scope lifecycles around each mutation, and the
//! lifecycle delegate bridges hosting-shell events into both.

pub mod chain;
pub mod dispatcher;
pub mod lifecycle;
pub mod navigator;
pub mod transitions;

pub use chain::{ChainStep, NavigationChain};
pub use dispatcher::{DispatchError, Dispatcher, Presenter, Transition, VisibleEntry};
pub use lifecycle::LifecycleDelegate;
pub use navigator::{Config, Navigator, NavigatorError};
pub use transitions::{TransitionDirection, Transitions};
