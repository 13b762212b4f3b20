//! Screen identity and path types
//!
//! This module contains pure identity logic that is independent of the
//! history stack and the scope tree: what a navigable destination *is*,
//! not where it currently sits.

pub mod path;

pub use path::{Screen, ScreenFactory, ScreenKey, ScreenPath, ScreenStack};
