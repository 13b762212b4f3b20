//! Per-screen resource scope tree
//!
//! Scopes form an explicit tree of nodes keyed by generated ids. Each history
//! entry exclusively owns one scope; destroying a scope cascades to all of
//! its descendants and drops the services it holds.

pub mod arena;

pub use arena::{ScopeArena, ScopeBuilder, ScopeError, ScopeId, ScopeRef};
