//! Advisory transition direction registry
//!
//! The rendering layer consults this registry to pick an animation for the
//! scope it is about to redraw. Directions never influence history ordering
//! or scope lifecycles.

use std::collections::HashMap;

use crate::scope::ScopeId;

/// Direction hint for the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionDirection {
    Forward,
    Backward,
    Replace,
}

/// Last applied direction per navigation scope
#[derive(Debug, Default)]
pub struct Transitions {
    last: HashMap<ScopeId, TransitionDirection>,
}

impl Transitions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the direction applied by the latest dispatch for `scope`.
    pub fn record(&mut self, scope: ScopeId, direction: TransitionDirection) {
        self.last.insert(scope, direction);
    }

    /// Direction of the last dispatch for `scope`, if any dispatch carried
    /// one. Peeks without consuming: repeated calls between dispatches see
    /// the same value. Rendering layers that animate should use
    /// [`Transitions::take`] instead, so a direction is never replayed.
    pub fn last_for(&self, scope: ScopeId) -> Option<TransitionDirection> {
        self.last.get(&scope).copied()
    }

    /// Consumes the recorded direction. This is the rendering-layer idiom:
    /// each dispatch yields at most one animation, and a redraw with no
    /// pending direction falls back to no animation.
    pub fn take(&mut self, scope: ScopeId) -> Option<TransitionDirection> {
        self.last.remove(&scope)
    }

    /// Forgets directions recorded for a scope that was destroyed.
    pub fn forget(&mut self, scope: ScopeId) {
        self.last.remove(&scope);
    }
}
