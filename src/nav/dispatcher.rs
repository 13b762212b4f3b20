//! Transition dispatcher: scope sequencing around a history mutation
//!
//! For each transition batch the dispatcher enters scopes for every added
//! entry, notifies the presentation collaborator of the new visible entry
//! set, then exits scopes for every removed entry in reverse creation order.
//! Additions always happen before the notification, which happens before all
//! removals, so a new screen's dependencies are fully available before
//! anything it might depend on is torn down.

use std::collections::HashMap;

use log::{debug, warn};
use serde_json::Value;
use thiserror::Error;

use crate::history::{Entry, EntryId, History, NavType};
use crate::nav::transitions::{TransitionDirection, Transitions};
use crate::scope::{ScopeArena, ScopeBuilder, ScopeError, ScopeId};
use crate::screen::ScreenKey;

/// Errors from applying one transition batch
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A navigation operation was invoked while a previous dispatch was
    /// still applying. Committing it could double-destroy a scope.
    #[error("navigation dispatched while a previous transition is still applying")]
    Reentrant,

    /// Scope construction for an added entry failed. Nothing was torn down;
    /// the transition is fatal to the caller because history has already
    /// been mutated and no rollback primitive exists.
    #[error("failed to construct scope for screen '{key}'")]
    ScopeConstruction {
        key: ScreenKey,
        #[source]
        source: ScopeError,
    },
}

/// One screen the presentation layer should currently show
#[derive(Debug, Clone)]
pub struct VisibleEntry {
    pub key: ScreenKey,
    pub nav_type: NavType,
    pub scope: ScopeId,
    /// Payload delivered by the back navigation that revealed this entry
    pub result: Option<Value>,
}

/// Presentation collaborator notified after scope construction
///
/// `visible` is the topmost push entry plus any modal overlays above it,
/// bottom first. The direction is advisory; `None` means the caller did not
/// ask for a particular animation.
pub trait Presenter {
    fn present(&mut self, visible: &[VisibleEntry], direction: Option<TransitionDirection>);
}

/// One batch of history mutations to apply
#[derive(Debug, Default)]
pub struct Transition {
    /// Entries appended to history, bottom first
    pub added: Vec<Entry>,
    /// Entries removed from history, in any order; the dispatcher tears
    /// their scopes down most recently created first
    pub removed: Vec<Entry>,
    pub direction: Option<TransitionDirection>,
}

/// Sequences scope lifecycles and presenter notifications per transition
#[derive(Default)]
pub struct Dispatcher {
    scopes: HashMap<EntryId, ScopeId>,
    presenter: Option<Box<dyn Presenter>>,
    in_flight: bool,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds the presentation collaborator. Returns false when one is
    /// already bound; the container slot is single-occupancy.
    pub fn attach_presenter(&mut self, presenter: Box<dyn Presenter>) -> bool {
        if self.presenter.is_some() {
            return false;
        }
        self.presenter = Some(presenter);
        true
    }

    /// Unbinds the presentation collaborator without touching any scopes.
    pub fn detach_presenter(&mut self) -> Option<Box<dyn Presenter>> {
        self.presenter.take()
    }

    pub fn has_presenter(&self) -> bool {
        self.presenter.is_some()
    }

    /// Scope currently owned by a live entry.
    pub fn scope_of(&self, entry: EntryId) -> Option<ScopeId> {
        self.scopes.get(&entry).copied()
    }

    /// Applies one transition: enter added scopes, notify, exit removed
    /// scopes, record the direction.
    pub fn dispatch(
        &mut self,
        arena: &mut ScopeArena,
        nav_scope: ScopeId,
        history: &History,
        transition: Transition,
        transitions: &mut Transitions,
    ) -> Result<(), DispatchError> {
        if self.in_flight {
            return Err(DispatchError::Reentrant);
        }
        self.in_flight = true;
        let result = self.apply(arena, nav_scope, history, transition, transitions);
        self.in_flight = false;
        result
    }

    fn apply(
        &mut self,
        arena: &mut ScopeArena,
        nav_scope: ScopeId,
        history: &History,
        transition: Transition,
        transitions: &mut Transitions,
    ) -> Result<(), DispatchError> {
        debug!(
            "dispatch: {} added, {} removed, direction {:?}",
            transition.added.len(),
            transition.removed.len(),
            transition.direction
        );

        for entry in &transition.added {
            let scope = self.enter_scope(arena, nav_scope, entry)?;
            self.scopes.insert(entry.id(), scope);
        }

        if let Some(presenter) = self.presenter.as_mut() {
            let visible = visible_entries(history, &self.scopes);
            presenter.present(&visible, transition.direction);
        }

        // A chain can accumulate kills out of stack order (a replace step
        // followed by a back step removes the older entry first); teardown
        // must still run most-recently-added first.
        let mut removed = transition.removed;
        removed.sort_by(|a, b| b.id().cmp(&a.id()));
        for entry in &removed {
            match self.scopes.remove(&entry.id()) {
                Some(scope) => {
                    if let Err(err) = arena.destroy(scope) {
                        warn!("scope for '{}' was already gone: {err}", entry.key());
                    }
                }
                None => warn!("no scope recorded for removed entry '{}'", entry.key()),
            }
        }

        if let Some(direction) = transition.direction {
            transitions.record(nav_scope, direction);
        }
        Ok(())
    }

    /// Re-sends the current visible set to the presenter, used when a
    /// container attaches while history already exists.
    pub fn sync_presenter(&mut self, history: &History) {
        if let Some(presenter) = self.presenter.as_mut() {
            let visible = visible_entries(history, &self.scopes);
            presenter.present(&visible, None);
        }
    }

    /// Destroys every remaining entry scope. Called when the navigator
    /// itself detaches; the arena root teardown follows.
    pub fn kill(&mut self, arena: &mut ScopeArena) {
        let mut remaining: Vec<(EntryId, ScopeId)> = self.scopes.drain().collect();
        // newest scopes first
        remaining.sort_by(|a, b| b.1.cmp(&a.1));
        for (_, scope) in remaining {
            if arena.is_alive(scope) {
                if let Err(err) = arena.destroy(scope) {
                    warn!("failed to destroy scope during navigator teardown: {err}");
                }
            }
        }
        self.presenter = None;
    }

    fn enter_scope(
        &self,
        arena: &mut ScopeArena,
        nav_scope: ScopeId,
        entry: &Entry,
    ) -> Result<ScopeId, DispatchError> {
        let key = entry.key();
        let mut builder = ScopeBuilder::new();

        let parent = arena
            .scope_ref(nav_scope)
            .map_err(|source| DispatchError::ScopeConstruction {
                key: key.clone(),
                source,
            })?;
        entry
            .path()
            .screen()
            .configure_scope(&mut builder, parent)
            .map_err(|source| DispatchError::ScopeConstruction {
                key: key.clone(),
                source,
            })?;

        // Entry ids keep names unique even when the same screen is stacked
        // twice.
        let name = format!("{key}#{}", entry.id());
        arena
            .build_child(nav_scope, name, builder)
            .map_err(|source| DispatchError::ScopeConstruction { key, source })
    }
}

fn visible_entries(history: &History, scopes: &HashMap<EntryId, ScopeId>) -> Vec<VisibleEntry> {
    history
        .visible()
        .iter()
        .filter_map(|entry| {
            let scope = scopes.get(&entry.id()).copied()?;
            Some(VisibleEntry {
                key: entry.key(),
                nav_type: entry.nav_type(),
                scope,
                result: entry.received_result().cloned(),
            })
        })
        .collect()
}
