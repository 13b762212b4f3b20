//! Navigator facade
//!
//! Public entry point of the engine: validates input, mutates the history
//! through push/show/replace/chain/set/back operations, and hands the
//! resulting entry diffs to the dispatcher. The navigator exclusively owns
//! the scope tree and follows a two-state attachment machine: operations
//! are only legal while a navigation scope is attached, and attaching twice
//! is a programming error.

use log::debug;
use serde_json::Value;
use thiserror::Error;

use crate::history::{History, NavType, SnapshotError};
use crate::nav::chain::{ChainStep, NavigationChain};
use crate::nav::dispatcher::{DispatchError, Dispatcher, Transition};
use crate::nav::lifecycle::LifecycleDelegate;
use crate::nav::transitions::{TransitionDirection, Transitions};
use crate::scope::{ScopeArena, ScopeId};
use crate::screen::{ScreenFactory, ScreenPath, ScreenStack};

const NAV_SCOPE_NAME: &str = "stacknav.navigator";

/// Navigator errors
///
/// Everything here is either a programming error surfaced fast (wrong
/// attachment state, empty arguments, missing factory) or a fatal dispatch
/// failure. The recoverable "at root" condition is *not* an error: `back`
/// and `back_to_root` report it as `Ok(false)`.
#[derive(Debug, Error)]
pub enum NavigatorError {
    #[error("navigator is not attached to a navigation scope")]
    NotAttached,

    #[error("navigator is already attached to a navigation scope")]
    AlreadyAttached,

    #[error("a screen factory is required while stack restoration is enabled")]
    MissingFactory,

    #[error("navigation stack cannot be empty")]
    EmptyStack,

    #[error("navigation chain cannot be empty")]
    EmptyChain,

    #[error("a presentation container is already attached")]
    ContainerAlreadyAttached,

    #[error("dispatch failed")]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

/// Navigator behaviour switches
#[derive(Debug, Clone, Copy, Default)]
pub struct Config {
    /// When set, a persisted history is ignored on cold start and saving is
    /// skipped: after a process kill the app starts from its default screen
    /// again. Default is false, the stack is restored.
    pub dont_restore_stack_after_kill: bool,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dont_restore_stack_after_kill(mut self, value: bool) -> Self {
        self.dont_restore_stack_after_kill = value;
        self
    }
}

/// Public facade over history, scopes, dispatcher and transitions
pub struct Navigator {
    config: Config,
    factory: Option<Box<dyn ScreenFactory>>,
    history: History,
    arena: ScopeArena,
    nav_scope: Option<ScopeId>,
    dispatcher: Dispatcher,
    transitions: Transitions,
}

impl Navigator {
    /// Creates a detached navigator.
    ///
    /// The factory may only be omitted when restoration is disabled in
    /// `config`; restoring a snapshot without one is impossible.
    pub fn new(
        config: Config,
        factory: Option<Box<dyn ScreenFactory>>,
    ) -> Result<Self, NavigatorError> {
        if factory.is_none() && !config.dont_restore_stack_after_kill {
            return Err(NavigatorError::MissingFactory);
        }
        Ok(Self {
            config,
            factory,
            history: History::new(),
            arena: ScopeArena::new(),
            nav_scope: None,
            dispatcher: Dispatcher::new(),
            transitions: Transitions::new(),
        })
    }

    /// Enters the navigation scope. Happens once per scope lifetime;
    /// attaching an already-attached navigator is a programming error.
    pub fn attach(&mut self) -> Result<(), NavigatorError> {
        if self.nav_scope.is_some() {
            return Err(NavigatorError::AlreadyAttached);
        }
        debug!("navigator attach");
        self.nav_scope = Some(self.arena.create_root(NAV_SCOPE_NAME));
        Ok(())
    }

    /// Tears the navigation scope down: every entry scope is destroyed,
    /// the presenter is released and the history is dropped.
    pub fn detach(&mut self) {
        let Some(nav_scope) = self.nav_scope.take() else {
            return;
        };
        debug!("navigator detach");
        self.dispatcher.kill(&mut self.arena);
        self.transitions.forget(nav_scope);
        if self.arena.is_alive(nav_scope) {
            let _ = self.arena.destroy(nav_scope);
        }
        self.history = History::new();
    }

    pub fn is_attached(&self) -> bool {
        self.nav_scope.is_some()
    }

    /// Appends one path as a regular stack frame.
    pub fn push(&mut self, path: ScreenPath) -> Result<(), NavigatorError> {
        self.push_all(ScreenStack::from(path))
    }

    /// Appends one or more paths as regular stack frames, dispatched as one
    /// forward transition.
    pub fn push_all(&mut self, stack: ScreenStack) -> Result<(), NavigatorError> {
        self.check()?;
        let added = self.add_all(stack, NavType::Push)?;
        self.dispatch(Transition {
            added,
            removed: vec![],
            direction: Some(TransitionDirection::Forward),
        })
    }

    /// Shows one path as a modal overlay.
    pub fn show(&mut self, path: ScreenPath) -> Result<(), NavigatorError> {
        self.show_all(ScreenStack::from(path))
    }

    /// Shows one or more paths as modal overlays. Modal entries participate
    /// in the same back-stack; the distinction is advisory for presentation.
    pub fn show_all(&mut self, stack: ScreenStack) -> Result<(), NavigatorError> {
        self.check()?;
        let added = self.add_all(stack, NavType::Modal)?;
        self.dispatch(Transition {
            added,
            removed: vec![],
            direction: Some(TransitionDirection::Forward),
        })
    }

    /// Swaps the current top entry for `path`.
    pub fn replace(&mut self, path: ScreenPath) -> Result<(), NavigatorError> {
        self.replace_all(ScreenStack::from(path))
    }

    /// Kills the current top entry, then pushes the new paths, as one
    /// transition with the replace direction. On a root-only stack nothing
    /// is killed and this degenerates to a push.
    pub fn replace_all(&mut self, stack: ScreenStack) -> Result<(), NavigatorError> {
        self.check()?;
        if stack.is_empty() {
            return Err(NavigatorError::EmptyStack);
        }
        let removed: Vec<_> = self.history.kill().into_iter().collect();
        let added = self.add_all(stack, NavType::Push)?;
        self.dispatch(Transition {
            added,
            removed,
            direction: Some(TransitionDirection::Replace),
        })
    }

    /// Applies every chain step against the same history snapshot and
    /// dispatches the accumulated diff as one batch.
    pub fn chain(
        &mut self,
        chain: NavigationChain,
        direction: Option<TransitionDirection>,
    ) -> Result<(), NavigatorError> {
        self.check()?;
        if chain.is_empty() {
            return Err(NavigatorError::EmptyChain);
        }

        let mut added = Vec::new();
        let mut removed = Vec::new();
        for step in chain.into_steps() {
            match step {
                ChainStep::Push(path) => {
                    added.push(self.history.add(path, NavType::Push));
                }
                ChainStep::Replace(path) => {
                    removed.extend(self.history.kill());
                    added.push(self.history.add(path, NavType::Push));
                }
                ChainStep::Back => {
                    removed.extend(self.history.kill());
                }
                ChainStep::BackToRoot => {
                    removed.extend(self.history.kill_all_but_root());
                }
            }
        }

        self.dispatch(Transition {
            added,
            removed,
            direction,
        })
    }

    /// Removes the entire current history, root included, and installs a
    /// brand-new stack. Used to reset the whole navigation tree, e.g. the
    /// login → main-app transition.
    pub fn set(
        &mut self,
        stack: ScreenStack,
        direction: TransitionDirection,
    ) -> Result<(), NavigatorError> {
        self.check()?;
        if stack.is_empty() {
            return Err(NavigatorError::EmptyStack);
        }
        let removed = self.history.kill_all();
        let added = self.add_all(stack, NavType::Push)?;
        self.dispatch(Transition {
            added,
            removed,
            direction: Some(direction),
        })
    }

    /// Kills the top entry. `Ok(false)` when the stack cannot shrink
    /// further; this is the normal at-root condition, not a failure.
    pub fn back(&mut self) -> Result<bool, NavigatorError> {
        self.back_inner(None)
    }

    /// Like [`Navigator::back`], additionally delivering a result payload
    /// to the newly revealed top entry.
    pub fn back_with_result(&mut self, result: Value) -> Result<bool, NavigatorError> {
        self.back_inner(Some(result))
    }

    fn back_inner(&mut self, result: Option<Value>) -> Result<bool, NavigatorError> {
        self.check()?;
        let Some(killed) = self.history.kill() else {
            return Ok(false);
        };
        if let Some(result) = result {
            self.history.deliver_result(result);
        }
        self.dispatch(Transition {
            added: vec![],
            removed: vec![killed],
            direction: Some(TransitionDirection::Backward),
        })?;
        Ok(true)
    }

    /// Unwinds to the root in one batch. `Ok(false)` when already there.
    pub fn back_to_root(&mut self) -> Result<bool, NavigatorError> {
        self.check()?;
        if !self.history.can_kill() {
            return Ok(false);
        }
        let removed = self.history.kill_all_but_root();
        self.dispatch(Transition {
            added: vec![],
            removed,
            direction: Some(TransitionDirection::Backward),
        })?;
        Ok(true)
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn transitions(&self) -> &Transitions {
        &self.transitions
    }

    pub fn transitions_mut(&mut self) -> &mut Transitions {
        &mut self.transitions
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Scope tree, for the rendering layer to resolve services of visible
    /// entries.
    pub fn scopes(&self) -> &ScopeArena {
        &self.arena
    }

    /// Lifecycle bridge consumed by the hosting shell.
    pub fn delegate(&mut self) -> LifecycleDelegate<'_> {
        LifecycleDelegate::new(self)
    }

    pub(crate) fn factory(&self) -> Result<&dyn ScreenFactory, NavigatorError> {
        self.factory
            .as_deref()
            .ok_or(NavigatorError::MissingFactory)
    }

    /// Replaces the whole history, destroying every current entry scope and
    /// entering scopes for the new entries.
    pub(crate) fn install_history(&mut self, history: History) -> Result<(), NavigatorError> {
        self.check()?;
        let removed = self.history.kill_all();
        self.history = history;
        let added = self.history.entries().to_vec();
        self.dispatch(Transition {
            added,
            removed,
            direction: None,
        })
    }

    pub(crate) fn dispatcher_mut(&mut self) -> &mut Dispatcher {
        &mut self.dispatcher
    }

    pub(crate) fn sync_presenter(&mut self) {
        self.dispatcher.sync_presenter(&self.history);
    }

    fn add_all(
        &mut self,
        stack: ScreenStack,
        nav_type: NavType,
    ) -> Result<Vec<crate::history::Entry>, NavigatorError> {
        if stack.is_empty() {
            return Err(NavigatorError::EmptyStack);
        }
        Ok(stack
            .into_paths()
            .into_iter()
            .map(|path| self.history.add(path, nav_type))
            .collect())
    }

    fn check(&self) -> Result<ScopeId, NavigatorError> {
        self.nav_scope.ok_or(NavigatorError::NotAttached)
    }

    fn dispatch(&mut self, transition: Transition) -> Result<(), NavigatorError> {
        let nav_scope = self.check()?;
        self.dispatcher.dispatch(
            &mut self.arena,
            nav_scope,
            &self.history,
            transition,
            &mut self.transitions,
        )?;
        Ok(())
    }
}

impl Drop for Navigator {
    fn drop(&mut self) {
        self.detach();
    }
}
