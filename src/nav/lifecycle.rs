//! Lifecycle bridge between the hosting shell and the navigator
//!
//! The hosting shell drives this delegate directly instead of the engine
//! listening to any UI framework: creation, payload redelivery, state
//! saving, container teardown and back requests all arrive as explicit
//! calls. History survives container teardown; it only dies with the
//! navigator's own scope.

use log::debug;
use serde_json::Value;

use crate::history::{History, HistorySnapshot};
use crate::nav::dispatcher::Presenter;
use crate::nav::navigator::{Navigator, NavigatorError};
use crate::screen::ScreenPath;

/// Bridges hosting-shell lifecycle events into navigator operations
pub struct LifecycleDelegate<'a> {
    navigator: &'a mut Navigator,
}

impl<'a> LifecycleDelegate<'a> {
    pub(crate) fn new(navigator: &'a mut Navigator) -> Self {
        Self { navigator }
    }

    /// Cold-start entry point.
    ///
    /// History source, in priority order: a relaunch-intent payload is
    /// always honored; a previous-process saved payload only when the
    /// config permits restoration; otherwise a fresh history with
    /// `default_screen` as root. The container becomes the presentation
    /// collaborator; binding while one is attached is a programming error.
    pub fn on_create(
        &mut self,
        relaunch_payload: Option<&HistorySnapshot>,
        saved_payload: Option<&HistorySnapshot>,
        container: Box<dyn Presenter>,
        default_screen: ScreenPath,
    ) -> Result<(), NavigatorError> {
        if self.navigator.dispatcher_mut().has_presenter() {
            return Err(NavigatorError::ContainerAlreadyAttached);
        }

        // Resolve the history before binding the container, so a failed
        // restore leaves no presenter behind and the shell can retry.
        let restore_allowed = !self.navigator.config().dont_restore_stack_after_kill;
        let history = if let Some(payload) = relaunch_payload {
            debug!("on_create: restoring history from relaunch payload");
            History::from_snapshot(payload, self.navigator.factory()?)?
        } else if let Some(payload) = saved_payload.filter(|_| restore_allowed) {
            debug!("on_create: restoring history from saved state");
            History::from_snapshot(payload, self.navigator.factory()?)?
        } else {
            debug!("on_create: fresh history from default screen");
            History::with_root(default_screen)
        };

        self.navigator.dispatcher_mut().attach_presenter(container);
        if let Err(err) = self.navigator.install_history(history) {
            self.navigator.dispatcher_mut().detach_presenter();
            return Err(err);
        }
        Ok(())
    }

    /// A restore payload was redelivered while already running: the current
    /// history is replaced wholesale.
    pub fn on_new_intent(&mut self, payload: &HistorySnapshot) -> Result<(), NavigatorError> {
        debug!("on_new_intent: replacing history");
        let history = History::from_snapshot(payload, self.navigator.factory()?)?;
        self.navigator.install_history(history)
    }

    /// Serializes the current history into the state-saving contract.
    /// Skipped (leaving `out` untouched) when restoration is disabled.
    pub fn on_save_instance_state(&self, out: &mut Option<HistorySnapshot>) {
        if self.navigator.config().dont_restore_stack_after_kill {
            return;
        }
        *out = Some(self.navigator.history().snapshot());
    }

    /// Detaches the rendering container. History and entry scopes stay
    /// alive until the navigator scope itself is destroyed.
    pub fn on_destroy(&mut self) {
        debug!("on_destroy: releasing container");
        self.navigator.dispatcher_mut().detach_presenter();
    }

    /// Rebinds a rendering container after an `on_destroy`, immediately
    /// syncing it with the current visible set. Queued transitions are not
    /// replayed; the sync carries no direction.
    pub fn on_container_reattached(
        &mut self,
        container: Box<dyn Presenter>,
    ) -> Result<(), NavigatorError> {
        if !self.navigator.dispatcher_mut().attach_presenter(container) {
            return Err(NavigatorError::ContainerAlreadyAttached);
        }
        self.navigator.sync_presenter();
        Ok(())
    }

    /// External back request. `Ok(false)` tells the caller to fall through
    /// to the platform default back behaviour.
    pub fn on_back_pressed(&mut self) -> Result<bool, NavigatorError> {
        self.navigator.back()
    }

    /// External back request carrying a result for the revealed screen.
    pub fn on_back_pressed_with_result(&mut self, result: Value) -> Result<bool, NavigatorError> {
        self.navigator.back_with_result(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::{EntryRecord, NavType};
    use crate::nav::dispatcher::VisibleEntry;
    use crate::nav::navigator::Config;
    use crate::nav::transitions::TransitionDirection;
    use crate::screen::{Screen, ScreenFactory};
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Plain(String);

    impl Screen for Plain {
        fn screen_type(&self) -> &str {
            &self.0
        }
    }

    struct Factory;

    impl ScreenFactory for Factory {
        fn create(&self, screen_type: &str, _instance_id: Option<&str>) -> Option<ScreenPath> {
            if screen_type == "retired-screen" {
                return None;
            }
            Some(ScreenPath::new(Plain(screen_type.to_string())))
        }
    }

    #[derive(Default)]
    struct RecordingContainer {
        shown: Rc<RefCell<Vec<Vec<String>>>>,
    }

    impl Presenter for RecordingContainer {
        fn present(&mut self, visible: &[VisibleEntry], _: Option<TransitionDirection>) {
            self.shown
                .borrow_mut()
                .push(visible.iter().map(|v| v.key.to_string()).collect());
        }
    }

    fn navigator(config: Config) -> Navigator {
        let mut navigator = Navigator::new(config, Some(Box::new(Factory))).unwrap();
        navigator.attach().unwrap();
        navigator
    }

    fn snapshot(names: &[&str]) -> HistorySnapshot {
        HistorySnapshot {
            history: names
                .iter()
                .map(|name| EntryRecord {
                    screen_type: name.to_string(),
                    instance_id: None,
                    nav_type: NavType::Push,
                })
                .collect(),
        }
    }

    fn stack_names(navigator: &Navigator) -> Vec<String> {
        navigator
            .history()
            .entries()
            .iter()
            .map(|e| e.key().to_string())
            .collect()
    }

    #[test]
    fn create_without_payloads_uses_default_screen() {
        let mut navigator = navigator(Config::new());
        let shown = Rc::new(RefCell::new(Vec::new()));

        navigator
            .delegate()
            .on_create(
                None,
                None,
                Box::new(RecordingContainer { shown: shown.clone() }),
                ScreenPath::new(Plain("home".into())),
            )
            .unwrap();

        assert_eq!(stack_names(&navigator), ["home"]);
        assert_eq!(*shown.borrow(), vec![vec!["home".to_string()]]);
    }

    #[test]
    fn create_prefers_relaunch_payload() {
        let mut navigator = navigator(Config::new());

        navigator
            .delegate()
            .on_create(
                Some(&snapshot(&["main", "inbox"])),
                Some(&snapshot(&["stale"])),
                Box::new(RecordingContainer::default()),
                ScreenPath::new(Plain("home".into())),
            )
            .unwrap();

        assert_eq!(stack_names(&navigator), ["main", "inbox"]);
    }

    #[test]
    fn create_falls_back_to_saved_payload() {
        let mut navigator = navigator(Config::new());

        navigator
            .delegate()
            .on_create(
                None,
                Some(&snapshot(&["main", "details"])),
                Box::new(RecordingContainer::default()),
                ScreenPath::new(Plain("home".into())),
            )
            .unwrap();

        assert_eq!(stack_names(&navigator), ["main", "details"]);
    }

    #[test]
    fn saved_payload_ignored_when_restoration_disabled() {
        let mut navigator = navigator(Config::new().dont_restore_stack_after_kill(true));

        navigator
            .delegate()
            .on_create(
                None,
                Some(&snapshot(&["main", "details"])),
                Box::new(RecordingContainer::default()),
                ScreenPath::new(Plain("home".into())),
            )
            .unwrap();

        assert_eq!(stack_names(&navigator), ["home"]);
    }

    #[test]
    fn failed_restore_leaves_no_container_and_allows_retry() {
        let mut navigator = navigator(Config::new());

        // A stale saved payload naming a screen the factory no longer knows
        // fails the restore without binding the container.
        let result = navigator.delegate().on_create(
            None,
            Some(&snapshot(&["home", "retired-screen"])),
            Box::new(RecordingContainer::default()),
            ScreenPath::new(Plain("home".into())),
        );
        assert!(matches!(result, Err(NavigatorError::Snapshot(_))));
        assert!(navigator.history().is_empty());

        // The shell can retry without the stale payload.
        let shown = Rc::new(RefCell::new(Vec::new()));
        navigator
            .delegate()
            .on_create(
                None,
                None,
                Box::new(RecordingContainer { shown: shown.clone() }),
                ScreenPath::new(Plain("home".into())),
            )
            .unwrap();
        assert_eq!(stack_names(&navigator), ["home"]);
        assert_eq!(*shown.borrow(), vec![vec!["home".to_string()]]);
    }

    #[test]
    fn second_container_bind_is_an_error() {
        let mut navigator = navigator(Config::new());
        navigator
            .delegate()
            .on_create(
                None,
                None,
                Box::new(RecordingContainer::default()),
                ScreenPath::new(Plain("home".into())),
            )
            .unwrap();

        let result = navigator.delegate().on_create(
            None,
            None,
            Box::new(RecordingContainer::default()),
            ScreenPath::new(Plain("home".into())),
        );
        assert!(matches!(
            result,
            Err(NavigatorError::ContainerAlreadyAttached)
        ));
    }

    #[test]
    fn new_intent_replaces_history_wholesale() {
        let mut navigator = navigator(Config::new());
        navigator
            .delegate()
            .on_create(
                None,
                None,
                Box::new(RecordingContainer::default()),
                ScreenPath::new(Plain("home".into())),
            )
            .unwrap();
        navigator.push(ScreenPath::new(Plain("old".into()))).unwrap();

        navigator
            .delegate()
            .on_new_intent(&snapshot(&["fresh-root", "fresh-top"]))
            .unwrap();

        assert_eq!(stack_names(&navigator), ["fresh-root", "fresh-top"]);
        // Only the new entries own scopes besides the navigation root.
        assert_eq!(navigator.scopes().len(), 3);
    }

    #[test]
    fn save_round_trips_through_the_contract() {
        let mut navigator = navigator(Config::new());
        navigator
            .delegate()
            .on_create(
                None,
                None,
                Box::new(RecordingContainer::default()),
                ScreenPath::new(Plain("home".into())),
            )
            .unwrap();
        navigator.push(ScreenPath::new(Plain("details".into()))).unwrap();

        let mut out = None;
        navigator.delegate().on_save_instance_state(&mut out);
        let payload = out.unwrap();

        let mut second = navigator_from_saved(&payload);
        assert_eq!(stack_names(&second), ["home", "details"]);
        second.detach();
    }

    fn navigator_from_saved(payload: &HistorySnapshot) -> Navigator {
        let mut navigator = navigator(Config::new());
        navigator
            .delegate()
            .on_create(
                None,
                Some(payload),
                Box::new(RecordingContainer::default()),
                ScreenPath::new(Plain("home".into())),
            )
            .unwrap();
        navigator
    }

    #[test]
    fn save_skipped_when_restoration_disabled() {
        let mut navigator = navigator(Config::new().dont_restore_stack_after_kill(true));
        navigator
            .delegate()
            .on_create(
                None,
                None,
                Box::new(RecordingContainer::default()),
                ScreenPath::new(Plain("home".into())),
            )
            .unwrap();

        let mut out = None;
        navigator.delegate().on_save_instance_state(&mut out);
        assert!(out.is_none());
    }

    #[test]
    fn destroy_detaches_container_but_keeps_history() {
        let mut navigator = navigator(Config::new());
        navigator
            .delegate()
            .on_create(
                None,
                None,
                Box::new(RecordingContainer::default()),
                ScreenPath::new(Plain("home".into())),
            )
            .unwrap();
        navigator.push(ScreenPath::new(Plain("details".into()))).unwrap();

        navigator.delegate().on_destroy();
        assert_eq!(stack_names(&navigator), ["home", "details"]);

        // Navigation keeps working while detached; the presenter is simply
        // not notified.
        navigator.push(ScreenPath::new(Plain("more".into()))).unwrap();

        // Reattachment syncs the current visible set.
        let shown = Rc::new(RefCell::new(Vec::new()));
        navigator
            .delegate()
            .on_container_reattached(Box::new(RecordingContainer { shown: shown.clone() }))
            .unwrap();
        assert_eq!(*shown.borrow(), vec![vec!["more".to_string()]]);
    }

    #[test]
    fn back_pressed_delegates_and_reports_at_root() {
        let mut navigator = navigator(Config::new());
        navigator
            .delegate()
            .on_create(
                None,
                None,
                Box::new(RecordingContainer::default()),
                ScreenPath::new(Plain("home".into())),
            )
            .unwrap();
        navigator.push(ScreenPath::new(Plain("details".into()))).unwrap();

        assert!(navigator.delegate().on_back_pressed().unwrap());
        // At root: caller should fall through to the platform default.
        assert!(!navigator.delegate().on_back_pressed().unwrap());
    }
}
