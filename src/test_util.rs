//! Shared test fixtures.

use crate::nv_tree::NativeView;
use crate::view::{CoordinatorTransition, HandlerResult, ViewDelegate, ViewId};
use crate::view_tree::CustomView;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

/// Routes `log` output to the test harness.
pub fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    AncestorDidLayout(ViewId),
    HierarchyDidChange(ViewId),
    WillMove(ViewId, CoordinatorTransition),
    DidMove(ViewId, CoordinatorTransition),
    FocusDidChange(ViewId, bool),
}

#[derive(Debug, Default)]
struct Log {
    events: Vec<Event>,
    failing: HashSet<ViewId>,
}

/// A delegate that writes every notification into one log shared by all its clones.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    log: Arc<Mutex<Log>>,
}

impl Recorder {
    pub fn new() -> Recorder {
        Recorder::default()
    }

    pub fn native(&self, view: NativeView) -> NativeView {
        view.with_delegate(self.clone())
    }

    pub fn custom(&self, view: CustomView) -> CustomView {
        view.with_delegate(self.clone())
    }

    /// Makes every handler of `view` return an error (after recording the event).
    pub fn fail_on(&self, view: ViewId) {
        self.log.lock().failing.insert(view);
    }

    pub fn events(&self) -> Vec<Event> {
        self.log.lock().events.clone()
    }

    pub fn hierarchy_changes(&self) -> Vec<ViewId> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::HierarchyDidChange(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.log.lock().events.clear();
    }

    fn record(&self, view: ViewId, event: Event) -> HandlerResult {
        let mut log = self.log.lock();
        log.events.push(event);
        if log.failing.contains(&view) {
            return Err(format!("{:?} refused {:?}", view, event).into());
        }
        Ok(())
    }
}

impl ViewDelegate for Recorder {
    fn ancestor_did_layout(&mut self, view: ViewId) -> HandlerResult {
        self.record(view, Event::AncestorDidLayout(view))
    }

    fn view_hierarchy_did_change(&mut self, view: ViewId) -> HandlerResult {
        self.record(view, Event::HierarchyDidChange(view))
    }

    fn will_move_to_coordinator(
        &mut self,
        view: ViewId,
        transition: CoordinatorTransition,
    ) -> HandlerResult {
        self.record(view, Event::WillMove(view, transition))
    }

    fn did_move_from_coordinator(
        &mut self,
        view: ViewId,
        transition: CoordinatorTransition,
    ) -> HandlerResult {
        self.record(view, Event::DidMove(view, transition))
    }

    fn focus_did_change(&mut self, view: ViewId, focused: bool) -> HandlerResult {
        self.record(view, Event::FocusDidChange(view, focused))
    }
}
