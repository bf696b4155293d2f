//! Focus resolution.
//!
//! A view is focused if it lies on the logical path from the platform’s first responder up to the
//! nearest enclosing controller root. The result is cached in each view’s focused flag and only
//! recomputed by `Hierarchy::refresh_focus`.

use crate::hierarchy::Hierarchy;
use crate::view::{BridgedView, Capabilities, ViewId};
use core::fmt;
use log::{debug, warn};
use parking_lot::Mutex;
use std::sync::Arc;

/// The platform’s answer to “which view has keyboard focus?”
pub trait FirstResponder: fmt::Debug {
    fn first_responder(&self) -> Option<ViewId>;
}

/// A first responder slot shared between the platform side and a hierarchy.
#[derive(Debug, Clone, Default)]
pub struct ResponderCell(Arc<Mutex<Option<ViewId>>>);

impl ResponderCell {
    pub fn new() -> ResponderCell {
        ResponderCell::default()
    }

    /// Sets the first responder. The hierarchy picks this up on its next `refresh_focus`.
    pub fn set(&self, responder: Option<ViewId>) {
        *self.0.lock() = responder;
    }

    pub fn get(&self) -> Option<ViewId> {
        *self.0.lock()
    }
}

impl FirstResponder for ResponderCell {
    fn first_responder(&self) -> Option<ViewId> {
        self.get()
    }
}

impl Hierarchy {
    /// Returns the current first responder as reported by the platform.
    pub fn first_responder(&self) -> Option<ViewId> {
        self.responder.first_responder()
    }

    /// Returns the cached focused flag of a view. Unknown views are not focused.
    pub fn is_focused(&self, id: ViewId) -> bool {
        self.view(id).map_or(false, |view| view.is_focused())
    }

    /// The views that should be focused for the given first responder, responder first.
    fn resolve_focus_path(&self, responder: Option<ViewId>) -> Vec<ViewId> {
        let responder = match responder {
            Some(id) if self.contains(id) => id,
            _ => return Vec::new(),
        };

        let mut path = Vec::new();
        for id in Some(responder).into_iter().chain(self.ancestors(responder)) {
            path.push(id);
            let is_controller = self
                .view(id)
                .map_or(false, |view| view.has_capability(Capabilities::CONTROLLER));
            if is_controller {
                return path;
            }
        }
        // not inside a controller
        Vec::new()
    }

    /// Recomputes the focus path and updates the focused flags of views that changed.
    pub fn refresh_focus(&mut self) {
        let path = self.resolve_focus_path(self.first_responder());
        if path == self.focus_path {
            return;
        }
        debug!("focus path: {:?}", path);

        let lost: Vec<_> = self
            .focus_path
            .iter()
            .copied()
            .filter(|id| !path.contains(id))
            .collect();
        let gained: Vec<_> = path
            .iter()
            .copied()
            .filter(|id| !self.focus_path.contains(id))
            .collect();
        self.focus_path = path;

        for id in lost {
            self.set_focused(id, false);
        }
        for id in gained {
            self.set_focused(id, true);
        }
    }

    fn set_focused(&mut self, id: ViewId, focused: bool) {
        let delegate = match self.view_mut(id) {
            Some(view) if view.is_focused() != focused => {
                view.set_focused(focused);
                view.delegate()
            }
            _ => return,
        };
        if let Some(delegate) = delegate {
            if let Err(err) = delegate.lock().focus_did_change(id, focused) {
                warn!("focus_did_change handler of {:?} failed: {}", id, err);
            }
        }
    }
}
