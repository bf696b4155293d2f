//! Hosting relationships and the logical parent chain.
//!
//! A host (a native container showing custom views, or a custom view embedding a native one)
//! points at its guest root, and the guest root points back at its host. Both halves are only
//! ever written by `Hierarchy::set_guest_view`.

use crate::error::{BridgeError, InvariantViolation};
use crate::hierarchy::Hierarchy;
use crate::view::{BridgedView, Capabilities, HostToken, ViewId};
use log::{debug, error, warn};

/// Iterator over the strict logical ancestors of a view, nearest first.
///
/// Stops (with an error log) after `Config::max_depth` steps.
#[derive(Debug)]
pub struct Ancestors<'a> {
    hierarchy: &'a Hierarchy,
    start: ViewId,
    next: Option<ViewId>,
    steps: usize,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = ViewId;

    fn next(&mut self) -> Option<ViewId> {
        let current = self.next?;
        if self.steps >= self.hierarchy.config.max_depth {
            error!(
                "ancestors of {:?}: gave up after {} levels (cycle?)",
                self.start, self.steps
            );
            self.next = None;
            return None;
        }
        self.steps += 1;
        self.next = self
            .hierarchy
            .view(current)
            .and_then(|view| view.parent());
        Some(current)
    }
}

impl Hierarchy {
    /// Returns the superview or host of a view, whichever is closer.
    ///
    /// If a view has both, the superview wins.
    pub fn immediate_parent_view(&self, id: ViewId) -> Option<ViewId> {
        self.view(id).and_then(|view| view.parent())
    }

    /// Returns the view directly or indirectly hosting this view.
    ///
    /// This is the view’s own host if it is a guest root, or else the nearest host of its
    /// structural superviews within its own tree.
    pub fn host_view(&self, id: ViewId) -> Option<ViewId> {
        let mut current = self.view(id)?;
        for _ in 0..self.config.max_depth {
            if let Some(host) = current.host_view() {
                return Some(host);
            }
            current = self.view(current.superview()?)?;
        }
        error!("host_view of {:?}: superview chain too deep", id);
        None
    }

    /// Returns the guest root displayed by a host.
    pub fn guest_view(&self, host: ViewId) -> Option<ViewId> {
        self.view(host).and_then(|view| view.guest_view())
    }

    /// Returns the strict logical ancestors of a view, nearest first.
    pub fn ancestors(&self, id: ViewId) -> Ancestors<'_> {
        Ancestors {
            hierarchy: self,
            start: id,
            next: self.immediate_parent_view(id),
            steps: 0,
        }
    }

    /// Whether `ancestor` is a strict logical ancestor of `view`.
    pub fn is_ancestor(&self, ancestor: ViewId, view: ViewId) -> bool {
        self.ancestors(view).any(|id| id == ancestor)
    }

    /// Returns the top of the logical parent chain, which may be the view itself.
    pub fn logical_root(&self, id: ViewId) -> Option<ViewId> {
        if !self.contains(id) {
            return None;
        }
        Some(self.ancestors(id).last().unwrap_or(id))
    }

    /// The view followed by all its logical ancestors, or an error if the chain is too deep.
    pub(crate) fn parent_chain(&self, id: ViewId) -> Result<Vec<ViewId>, BridgeError> {
        let mut chain = vec![id];
        let mut current = self.try_view(id)?;
        while let Some(parent) = current.parent() {
            if chain.len() > self.config.max_depth {
                return Err(BridgeError::DepthExceeded {
                    view: id,
                    max: self.config.max_depth,
                });
            }
            chain.push(parent);
            current = self.try_view(parent)?;
        }
        Ok(chain)
    }

    /// Children in the logical tree: the structural subviews back to front, then the guest.
    ///
    /// A guest that also has a superview belongs to the superview and is left out here.
    pub fn logical_children(&self, id: ViewId) -> Vec<ViewId> {
        match self.view(id) {
            Some(view) => {
                let mut children = view.subviews().to_vec();
                let guest = view
                    .guest_view()
                    .filter(|guest| self.immediate_parent_view(*guest) == Some(id));
                children.extend(guest);
                children
            }
            None => Vec::new(),
        }
    }

    /// Walks up the logical tree and returns the nearest strict ancestor with the capability.
    fn nearest_ancestor_with(&self, id: ViewId, capability: Capabilities) -> Option<ViewId> {
        self.ancestors(id).find(|ancestor| {
            self.view(*ancestor)
                .map_or(false, |view| view.has_capability(capability))
        })
    }

    /// Returns the nearest root coordinator that is an ancestor of the view, or of a view hosting
    /// it.
    ///
    /// Returns None if the view isn’t part of a coordinated hierarchy.
    pub fn ancestor_coordinator(&self, id: ViewId) -> Option<ViewId> {
        self.nearest_ancestor_with(id, Capabilities::ROOT_COORDINATOR)
    }

    /// Returns the nearest scroll container among the view’s ancestors.
    pub fn ancestor_scroll_view(&self, id: ViewId) -> Option<ViewId> {
        self.nearest_ancestor_with(id, Capabilities::SCROLL_CONTAINER)
    }

    /// The coordinator a child of `id` would have.
    pub(crate) fn coordinator_at_or_above(&self, id: ViewId) -> Option<ViewId> {
        let is_coordinator = self
            .view(id)
            .map_or(false, |view| view.has_capability(Capabilities::ROOT_COORDINATOR));
        if is_coordinator {
            Some(id)
        } else {
            self.ancestor_coordinator(id)
        }
    }

    /// Sets (or with None, clears) the guest view displayed by `host`.
    ///
    /// The guest must come from the other tree. If it is currently hosted elsewhere, it is moved
    /// over in one step, so it only sees a single coordinator transition. The previous guest of
    /// `host`, if any, is un-hosted first.
    ///
    /// On error nothing is changed. Misuse (a host without the capability, a guest of the same
    /// kind, or a guest that would end up above its host) is returned as an error in every build.
    /// Debug builds additionally panic if the hosting references end up inconsistent afterwards,
    /// since only this crate can write them.
    pub fn set_guest_view(&mut self, host: ViewId, guest: Option<ViewId>) -> Result<(), BridgeError> {
        let host_view = self.try_view(host)?;
        if !host_view.has_capability(Capabilities::HOST) {
            return Err(InvariantViolation::NotAHost(host).into());
        }
        let current = host_view.guest_view();
        if current == guest {
            return Ok(());
        }

        if let Some(guest) = guest {
            let guest_view = self.try_view(guest)?;
            if guest == host {
                return Err(InvariantViolation::SelfHosting(host).into());
            }
            if guest_view.kind() == host_view.kind() {
                return Err(InvariantViolation::SameKindGuest { host, guest }.into());
            }
            if self.is_ancestor(guest, host) {
                return Err(InvariantViolation::HostingCycle { host, guest }.into());
            }
        }

        if let Some(old) = current {
            self.unhost(host, old)?;
        }
        if let Some(guest) = guest {
            self.host(host, guest)?;
        }
        debug_assert!(
            self.check_hosting().is_ok(),
            "hosting references are inconsistent after setting the guest of {:?}",
            host
        );
        Ok(())
    }

    fn unhost(&mut self, host: ViewId, guest: ViewId) -> Result<(), BridgeError> {
        debug!("un-hosting {:?} from {:?}", guest, host);
        let new_parent = self.view(guest).and_then(|view| view.superview());

        self.restructure(guest, new_parent, |this| {
            let token = HostToken::new();
            if let Some(view) = this.view_mut(host) {
                view.set_guest_view(None, &token);
            }
            if let Some(view) = this.view_mut(guest) {
                if view.host_view() == Some(host) {
                    view.set_host_view(None, &token);
                }
            }
            Ok(())
        })
    }

    fn host(&mut self, host: ViewId, guest: ViewId) -> Result<(), BridgeError> {
        let guest_view = self.try_view(guest)?;
        let previous_host = guest_view.host_view();
        let superview = guest_view.superview();
        if let Some(superview) = superview {
            warn!(
                "{:?} has superview {:?} and is getting host {:?}; the superview takes precedence",
                guest, superview, host
            );
        }
        if let Some(window) = self.window_with_content(guest) {
            warn!("{:?} stops being the content view of {:?}", guest, window);
            self.set_content_view(window, None)?;
        }
        debug!("hosting {:?} in {:?} (was {:?})", guest, host, previous_host);

        self.restructure(guest, superview.or(Some(host)), |this| {
            let token = HostToken::new();
            if let Some(previous) = previous_host {
                if let Some(view) = this.view_mut(previous) {
                    view.set_guest_view(None, &token);
                }
            }
            if let Some(view) = this.view_mut(host) {
                view.set_guest_view(Some(guest), &token);
            }
            if let Some(view) = this.view_mut(guest) {
                view.set_host_view(Some(host), &token);
            }
            Ok(())
        })
    }

    /// Checks that both halves of every hosting edge agree.
    pub fn check_hosting(&self) -> Result<(), BridgeError> {
        let views = self
            .native
            .iter()
            .map(|view| view as &dyn BridgedView)
            .chain(self.custom.iter().map(|view| view as &dyn BridgedView));
        for view in views {
            if let Some(host) = view.host_view() {
                if self.guest_view(host) != Some(view.id()) {
                    return Err(InvariantViolation::Inconsistent {
                        host,
                        guest: view.id(),
                    }
                    .into());
                }
            }
            if let Some(guest) = view.guest_view() {
                let back = self.view(guest).and_then(|guest| guest.host_view());
                if back != Some(view.id()) {
                    return Err(InvariantViolation::Inconsistent {
                        host: view.id(),
                        guest,
                    }
                    .into());
                }
            }
        }
        Ok(())
    }
}
