use crate::config::Config;
use crate::error::{BridgeError, InvariantViolation};
use crate::focus::{FirstResponder, ResponderCell};
use crate::layer::Layer;
use crate::nv_tree::{NativeTree, NativeView};
use crate::view::{BridgedView, CoordinatorTransition, ViewId};
use crate::view_tree::{CustomTree, CustomView};
use log::{debug, warn};
use std::collections::HashMap;
use uuid::Uuid;

/// A unique identifier for a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WindowId(u32, u16, u16, [u8; 8]);

impl WindowId {
    fn new() -> WindowId {
        let uuid = Uuid::new_v4();
        let (a, b, c, d) = uuid.as_fields();
        WindowId(a, b, c, *d)
    }
}

/// A window as far as the bridge is concerned: something with a native content view.
///
/// The content view’s layer position is relative to the window’s content area.
#[derive(Debug, Default)]
struct Window {
    content_view: Option<ViewId>,
}

/// Both view trees, stitched together by hosting relationships into one logical tree.
///
/// All structural mutation goes through here so that every change is followed by the matching
/// notifications and a focus refresh.
#[derive(Debug)]
pub struct Hierarchy {
    pub(crate) config: Config,
    pub(crate) native: NativeTree,
    pub(crate) custom: CustomTree,
    windows: HashMap<WindowId, Window>,
    pub(crate) responder: Box<dyn FirstResponder>,
    /// The views whose focused flag is currently set.
    pub(crate) focus_path: Vec<ViewId>,
}

impl Default for Hierarchy {
    fn default() -> Self {
        Hierarchy::new()
    }
}

impl Hierarchy {
    pub fn new() -> Hierarchy {
        Hierarchy::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Hierarchy {
        Hierarchy::with_responder(config, ResponderCell::new())
    }

    /// Creates a hierarchy that reads the platform’s first responder from `responder`.
    pub fn with_responder<R: FirstResponder + 'static>(config: Config, responder: R) -> Hierarchy {
        Hierarchy {
            config,
            native: NativeTree::new(),
            custom: CustomTree::new(),
            windows: HashMap::new(),
            responder: Box::new(responder),
            focus_path: Vec::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn native_tree(&self) -> &NativeTree {
        &self.native
    }

    pub fn custom_tree(&self) -> &CustomTree {
        &self.custom
    }

    /// Adds a detached native view.
    pub fn add_native(&mut self, view: NativeView) -> ViewId {
        self.native.insert(view)
    }

    /// Adds a detached custom view.
    pub fn add_custom(&mut self, view: CustomView) -> ViewId {
        self.custom.add_view(view)
    }

    pub fn contains(&self, id: ViewId) -> bool {
        self.native.contains(id) || self.custom.contains(id)
    }

    /// Looks a view up in either tree.
    pub fn view(&self, id: ViewId) -> Option<&dyn BridgedView> {
        match self.native.get(id) {
            Some(view) => Some(view as &dyn BridgedView),
            None => self.custom.get(id).map(|view| view as &dyn BridgedView),
        }
    }

    pub fn view_mut(&mut self, id: ViewId) -> Option<&mut dyn BridgedView> {
        if self.native.contains(id) {
            return self.native.get_mut(id).map(|view| view as &mut dyn BridgedView);
        }
        self.custom.get_mut(id).map(|view| view as &mut dyn BridgedView)
    }

    pub(crate) fn try_view(&self, id: ViewId) -> Result<&dyn BridgedView, BridgeError> {
        self.view(id).ok_or(BridgeError::NoSuchView(id))
    }

    pub fn native_view_mut(&mut self, id: ViewId) -> Option<&mut NativeView> {
        self.native.get_mut(id)
    }

    pub fn custom_view_mut(&mut self, id: ViewId) -> Option<&mut CustomView> {
        self.custom.get_mut(id)
    }

    pub fn layer(&self, id: ViewId) -> Option<&Layer> {
        self.view(id).map(|view| view.layer())
    }

    /// Direct access to a layer.
    ///
    /// Geometry changes made this way are not announced; use `set_frame` or
    /// `layout_did_complete` for that.
    pub fn layer_mut(&mut self, id: ViewId) -> Option<&mut Layer> {
        self.view_mut(id).map(|view| view.layer_mut())
    }

    /// Registers a new window without content.
    pub fn add_window(&mut self) -> WindowId {
        let id = WindowId::new();
        self.windows.insert(id, Window::default());
        id
    }

    /// Removes a window. Its content view is detached but not destroyed.
    pub fn remove_window(&mut self, window: WindowId) -> Result<(), BridgeError> {
        self.set_content_view(window, None)?;
        self.windows.remove(&window);
        Ok(())
    }

    pub fn contains_window(&self, window: WindowId) -> bool {
        self.windows.contains_key(&window)
    }

    pub fn content_view(&self, window: WindowId) -> Option<ViewId> {
        self.windows.get(&window).and_then(|w| w.content_view)
    }

    /// Sets the native root view of a window.
    ///
    /// The view must be a native view without a superview or host.
    pub fn set_content_view(
        &mut self,
        window: WindowId,
        view: Option<ViewId>,
    ) -> Result<(), BridgeError> {
        let previous = self
            .windows
            .get(&window)
            .ok_or(BridgeError::NoSuchWindow(window))?
            .content_view;
        if previous == view {
            return Ok(());
        }

        if let Some(id) = view {
            let node = match self.native.get(id) {
                Some(node) => node,
                None if self.custom.contains(id) => return Err(BridgeError::NotNative(id)),
                None => return Err(BridgeError::NoSuchView(id)),
            };
            if node.parent().is_some() {
                return Err(BridgeError::HasParent(id));
            }
            // a view can only be the content of one window
            for other in self.windows.values_mut() {
                if other.content_view == Some(id) {
                    other.content_view = None;
                }
            }
        }

        if let Some(w) = self.windows.get_mut(&window) {
            w.content_view = view;
        }
        debug!("window {:?} content view {:?} -> {:?}", window, previous, view);

        for id in previous.into_iter().chain(view) {
            self.view_hierarchy_did_change(id);
        }
        self.refresh_focus();
        Ok(())
    }

    /// Returns the window the view is (directly or through hosting) attached to.
    pub fn window_of(&self, id: ViewId) -> Option<WindowId> {
        let root = self.logical_root(id)?;
        self.window_with_content(root)
    }

    pub(crate) fn window_with_content(&self, root: ViewId) -> Option<WindowId> {
        self.windows
            .iter()
            .find(|(_, w)| w.content_view == Some(root))
            .map(|(id, _)| *id)
    }

    /// Appends `child` to `parent`’s subviews (topmost).
    pub fn add_subview(&mut self, parent: ViewId, child: ViewId) -> Result<(), BridgeError> {
        self.insert_subview(parent, child, None)
    }

    /// Inserts `child` into `parent`’s subviews at `index` (back to front), or on top if None.
    ///
    /// Both views must belong to the same tree; crossing trees is what hosting is for. Moving a
    /// view within its current superview counts as a reorder.
    pub fn insert_subview(
        &mut self,
        parent: ViewId,
        child: ViewId,
        index: Option<usize>,
    ) -> Result<(), BridgeError> {
        let parent_view = self.try_view(parent)?;
        let child_view = self.try_view(child)?;
        if parent_view.kind() != child_view.kind() {
            return Err(BridgeError::KindMismatch {
                parent,
                parent_kind: parent_view.kind(),
                child,
                child_kind: child_view.kind(),
            });
        }
        if parent == child || self.is_ancestor(child, parent) {
            return Err(BridgeError::Cycle(child));
        }
        if child_view.host_view().is_some() {
            warn!(
                "{:?} is hosted by {:?} and is getting superview {:?}; the superview takes precedence",
                child,
                child_view.host_view(),
                parent
            );
        }
        if let Some(window) = self.window_with_content(child) {
            warn!("{:?} stops being the content view of {:?}", child, window);
            if let Some(w) = self.windows.get_mut(&window) {
                w.content_view = None;
            }
        }

        self.restructure(child, Some(parent), |this| {
            if this.native.contains(child) {
                this.native.link(parent, child, index)
            } else {
                this.custom.add_subview(parent, child, index)
            }
        })
    }

    /// Detaches a view from its superview.
    ///
    /// A view that is also hosted falls back to its host as its parent. If that host sits inside
    /// the view’s own subtree, the removal is rejected with `HostingCycle`.
    pub fn remove_from_superview(&mut self, child: ViewId) -> Result<(), BridgeError> {
        let view = self.try_view(child)?;
        if view.superview().is_none() {
            return Ok(());
        }
        let new_parent = view.host_view();
        if let Some(host) = new_parent {
            if self.is_ancestor(child, host) {
                return Err(InvariantViolation::HostingCycle { host, guest: child }.into());
            }
        }

        self.restructure(child, new_parent, |this| {
            if this.native.contains(child) {
                this.native.unlink(child)
            } else {
                this.custom.remove_from_superview(child)
            }
        })
    }

    /// Removes a view and its structural subviews from the hierarchy.
    ///
    /// Guests hosted anywhere in the removed subtree are un-hosted, not removed: hosts don’t own
    /// their guests.
    pub fn destroy_view(&mut self, id: ViewId) -> Result<(), BridgeError> {
        let view = self.try_view(id)?;
        let superview = view.superview();
        let host = view.host_view();

        // un-host first so detaching never falls back to a host
        if let Some(host) = host {
            self.set_guest_view(host, None)?;
        }
        if superview.is_some() {
            self.remove_from_superview(id)?;
        }
        if let Some(window) = self.window_with_content(id) {
            self.set_content_view(window, None)?;
        }

        // collect the structural subtree (not crossing into guests)
        let mut subtree = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if subtree.contains(&next) {
                continue;
            }
            if let Some(view) = self.view(next) {
                stack.extend(view.subviews().iter().rev().copied());
                subtree.push(next);
            }
        }

        for &node in &subtree {
            let (guest, host) = match self.view(node) {
                Some(view) => (view.guest_view(), view.host_view()),
                None => continue,
            };
            if guest.is_some() {
                self.set_guest_view(node, None)?;
            }
            // a subview that was also hosted somewhere
            if let Some(host) = host {
                self.set_guest_view(host, None)?;
            }
        }

        for node in subtree {
            let removed = if self.native.contains(node) {
                self.native.remove(node).map(|_| ())
            } else {
                self.custom.remove_view(node).map(|_| ())
            };
            removed?;
            self.focus_path.retain(|i| *i != node);
        }
        debug!("destroyed view {:?}", id);
        self.refresh_focus();
        Ok(())
    }

    /// Runs a structural change of `view`, bracketed by the coordinator transition
    /// notifications, then announces the hierarchy change and refreshes focus.
    ///
    /// If `mutate` fails, the did-move notification still goes out, carrying the coordinator the
    /// view ended up with, and the error is returned.
    ///
    /// `new_parent` is the logical parent `view` will have after `mutate`.
    pub(crate) fn restructure<F>(
        &mut self,
        view: ViewId,
        new_parent: Option<ViewId>,
        mutate: F,
    ) -> Result<(), BridgeError>
    where
        F: FnOnce(&mut Hierarchy) -> Result<(), BridgeError>,
    {
        let transition = CoordinatorTransition {
            from: self.ancestor_coordinator(view),
            to: new_parent.and_then(|parent| self.coordinator_at_or_above(parent)),
        };
        let changes_coordinator = transition.from != transition.to;

        if changes_coordinator {
            self.will_move_to_coordinator(view, transition);
        }
        if let Err(err) = mutate(self) {
            if changes_coordinator {
                // close the pair with where the view actually ended up
                let aborted = CoordinatorTransition {
                    from: transition.from,
                    to: self.ancestor_coordinator(view),
                };
                self.did_move_from_coordinator(view, aborted);
            }
            warn!("restructuring {:?} failed: {}", view, err);
            return Err(err);
        }
        if changes_coordinator {
            self.did_move_from_coordinator(view, transition);
        }
        self.view_hierarchy_did_change(view);
        self.refresh_focus();
        Ok(())
    }
}
