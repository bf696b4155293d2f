use crate::error::BridgeError;
use crate::layer::Layer;
use crate::rect::Rect;
use crate::view::{
    BridgedView, Capabilities, DelegateHandle, HostToken, ViewDelegate, ViewId, ViewKind,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// A platform-owned view.
#[derive(Debug)]
pub struct NativeView {
    id: ViewId,
    layer: Layer,
    superview: Option<ViewId>,
    subviews: Vec<ViewId>,
    host: Option<ViewId>,
    guest: Option<ViewId>,
    capabilities: Capabilities,
    /// Whether the view takes mouse events (`NSView` has no such switch; controls do).
    enabled: bool,
    focused: bool,
    delegate: Option<DelegateHandle>,
}

impl NativeView {
    /// Creates a plain native view occupying `frame` in its superview.
    pub fn new(frame: Rect) -> NativeView {
        NativeView {
            id: ViewId::new(),
            layer: Layer::new(frame),
            superview: None,
            subviews: Vec::new(),
            host: None,
            guest: None,
            capabilities: Capabilities::empty(),
            enabled: true,
            focused: false,
            delegate: None,
        }
    }

    /// A native container that displays a custom view hierarchy.
    pub fn host(frame: Rect) -> NativeView {
        NativeView::new(frame).with_capabilities(Capabilities::HOST)
    }

    /// A native container that anchors a custom view hierarchy, e.g. a window’s main content.
    pub fn coordinator(frame: Rect) -> NativeView {
        NativeView::new(frame)
            .with_capabilities(Capabilities::HOST | Capabilities::ROOT_COORDINATOR)
    }

    /// A native scroll view.
    pub fn scroll_view(frame: Rect) -> NativeView {
        NativeView::new(frame).with_capabilities(Capabilities::SCROLL_CONTAINER)
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> NativeView {
        self.capabilities |= capabilities;
        self
    }

    pub fn with_delegate<D: ViewDelegate + 'static>(mut self, delegate: D) -> NativeView {
        self.delegate = Some(Arc::new(Mutex::new(delegate)));
        self
    }

    pub fn with_delegate_handle(mut self, delegate: DelegateHandle) -> NativeView {
        self.delegate = Some(delegate);
        self
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

impl BridgedView for NativeView {
    fn id(&self) -> ViewId {
        self.id
    }
    fn kind(&self) -> ViewKind {
        ViewKind::Native
    }
    fn layer(&self) -> &Layer {
        &self.layer
    }
    fn layer_mut(&mut self) -> &mut Layer {
        &mut self.layer
    }
    fn superview(&self) -> Option<ViewId> {
        self.superview
    }
    fn subviews(&self) -> &[ViewId] {
        &self.subviews
    }
    fn host_view(&self) -> Option<ViewId> {
        self.host
    }
    fn set_host_view(&mut self, host: Option<ViewId>, _: &HostToken) {
        self.host = host;
    }
    fn guest_view(&self) -> Option<ViewId> {
        self.guest
    }
    fn set_guest_view(&mut self, guest: Option<ViewId>, _: &HostToken) {
        self.guest = guest;
    }
    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }
    fn accepts_user_interaction(&self) -> bool {
        self.enabled
    }
    fn is_focused(&self) -> bool {
        self.focused
    }
    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
    fn delegate(&self) -> Option<DelegateHandle> {
        self.delegate.clone()
    }
}

/// The native-view tree.
///
/// Only knows about native views and their structural relationships; hosting edges into the
/// custom tree are stored on the nodes but never followed here.
#[derive(Debug, Default)]
pub struct NativeTree {
    nodes: HashMap<ViewId, NativeView>,
}

impl NativeTree {
    pub fn new() -> NativeTree {
        NativeTree {
            nodes: HashMap::new(),
        }
    }

    pub fn contains(&self, id: ViewId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn get(&self, id: ViewId) -> Option<&NativeView> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: ViewId) -> Option<&mut NativeView> {
        self.nodes.get_mut(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &NativeView> + '_ {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Adds a detached view.
    pub(crate) fn insert(&mut self, view: NativeView) -> ViewId {
        let id = view.id;
        self.nodes.insert(id, view);
        id
    }

    /// Removes a single view. Does not touch the superview’s subview list or the subviews.
    pub(crate) fn remove(&mut self, id: ViewId) -> Result<NativeView, BridgeError> {
        self.nodes.remove(&id).ok_or(BridgeError::NoSuchView(id))
    }

    /// Inserts `subview` into `superview`’s subviews at `index` (clamped), detaching it from any
    /// previous superview first.
    pub(crate) fn link(
        &mut self,
        superview: ViewId,
        subview: ViewId,
        index: Option<usize>,
    ) -> Result<(), BridgeError> {
        if superview == subview {
            return Err(BridgeError::Cycle(subview));
        }
        if !self.nodes.contains_key(&superview) {
            return Err(BridgeError::NoSuchView(superview));
        }
        self.unlink(subview)?;

        let node = self
            .nodes
            .get_mut(&superview)
            .ok_or(BridgeError::NoSuchView(superview))?;
        let index = index.map_or(node.subviews.len(), |i| i.min(node.subviews.len()));
        node.subviews.insert(index, subview);

        if let Some(node) = self.nodes.get_mut(&subview) {
            node.superview = Some(superview);
        }
        Ok(())
    }

    /// Detaches a view from its superview, if it has one.
    pub(crate) fn unlink(&mut self, id: ViewId) -> Result<(), BridgeError> {
        let superview = match self.nodes.get_mut(&id) {
            Some(node) => node.superview.take(),
            None => return Err(BridgeError::NoSuchView(id)),
        };
        if let Some(superview) = superview {
            if let Some(node) = self.nodes.get_mut(&superview) {
                node.subviews.retain(|i| *i != id);
            }
        }
        Ok(())
    }
}
