use crate::error::BridgeError;
use crate::layer::Layer;
use crate::rect::Rect;
use crate::view::{
    BridgedView, Capabilities, DelegateHandle, HostToken, ViewDelegate, ViewId, ViewKind,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// A lightweight, layer-backed view.
#[derive(Debug)]
pub struct CustomView {
    id: ViewId,
    layer: Layer,
    superview: Option<ViewId>,
    subviews: Vec<ViewId>,
    /// Set on the root of a hosted hierarchy only.
    host: Option<ViewId>,
    /// Set when this view embeds a native view.
    guest: Option<ViewId>,
    capabilities: Capabilities,
    user_interaction_enabled: bool,
    focused: bool,
    delegate: Option<DelegateHandle>,
}

impl CustomView {
    pub fn new(frame: Rect) -> CustomView {
        CustomView {
            id: ViewId::new(),
            layer: Layer::new(frame),
            superview: None,
            subviews: Vec::new(),
            host: None,
            guest: None,
            capabilities: Capabilities::empty(),
            user_interaction_enabled: true,
            focused: false,
            delegate: None,
        }
    }

    /// A custom view that embeds a native view.
    pub fn host(frame: Rect) -> CustomView {
        CustomView::new(frame).with_capabilities(Capabilities::HOST)
    }

    /// The root view of a view controller.
    pub fn controller(frame: Rect) -> CustomView {
        CustomView::new(frame).with_capabilities(Capabilities::CONTROLLER)
    }

    pub fn scroll_view(frame: Rect) -> CustomView {
        CustomView::new(frame).with_capabilities(Capabilities::SCROLL_CONTAINER)
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> CustomView {
        self.capabilities |= capabilities;
        self
    }

    pub fn with_delegate<D: ViewDelegate + 'static>(mut self, delegate: D) -> CustomView {
        self.delegate = Some(Arc::new(Mutex::new(delegate)));
        self
    }

    pub fn with_delegate_handle(mut self, delegate: DelegateHandle) -> CustomView {
        self.delegate = Some(delegate);
        self
    }

    pub fn set_user_interaction_enabled(&mut self, enabled: bool) {
        self.user_interaction_enabled = enabled;
    }
}

impl BridgedView for CustomView {
    fn id(&self) -> ViewId {
        self.id
    }
    fn kind(&self) -> ViewKind {
        ViewKind::Custom
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
        self.user_interaction_enabled
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

/// A tree of custom views.
#[derive(Debug, Default)]
pub struct CustomTree {
    views: HashMap<ViewId, CustomView>,
}

impl CustomTree {
    pub fn new() -> CustomTree {
        CustomTree {
            views: HashMap::new(),
        }
    }

    pub fn contains(&self, id: ViewId) -> bool {
        self.views.contains_key(&id)
    }

    pub fn get(&self, id: ViewId) -> Option<&CustomView> {
        self.views.get(&id)
    }

    pub fn get_mut(&mut self, id: ViewId) -> Option<&mut CustomView> {
        self.views.get_mut(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CustomView> + '_ {
        self.views.values()
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Adds a view without a superview.
    pub(crate) fn add_view(&mut self, view: CustomView) -> ViewId {
        let id = view.id;
        self.views.insert(id, view);
        id
    }

    /// Removes a view. Its subviews and its superview’s subview list are left alone.
    pub(crate) fn remove_view(&mut self, id: ViewId) -> Result<CustomView, BridgeError> {
        self.views.remove(&id).ok_or(BridgeError::NoSuchView(id))
    }

    /// Sets up a parent-child relationship, replacing the child’s previous one.
    ///
    /// - `index`: position in the superview’s subviews (back to front); appends if None.
    pub(crate) fn add_subview(
        &mut self,
        superview: ViewId,
        subview: ViewId,
        index: Option<usize>,
    ) -> Result<(), BridgeError> {
        if superview == subview {
            return Err(BridgeError::Cycle(subview));
        }
        if !self.views.contains_key(&superview) {
            return Err(BridgeError::NoSuchView(superview));
        }
        self.remove_from_superview(subview)?;

        if let Some(parent) = self.views.get_mut(&superview) {
            let index = match index {
                Some(i) if i < parent.subviews.len() => i,
                _ => parent.subviews.len(),
            };
            parent.subviews.insert(index, subview);
        }
        if let Some(view) = self.views.get_mut(&subview) {
            view.superview = Some(superview);
        }
        Ok(())
    }

    /// Removes the parent-child relationship of a view, if any.
    pub(crate) fn remove_from_superview(&mut self, id: ViewId) -> Result<(), BridgeError> {
        let superview = self
            .views
            .get_mut(&id)
            .ok_or(BridgeError::NoSuchView(id))?
            .superview
            .take();
        if let Some(parent) = superview.and_then(|s| self.views.get_mut(&s)) {
            if let Some(pos) = parent.subviews.iter().position(|i| *i == id) {
                parent.subviews.remove(pos);
            }
        }
        Ok(())
    }
}
