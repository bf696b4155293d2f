use crate::layer::Layer;
use bitflags::bitflags;
use cgmath::Point2;
use core::fmt;
use parking_lot::Mutex;
use std::error::Error;
use std::sync::Arc;
use uuid::Uuid;

/// A unique identifier for a view.
///
/// (this is just a UUID)
///
/// Native and custom views share one id space, so an id alone is enough to find a view in
/// either tree.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ViewId(u32, u16, u16, [u8; 8]);

impl ViewId {
    pub(crate) fn new() -> ViewId {
        let uuid = Uuid::new_v4();
        let (a, b, c, d) = uuid.as_fields();
        ViewId(a, b, c, *d)
    }
}

/// Which of the two trees a view lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
    /// A platform-owned, windowed view.
    Native,
    /// A lightweight layer-backed view.
    Custom,
}

bitflags! {
    /// Marker capabilities a view may carry.
    ///
    /// These are how the bridge discovers hosts, coordinators, scroll views and controller roots
    /// without knowing concrete view types.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u8 {
        /// May host a guest view from the other tree.
        const HOST = 1;
        /// Anchors a hierarchy; found by `Hierarchy::ancestor_coordinator`.
        const ROOT_COORDINATOR = 1 << 1;
        /// Found by `Hierarchy::ancestor_scroll_view`.
        const SCROLL_CONTAINER = 1 << 2;
        /// The root view of a view controller; delimits focus.
        const CONTROLLER = 1 << 3;
    }
}

/// A change of a view’s nearest ancestor root coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorTransition {
    /// The coordinator before the change, if any.
    pub from: Option<ViewId>,
    /// The coordinator after the change, if any.
    pub to: Option<ViewId>,
}

/// Result type for delegate notification handlers.
pub type HandlerResult = Result<(), Box<dyn Error + Send + Sync>>;

/// Shared handle to a view delegate.
pub type DelegateHandle = Arc<Mutex<dyn ViewDelegate>>;

/// Hooks invoked on a view as the hierarchy around it changes.
///
/// All methods have empty default implementations. Handlers only receive the view id and event
/// data; they cannot touch the hierarchy, so they can’t restructure it mid-traversal.
///
/// A handler returning an error does not stop the notification from reaching other views.
pub trait ViewDelegate: fmt::Debug + Send {
    /// Called when an ancestor (structural or hosting) has finished laying itself out.
    ///
    /// Geometry should be re-derived on demand; this may be delivered more than once per pass.
    fn ancestor_did_layout(&mut self, view: ViewId) -> HandlerResult {
        let _ = view;
        Ok(())
    }

    /// Called when the view’s absolute position in the logical tree has changed.
    fn view_hierarchy_did_change(&mut self, view: ViewId) -> HandlerResult {
        let _ = view;
        Ok(())
    }

    /// Called before the view’s nearest root coordinator changes.
    fn will_move_to_coordinator(
        &mut self,
        view: ViewId,
        transition: CoordinatorTransition,
    ) -> HandlerResult {
        let _ = (view, transition);
        Ok(())
    }

    /// Called after the view’s nearest root coordinator has changed.
    fn did_move_from_coordinator(
        &mut self,
        view: ViewId,
        transition: CoordinatorTransition,
    ) -> HandlerResult {
        let _ = (view, transition);
        Ok(())
    }

    /// Called when the cached focused flag of the view flips.
    fn focus_did_change(&mut self, view: ViewId, focused: bool) -> HandlerResult {
        let _ = (view, focused);
        Ok(())
    }

    /// Narrows the view’s hit area.
    ///
    /// This is combined with the layer bounds check, so it can only exclude points.
    fn point_inside(&self, view: ViewId, point: Point2<f64>) -> bool {
        let _ = (view, point);
        true
    }
}

/// Proof that the caller is the hosting code path.
///
/// Only this crate can create one, so nothing outside of `Hierarchy::set_guest_view` can write a
/// hosting reference.
#[derive(Debug)]
pub struct HostToken(());

impl HostToken {
    pub(crate) fn new() -> HostToken {
        HostToken(())
    }
}

/// The contract every view in the bridged hierarchy fulfills, native or custom.
///
/// Traversal code only ever works with `&dyn BridgedView`.
pub trait BridgedView: fmt::Debug {
    fn id(&self) -> ViewId;

    /// Which tree the view lives in.
    ///
    /// Used when validating edges; traversal never looks at it.
    fn kind(&self) -> ViewKind;

    /// The backing layer. There is always one.
    fn layer(&self) -> &Layer;

    fn layer_mut(&mut self) -> &mut Layer;

    /// The structural parent within the view’s own tree.
    fn superview(&self) -> Option<ViewId>;

    /// Structural children, back to front.
    fn subviews(&self) -> &[ViewId];

    /// The host this view is the guest of, if it is a hosted root.
    ///
    /// This is the stored reference only; see `Hierarchy::host_view` for the inherited value.
    fn host_view(&self) -> Option<ViewId>;

    /// Writes the hosting reference. Only the hosting code path holds a `HostToken`.
    fn set_host_view(&mut self, host: Option<ViewId>, token: &HostToken);

    /// The guest root displayed by this view, if it is a host.
    fn guest_view(&self) -> Option<ViewId>;

    fn set_guest_view(&mut self, guest: Option<ViewId>, token: &HostToken);

    fn capabilities(&self) -> Capabilities;

    fn accepts_user_interaction(&self) -> bool;

    fn is_focused(&self) -> bool;

    fn set_focused(&mut self, focused: bool);

    fn delegate(&self) -> Option<DelegateHandle>;

    /// Returns the superview or the host, whichever is closer.
    ///
    /// A view with both resolves to its superview.
    fn parent(&self) -> Option<ViewId> {
        self.superview().or_else(|| self.host_view())
    }

    fn is_visible(&self) -> bool {
        self.layer().is_visible()
    }

    fn has_capability(&self, capability: Capabilities) -> bool {
        self.capabilities().contains(capability)
    }

    /// Geometric part of the point membership test: within the layer bounds.
    fn point_inside(&self, point: Point2<f64>) -> bool {
        self.layer().bounds.contains(point)
    }
}
