//! Bridges a native (platform-owned) view tree and a custom (layer-backed) view tree into one
//! logical hierarchy.
//!
//! Either kind of view can host a root of the other kind. The resulting logical tree is never
//! stored; it is derived from superview and hosting edges whenever it is walked, so geometry
//! conversion, hit testing, focus and change notifications all work across hosting seams.

mod config;
mod error;
mod focus;
pub mod geometry;
mod hierarchy;
mod host;
mod hosting;
mod layer;
mod nv_tree;
mod propagate;
mod rect;
#[cfg(test)]
mod test_util;
mod view;
mod view_tree;

pub use config::Config;
pub use error::{BridgeError, InvariantViolation};
pub use focus::{FirstResponder, ResponderCell};
pub use hierarchy::{Hierarchy, WindowId};
pub use host::{Host, PlatformEvent};
pub use hosting::Ancestors;
pub use layer::Layer;
pub use nv_tree::{NativeTree, NativeView};
pub use propagate::Propagation;
pub use rect::Rect;
pub use view::{
    BridgedView, Capabilities, CoordinatorTransition, DelegateHandle, HandlerResult, HostToken,
    ViewDelegate, ViewId, ViewKind,
};
pub use view_tree::{CustomTree, CustomView};
