use crate::view::{ViewId, ViewKind};
use crate::hierarchy::WindowId;
use thiserror::Error;

/// Errors raised by the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    #[error("no such view: {0:?}")]
    NoSuchView(ViewId),

    #[error("no such window: {0:?}")]
    NoSuchWindow(WindowId),

    /// Only native views can be the content of a window.
    #[error("{0:?} is not a native view")]
    NotNative(ViewId),

    /// Only root views can be the content of a window.
    #[error("{0:?} already has a parent")]
    HasParent(ViewId),

    /// Geometry was requested for a view that isn’t in any window.
    #[error("view {0:?} is not attached to a window")]
    Unattached(ViewId),

    /// The transform chain from a view to its window can’t be inverted.
    #[error("transform chain of view {0:?} is not invertible")]
    NonInvertible(ViewId),

    /// Structural edges only exist within one tree; crossing trees requires hosting.
    #[error("cannot make {child:?} ({child_kind:?}) a subview of {parent:?} ({parent_kind:?})")]
    KindMismatch {
        parent: ViewId,
        parent_kind: ViewKind,
        child: ViewId,
        child_kind: ViewKind,
    },

    #[error("hosting invariant violated: {0}")]
    Invariant(#[from] InvariantViolation),

    /// The logical tree contains a cycle through this view.
    #[error("cycle in view hierarchy at {0:?}")]
    Cycle(ViewId),

    #[error("view hierarchy deeper than {max} levels at {view:?}")]
    DepthExceeded { view: ViewId, max: usize },
}

/// Ways of misusing hosting relationships.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("{0:?} cannot host views")]
    NotAHost(ViewId),

    #[error("{host:?} and {guest:?} live in the same tree")]
    SameKindGuest { host: ViewId, guest: ViewId },

    #[error("{0:?} cannot host itself")]
    SelfHosting(ViewId),

    #[error("hosting {guest:?} in {host:?} would create a cycle")]
    HostingCycle { host: ViewId, guest: ViewId },

    /// The two halves of a hosting edge disagree.
    #[error("{guest:?} claims {host:?} as its host, but the host does not display it")]
    Inconsistent { host: ViewId, guest: ViewId },
}
