//! Notifications that travel down the logical tree.
//!
//! All of them use the same traversal: pre-order, depth first, subviews back to front and then
//! the guest, so a host forwards to whatever it displays. Each view is visited at most once per
//! notification. Failing handlers are logged and skipped.

use crate::error::BridgeError;
use crate::hierarchy::Hierarchy;
use crate::rect::Rect;
use crate::view::{
    BridgedView, Capabilities, CoordinatorTransition, HandlerResult, ViewDelegate, ViewId,
};
use log::{error, trace, warn};
use std::collections::HashSet;

/// What happened while delivering a notification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Propagation {
    /// Number of views the notification was delivered to.
    pub reached: usize,
    /// Views whose handler returned an error.
    pub failed: Vec<ViewId>,
}

impl Hierarchy {
    /// Tells every logical descendant of `id` (but not `id` itself) that their ancestor laid
    /// itself out.
    pub fn ancestor_did_layout(&self, id: ViewId) -> Propagation {
        self.deliver(id, false, false, "ancestor_did_layout", |delegate, view| {
            delegate.ancestor_did_layout(view)
        })
    }

    /// Announces that `id` finished a layout pass.
    pub fn layout_did_complete(&self, id: ViewId) -> Propagation {
        self.ancestor_did_layout(id)
    }

    /// Moves and resizes a view’s layer, then notifies its descendants.
    pub fn set_frame(&mut self, id: ViewId, frame: Rect) -> Result<Propagation, BridgeError> {
        let layer = self.layer_mut(id).ok_or(BridgeError::NoSuchView(id))?;
        layer.set_frame(frame);
        Ok(self.layout_did_complete(id))
    }

    /// Tells a view and its logical descendants that their absolute position in the hierarchy
    /// changed.
    pub fn view_hierarchy_did_change(&self, id: ViewId) -> Propagation {
        self.deliver(id, true, false, "view_hierarchy_did_change", |delegate, view| {
            delegate.view_hierarchy_did_change(view)
        })
    }

    /// Tells a view and the descendants sharing its nearest coordinator that the coordinator is
    /// about to change.
    ///
    /// Coordinators below the view are told too, but not their descendants: those stay with the
    /// coordinator above them.
    pub(crate) fn will_move_to_coordinator(
        &self,
        id: ViewId,
        transition: CoordinatorTransition,
    ) -> Propagation {
        self.deliver(id, true, true, "will_move_to_coordinator", |delegate, view| {
            delegate.will_move_to_coordinator(view, transition)
        })
    }

    pub(crate) fn did_move_from_coordinator(
        &self,
        id: ViewId,
        transition: CoordinatorTransition,
    ) -> Propagation {
        self.deliver(id, true, true, "did_move_from_coordinator", |delegate, view| {
            delegate.did_move_from_coordinator(view, transition)
        })
    }

    /// Walks the logical subtree of `start` in pre-order and calls `handler` on every delegate.
    ///
    /// Child lists are copied before descending. With `stop_at_coordinators`, root coordinators
    /// are visited but not descended into.
    fn deliver<F>(
        &self,
        start: ViewId,
        include_start: bool,
        stop_at_coordinators: bool,
        name: &str,
        mut handler: F,
    ) -> Propagation
    where
        F: FnMut(&mut dyn ViewDelegate, ViewId) -> HandlerResult,
    {
        let mut report = Propagation::default();
        let mut visited = HashSet::new();
        let mut stack = vec![(start, 0)];

        while let Some((id, depth)) = stack.pop() {
            if !visited.insert(id) {
                error!("{}: {:?} reached twice; hierarchy is not a tree", name, id);
                continue;
            }
            if depth > self.config.max_depth {
                error!("{}: stopping at {:?}, deeper than {}", name, id, self.config.max_depth);
                continue;
            }
            let view = match self.view(id) {
                Some(view) => view,
                None => continue,
            };

            if !(stop_at_coordinators && view.has_capability(Capabilities::ROOT_COORDINATOR)) {
                let children = self.logical_children(id);
                stack.extend(children.into_iter().rev().map(|child| (child, depth + 1)));
            }

            if id == start && !include_start {
                continue;
            }
            report.reached += 1;
            trace!("{} -> {:?}", name, id);

            if let Some(delegate) = view.delegate() {
                let mut delegate = delegate.lock();
                if let Err(err) = handler(&mut *delegate, id) {
                    warn!("{} handler of {:?} failed: {}", name, id, err);
                    report.failed.push(id);
                }
            }
        }
        report
    }

    /// Checks that no view is its own logical ancestor.
    pub fn check_acyclic(&self) -> Result<(), BridgeError> {
        let ids = self
            .native
            .iter()
            .map(|view| view.id())
            .chain(self.custom.iter().map(|view| view.id()));

        for id in ids {
            let mut seen = HashSet::new();
            let mut current = Some(id);
            while let Some(next) = current {
                if !seen.insert(next) {
                    return Err(BridgeError::Cycle(next));
                }
                current = self.immediate_parent_view(next);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::error::BridgeError;
    use crate::hierarchy::Hierarchy;
    use crate::nv_tree::NativeView;
    use crate::rect::Rect;
    use crate::test_util::{init, Event, Recorder};
    use crate::view::{CoordinatorTransition, ViewId};
    use crate::view_tree::CustomView;

    /// native root -> [host -> guest -> [g1, g2 -> g21], sibling]
    struct Fixture {
        h: Hierarchy,
        recorder: Recorder,
        root: ViewId,
        host: ViewId,
        sibling: ViewId,
        guest: ViewId,
        g1: ViewId,
        g2: ViewId,
        g21: ViewId,
    }

    fn fixture() -> Fixture {
        init();
        let recorder = Recorder::new();
        let mut h = Hierarchy::new();
        let root = h.add_native(recorder.native(NativeView::new(Rect::zero())));
        let host = h.add_native(recorder.native(NativeView::host(Rect::zero())));
        let sibling = h.add_native(recorder.native(NativeView::new(Rect::zero())));
        let guest = h.add_custom(recorder.custom(CustomView::new(Rect::zero())));
        let g1 = h.add_custom(recorder.custom(CustomView::new(Rect::zero())));
        let g2 = h.add_custom(recorder.custom(CustomView::new(Rect::zero())));
        let g21 = h.add_custom(recorder.custom(CustomView::new(Rect::zero())));

        h.add_subview(root, host).unwrap();
        h.add_subview(root, sibling).unwrap();
        h.add_subview(guest, g1).unwrap();
        h.add_subview(guest, g2).unwrap();
        h.add_subview(g2, g21).unwrap();
        h.set_guest_view(host, Some(guest)).unwrap();
        recorder.clear();

        Fixture {
            h,
            recorder,
            root,
            host,
            sibling,
            guest,
            g1,
            g2,
            g21,
        }
    }

    #[test]
    fn hierarchy_change_reaches_everything_once_in_pre_order() {
        let f = fixture();
        let report = f.h.view_hierarchy_did_change(f.root);

        assert_eq!(report.reached, 7);
        assert!(report.failed.is_empty());
        assert_eq!(
            f.recorder.hierarchy_changes(),
            vec![f.root, f.host, f.guest, f.g1, f.g2, f.g21, f.sibling]
        );
    }

    #[test]
    fn layout_reaches_descendants_across_the_seam() {
        let f = fixture();
        f.h.layout_did_complete(f.host);
        assert_eq!(
            f.recorder.events(),
            vec![
                Event::AncestorDidLayout(f.guest),
                Event::AncestorDidLayout(f.g1),
                Event::AncestorDidLayout(f.g2),
                Event::AncestorDidLayout(f.g21),
            ]
        );

        f.recorder.clear();
        let report = f.h.ancestor_did_layout(f.g2);
        assert_eq!(report.reached, 1);
        assert_eq!(f.recorder.events(), vec![Event::AncestorDidLayout(f.g21)]);
    }

    #[test]
    fn repeated_layout_notifications_are_harmless() {
        let f = fixture();
        f.h.layout_did_complete(f.root);
        f.h.layout_did_complete(f.root);
        let layouts = f
            .recorder
            .events()
            .into_iter()
            .filter(|e| *e == Event::AncestorDidLayout(f.g21))
            .count();
        assert_eq!(layouts, 2);
    }

    #[test]
    fn failing_handlers_do_not_stop_propagation() {
        let mut f = fixture();
        f.recorder.fail_on(f.g2);

        let report = f.h.view_hierarchy_did_change(f.guest);
        assert_eq!(report.reached, 4);
        assert_eq!(report.failed, vec![f.g2]);
        assert_eq!(
            f.recorder.hierarchy_changes(),
            vec![f.guest, f.g1, f.g2, f.g21]
        );

        // and structural changes still go through
        f.recorder.clear();
        f.h.remove_from_superview(f.g21).unwrap();
        assert_eq!(f.recorder.hierarchy_changes(), vec![f.g21]);
    }

    #[test]
    fn set_frame_notifies_descendants_only() {
        let mut f = fixture();
        let report = f.h.set_frame(f.guest, Rect::xywh(1., 2., 3., 4.)).unwrap();
        assert_eq!(report.reached, 3);
        assert_eq!(f.h.layer(f.guest).unwrap().frame(), Rect::xywh(1., 2., 3., 4.));
        assert!(!f.recorder.events().contains(&Event::AncestorDidLayout(f.guest)));
    }

    #[test]
    fn rehosting_between_coordinators_brackets_the_move() {
        init();
        let recorder = Recorder::new();
        let mut h = Hierarchy::new();
        let r1 = h.add_native(NativeView::coordinator(Rect::zero()));
        let r2 = h.add_native(NativeView::coordinator(Rect::zero()));
        let c1 = h.add_native(NativeView::host(Rect::zero()));
        let c2 = h.add_native(NativeView::host(Rect::zero()));
        let g = h.add_custom(recorder.custom(CustomView::new(Rect::zero())));
        let g1 = h.add_custom(recorder.custom(CustomView::new(Rect::zero())));
        h.add_subview(r1, c1).unwrap();
        h.add_subview(r2, c2).unwrap();
        h.add_subview(g, g1).unwrap();
        h.set_guest_view(c1, Some(g)).unwrap();
        recorder.clear();

        h.set_guest_view(c2, Some(g)).unwrap();

        let transition = CoordinatorTransition {
            from: Some(r1),
            to: Some(r2),
        };
        assert_eq!(
            recorder.events(),
            vec![
                Event::WillMove(g, transition),
                Event::WillMove(g1, transition),
                Event::DidMove(g, transition),
                Event::DidMove(g1, transition),
                Event::HierarchyDidChange(g),
                Event::HierarchyDidChange(g1),
            ]
        );
        assert_eq!(h.ancestor_coordinator(g1), Some(r2));
    }

    #[test]
    fn transitions_stop_at_nested_coordinators() {
        init();
        let recorder = Recorder::new();
        let mut h = Hierarchy::new();
        let r1 = h.add_native(NativeView::coordinator(Rect::zero()));
        let r2 = h.add_native(NativeView::coordinator(Rect::zero()));
        let inner = h.add_native(recorder.native(NativeView::coordinator(Rect::zero())));
        let g = h.add_custom(recorder.custom(CustomView::new(Rect::zero())));
        h.add_subview(r1, inner).unwrap();
        h.set_guest_view(inner, Some(g)).unwrap();
        recorder.clear();

        h.add_subview(r2, inner).unwrap();

        let transition = CoordinatorTransition {
            from: Some(r1),
            to: Some(r2),
        };
        assert_eq!(h.ancestor_coordinator(inner), Some(r2));
        assert_eq!(h.ancestor_coordinator(g), Some(inner));
        assert_eq!(
            recorder.events(),
            vec![
                Event::WillMove(inner, transition),
                Event::DidMove(inner, transition),
                Event::HierarchyDidChange(inner),
                Event::HierarchyDidChange(g),
            ]
        );
    }

    #[test]
    fn coordinators_below_a_moved_view_are_told_but_not_their_subtrees() {
        init();
        let recorder = Recorder::new();
        let mut h = Hierarchy::new();
        let r1 = h.add_native(NativeView::coordinator(Rect::zero()));
        let r2 = h.add_native(NativeView::coordinator(Rect::zero()));
        let plain = h.add_native(recorder.native(NativeView::new(Rect::zero())));
        let inner = h.add_native(recorder.native(NativeView::coordinator(Rect::zero())));
        let g = h.add_custom(recorder.custom(CustomView::new(Rect::zero())));
        h.add_subview(r1, plain).unwrap();
        h.add_subview(plain, inner).unwrap();
        h.set_guest_view(inner, Some(g)).unwrap();
        recorder.clear();

        h.add_subview(r2, plain).unwrap();

        let moves: Vec<_> = recorder
            .events()
            .into_iter()
            .filter(|e| match e {
                Event::WillMove(..) | Event::DidMove(..) => true,
                _ => false,
            })
            .collect();
        let transition = CoordinatorTransition {
            from: Some(r1),
            to: Some(r2),
        };
        assert_eq!(
            moves,
            vec![
                Event::WillMove(plain, transition),
                Event::WillMove(inner, transition),
                Event::DidMove(plain, transition),
                Event::DidMove(inner, transition),
            ]
        );
    }

    #[test]
    fn failed_mutations_still_close_the_transition() {
        init();
        let recorder = Recorder::new();
        let mut h = Hierarchy::new();
        let r1 = h.add_native(NativeView::coordinator(Rect::zero()));
        let r2 = h.add_native(NativeView::coordinator(Rect::zero()));
        let g = h.add_custom(recorder.custom(CustomView::new(Rect::zero())));
        h.set_guest_view(r1, Some(g)).unwrap();
        recorder.clear();

        let result = h.restructure(g, Some(r2), |_| Err(BridgeError::NoSuchView(g)));

        assert_eq!(result, Err(BridgeError::NoSuchView(g)));
        assert_eq!(
            recorder.events(),
            vec![
                Event::WillMove(
                    g,
                    CoordinatorTransition {
                        from: Some(r1),
                        to: Some(r2)
                    }
                ),
                Event::DidMove(
                    g,
                    CoordinatorTransition {
                        from: Some(r1),
                        to: Some(r1)
                    }
                ),
            ]
        );
    }

    #[test]
    fn moves_within_a_coordinator_skip_the_transition() {
        let mut f = fixture();
        f.h.add_subview(f.g1, f.g21).unwrap();
        assert_eq!(f.recorder.events(), vec![Event::HierarchyDidChange(f.g21)]);
    }

    #[test]
    fn reordering_announces_a_hierarchy_change() {
        let mut f = fixture();
        f.h.insert_subview(f.guest, f.g2, Some(0)).unwrap();
        assert_eq!(f.h.logical_children(f.guest), vec![f.g2, f.g1]);
        assert_eq!(f.recorder.hierarchy_changes(), vec![f.g2, f.g21]);
        assert!(f.h.check_acyclic().is_ok());
    }
}
