use crate::config::Config;
use crate::focus::ResponderCell;
use crate::hierarchy::Hierarchy;
use crate::rect::Rect;
use crate::view::ViewId;
use crossbeam::channel::{self, Receiver, Sender};
use log::{debug, warn};

/// Something the platform reports to the bridge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlatformEvent {
    /// Keyboard focus moved to another view (or to none).
    FirstResponderChanged(Option<ViewId>),
    /// A view finished laying itself out.
    LayoutCompleted(ViewId),
    /// The platform moved or resized a view.
    FrameChanged(ViewId, Rect),
}

/// Connects a hierarchy to the platform.
///
/// Events may be sent from any thread, but they are only applied to the hierarchy in `poll`.
#[derive(Debug)]
pub struct Host {
    pub hierarchy: Hierarchy,
    responder: ResponderCell,
    event_send: Sender<PlatformEvent>,
    event_recv: Receiver<PlatformEvent>,
}

impl Default for Host {
    fn default() -> Self {
        Host::new(Config::default())
    }
}

impl Host {
    /// Creates a new Host with an empty hierarchy.
    pub fn new(config: Config) -> Host {
        let (event_send, event_recv) = channel::unbounded();
        let responder = ResponderCell::new();

        Host {
            hierarchy: Hierarchy::with_responder(config, responder.clone()),
            responder,
            event_send,
            event_recv,
        }
    }

    /// Returns a sender for platform events.
    pub fn sender(&self) -> Sender<PlatformEvent> {
        self.event_send.clone()
    }

    /// Receives all events from the event queue and updates the hierarchy accordingly.
    ///
    /// Returns the number of events handled.
    pub fn poll(&mut self) -> usize {
        // the host holds a sender itself, so the queue never disconnects
        let mut count = 0;
        while let Ok(event) = self.event_recv.try_recv() {
            self.handle_event(event);
            count += 1;
        }
        count
    }

    fn handle_event(&mut self, event: PlatformEvent) {
        debug!("platform event: {:?}", event);
        match event {
            PlatformEvent::FirstResponderChanged(responder) => {
                self.responder.set(responder);
                self.hierarchy.refresh_focus();
            }
            PlatformEvent::LayoutCompleted(view) => {
                if !self.hierarchy.contains(view) {
                    warn!("layout completed for unknown view {:?}", view);
                    return;
                }
                self.hierarchy.layout_did_complete(view);
            }
            PlatformEvent::FrameChanged(view, frame) => {
                if let Err(err) = self.hierarchy.set_frame(view, frame) {
                    warn!("could not apply frame change: {}", err);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nv_tree::NativeView;
    use crate::test_util::{init, Event, Recorder};
    use crate::view::BridgedView;
    use crate::view_tree::CustomView;
    use std::thread;

    #[test]
    fn events_are_applied_on_poll() {
        init();
        let recorder = Recorder::new();
        let mut host = Host::default();
        let h = &mut host.hierarchy;
        let coordinator = h.add_native(NativeView::coordinator(Rect::xywh(0., 0., 100., 100.)));
        let controller = h.add_custom(recorder.custom(CustomView::controller(Rect::zero())));
        let field = h.add_custom(recorder.custom(CustomView::new(Rect::zero())));
        h.set_guest_view(coordinator, Some(controller)).unwrap();
        h.add_subview(controller, field).unwrap();
        recorder.clear();

        let sender = host.sender();
        thread::spawn(move || {
            sender
                .send(PlatformEvent::FirstResponderChanged(Some(field)))
                .unwrap();
            sender
                .send(PlatformEvent::FrameChanged(controller, Rect::xywh(0., 0., 50., 50.)))
                .unwrap();
        })
        .join()
        .unwrap();

        assert!(recorder.events().is_empty(), "nothing happens before poll");
        assert!(!host.hierarchy.is_focused(field));

        assert_eq!(host.poll(), 2);
        assert!(host.hierarchy.is_focused(field));
        assert!(host.hierarchy.is_focused(controller));
        assert_eq!(
            host.hierarchy.layer(controller).unwrap().frame(),
            Rect::xywh(0., 0., 50., 50.)
        );
        assert!(recorder.events().contains(&Event::AncestorDidLayout(field)));
        assert_eq!(host.poll(), 0);
    }

    #[test]
    fn unknown_views_are_ignored() {
        init();
        let mut host = Host::default();
        let stray = NativeView::new(Rect::zero()).id();
        let sender = host.sender();
        sender.send(PlatformEvent::LayoutCompleted(stray)).unwrap();
        sender
            .send(PlatformEvent::FrameChanged(stray, Rect::zero()))
            .unwrap();
        assert_eq!(host.poll(), 2);
        assert!(host.hierarchy.native_tree().is_empty());
    }

    #[test]
    fn events_outlive_their_senders() {
        init();
        let recorder = Recorder::new();
        let mut host = Host::default();
        let view = host.hierarchy.add_custom(CustomView::new(Rect::zero()));
        let child = host
            .hierarchy
            .add_custom(recorder.custom(CustomView::new(Rect::zero())));
        host.hierarchy.add_subview(view, child).unwrap();
        recorder.clear();

        let sender = host.sender();
        sender.send(PlatformEvent::LayoutCompleted(view)).unwrap();
        drop(sender);

        assert_eq!(host.poll(), 1);
        assert_eq!(recorder.events(), vec![Event::AncestorDidLayout(child)]);
        assert_eq!(host.poll(), 0);

        // fresh senders keep working after earlier ones are gone
        host.sender()
            .send(PlatformEvent::LayoutCompleted(view))
            .unwrap();
        assert_eq!(host.poll(), 1);
    }
}
