//! Fan-out of one sender's payload to every other connection.

use linecast_protocol::FrameLayout;
use tracing::trace;

use crate::registry::{ConnectionId, ConnectionRegistry};

/// Encodes payloads and enqueues them on recipients' outbound queues.
///
/// Delivery is fire and forget: a frame queued for a connection that goes
/// away before it is flushed is dropped together with the connection.
#[derive(Debug, Clone, Copy)]
pub struct BroadcastRouter {
    layout: FrameLayout,
}

impl BroadcastRouter {
    pub fn new(layout: FrameLayout) -> Self {
        Self { layout }
    }

    /// Queues `payload` for every registered connection except `sender`.
    ///
    /// The payload is expected to fit one frame; the server never chunks.
    /// Returns how many connections received the frame.
    pub fn route<S>(
        &self,
        registry: &mut ConnectionRegistry<S>,
        sender: ConnectionId,
        payload: &str,
    ) -> usize {
        // Frames are immutable, so every recipient shares one buffer.
        let frame = self.layout.encode(payload);

        let mut recipients = 0;
        for conn in registry.iter_mut().filter(|conn| conn.id() != sender) {
            trace!(from = %sender, to = %conn.id(), "queueing frame");
            conn.enqueue(frame.clone());
            recipients += 1;
        }
        recipients
    }

    /// Queues a frame carrying `text` for `id` alone.
    pub fn notify<S>(
        &self,
        registry: &mut ConnectionRegistry<S>,
        id: ConnectionId,
        text: &str,
    ) -> bool {
        registry.enqueue(id, self.layout.encode(text))
    }

    pub fn layout(&self) -> FrameLayout {
        self.layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(n: usize) -> (ConnectionRegistry<()>, Vec<ConnectionId>, BroadcastRouter) {
        let layout = FrameLayout::default();
        let mut registry = ConnectionRegistry::new(layout);
        let ids = (0..n).map(|_| registry.register((), None)).collect();
        (registry, ids, BroadcastRouter::new(layout))
    }

    #[test]
    fn route_skips_sender() {
        let (mut registry, ids, router) = setup(3);
        let (c1, c2, c3) = (ids[0], ids[1], ids[2]);

        let delivered = router.route(&mut registry, c1, "hello");
        assert_eq!(delivered, 2);

        assert!(registry.get(c1).unwrap().queue().is_empty());
        for id in [c2, c3] {
            assert_eq!(registry.get(id).unwrap().queue().len(), 1);
            let frame = registry.dequeue(id).unwrap();
            assert_eq!(router.layout().decode(&frame), "hello");
        }
    }

    #[test]
    fn route_reaches_n_minus_one_queues() {
        let (mut registry, ids, router) = setup(6);

        router.route(&mut registry, ids[3], "x");

        let grown = registry.iter().filter(|c| c.queue().len() == 1).count();
        assert_eq!(grown, 5);
        assert!(registry.get(ids[3]).unwrap().queue().is_empty());
    }

    #[test]
    fn route_with_lone_sender_delivers_nothing() {
        let (mut registry, ids, router) = setup(1);
        assert_eq!(router.route(&mut registry, ids[0], "anyone?"), 0);
        assert!(registry.get(ids[0]).unwrap().queue().is_empty());
    }

    #[test]
    fn frames_keep_send_order() {
        let (mut registry, ids, router) = setup(2);

        router.route(&mut registry, ids[0], "A");
        router.route(&mut registry, ids[0], "B");

        let layout = router.layout();
        assert_eq!(layout.decode(&registry.dequeue(ids[1]).unwrap()), "A");
        assert_eq!(layout.decode(&registry.dequeue(ids[1]).unwrap()), "B");
    }

    #[test]
    fn notify_targets_one_connection() {
        let (mut registry, ids, router) = setup(2);

        assert!(router.notify(&mut registry, ids[1], "Server: Welcome!"));
        assert!(registry.get(ids[0]).unwrap().queue().is_empty());
        let frame = registry.dequeue(ids[1]).unwrap();
        assert_eq!(&frame[..4], b"16  ");
        assert_eq!(router.layout().decode(&frame), "Server: Welcome!");
    }
}
