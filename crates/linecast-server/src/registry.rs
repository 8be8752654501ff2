//! Registry of live connections and their outbound queues.
//!
//! The registry is generic over the transport so that routing can be
//! exercised without sockets; the server instantiates it with
//! `tokio::net::TcpStream`.

use std::collections::BTreeMap;
use std::fmt;
use std::net::SocketAddr;

use bytes::{Buf, Bytes};
use linecast_protocol::{FrameAccumulator, FrameLayout};

use crate::queue::OutboundQueue;

/// Identifier of a registered connection. Never reused within a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One registered peer: its transport plus buffered traffic in both
/// directions.
#[derive(Debug)]
pub struct Connection<S> {
    id: ConnectionId,
    peer: Option<SocketAddr>,
    stream: S,
    queue: OutboundQueue,
    inbound: FrameAccumulator,
    /// Unwritten tail of a frame a previous write only partly sent.
    in_flight: Option<Bytes>,
}

impl<S> Connection<S> {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn peer(&self) -> Option<SocketAddr> {
        self.peer
    }

    pub fn stream(&self) -> &S {
        &self.stream
    }

    pub fn stream_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    pub fn queue(&self) -> &OutboundQueue {
        &self.queue
    }

    /// Reassembly buffer for frames arriving from this peer.
    pub fn inbound_mut(&mut self) -> &mut FrameAccumulator {
        &mut self.inbound
    }

    /// Appends a frame to this connection's outbound queue.
    pub fn enqueue(&mut self, frame: Bytes) {
        self.queue.push(frame);
    }

    /// Whether anything is waiting to be written.
    pub fn has_pending_output(&self) -> bool {
        self.in_flight.is_some() || !self.queue.is_empty()
    }

    /// Returns the transport together with the bytes to write next.
    ///
    /// Resumes a partly written frame if there is one, otherwise dequeues
    /// the next frame.
    pub fn next_outbound(&mut self) -> Option<(&S, &[u8])> {
        if self.in_flight.is_none() {
            self.in_flight = self.queue.pop();
        }
        let frame = self.in_flight.as_deref()?;
        Some((&self.stream, frame))
    }

    /// Records that `written` bytes of [`next_outbound`] reached the socket.
    ///
    /// Returns `true` once the current frame is fully written.
    ///
    /// [`next_outbound`]: Self::next_outbound
    pub fn consume_outbound(&mut self, written: usize) -> bool {
        match self.in_flight.as_mut() {
            Some(frame) if written < frame.len() => {
                frame.advance(written);
                false
            }
            Some(_) => {
                self.in_flight = None;
                true
            }
            None => false,
        }
    }

    /// Consumes the connection, returning its transport.
    pub fn into_stream(self) -> S {
        self.stream
    }
}

/// Owns every live connection, keyed by [`ConnectionId`].
#[derive(Debug)]
pub struct ConnectionRegistry<S> {
    connections: BTreeMap<ConnectionId, Connection<S>>,
    next_id: u64,
    layout: FrameLayout,
}

impl<S> ConnectionRegistry<S> {
    /// Creates an empty registry whose connections reassemble frames of
    /// `layout`.
    pub fn new(layout: FrameLayout) -> Self {
        Self {
            connections: BTreeMap::new(),
            next_id: 1,
            layout,
        }
    }

    /// Adds a connection with an empty queue and returns its id.
    pub fn register(&mut self, stream: S, peer: Option<SocketAddr>) -> ConnectionId {
        let id = ConnectionId(self.next_id);
        self.next_id += 1;

        self.connections.insert(
            id,
            Connection {
                id,
                peer,
                stream,
                queue: OutboundQueue::new(),
                inbound: FrameAccumulator::new(self.layout),
                in_flight: None,
            },
        );
        id
    }

    /// Removes a connection. Its pending frames are dropped with it.
    pub fn unregister(&mut self, id: ConnectionId) -> Option<Connection<S>> {
        self.connections.remove(&id)
    }

    /// Appends `frame` to the queue of `id`. Returns `false` if `id` is not
    /// registered.
    pub fn enqueue(&mut self, id: ConnectionId, frame: Bytes) -> bool {
        match self.connections.get_mut(&id) {
            Some(conn) => {
                conn.enqueue(frame);
                true
            }
            None => false,
        }
    }

    /// Pops the oldest pending frame of `id`.
    pub fn dequeue(&mut self, id: ConnectionId) -> Option<Bytes> {
        self.connections.get_mut(&id)?.queue.pop()
    }

    pub fn get(&self, id: ConnectionId) -> Option<&Connection<S>> {
        self.connections.get(&id)
    }

    pub fn get_mut(&mut self, id: ConnectionId) -> Option<&mut Connection<S>> {
        self.connections.get_mut(&id)
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.connections.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Snapshot of registered ids in ascending order.
    pub fn ids(&self) -> Vec<ConnectionId> {
        self.connections.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Connection<S>> {
        self.connections.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Connection<S>> {
        self.connections.values_mut()
    }

    pub fn layout(&self) -> FrameLayout {
        self.layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ConnectionRegistry<()> {
        ConnectionRegistry::new(FrameLayout::default())
    }

    #[test]
    fn register_assigns_distinct_ids() {
        let mut reg = registry();
        let a = reg.register((), None);
        let b = reg.register((), None);

        assert_ne!(a, b);
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.ids(), vec![a, b]);
        assert!(reg.get(a).unwrap().queue().is_empty());
    }

    #[test]
    fn ids_are_not_reused() {
        let mut reg = registry();
        let a = reg.register((), None);
        reg.unregister(a);
        let b = reg.register((), None);
        assert_ne!(a, b);
    }

    #[test]
    fn queue_order_is_fifo() {
        let mut reg = registry();
        let id = reg.register((), None);

        assert!(reg.enqueue(id, Bytes::from_static(b"A")));
        assert!(reg.enqueue(id, Bytes::from_static(b"B")));

        assert_eq!(reg.dequeue(id).as_deref(), Some(&b"A"[..]));
        assert_eq!(reg.dequeue(id).as_deref(), Some(&b"B"[..]));
        assert!(reg.dequeue(id).is_none());
    }

    #[test]
    fn unregister_leaves_others_intact() {
        let mut reg = registry();
        let a = reg.register((), None);
        let b = reg.register((), None);
        let c = reg.register((), None);
        reg.enqueue(a, Bytes::from_static(b"for a"));
        reg.enqueue(b, Bytes::from_static(b"for b"));
        reg.enqueue(c, Bytes::from_static(b"for c"));

        let removed = reg.unregister(b).unwrap();
        assert_eq!(removed.queue().len(), 1);

        assert!(!reg.contains(b));
        assert!(!reg.enqueue(b, Bytes::from_static(b"late")));
        assert!(reg.dequeue(b).is_none());
        assert_eq!(reg.dequeue(a).as_deref(), Some(&b"for a"[..]));
        assert_eq!(reg.dequeue(c).as_deref(), Some(&b"for c"[..]));
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn partial_write_resumes_before_next_frame() {
        let mut reg = registry();
        let id = reg.register((), None);
        reg.enqueue(id, Bytes::from_static(b"first"));
        reg.enqueue(id, Bytes::from_static(b"second"));

        let conn = reg.get_mut(id).unwrap();
        let next = |conn: &mut Connection<()>| conn.next_outbound().map(|(_, f)| f.to_vec());

        assert_eq!(next(conn), Some(b"first".to_vec()));
        assert!(!conn.consume_outbound(2));
        assert_eq!(next(conn), Some(b"rst".to_vec()));
        assert!(conn.consume_outbound(3));
        assert_eq!(conn.queue().len(), 1);

        assert_eq!(next(conn), Some(b"second".to_vec()));
        assert!(conn.consume_outbound(6));
        assert!(!conn.has_pending_output());
        assert!(next(conn).is_none());
    }

    #[test]
    fn connection_id_display() {
        let mut reg = registry();
        let id = reg.register((), None);
        assert_eq!(id.to_string(), "#1");
        assert_eq!(id.get(), 1);
    }
}
