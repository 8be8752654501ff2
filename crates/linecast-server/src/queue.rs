//! Per-connection outbound frame queue.

use std::collections::VecDeque;

use bytes::Bytes;

/// FIFO of encoded frames waiting to be written to one connection.
///
/// The queue is unbounded: a peer that never drains its socket makes it
/// grow without limit. There is no backpressure.
#[derive(Debug, Default)]
pub struct OutboundQueue {
    frames: VecDeque<Bytes>,
}

impl OutboundQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a frame at the back.
    pub fn push(&mut self, frame: Bytes) {
        self.frames.push_back(frame);
    }

    /// Removes the oldest frame, or returns `None` when nothing is pending.
    pub fn pop(&mut self) -> Option<Bytes> {
        self.frames.pop_front()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Bytes held by all pending frames.
    pub fn pending_bytes(&self) -> usize {
        self.frames.iter().map(Bytes::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bytes> {
        self.frames.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_order() {
        let mut queue = OutboundQueue::new();
        queue.push(Bytes::from_static(b"A"));
        queue.push(Bytes::from_static(b"B"));

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop().as_deref(), Some(&b"A"[..]));
        assert_eq!(queue.pop().as_deref(), Some(&b"B"[..]));
        assert!(queue.pop().is_none());
        assert!(queue.is_empty());
    }

    #[test]
    fn pending_bytes_counts_all_frames() {
        let mut queue = OutboundQueue::new();
        queue.push(Bytes::from_static(b"abc"));
        queue.push(Bytes::from_static(b"de"));
        assert_eq!(queue.pending_bytes(), 5);
        assert_eq!(queue.iter().count(), 2);
    }
}
