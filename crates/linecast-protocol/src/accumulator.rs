//! Reassembly of fixed-size frames from arbitrary read fragments.
//!
//! A non-blocking read may return part of a frame, or the tail of one frame
//! plus the head of the next. The accumulator buffers bytes until a full
//! frame is present and hands out only whole frames.

use bytes::{Bytes, BytesMut};

use crate::codec::FrameLayout;

/// Buffers incoming bytes and yields complete frames.
#[derive(Debug)]
pub struct FrameAccumulator {
    buffer: BytesMut,
    frame_size: usize,
}

impl FrameAccumulator {
    pub fn new(layout: FrameLayout) -> Self {
        let frame_size = layout.frame_size();
        Self {
            buffer: BytesMut::with_capacity(frame_size),
            frame_size,
        }
    }

    /// Appends `data` and returns every frame it completed, in order.
    ///
    /// Bytes of a trailing partial frame stay buffered for the next push.
    pub fn push(&mut self, data: &[u8]) -> Vec<Bytes> {
        self.buffer.extend_from_slice(data);

        let mut frames = Vec::with_capacity(self.buffer.len() / self.frame_size);
        while self.buffer.len() >= self.frame_size {
            frames.push(self.buffer.split_to(self.frame_size).freeze());
        }
        frames
    }

    /// Number of bytes that still await the rest of their frame.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// Drops any partially received frame.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_layout() -> FrameLayout {
        FrameLayout::new(2, 6).unwrap()
    }

    #[test]
    fn single_complete_frame() {
        let layout = small_layout();
        let mut acc = FrameAccumulator::new(layout);

        let frames = acc.push(&layout.encode("hey"));

        assert_eq!(frames.len(), 1);
        assert_eq!(layout.decode(&frames[0]), "hey");
        assert!(acc.is_empty());
    }

    #[test]
    fn fragmented_frame() {
        let layout = small_layout();
        let mut acc = FrameAccumulator::new(layout);
        let frame = layout.encode("split");

        assert!(acc.push(&frame[..3]).is_empty());
        assert_eq!(acc.pending(), 3);

        let frames = acc.push(&frame[3..]);
        assert_eq!(frames.len(), 1);
        assert_eq!(layout.decode(&frames[0]), "split");
        assert!(acc.is_empty());
    }

    #[test]
    fn multiple_frames_and_a_partial() {
        let layout = small_layout();
        let mut acc = FrameAccumulator::new(layout);

        let mut data = layout.encode("one").to_vec();
        data.extend_from_slice(&layout.encode("two"));
        let third = layout.encode("three");
        data.extend_from_slice(&third[..4]);

        let frames = acc.push(&data);
        assert_eq!(
            frames.iter().map(|f| layout.decode(f)).collect::<Vec<_>>(),
            vec!["one", "two"]
        );
        assert_eq!(acc.pending(), 4);

        let frames = acc.push(&third[4..]);
        assert_eq!(frames.len(), 1);
        assert_eq!(layout.decode(&frames[0]), "three");
    }

    #[test]
    fn byte_at_a_time() {
        let layout = FrameLayout::default();
        let mut acc = FrameAccumulator::new(layout);
        let frame = layout.encode("hi");

        let mut frames = Vec::new();
        for byte in frame.iter() {
            frames.extend(acc.push(&[*byte]));
        }

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0], frame);
    }

    #[test]
    fn clear_drops_partial_frame() {
        let layout = small_layout();
        let mut acc = FrameAccumulator::new(layout);
        acc.push(b"5 ab");
        assert_eq!(acc.pending(), 4);

        acc.clear();
        assert!(acc.is_empty());
        assert_eq!(acc.frame_size(), 8);
    }
}
