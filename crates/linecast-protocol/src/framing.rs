//! Async frame reading and writing over a byte stream.
//!
//! TCP has no message boundaries, so the reader loops until a whole
//! fixed-size frame has arrived instead of trusting one read call to
//! return one frame.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::codec::FrameLayout;
use crate::error::{ProtocolError, ProtocolResult};

/// Reads fixed-size frames from a byte stream.
pub struct FrameReader<R> {
    reader: R,
    layout: FrameLayout,
    buf: Vec<u8>,
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    /// Creates a new FrameReader wrapping the given reader.
    pub fn new(reader: R, layout: FrameLayout) -> Self {
        Self {
            reader,
            layout,
            buf: vec![0u8; layout.frame_size()],
        }
    }

    /// Reads one frame and returns its raw bytes.
    ///
    /// Returns `Ok(None)` if the stream ends cleanly on a frame boundary and
    /// [`ProtocolError::IncompleteFrame`] if it ends part way through one.
    pub async fn read_raw(&mut self) -> ProtocolResult<Option<&[u8]>> {
        let expected = self.buf.len();
        let mut filled = 0;

        while filled < expected {
            let n = self.reader.read(&mut self.buf[filled..]).await?;
            if n == 0 {
                if filled == 0 {
                    return Ok(None);
                }
                return Err(ProtocolError::IncompleteFrame {
                    expected,
                    received: filled,
                });
            }
            filled += n;
        }

        Ok(Some(&self.buf))
    }

    /// Reads one frame and decodes its payload.
    pub async fn read_frame(&mut self) -> ProtocolResult<Option<String>> {
        let layout = self.layout;
        Ok(self.read_raw().await?.map(|frame| layout.decode(frame)))
    }

    pub fn layout(&self) -> FrameLayout {
        self.layout
    }

    /// Returns a mutable reference to the underlying reader.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    /// Unwraps this FrameReader, returning the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

/// Writes fixed-size frames to a byte stream.
pub struct FrameWriter<W> {
    writer: W,
    layout: FrameLayout,
}

impl<W: AsyncWrite + Unpin> FrameWriter<W> {
    /// Creates a new FrameWriter wrapping the given writer.
    pub fn new(writer: W, layout: FrameLayout) -> Self {
        Self { writer, layout }
    }

    /// Encodes `payload` as a single frame and writes it.
    ///
    /// `payload` must already fit one frame; longer text is truncated.
    pub async fn write_frame(&mut self, payload: &str) -> ProtocolResult<()> {
        let frame = self.layout.encode(payload);
        self.writer.write_all(&frame).await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Splits `text` into frame-sized chunks and writes one frame per chunk.
    ///
    /// Stops at the first failed write. Returns the number of frames sent.
    pub async fn write_message(&mut self, text: &str) -> ProtocolResult<usize> {
        let chunks = self.layout.chunks(text);
        for chunk in &chunks {
            self.write_frame(chunk).await?;
        }
        Ok(chunks.len())
    }

    /// Shuts down the write side of the stream.
    pub async fn shutdown(&mut self) -> ProtocolResult<()> {
        self.writer.shutdown().await?;
        Ok(())
    }

    pub fn layout(&self) -> FrameLayout {
        self.layout
    }

    /// Returns a mutable reference to the underlying writer.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Unwraps this FrameWriter, returning the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[tokio::test]
    async fn writer_reader_roundtrip() {
        let layout = FrameLayout::default();
        let mut buffer = Vec::new();

        {
            let mut writer = FrameWriter::new(&mut buffer, layout);
            writer.write_frame("alice: hi").await.unwrap();
            writer.write_frame("bob: hello").await.unwrap();
        }
        assert_eq!(buffer.len(), 2 * layout.frame_size());

        let mut reader = FrameReader::new(Cursor::new(buffer), layout);
        assert_eq!(
            reader.read_frame().await.unwrap().as_deref(),
            Some("alice: hi")
        );
        assert_eq!(
            reader.read_frame().await.unwrap().as_deref(),
            Some("bob: hello")
        );
        assert!(reader.read_frame().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn write_message_chunks_long_text() {
        let layout = FrameLayout::new(2, 10).unwrap();
        let mut buffer = Vec::new();

        let text = "carol: this line is long";
        let sent = FrameWriter::new(&mut buffer, layout)
            .write_message(text)
            .await
            .unwrap();
        assert_eq!(sent, 3);
        assert_eq!(buffer.len(), 3 * layout.frame_size());

        let mut reader = FrameReader::new(Cursor::new(buffer), layout);
        let mut received = String::new();
        while let Some(chunk) = reader.read_frame().await.unwrap() {
            received.push_str(&chunk);
        }
        // Padding is trimmed per frame, so a chunk ending in a space loses it.
        assert_eq!(received, "carol: this line islong");
    }

    #[tokio::test]
    async fn reader_reports_incomplete_frame() {
        let layout = FrameLayout::default();
        let frame = layout.encode("cut short");

        let mut reader = FrameReader::new(Cursor::new(frame[..100].to_vec()), layout);
        let result = reader.read_frame().await;
        assert!(matches!(
            result,
            Err(ProtocolError::IncompleteFrame {
                expected: 1024,
                received: 100
            })
        ));
    }

    #[tokio::test]
    async fn reader_handles_fragmented_stream() {
        let layout = FrameLayout::default();
        let frame = layout.encode("slow sender");
        let (mut tx, rx) = tokio::io::duplex(64);

        let feeder = tokio::spawn(async move {
            for piece in frame.chunks(100) {
                tx.write_all(piece).await.unwrap();
            }
        });

        let mut reader = FrameReader::new(rx, layout);
        assert_eq!(
            reader.read_frame().await.unwrap().as_deref(),
            Some("slow sender")
        );
        feeder.await.unwrap();
        assert!(reader.read_frame().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn empty_stream_is_clean_eof() {
        let mut reader = FrameReader::new(Cursor::new(Vec::new()), FrameLayout::default());
        assert!(reader.read_frame().await.unwrap().is_none());
    }
}
