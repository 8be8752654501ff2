//! Frame encoding and decoding.
//!
//! Widths are counted in bytes. Truncation and chunking always cut on a
//! UTF-8 character boundary, so a decoded payload is valid text even when
//! the sender overflowed the frame.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{ProtocolError, ProtocolResult};
use crate::{HEADER_WIDTH, MAX_PAYLOAD};

/// Padding byte for both the header and the payload section.
const PAD: u8 = b' ';

/// Geometry of a frame: header width plus fixed payload width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLayout {
    header_width: usize,
    max_payload: usize,
}

impl Default for FrameLayout {
    fn default() -> Self {
        Self {
            header_width: HEADER_WIDTH,
            max_payload: MAX_PAYLOAD,
        }
    }
}

impl FrameLayout {
    /// Creates a layout, checking that the header can hold any length the
    /// payload section can carry.
    pub fn new(header_width: usize, max_payload: usize) -> ProtocolResult<Self> {
        if max_payload == 0 {
            return Err(ProtocolError::EmptyPayloadWidth);
        }
        if decimal_width(max_payload) > header_width {
            return Err(ProtocolError::HeaderTooNarrow {
                header_width,
                max_payload,
            });
        }
        Ok(Self {
            header_width,
            max_payload,
        })
    }

    pub fn header_width(&self) -> usize {
        self.header_width
    }

    pub fn max_payload(&self) -> usize {
        self.max_payload
    }

    /// Size of every frame on the wire.
    pub fn frame_size(&self) -> usize {
        self.header_width + self.max_payload
    }

    /// Encodes `payload` into a single frame of exactly [`frame_size`] bytes.
    ///
    /// Payloads longer than [`max_payload`] are truncated; callers that need
    /// the whole text delivered must split it with [`chunk_payload`] first.
    ///
    /// [`frame_size`]: Self::frame_size
    /// [`max_payload`]: Self::max_payload
    pub fn encode(&self, payload: &str) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.frame_size());
        self.encode_into(payload, &mut buf);
        buf.freeze()
    }

    /// Appends one encoded frame to `dst`.
    ///
    /// The header records the length of `payload` before truncation, cut to
    /// the header's first `header_width` digits if it does not fit.
    pub fn encode_into(&self, payload: &str, dst: &mut BytesMut) {
        let carried = &payload[..floor_char_boundary(payload, self.max_payload)];
        let digits = payload.len().to_string();
        let header_len = digits.len().min(self.header_width);

        dst.reserve(self.frame_size());
        dst.put_slice(&digits.as_bytes()[..header_len]);
        dst.put_bytes(PAD, self.header_width - header_len);
        dst.put_slice(carried.as_bytes());
        dst.put_bytes(PAD, self.max_payload - carried.len());
    }

    /// Decodes one frame back to its payload text, dropping the header and
    /// the trailing padding.
    pub fn decode(&self, frame: &[u8]) -> String {
        let end = frame.len().min(self.frame_size());
        decode_frame(&frame[..end], self.header_width)
    }

    /// Splits `text` into pieces that each fit one frame.
    pub fn chunks<'a>(&self, text: &'a str) -> Vec<&'a str> {
        chunk_payload(text, self.max_payload)
    }
}

/// Encodes `payload` as one frame of `header_width + max_payload` bytes.
///
/// The header holds the original length of `payload`, left-justified and
/// space padded. The payload is space padded, or
/// truncated when the caller did not chunk it.
pub fn encode_frame(payload: &str, max_payload: usize, header_width: usize) -> Bytes {
    FrameLayout {
        header_width,
        max_payload,
    }
    .encode(payload)
}

/// Strips the first `header_width` bytes of `frame` and returns the rest as
/// text without trailing padding.
///
/// The header is not consulted: the transport delivers exactly one frame's
/// worth of bytes per call.
pub fn decode_frame(frame: &[u8], header_width: usize) -> String {
    let body = frame.get(header_width..).unwrap_or_default();
    let end = body
        .iter()
        .rposition(|&b| b != PAD)
        .map_or(0, |last| last + 1);
    String::from_utf8_lossy(&body[..end]).into_owned()
}

/// Splits `text` into successive chunks of at most `max_payload` bytes.
///
/// Empty text yields a single empty chunk, so an empty line still produces
/// one frame.
pub fn chunk_payload(text: &str, max_payload: usize) -> Vec<&str> {
    if text.is_empty() {
        return vec![text];
    }

    let mut chunks = Vec::with_capacity(text.len().div_ceil(max_payload.max(1)));
    let mut rest = text;
    while !rest.is_empty() {
        let mut cut = floor_char_boundary(rest, max_payload);
        if cut == 0 {
            // A single character wider than the whole payload section.
            cut = rest.chars().next().map_or(rest.len(), char::len_utf8);
        }
        let (chunk, tail) = rest.split_at(cut);
        chunks.push(chunk);
        rest = tail;
    }
    chunks
}

/// The parsed length header of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Payload length the sender declared.
    pub declared_len: usize,
}

impl FrameHeader {
    /// Parses the header at the start of `frame`.
    ///
    /// Used for diagnostics only; frame boundaries never depend on it.
    pub fn parse(frame: &[u8], header_width: usize) -> ProtocolResult<Self> {
        let raw = frame.get(..header_width).ok_or_else(|| {
            ProtocolError::InvalidHeader(String::from_utf8_lossy(frame).into_owned())
        })?;
        let invalid = || ProtocolError::InvalidHeader(String::from_utf8_lossy(raw).into_owned());

        let text = std::str::from_utf8(raw).map_err(|_| invalid())?;
        let digits = text.trim_end_matches(' ');
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let declared_len = digits.parse().map_err(|_| invalid())?;
        Ok(Self { declared_len })
    }
}

/// Largest index `<= max` that falls on a char boundary of `s`.
fn floor_char_boundary(s: &str, max: usize) -> usize {
    if s.len() <= max {
        return s.len();
    }
    let mut idx = max;
    while !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

fn decimal_width(mut n: usize) -> usize {
    let mut width = 1;
    while n >= 10 {
        n /= 10;
        width += 1;
    }
    width
}
