//! Fixed-width framing for the linecast broadcast protocol.
//!
//! Every message on the wire is one fixed-size frame:
//!
//! ```text
//! +---------------------------+---------------------------------------+
//! | length (4 ASCII, padded)  |  payload (1020 bytes, space padded)   |
//! +---------------------------+---------------------------------------+
//! ```
//!
//! The header carries the unpadded payload length as left-justified decimal
//! text. Readers never use it to size reads: a frame is always
//! `header_width + max_payload` bytes, so the header only serves
//! diagnostics (see [`FrameHeader`]).
//!
//! # Example
//!
//! ```rust
//! use linecast_protocol::FrameLayout;
//!
//! let layout = FrameLayout::default();
//! let frame = layout.encode("hi");
//! assert_eq!(frame.len(), 1024);
//! assert_eq!(&frame[..6], b"2   hi");
//! assert_eq!(layout.decode(&frame), "hi");
//! ```

mod accumulator;
mod codec;
mod error;
mod framing;

pub use accumulator::FrameAccumulator;
pub use codec::{FrameHeader, FrameLayout, chunk_payload, decode_frame, encode_frame};
pub use error::{ProtocolError, ProtocolResult};
pub use framing::{FrameReader, FrameWriter};

/// Width of the decimal length header in bytes.
pub const HEADER_WIDTH: usize = 4;

/// Fixed payload width of every frame, shared by client and server.
pub const MAX_PAYLOAD: usize = 1020;

/// Total size of one frame on the wire.
pub const FRAME_SIZE: usize = HEADER_WIDTH + MAX_PAYLOAD;
