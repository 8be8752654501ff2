//! Protocol error types.

use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors that can occur during protocol operations.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The header cannot hold the decimal rendering of the payload width.
    #[error("header width {header_width} cannot hold payload length {max_payload}")]
    HeaderTooNarrow {
        header_width: usize,
        max_payload: usize,
    },

    /// A frame layout needs room for at least one payload byte.
    #[error("frame payload width must be non-zero")]
    EmptyPayloadWidth,

    /// The length header is not left-justified decimal text.
    #[error("invalid frame header: {0:?}")]
    InvalidHeader(String),

    /// Connection closed part way through a frame.
    #[error("incomplete frame: expected {expected} bytes, got {received}")]
    IncompleteFrame { expected: usize, received: usize },

    /// IO error during read/write.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
