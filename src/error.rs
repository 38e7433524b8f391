//! Error types for the per-stream state machine.
//!
//! Mirrors the teacher's split between a protocol-facing `Reason` and a
//! Rust-facing error enum: no `std::error::Error` blanket impls are pulled
//! in from a crate, everything here is written by hand.

use std::fmt;

/// Errors that can occur while driving a single stream.
///
/// See spec §7 ("Error Handling Design") for the propagation policy
/// associated with each variant.
#[derive(Debug)]
pub enum StreamError {
    /// A frame arrived in a state the machine does not accept.
    ///
    /// Reserved for future tightening; HEADERS and DATA are currently
    /// accepted in every state (see spec §4.1 tie-breaks), so this variant
    /// is never constructed by the FSM itself today.
    ProtocolState,

    /// HPACK decode or encode failed on a header block.
    Hpack(HpackError),

    /// Writing encoded bytes to the transport failed.
    Transport(TransportError),

    /// The peer reset the stream.
    PeerReset,
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::ProtocolState => write!(f, "frame received in an unexpected stream state"),
            StreamError::Hpack(e) => write!(f, "hpack error: {}", e),
            StreamError::Transport(e) => write!(f, "transport error: {}", e),
            StreamError::PeerReset => write!(f, "stream reset by peer"),
        }
    }
}

impl std::error::Error for StreamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StreamError::Hpack(e) => Some(e),
            StreamError::Transport(e) => Some(e),
            _ => None,
        }
    }
}

impl From<HpackError> for StreamError {
    fn from(src: HpackError) -> Self {
        StreamError::Hpack(src)
    }
}

impl From<TransportError> for StreamError {
    fn from(src: TransportError) -> Self {
        StreamError::Transport(src)
    }
}

/// Failure surfaced by an `HpackEncoder`/`HpackDecoder` implementation.
#[derive(Debug, Clone)]
pub struct HpackError {
    message: String,
}

impl HpackError {
    pub fn new<S: Into<String>>(message: S) -> Self {
        HpackError {
            message: message.into(),
        }
    }
}

impl fmt::Display for HpackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for HpackError {}

/// Failure surfaced by the transport write sink.
#[derive(Debug, Clone)]
pub struct TransportError {
    message: String,
}

impl TransportError {
    pub fn new<S: Into<String>>(message: S) -> Self {
        TransportError {
            message: message.into(),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for TransportError {}
