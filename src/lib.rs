//! A client-side HTTP/2 stream state machine.
//!
//! This crate implements exactly one thing out of a full HTTP/2 client:
//! the per-stream state machine described in RFC 7540 §5.1, run as an
//! independent, mailbox-driven actor. It is deliberately not a complete
//! HTTP/2 client — framing, HPACK compression, connection-level flow
//! control, and frame demultiplexing are all treated as collaborators
//! supplied by whatever embeds this crate (see `frame`, `hpack`, and
//! `conn`).
//!
//! A typical embedder:
//!
//! 1. Builds a [`conn::StreamContext`] per new stream: a stream id, the
//!    request's scheme/authority, a `watch` of the connection's peer
//!    [`settings::PeerSettings`], an [`conn::HpackHandle`] shared by every
//!    stream of the connection, a [`frame::FrameCodec`], and the shared
//!    write/completion sinks.
//! 2. Constructs a [`stream::Stream`] from that context and calls
//!    [`stream::Stream::start`] to spawn its actor task, getting back a
//!    [`stream::StreamHandle`].
//! 3. Feeds inbound frames to the handle via `recv`, and issues outbound
//!    requests via `send_headers`.
//! 4. Reads [`conn::ConnectionEvent`]s off the shared completion sink as
//!    streams finish.

pub mod conn;
pub mod error;
pub mod frame;
pub mod hpack;
pub mod response;
pub mod settings;
pub mod stream;

pub use conn::{ConnectionEvent, HpackHandle, StreamContext};
pub use error::StreamError;
pub use response::Response;
pub use settings::PeerSettings;
pub use stream::{Stream, StreamCommand, StreamEvent, StreamHandle, StreamState};
