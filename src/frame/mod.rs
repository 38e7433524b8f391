//! Frame types and the wire-encoding boundary.
//!
//! spec §2 names the frame codec as opaque to the core, "consumed only via
//! `encode_frame`". This module draws that boundary as the `FrameCodec`
//! trait: the stream actor never reaches past it to manipulate wire bytes
//! directly, and a connection embedding this crate is free to swap in its
//! own codec (fuzzing, a different wire transform, ...) by implementing the
//! trait itself. `WireFrameCodec` is the RFC 7540-faithful default.
//!
//! Frame *parsing* is not modeled here at all: spec §1 places "the
//! byte-level frame parser that demultiplexes incoming frames by stream id"
//! out of scope, so inbound data arrives as already-typed `StreamEvent`
//! values (see `crate::stream`), never as raw bytes this module decodes.

mod data;
mod head;
mod headers;
mod reset;

pub use self::data::Data;
pub use self::head::{Head, Kind, StreamId, HEADER_LEN};
pub use self::headers::{augment_and_sort, HeaderList, HeaderPair, Headers};
pub use self::reset::{Reason, RstStream};

use bytes::BytesMut;

/// A typed frame value, ready to be turned into wire bytes.
///
/// Only the frame kinds the stream actor can emit appear here (spec §6's
/// "Wire format produced on send" table): HEADERS, DATA, RST_STREAM.
#[derive(Debug, Clone)]
pub enum Frame {
    Headers(Headers),
    Data(Data),
    RstStream(RstStream),
}

impl From<Headers> for Frame {
    fn from(src: Headers) -> Self {
        Frame::Headers(src)
    }
}

impl From<Data> for Frame {
    fn from(src: Data) -> Self {
        Frame::Data(src)
    }
}

impl From<RstStream> for Frame {
    fn from(src: RstStream) -> Self {
        Frame::RstStream(src)
    }
}

/// Converts typed frame values to wire bytes.
///
/// This is the entirety of the "Frame Codec Interface" component from
/// spec §2: one method, called once per outbound frame.
pub trait FrameCodec: Send + Sync {
    fn encode_frame(&self, frame: Frame) -> BytesMut;
}

/// The RFC 7540-faithful codec: encodes each frame exactly as spec §6
/// describes.
#[derive(Debug, Default, Clone, Copy)]
pub struct WireFrameCodec;

impl FrameCodec for WireFrameCodec {
    fn encode_frame(&self, frame: Frame) -> BytesMut {
        match frame {
            Frame::Headers(h) => h.encode(),
            Frame::Data(d) => d.encode(),
            Frame::RstStream(r) => r.encode(),
        }
    }
}
