use byteorder::{BigEndian, ByteOrder};
use bytes::BufMut;

/// Number of bytes in a frame header: 3 (length) + 1 (type) + 1 (flags) + 4
/// (stream id).
pub const HEADER_LEN: usize = 9;

/// Stream identifier.
///
/// Client-initiated streams use odd ids, monotonically increasing per
/// connection (spec §3). The stream-id *allocator* lives outside this
/// crate (spec §1, out of scope); this type only validates the shape of an
/// id it is handed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StreamId(u32);

impl StreamId {
    pub const fn new(id: u32) -> Self {
        StreamId(id)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn is_client_initiated(&self) -> bool {
        self.0 != 0 && self.0 % 2 == 1
    }
}

impl From<u32> for StreamId {
    fn from(src: u32) -> Self {
        StreamId(src)
    }
}

impl From<StreamId> for u32 {
    fn from(src: StreamId) -> Self {
        src.0
    }
}

impl std::fmt::Display for StreamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The frame kinds this crate knows how to emit.
///
/// HTTP/2 defines more frame types (SETTINGS, PING, GOAWAY, WINDOW_UPDATE,
/// ...); those are connection-level concerns out of scope for the stream
/// actor (spec §1) and so have no representation here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Data,
    Headers,
    RstStream,
}

impl Kind {
    fn wire_value(self) -> u8 {
        match self {
            Kind::Data => 0x0,
            Kind::Headers => 0x1,
            Kind::RstStream => 0x3,
        }
    }
}

/// The fixed 9-byte frame header shared by every frame kind.
#[derive(Debug, Clone, Copy)]
pub struct Head {
    kind: Kind,
    flag: u8,
    stream_id: StreamId,
}

impl Head {
    pub fn new(kind: Kind, flag: u8, stream_id: StreamId) -> Self {
        Head {
            kind,
            flag,
            stream_id,
        }
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn flag(&self) -> u8 {
        self.flag
    }

    pub fn stream_id(&self) -> StreamId {
        self.stream_id
    }

    /// Encodes the header, with `payload_len` written into the 24-bit
    /// length field, into `dst`.
    pub fn encode<B: BufMut>(&self, payload_len: usize, dst: &mut B) {
        let mut buf = [0; HEADER_LEN];
        BigEndian::write_uint(&mut buf[0..3], payload_len as u64, 3);
        buf[3] = self.kind.wire_value();
        buf[4] = self.flag;
        BigEndian::write_u32(&mut buf[5..9], self.stream_id.into());
        dst.put_slice(&buf);
    }
}
