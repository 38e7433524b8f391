use super::head::{Head, Kind, StreamId, HEADER_LEN};

use byteorder::{BigEndian, ByteOrder};
use bytes::{BufMut, BytesMut};

/// RST_STREAM error codes, per RFC 7540 §7. Only the handful this crate
/// can produce are named; the rest are out of scope (connection-level
/// error handling, spec §1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    NoError,
    Cancel,
}

impl Reason {
    fn wire_value(self) -> u32 {
        match self {
            Reason::NoError => 0x0,
            Reason::Cancel => 0x8,
        }
    }
}

/// An RST_STREAM frame. spec §6: "default error code (NO_ERROR or
/// implementation-defined; preserved verbatim from frame builder)".
#[derive(Debug, Clone)]
pub struct RstStream {
    stream_id: StreamId,
    reason: Reason,
}

impl RstStream {
    pub fn new(stream_id: StreamId, reason: Reason) -> Self {
        RstStream { stream_id, reason }
    }

    pub fn encode(&self) -> BytesMut {
        let head = Head::new(Kind::RstStream, 0, self.stream_id);

        let mut dst = BytesMut::with_capacity(HEADER_LEN + 4);
        head.encode(4, &mut dst);

        let mut code = [0; 4];
        BigEndian::write_u32(&mut code, self.reason.wire_value());
        dst.put_slice(&code);
        dst
    }
}
