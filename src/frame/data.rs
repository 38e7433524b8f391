use super::head::{Head, Kind, StreamId, HEADER_LEN};

use bytes::{BufMut, Bytes, BytesMut};

const END_STREAM: u8 = 0x1;

/// A DATA frame ready to be written to the wire.
#[derive(Debug, Clone)]
pub struct Data {
    stream_id: StreamId,
    payload: Bytes,
    end_stream: bool,
}

impl Data {
    pub fn new(stream_id: StreamId, payload: Bytes, end_stream: bool) -> Self {
        Data {
            stream_id,
            payload,
            end_stream,
        }
    }

    pub fn encode(&self) -> BytesMut {
        let flags = if self.end_stream { END_STREAM } else { 0 };
        let head = Head::new(Kind::Data, flags, self.stream_id);

        let mut dst = BytesMut::with_capacity(HEADER_LEN + self.payload.len());
        head.encode(self.payload.len(), &mut dst);
        dst.put_slice(&self.payload);
        dst
    }
}
