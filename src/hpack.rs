//! HPACK endpoint traits.
//!
//! spec §2: "HPACK Endpoints — `encode(headers) -> bytes` and
//! `decode(bytes) -> headers`; stateful (shared dynamic tables), but the
//! stream treats them as thread-confined endpoints owned by the
//! connection." No compression table is implemented in this crate — that
//! is the teacher's `hpack` module, which this subsystem treats purely as
//! an external collaborator reached through these two traits.

use crate::error::HpackError;
use crate::frame::HeaderList;

use bytes::Bytes;

/// Encodes a header list into an HPACK-compressed byte block.
///
/// Implementations own the connection's encoding dynamic table and so are
/// inherently stateful across calls; callers must only invoke this from the
/// connection's single serialization domain (see `crate::conn::HpackHandle`,
/// which provides that domain for this crate's task-per-stream actor
/// model).
pub trait HpackEncoder: Send {
    fn encode(&mut self, headers: &HeaderList) -> Bytes;
}

/// Decodes an HPACK-compressed byte block into a header list.
pub trait HpackDecoder: Send {
    fn decode(&mut self, block: &Bytes) -> Result<HeaderList, HpackError>;
}

/// A trivial length-prefixed codec used by tests and the crate's doc
/// examples in place of a real HPACK dynamic table.
///
/// This is explicitly not RFC 7541 HPACK — it exists only so the stream
/// actor's send/receive paths can be exercised without pulling in a real
/// compressor, exactly as spec §2 describes the HPACK tables as opaque to
/// this subsystem.
#[derive(Debug, Default)]
pub struct PassthroughHpack;

impl HpackEncoder for PassthroughHpack {
    fn encode(&mut self, headers: &HeaderList) -> Bytes {
        let mut buf = Vec::new();
        for (name, value) in headers {
            buf.extend_from_slice(&(name.len() as u32).to_be_bytes());
            buf.extend_from_slice(name.as_bytes());
            buf.extend_from_slice(&(value.len() as u32).to_be_bytes());
            buf.extend_from_slice(value.as_bytes());
        }
        Bytes::from(buf)
    }
}

impl HpackDecoder for PassthroughHpack {
    fn decode(&mut self, block: &Bytes) -> Result<HeaderList, HpackError> {
        let mut headers = HeaderList::new();
        let buf = block.as_ref();
        let mut pos = 0;

        let read_len = |buf: &[u8], pos: usize| -> Result<(usize, usize), HpackError> {
            if pos + 4 > buf.len() {
                return Err(HpackError::new("truncated length prefix"));
            }
            let len = u32::from_be_bytes(buf[pos..pos + 4].try_into().unwrap()) as usize;
            Ok((len, pos + 4))
        };

        while pos < buf.len() {
            let (name_len, after_len) = read_len(buf, pos)?;
            pos = after_len;
            if pos + name_len > buf.len() {
                return Err(HpackError::new("truncated header name"));
            }
            let name = String::from_utf8(buf[pos..pos + name_len].to_vec())
                .map_err(|_| HpackError::new("header name is not valid utf-8"))?;
            pos += name_len;

            let (value_len, after_len) = read_len(buf, pos)?;
            pos = after_len;
            if pos + value_len > buf.len() {
                return Err(HpackError::new("truncated header value"));
            }
            let value = String::from_utf8(buf[pos..pos + value_len].to_vec())
                .map_err(|_| HpackError::new("header value is not valid utf-8"))?;
            pos += value_len;

            headers.push((name, value));
        }

        Ok(headers)
    }
}
