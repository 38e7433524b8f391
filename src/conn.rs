//! The connection-side collaborators a stream actor is handed.
//!
//! spec §2, component 3 ("Connection Context"): "immutable-to-the-stream
//! view providing: stream id, authority URI, scheme, current peer
//! settings..., the write sink..., and a completion sink...". This module
//! also supplies the HPACK serialization domain discussed in
//! SPEC_FULL.md §2: since every stream runs as its own task, the shared
//! HPACK encoder/decoder is driven by one dedicated `HpackAgent` task and
//! reached through request/response channels, never called directly from
//! more than one task at a time.

use crate::error::HpackError;
use crate::frame::{Frame, FrameCodec, HeaderList, StreamId};
use crate::hpack::{HpackDecoder, HpackEncoder};
use crate::response::Response;
use crate::settings::PeerSettings;

use bytes::{Bytes, BytesMut};
use http::uri::{Authority, Scheme};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};

/// Messages a stream actor publishes to its owning connection.
///
/// spec §6: `sink.publish(conn_pid, message)` where message is one of
/// these two.
#[derive(Debug, Clone)]
pub enum ConnectionEvent {
    Finished(Response),
    PushPromise(Response),
}

enum HpackRequest {
    Encode(HeaderList, oneshot::Sender<Bytes>),
    Decode(Bytes, oneshot::Sender<Result<HeaderList, HpackError>>),
}

/// A handle onto the connection's HPACK serialization domain.
///
/// Cheap to clone; every stream actor holds one. Calls round-trip through
/// the agent task so that only one caller at a time ever touches the
/// shared dynamic tables, regardless of how many stream tasks are live.
#[derive(Clone)]
pub struct HpackHandle {
    tx: mpsc::UnboundedSender<HpackRequest>,
}

impl HpackHandle {
    /// Spawns the agent task owning `encoder`/`decoder` and returns a
    /// handle to it.
    pub fn spawn<E, D>(encoder: E, decoder: D) -> Self
    where
        E: HpackEncoder + 'static,
        D: HpackDecoder + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<HpackRequest>();

        tokio::spawn(async move {
            let mut encoder = encoder;
            let mut decoder = decoder;

            while let Some(req) = rx.recv().await {
                match req {
                    HpackRequest::Encode(headers, reply) => {
                        let bytes = encoder.encode(&headers);
                        let _ = reply.send(bytes);
                    }
                    HpackRequest::Decode(block, reply) => {
                        let result = decoder.decode(&block);
                        let _ = reply.send(result);
                    }
                }
            }
        });

        HpackHandle { tx }
    }

    /// Encodes `headers`, awaiting the agent task's reply.
    ///
    /// Panics if the agent task has been dropped; that only happens if the
    /// owning connection has already torn down, at which point there is no
    /// meaningful way to continue driving the stream either.
    pub async fn encode(&self, headers: HeaderList) -> Bytes {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(HpackRequest::Encode(headers, reply_tx))
            .expect("hpack agent task is gone");
        reply_rx.await.expect("hpack agent task dropped the reply")
    }

    /// Decodes `block`, awaiting the agent task's reply.
    pub async fn decode(&self, block: Bytes) -> Result<HeaderList, HpackError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(HpackRequest::Decode(block, reply_tx))
            .expect("hpack agent task is gone");
        reply_rx.await.expect("hpack agent task dropped the reply")
    }
}

/// The write sink shared by every stream of a connection.
///
/// spec §5: "The TLS write sink is shared across all streams of a
/// connection; the stream assumes an external mutex-or-ordering discipline
/// supplied by the connection." An `mpsc` sender gives exactly that: each
/// `send` is atomic with respect to other senders, and delivery order
/// within one sender is preserved.
pub type WriteSink = mpsc::UnboundedSender<BytesMut>;

/// The completion sink shared by every stream of a connection.
pub type CompletionSink = mpsc::UnboundedSender<ConnectionEvent>;

/// The immutable-to-the-stream view of the owning connection.
///
/// spec §2, component 3. Everything here is either `Copy`/cheap to clone
/// or already a shared handle, so `StreamContext` itself is cheap to move
/// into the stream actor's task.
#[derive(Clone)]
pub struct StreamContext {
    pub id: StreamId,
    pub scheme: Scheme,
    pub authority: Authority,
    pub settings: watch::Receiver<PeerSettings>,
    pub hpack: HpackHandle,
    pub codec: Arc<dyn FrameCodec>,
    pub write: WriteSink,
    pub completion: CompletionSink,
}

impl StreamContext {
    pub fn encode_frame(&self, frame: Frame) -> BytesMut {
        self.codec.encode_frame(frame)
    }

    pub fn max_frame_size(&self) -> u32 {
        self.settings.borrow().max_frame_size
    }
}
