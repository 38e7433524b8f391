//! The stream state machine and its actor wrapper.
//!
//! This is the core this crate exists to implement (spec §1, §4.1). The
//! state machine itself (`StreamMachine` + `dispatch`) is plain,
//! synchronous-per-event data; `Stream`/`StreamHandle` wrap it in a
//! `tokio::task` with an `mpsc` mailbox so that spec §5's "single-threaded
//! cooperative actor with a mailbox" is realized literally rather than
//! merely described.

use crate::conn::{ConnectionEvent, StreamContext};
use crate::error::{StreamError, TransportError};
use crate::frame::{self, Data, Frame, HeaderList, Headers, Reason, RstStream, StreamId};
use crate::response::Response;

use bytes::{Bytes, BytesMut};
use tokio::sync::mpsc;

/// One of the six canonical HTTP/2 stream states (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Idle,
    Open,
    HalfClosedLocal,
    HalfClosedRemote,
    ReservedRemote,
    Closed,
}

/// Inbound events, dispatched by the connection as frames for this stream
/// arrive (spec §4.1 alphabet).
#[derive(Debug, Clone)]
pub enum StreamEvent {
    Headers { fragment: Bytes, end_stream: bool },
    Continuation { fragment: Bytes },
    PushPromise { fragment: Bytes },
    Data { bytes: Bytes, end_stream: bool },
    RstStream,
}

/// Outbound commands, issued by the owner of the stream (spec §4.1
/// alphabet). `close` is not modeled as a mailbox message: in this crate
/// it is folded into the synchronous entry-action chain driven by
/// `half-closed-remote` (see module docs on `dispatch`), since nothing
/// about that transition needs to suspend the actor between mailbox
/// receives.
#[derive(Debug, Clone)]
pub enum StreamCommand {
    SendHeaders {
        headers: HeaderList,
        payload: Option<Bytes>,
    },
}

enum Mailbox {
    Event(StreamEvent),
    Command(StreamCommand),
}

/// The stream's own mutable state: the FSM plus the header/body buffers it
/// accumulates (spec §3).
pub struct StreamMachine {
    id: StreamId,
    state: StreamState,
    headers: HeaderList,
    body: BytesMut,
}

impl StreamMachine {
    fn new(id: StreamId) -> Self {
        // spec §3: "id is immutable after construction"; 0 is reserved for
        // connection-level frames and is never a valid id for an exchange
        // (client-initiated request/response streams are additionally odd,
        // but a stream can also be handed the even id of a server-reserved
        // push target, so only the universal "never zero" half of that
        // invariant is checked here).
        debug_assert!(!id.is_zero(), "stream id {} is reserved for connection-level frames", id);
        StreamMachine {
            id,
            state: StreamState::Idle,
            headers: HeaderList::new(),
            body: BytesMut::new(),
        }
    }

    pub fn state(&self) -> StreamState {
        self.state
    }
}

/// A stream not yet started. Constructed by the connection with a fresh id
/// (spec §6: `new(conn, id)`).
pub struct Stream {
    machine: StreamMachine,
    ctx: StreamContext,
}

/// A handle onto a running stream actor's mailbox (spec §6: the `pid` the
/// connection holds after `start`).
#[derive(Clone)]
pub struct StreamHandle {
    tx: mpsc::UnboundedSender<Mailbox>,
}

impl Stream {
    pub fn new(ctx: StreamContext) -> Self {
        Stream {
            machine: StreamMachine::new(ctx.id),
            ctx,
        }
    }

    /// Launches the actor: spawns the task owning this stream's state and
    /// returns a handle to its mailbox (spec §6: `start(stream)`).
    pub fn start(self) -> StreamHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run(self.machine, self.ctx, rx));
        StreamHandle { tx }
    }
}

impl StreamHandle {
    /// Enqueues an inbound frame event (spec §6: `recv(pid, frame)`).
    ///
    /// A failed send means the actor has already reached `closed` and
    /// dropped its mailbox; per spec §3 that is a terminal, expected state,
    /// not an error worth surfacing to the caller.
    pub fn recv(&self, event: StreamEvent) {
        let _ = self.tx.send(Mailbox::Event(event));
    }

    /// Enqueues an outbound `send_headers` command (spec §6).
    pub fn send_headers(&self, headers: HeaderList, payload: Option<Bytes>) {
        let _ = self
            .tx
            .send(Mailbox::Command(StreamCommand::SendHeaders { headers, payload }));
    }
}

/// The actor loop: process one mailbox message to completion, then await
/// the next. Spec §5: "An actor processes one event to completion before
/// handling the next; no internal suspension points exist within event
/// handling" — the only `.await` points here are HPACK round-trips to the
/// connection's serialization domain and the unbounded channel sends,
/// neither of which yields control back to another stream's state.
async fn run(mut machine: StreamMachine, ctx: StreamContext, mut rx: mpsc::UnboundedReceiver<Mailbox>) {
    while let Some(msg) = rx.recv().await {
        let result = match msg {
            Mailbox::Event(event) => dispatch_event(&mut machine, &ctx, event).await,
            Mailbox::Command(StreamCommand::SendHeaders { headers, payload }) => {
                dispatch_send_headers(&mut machine, &ctx, headers, payload).await
            }
        };

        if let Err(err) = result {
            log::debug!("stream {} aborting: {}", machine.id, err);
            // spec §7: HpackError/TransportError on receive/send abort the
            // stream without publishing a finished response.
            machine.state = StreamState::Closed;
        }

        if machine.state == StreamState::Closed {
            break;
        }
    }
}

/// Handles one inbound frame event against the current state (spec §4.1's
/// transition table, minus `send_headers`/`close`, which are not inbound
/// events).
async fn dispatch_event(
    machine: &mut StreamMachine,
    ctx: &StreamContext,
    event: StreamEvent,
) -> Result<(), StreamError> {
    match event {
        StreamEvent::Headers { fragment, end_stream } => {
            let decoded = ctx.hpack.decode(fragment).await?;
            machine.headers.extend(decoded);

            if end_stream {
                enter_half_closed_remote(machine, ctx).await?;
            }
        }

        StreamEvent::Continuation { fragment } => {
            // spec §4.1: defined for `idle`; the state is otherwise
            // unaffected wherever else a CONTINUATION might arrive.
            let decoded = ctx.hpack.decode(fragment).await?;
            machine.headers.extend(decoded);
        }

        StreamEvent::PushPromise { fragment } => {
            let decoded = ctx.hpack.decode(fragment).await?;
            machine.headers.extend(decoded);

            if machine.state == StreamState::Idle {
                let response = Response::new(machine.id, machine.headers.clone(), Bytes::new());
                publish(ctx, ConnectionEvent::PushPromise(response));
                machine.state = StreamState::ReservedRemote;
            }
        }

        StreamEvent::Data { bytes, end_stream } => {
            machine.body.extend_from_slice(&bytes);

            if end_stream {
                enter_half_closed_remote(machine, ctx).await?;
            }
        }

        StreamEvent::RstStream => {
            if matches!(
                machine.state,
                StreamState::Open
                    | StreamState::HalfClosedLocal
                    | StreamState::HalfClosedRemote
                    | StreamState::Closed
            ) {
                // spec §7: PeerReset is absorbed silently; any partial
                // response is discarded (no publish here).
                machine.state = StreamState::Closed;
            }
        }
    }

    Ok(())
}

/// Entry action for `half-closed-remote`.
///
/// REDESIGN FLAG (spec §9, open question 2 / SPEC_FULL.md REDESIGN FLAGS):
/// the source unconditionally emits RST_STREAM here before closing. That
/// quirk is removed: the completed response is published and the stream
/// transitions straight to `closed`.
async fn enter_half_closed_remote(machine: &mut StreamMachine, ctx: &StreamContext) -> Result<(), StreamError> {
    log::trace!("enter_half_closed_remote; id={:?}", machine.id);
    machine.state = StreamState::HalfClosedRemote;

    let response = Response::new(machine.id, machine.headers.clone(), machine.body.clone().freeze());
    publish(ctx, ConnectionEvent::Finished(response));

    machine.state = StreamState::Closed;
    Ok(())
}

fn publish(ctx: &StreamContext, event: ConnectionEvent) {
    let _ = ctx.completion.send(event);
}

/// `send_headers{headers, payload}` (spec §4.2).
///
/// REDESIGN FLAG: every call fully completes the local half of the
/// exchange (this crate's `send_headers` has no follow-up "send more data"
/// operation — spec §6's external interface table defines no such thing),
/// so unlike the source, END_STREAM is always signaled somewhere on the
/// wire and the stream always leaves this function in `half-closed-local`,
/// never `open`. Open question 1 only discusses the bodyless case; this
/// extends the same fix to the non-empty-payload case for the same reason
/// (an unreachable `half-closed-local` is exactly the bug being fixed).
async fn dispatch_send_headers(
    machine: &mut StreamMachine,
    ctx: &StreamContext,
    headers: HeaderList,
    payload: Option<Bytes>,
) -> Result<(), StreamError> {
    log::trace!("send_headers; id={:?}", ctx.id);
    let augmented = frame::augment_and_sort(headers, ctx.scheme.as_str(), ctx.authority.as_str());
    let block = ctx.hpack.encode(augmented).await;

    let payload = payload.filter(|p| !p.is_empty());
    let headers_end_stream = payload.is_none();

    write_frame(ctx, Headers::new(ctx.id, block, headers_end_stream).into())?;

    if let Some(payload) = payload {
        let max_frame_size = ctx.max_frame_size() as usize;
        let chunks = chunk_payload(&payload, max_frame_size);
        let last = chunks.len().saturating_sub(1);

        for (i, chunk) in chunks.into_iter().enumerate() {
            let data = Data::new(ctx.id, chunk, i == last);
            write_frame(ctx, data.into())?;
        }
    }

    machine.state = StreamState::HalfClosedLocal;
    Ok(())
}

/// Splits `payload` into chunks of exactly `max_frame_size` bytes, with a
/// final remainder chunk (spec §4.2 "Chunking algorithm").
///
/// Callers must only invoke this with a non-empty `payload`: an empty
/// payload produces no DATA frames at all (handled by the caller, not
/// here, so the "at least one chunk" invariant below always holds).
fn chunk_payload(payload: &Bytes, max_frame_size: usize) -> Vec<Bytes> {
    debug_assert!(!payload.is_empty());
    debug_assert!(max_frame_size > 0);

    let mut chunks = Vec::with_capacity((payload.len() + max_frame_size - 1) / max_frame_size);
    let mut remaining = payload.clone();

    while !remaining.is_empty() {
        let take = max_frame_size.min(remaining.len());
        chunks.push(remaining.split_to(take));
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::{quickcheck, Arbitrary, Gen, TestResult};

    quickcheck! {
        fn chunking_preserves_bytes_and_respects_max_frame_size(payload: Vec<u8>, max: u8) -> TestResult {
            if payload.is_empty() {
                return TestResult::discard();
            }
            let max = max as usize + 1;

            let bytes = Bytes::from(payload.clone());
            let chunks = chunk_payload(&bytes, max);

            let reassembled: Vec<u8> = chunks.iter().flat_map(|c| c.to_vec()).collect();
            if reassembled != payload {
                return TestResult::failed();
            }

            let last = chunks.len() - 1;
            for (i, chunk) in chunks.iter().enumerate() {
                let ok = if i == last {
                    chunk.len() >= 1 && chunk.len() <= max
                } else {
                    chunk.len() == max
                };
                if !ok {
                    return TestResult::failed();
                }
            }

            TestResult::passed()
        }
    }

    #[test]
    fn empty_payload_never_reaches_the_chunker() {
        // send_headers filters out an empty/absent payload before calling
        // chunk_payload (see dispatch_send_headers), so the "at least one
        // chunk" debug_assert above always holds in practice.
        let bytes = Bytes::new();
        assert!(bytes.is_empty());
    }

    /// A small, quickcheck-`Arbitrary` stand-in for the inbound event
    /// alphabet (spec §4.1), used to drive `dispatch_event` with random
    /// orderings for the two invariants below (spec §8, first two
    /// bullets: append-only `headers`/`body`, at-most-once terminal
    /// publish).
    #[derive(Debug, Clone)]
    enum TestEvent {
        Headers(bool),
        Continuation,
        PushPromise,
        Data(u8, bool),
        RstStream,
    }

    impl Arbitrary for TestEvent {
        fn arbitrary(g: &mut Gen) -> Self {
            match u8::arbitrary(g) % 5 {
                0 => TestEvent::Headers(bool::arbitrary(g)),
                1 => TestEvent::Continuation,
                2 => TestEvent::PushPromise,
                3 => TestEvent::Data(u8::arbitrary(g) % 8, bool::arbitrary(g)),
                _ => TestEvent::RstStream,
            }
        }
    }

    /// A `StreamContext` wired to in-process channels, for driving
    /// `dispatch_event` directly without a full `Stream::start` actor.
    fn test_ctx() -> (
        StreamContext,
        mpsc::UnboundedReceiver<BytesMut>,
        mpsc::UnboundedReceiver<ConnectionEvent>,
    ) {
        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        let (_settings_tx, settings_rx) = tokio::sync::watch::channel(crate::settings::PeerSettings::default());
        let hpack = crate::conn::HpackHandle::spawn(crate::hpack::PassthroughHpack, crate::hpack::PassthroughHpack);

        let ctx = StreamContext {
            id: StreamId::new(1),
            scheme: http::uri::Scheme::HTTP,
            authority: http::uri::Authority::from_static("example.com"),
            settings: settings_rx,
            hpack,
            codec: std::sync::Arc::new(crate::frame::WireFrameCodec),
            write: write_tx,
            completion: completion_tx,
        };

        (ctx, write_rx, completion_rx)
    }

    /// Converts one `TestEvent` into the `StreamEvent` `dispatch_event`
    /// expects and dispatches it. `fragment` is a fixed, already-valid
    /// HPACK block shared by every header-bearing event: these properties
    /// are about event *ordering*, not header content.
    async fn dispatch_test_event(machine: &mut StreamMachine, ctx: &StreamContext, fragment: &Bytes, event: TestEvent) {
        let stream_event = match event {
            TestEvent::Headers(end_stream) => StreamEvent::Headers {
                fragment: fragment.clone(),
                end_stream,
            },
            TestEvent::Continuation => StreamEvent::Continuation {
                fragment: fragment.clone(),
            },
            TestEvent::PushPromise => StreamEvent::PushPromise {
                fragment: fragment.clone(),
            },
            TestEvent::Data(len, end_stream) => StreamEvent::Data {
                bytes: Bytes::from(vec![0u8; len as usize]),
                end_stream,
            },
            TestEvent::RstStream => StreamEvent::RstStream,
        };

        let _ = dispatch_event(machine, ctx, stream_event).await;
    }

    quickcheck! {
        /// spec §8: "For all event sequences, `headers` and `body` are
        /// append-only until `state = closed`."
        fn headers_and_body_append_only_until_closed(events: Vec<TestEvent>) -> TestResult {
            if events.len() > 16 {
                return TestResult::discard();
            }

            let rt = tokio::runtime::Runtime::new().unwrap();
            let ok = rt.block_on(async {
                use crate::hpack::HpackEncoder;

                let (ctx, _write_rx, _completion_rx) = test_ctx();
                let fragment = crate::hpack::PassthroughHpack.encode(&vec![("x-test".to_string(), "1".to_string())]);
                let mut machine = StreamMachine::new(ctx.id);
                let mut prev_headers_len = 0;
                let mut prev_body_len = 0;

                for event in events {
                    if machine.state == StreamState::Closed {
                        break;
                    }

                    dispatch_test_event(&mut machine, &ctx, &fragment, event).await;

                    if machine.headers.len() < prev_headers_len || machine.body.len() < prev_body_len {
                        return false;
                    }
                    prev_headers_len = machine.headers.len();
                    prev_body_len = machine.body.len();
                }

                true
            });

            TestResult::from_bool(ok)
        }

        /// spec §8: "For all inputs, the machine reaches `closed` at most
        /// once and publishes at most one `finished` message." (Read here
        /// as: at most one terminal `ConnectionEvent`, `Finished` or
        /// `PushPromise`, is ever published for one stream.)
        fn publishes_at_most_one_terminal_event(events: Vec<TestEvent>) -> TestResult {
            if events.len() > 16 {
                return TestResult::discard();
            }

            let rt = tokio::runtime::Runtime::new().unwrap();
            let count = rt.block_on(async {
                use crate::hpack::HpackEncoder;

                let (ctx, _write_rx, mut completion_rx) = test_ctx();
                let fragment = crate::hpack::PassthroughHpack.encode(&vec![("x-test".to_string(), "1".to_string())]);
                let mut machine = StreamMachine::new(ctx.id);

                for event in events {
                    if machine.state == StreamState::Closed {
                        break;
                    }
                    dispatch_test_event(&mut machine, &ctx, &fragment, event).await;
                }

                let mut count = 0;
                while completion_rx.try_recv().is_ok() {
                    count += 1;
                }
                count
            });

            TestResult::from_bool(count <= 1)
        }
    }
}

fn write_frame(ctx: &StreamContext, frame: Frame) -> Result<(), StreamError> {
    let bytes = ctx.encode_frame(frame);
    ctx.write
        .send(bytes)
        .map_err(|_| TransportError::new("connection write sink is gone").into())
}

// Present for completeness of the wire-format table (spec §6); this
// subsystem's current redesign never emits RST_STREAM on the normal
// completion path, but a supervising layer cancelling a stream still needs
// a way to reset it outbound. Exposed for callers building that layer on
// top of this crate.
pub fn reset_frame(id: StreamId, reason: Reason) -> Frame {
    RstStream::new(id, reason).into()
}
