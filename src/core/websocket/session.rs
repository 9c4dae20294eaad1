//! Connection session: one physical socket, one writer, one dispatcher.
//!
//! # Tasks
//!
//! Each open session runs two background tasks:
//!
//! - the **reader** drains the socket and hands every frame to the
//!   dispatch queue without touching user code. It also answers pings and
//!   detects peer closes and transport failures.
//! - the **dispatch worker** is the only task that ever calls the
//!   handler. It processes queue entries strictly one at a time, in
//!   arrival order, and exits after the terminal callback.
//!
//! Writes from any number of callers are serialized through a single
//! async mutex around the sink.
//!
//! # Queues
//!
//! Inbound frames and reader-detected lifecycle events travel through a
//! bounded FIFO queue, so a failure is always reported after the frames
//! that preceded it. Locally initiated lifecycle events (`close`, a broken
//! pipe seen by `send`) use an unbounded control queue that the worker
//! polls first. That keeps `close` callable from inside a callback without
//! waiting on queue capacity, and discards frames still queued behind it.
//!
//! # Lifecycle
//!
//! `Idle -> Open -> {Closing -> Closed} | Failed`. Whoever performs the
//! transition out of `Open` owns the terminal notification, so exactly
//! one of `on_closed`/`on_failure` fires per session.

use std::fmt;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use parking_lot::{Mutex, RwLock};
use tokio::sync::{Mutex as AsyncMutex, mpsc};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::{
    self, Message,
    protocol::{CloseFrame, frame::coding::CloseCode},
};
use tracing::{debug, error, info, warn};
use url::Url;

use super::base::{
    CLOSE_ABNORMAL, CLOSE_NO_STATUS, CLOSE_NORMAL, SessionState, WebsocketError, WebsocketResult,
};
use super::catalog::Decoded;
use super::codec::{UpstreamEvent, encode};
use super::isolation::call_handler_safely;
use super::protocol::{BaseCallbackHandler, Protocol};
use super::transport::{ConnectRequest, FrameSink, FrameStream, Transport};

/// Default capacity of the inbound dispatch queue.
pub const DISPATCH_QUEUE_CAPACITY: usize = 256;

/// Entries consumed by the dispatch worker.
#[derive(Debug)]
enum Inbound {
    /// A text frame (or UTF-8 binary frame) to decode and dispatch
    Frame(String),
    /// A frame that could not even be read as text
    Malformed(WebsocketError),
    /// The peer sent a close frame
    PeerClosing { code: u16, reason: String },
    /// The socket finished closing after a peer close
    PeerClosed { code: u16, reason: String },
    /// Application-initiated close; the worker tears the socket down
    LocalClose { code: u16, reason: String },
    /// The transport failed
    Failed(WebsocketError),
}

struct Shared<P: Protocol> {
    url: Url,
    state: RwLock<SessionState>,
    writer: AsyncMutex<Option<FrameSink>>,
    handler: Arc<P::Handler>,
    intake: mpsc::Sender<Inbound>,
    control: mpsc::UnboundedSender<Inbound>,
    reader: Mutex<Option<JoinHandle<()>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

/// A live realtime session bound to protocol `P`.
///
/// Cloning is cheap and every clone refers to the same socket. Handler
/// callbacks receive a reference to the session so they can send replies
/// or close it.
///
/// Dropping every handle does not close the session. The reader and the
/// dispatch worker hold their own handles, so the socket stays up until
/// [`close`](Self::close) is called or the peer goes away. Always close a
/// session you no longer need.
pub struct WebsocketClient<P: Protocol> {
    inner: Arc<Shared<P>>,
}

impl<P: Protocol> Clone for WebsocketClient<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P: Protocol> fmt::Debug for WebsocketClient<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebsocketClient")
            .field("protocol", &P::NAME)
            .field("url", &self.inner.url.as_str())
            .field("state", &self.state())
            .finish()
    }
}

impl<P: Protocol> WebsocketClient<P> {
    /// Open a session: complete the handshake, then start the reader and
    /// the dispatch worker.
    ///
    /// Fails with [`WebsocketError::ConnectionError`] if the transport
    /// cannot connect.
    pub async fn open(
        transport: &dyn Transport,
        request: ConnectRequest,
        handler: Arc<P::Handler>,
        queue_capacity: usize,
    ) -> WebsocketResult<Self> {
        if queue_capacity == 0 {
            return Err(WebsocketError::config(
                "dispatch queue capacity must be greater than zero",
            ));
        }

        let url = request.url.clone();
        debug!(protocol = P::NAME, url = %url, "Opening session");
        let (sink, stream) = transport.connect(request).await?;

        let (intake_tx, intake_rx) = mpsc::channel(queue_capacity);
        let (control_tx, control_rx) = mpsc::unbounded_channel();

        let client = Self {
            inner: Arc::new(Shared {
                url,
                state: RwLock::new(SessionState::Idle),
                writer: AsyncMutex::new(Some(sink)),
                handler,
                intake: intake_tx,
                control: control_tx,
                reader: Mutex::new(None),
                worker: Mutex::new(None),
            }),
        };

        client.set_state(SessionState::Open);
        info!(protocol = P::NAME, url = %client.inner.url, "Session open");

        let worker = tokio::spawn(dispatch_loop(client.clone(), intake_rx, control_rx));
        let reader = tokio::spawn(read_loop(client.clone(), stream));
        *client.inner.worker.lock() = Some(worker);
        *client.inner.reader.lock() = Some(reader);

        Ok(client)
    }

    pub fn url(&self) -> &Url {
        &self.inner.url
    }

    pub fn state(&self) -> SessionState {
        *self.inner.state.read()
    }

    pub fn is_open(&self) -> bool {
        self.state() == SessionState::Open
    }

    /// The handler this session dispatches to.
    pub fn handler(&self) -> &Arc<P::Handler> {
        &self.inner.handler
    }

    /// Serialize `event` and write it as a single text frame.
    ///
    /// Fails with [`WebsocketError::SendError`] without touching the
    /// socket unless the session is `Open`. A broken pipe additionally
    /// fails the session.
    pub async fn send<E: UpstreamEvent>(&self, event: &E) -> WebsocketResult<()> {
        if !self.is_open() {
            return Err(WebsocketError::send(format!(
                "cannot send {} while session is {}",
                E::EVENT_TYPE,
                self.state()
            )));
        }

        let frame = encode(event)?;
        debug!(protocol = P::NAME, event_type = E::EVENT_TYPE, "Sending event");
        self.write_text(frame).await
    }

    /// Close with code 1000 and no reason.
    pub async fn close(&self) -> WebsocketResult<()> {
        self.close_with(CLOSE_NORMAL, "").await
    }

    /// Start a graceful close with an explicit code and reason.
    ///
    /// `on_closing` runs before the close frame is written and `on_closed`
    /// after the socket is torn down, both on the dispatch worker. Calling
    /// this on a session that is not `Open` does nothing.
    pub async fn close_with(&self, code: u16, reason: &str) -> WebsocketResult<()> {
        if !self.transition(SessionState::Open, SessionState::Closing) {
            debug!(
                protocol = P::NAME,
                state = %self.state(),
                "Close requested on a session that is not open"
            );
            return Ok(());
        }

        info!(protocol = P::NAME, url = %self.inner.url, code, reason, "Closing session");
        let marker = Inbound::LocalClose {
            code,
            reason: reason.to_string(),
        };
        if self.inner.control.send(marker).is_err() {
            // Worker is gone; nothing left to notify.
            self.teardown(code, reason).await;
        }
        Ok(())
    }

    /// Wait for the dispatch worker to finish, i.e. until the terminal
    /// callback has returned.
    ///
    /// Only one caller observes the join; later calls return immediately.
    /// Must not be awaited from inside a callback of the same session.
    pub async fn join(&self) {
        let handle = self.inner.worker.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                error!(protocol = P::NAME, error = %e, "Dispatch worker ended abnormally");
            }
        }
    }

    fn transition(&self, from: SessionState, to: SessionState) -> bool {
        let mut state = self.inner.state.write();
        if *state == from {
            *state = to;
            true
        } else {
            false
        }
    }

    fn set_state(&self, to: SessionState) {
        *self.inner.state.write() = to;
    }

    async fn write_text(&self, frame: String) -> WebsocketResult<()> {
        let result = {
            let mut writer = self.inner.writer.lock().await;
            match writer.as_mut() {
                Some(sink) => sink.send(Message::Text(frame.into())).await,
                None => return Err(WebsocketError::send("connection is closed")),
            }
        };

        match result {
            Ok(()) => Ok(()),
            Err(e) if is_broken_pipe(&e) => {
                let err = WebsocketError::transport(e.to_string());
                self.fail_from_writer(err);
                Err(WebsocketError::send(e.to_string()))
            }
            Err(e) => Err(WebsocketError::send(e.to_string())),
        }
    }

    /// A write found the socket dead. Stop reading and report the failure
    /// unless another path already ended the session.
    fn fail_from_writer(&self, err: WebsocketError) {
        if !self.transition(SessionState::Open, SessionState::Failed) {
            return;
        }
        warn!(protocol = P::NAME, url = %self.inner.url, error = %err, "Write failed, session failed");
        if let Some(reader) = self.inner.reader.lock().take() {
            reader.abort();
        }
        if self.inner.control.send(Inbound::Failed(err)).is_err() {
            debug!(protocol = P::NAME, "Dispatch worker already stopped");
        }
    }

    /// Stop the reader, write a close frame and release the sink.
    async fn teardown(&self, code: u16, reason: &str) {
        if let Some(reader) = self.inner.reader.lock().take() {
            reader.abort();
        }

        let sink = self.inner.writer.lock().await.take();
        if let Some(mut sink) = sink {
            let frame = CloseFrame {
                code: CloseCode::from(code),
                reason: reason.to_string().into(),
            };
            if let Err(e) = sink.send(Message::Close(Some(frame))).await {
                debug!(protocol = P::NAME, error = %e, "Failed to send close frame");
            }
            if let Err(e) = sink.close().await {
                debug!(protocol = P::NAME, error = %e, "Failed to close sink");
            }
        }

        self.set_state(SessionState::Closed);
    }

    async fn release_writer(&self) {
        self.inner.writer.lock().await.take();
    }
}

fn is_broken_pipe(err: &tungstenite::Error) -> bool {
    matches!(
        err,
        tungstenite::Error::ConnectionClosed
            | tungstenite::Error::AlreadyClosed
            | tungstenite::Error::Io(_)
    )
}

// =============================================================================
// Reader
// =============================================================================

async fn read_loop<P: Protocol>(client: WebsocketClient<P>, mut stream: FrameStream) {
    let mut peer_close: Option<(u16, String)> = None;

    let outcome: Result<(), tungstenite::Error> = loop {
        let inbound = match stream.next().await {
            Some(Ok(Message::Text(text))) => Inbound::Frame(text.as_str().to_owned()),
            Some(Ok(Message::Binary(data))) => match String::from_utf8(data.to_vec()) {
                Ok(text) => Inbound::Frame(text),
                Err(e) => Inbound::Malformed(WebsocketError::decode(format!(
                    "binary frame is not UTF-8: {e}"
                ))),
            },
            Some(Ok(Message::Ping(payload))) => {
                let mut writer = client.inner.writer.lock().await;
                if let Some(sink) = writer.as_mut() {
                    if let Err(e) = sink.send(Message::Pong(payload)).await {
                        warn!(protocol = P::NAME, error = %e, "Failed to send pong");
                    }
                }
                continue;
            }
            Some(Ok(Message::Close(frame))) => {
                let (code, reason) = match frame {
                    Some(frame) => (u16::from(frame.code), frame.reason.as_str().to_owned()),
                    None => (CLOSE_NO_STATUS, String::new()),
                };
                info!(protocol = P::NAME, code, reason = %reason, "Peer closed session");
                if !client.transition(SessionState::Open, SessionState::Closing) {
                    continue;
                }
                peer_close = Some((code, reason.clone()));
                Inbound::PeerClosing { code, reason }
            }
            Some(Ok(_)) => continue,
            Some(Err(e)) => break Err(e),
            None => break Ok(()),
        };

        if client.inner.intake.send(inbound).await.is_err() {
            debug!(protocol = P::NAME, "Dispatch worker stopped, reader exiting");
            return;
        }
    };

    client.release_writer().await;

    let terminal = match peer_close {
        Some((code, reason)) => {
            if !client.transition(SessionState::Closing, SessionState::Closed) {
                return;
            }
            Inbound::PeerClosed { code, reason }
        }
        None => {
            if !client.transition(SessionState::Open, SessionState::Failed) {
                return;
            }
            let err = match outcome {
                Err(e) => WebsocketError::transport(e.to_string()),
                Ok(()) => WebsocketError::transport(format!(
                    "connection dropped without a close frame (code {CLOSE_ABNORMAL})"
                )),
            };
            error!(protocol = P::NAME, url = %client.inner.url, error = %err, "Transport failed");
            Inbound::Failed(err)
        }
    };

    if client.inner.intake.send(terminal).await.is_err() {
        debug!(protocol = P::NAME, "Dispatch worker stopped before terminal event");
    }
}

// =============================================================================
// Dispatch Worker
// =============================================================================

async fn dispatch_loop<P: Protocol>(
    client: WebsocketClient<P>,
    mut intake: mpsc::Receiver<Inbound>,
    mut control: mpsc::UnboundedReceiver<Inbound>,
) {
    let handler = client.handler().as_ref();

    loop {
        let inbound = tokio::select! {
            biased;
            Some(inbound) = control.recv() => inbound,
            Some(inbound) = intake.recv() => inbound,
            else => break,
        };

        match inbound {
            Inbound::Frame(text) => dispatch_frame(&client, handler, &text).await,
            Inbound::Malformed(err) => {
                warn!(protocol = P::NAME, error = %err, "Dropping unreadable frame");
                report_client_exception(&client, handler, err).await;
            }
            Inbound::PeerClosing { code, reason } => {
                let _ = call_handler_safely(
                    "on_closing",
                    handler.on_closing(&client, code, &reason),
                )
                .await;
            }
            Inbound::PeerClosed { code, reason } => {
                let _ =
                    call_handler_safely("on_closed", handler.on_closed(&client, code, &reason))
                        .await;
                break;
            }
            Inbound::LocalClose { code, reason } => {
                let _ = call_handler_safely(
                    "on_closing",
                    handler.on_closing(&client, code, &reason),
                )
                .await;
                client.teardown(code, &reason).await;
                let _ =
                    call_handler_safely("on_closed", handler.on_closed(&client, code, &reason))
                        .await;
                break;
            }
            Inbound::Failed(err) => {
                client.release_writer().await;
                let _ = call_handler_safely("on_failure", handler.on_failure(&client, err)).await;
                break;
            }
        }
    }

    debug!(protocol = P::NAME, state = %client.state(), "Dispatch worker finished");
}

async fn dispatch_frame<P: Protocol>(client: &WebsocketClient<P>, handler: &P::Handler, text: &str) {
    match P::catalog().decode(text) {
        Ok(Decoded::Event { event_type, event }) => {
            let dispatch = P::dispatch(client, handler, event);
            if let Err(err) = call_handler_safely(event_type, dispatch).await {
                report_client_exception(client, handler, err).await;
            }
        }
        Ok(Decoded::Unknown { event_type, .. }) => {
            debug!(protocol = P::NAME, event_type = %event_type, "Ignoring unknown event");
        }
        Err(err) => {
            warn!(protocol = P::NAME, error = %err, "Failed to decode frame");
            report_client_exception(client, handler, err).await;
        }
    }
}

async fn report_client_exception<P: Protocol>(
    client: &WebsocketClient<P>,
    handler: &P::Handler,
    err: WebsocketError,
) {
    let _ = call_handler_safely(
        "on_client_exception",
        handler.on_client_exception(client, err),
    )
    .await;
}
