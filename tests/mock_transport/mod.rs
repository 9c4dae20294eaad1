//! Test doubles for realtime sessions
//!
//! - [`MockTransport`]: an in-memory [`Transport`] whose far end is a
//!   [`MockPeer`] driven by the test
//! - [`Recorder`]: a handler for every sub-protocol that records each
//!   callback as a string, optionally panicking on or closing after a
//!   given event
//! - [`websocket_mock`]: a real `tokio-tungstenite` server on localhost

// Each test binary uses a different subset of these helpers
#![allow(dead_code)]

pub mod websocket_mock;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::channel::mpsc as chan;
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::{Notify, mpsc};
use tokio_tungstenite::tungstenite::{
    self, Message,
    protocol::{CloseFrame, frame::coding::CloseCode},
};

use coze_ws::core::audio::buffer::{InputAudioBufferClearedEvent, InputAudioBufferCompletedEvent};
use coze_ws::core::audio::speech::*;
use coze_ws::core::audio::transcriptions::*;
use coze_ws::core::chat::*;
use coze_ws::core::models::ErrorEvent;
use coze_ws::core::websocket::{
    ConnectRequest, FrameSink, FrameStream, Protocol, WebsocketClient, WebsocketResult,
};
use coze_ws::{
    BaseCallbackHandler, ClientConfig, CozeWebsockets, Transport, WebsocketError,
};

/// Upper bound for any single wait in the tests.
pub const WAIT: Duration = Duration::from_secs(5);

pub const TEST_BASE_URL: &str = "wss://ws.test.local";
pub const TEST_TOKEN: &str = "test-token";

// =============================================================================
// In-memory Transport
// =============================================================================

/// Far end of one in-memory connection.
pub struct MockPeer {
    /// The request the client connected with
    pub request: ConnectRequest,
    to_client: chan::UnboundedSender<Result<Message, tungstenite::Error>>,
    from_client: chan::UnboundedReceiver<Message>,
}

impl MockPeer {
    pub fn send_json(&self, value: Value) {
        self.send_text(&value.to_string());
    }

    pub fn send_text(&self, text: &str) {
        self.to_client
            .unbounded_send(Ok(Message::Text(text.to_string().into())))
            .expect("client stream dropped");
    }

    pub fn send_binary(&self, data: Vec<u8>) {
        self.to_client
            .unbounded_send(Ok(Message::Binary(data.into())))
            .expect("client stream dropped");
    }

    /// Send a close frame and end the stream, like a server-initiated close.
    pub fn close(&self, code: u16, reason: &str) {
        let frame = CloseFrame {
            code: CloseCode::from(code),
            reason: reason.to_string().into(),
        };
        let _ = self.to_client.unbounded_send(Ok(Message::Close(Some(frame))));
        self.to_client.close_channel();
    }

    /// Surface a socket error on the client's read side.
    pub fn fail(&self, reason: &str) {
        let err = tungstenite::Error::Io(io::Error::new(io::ErrorKind::ConnectionReset, reason));
        let _ = self.to_client.unbounded_send(Err(err));
    }

    /// End the client's read side without a close frame.
    pub fn drop_connection(&self) {
        self.to_client.close_channel();
    }

    /// Refuse further writes from the client.
    pub fn stop_reading(&mut self) {
        self.from_client.close();
    }

    /// Next frame written by the client, or `None` once its sink is closed.
    pub async fn next_frame(&mut self) -> Option<Message> {
        tokio::time::timeout(WAIT, self.from_client.next())
            .await
            .expect("timed out waiting for a client frame")
    }

    /// Next text frame written by the client, parsed as JSON.
    pub async fn next_json(&mut self) -> Value {
        match self.next_frame().await {
            Some(Message::Text(text)) => serde_json::from_str(text.as_str()).expect("invalid JSON"),
            other => panic!("Expected a text frame, got {other:?}"),
        }
    }

    /// A frame the client already wrote, without waiting.
    pub fn written_frame(&mut self) -> Option<Message> {
        match self.from_client.try_next() {
            Ok(frame) => frame,
            Err(_) => None,
        }
    }
}

/// In-memory transport handing each connection's far end to the test.
pub struct MockTransport {
    peers: mpsc::UnboundedSender<MockPeer>,
    refuse: bool,
}

impl MockTransport {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<MockPeer>) {
        let (peers, rx) = mpsc::unbounded_channel();
        (
            Arc::new(Self {
                peers,
                refuse: false,
            }),
            rx,
        )
    }

    /// A transport whose handshake always fails.
    pub fn refusing() -> Arc<Self> {
        let (peers, _) = mpsc::unbounded_channel();
        Arc::new(Self {
            peers,
            refuse: true,
        })
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn connect(&self, request: ConnectRequest) -> WebsocketResult<(FrameSink, FrameStream)> {
        if self.refuse {
            return Err(WebsocketError::connection("handshake refused"));
        }

        let (to_client, client_stream) = chan::unbounded();
        let (client_sink, from_client) = chan::unbounded::<Message>();

        self.peers
            .send(MockPeer {
                request,
                to_client,
                from_client,
            })
            .map_err(|_| WebsocketError::connection("test dropped the peer receiver"))?;

        let sink: FrameSink =
            Box::pin(client_sink.sink_map_err(|_| tungstenite::Error::ConnectionClosed));
        let stream: FrameStream = Box::pin(client_stream);
        Ok((sink, stream))
    }
}

pub fn test_config() -> ClientConfig {
    let mut config = ClientConfig::new(TEST_TOKEN);
    config.ws_base_url = TEST_BASE_URL.to_string();
    config
}

/// Factory over a fresh in-memory transport.
pub fn mock_factory() -> (CozeWebsockets, mpsc::UnboundedReceiver<MockPeer>) {
    let (transport, peers) = MockTransport::new();
    let coze = CozeWebsockets::with_transport(test_config(), transport).expect("valid config");
    (coze, peers)
}

pub async fn next_peer(peers: &mut mpsc::UnboundedReceiver<MockPeer>) -> MockPeer {
    tokio::time::timeout(WAIT, peers.recv())
        .await
        .expect("timed out waiting for a connection")
        .expect("transport dropped")
}

pub async fn open_speech(
    recorder: Arc<Recorder>,
) -> (WebsocketClient<SpeechProtocol>, MockPeer) {
    let (coze, mut peers) = mock_factory();
    let client = coze.speech(recorder).await.expect("speech session");
    (client, next_peer(&mut peers).await)
}

pub async fn open_transcriptions(
    recorder: Arc<Recorder>,
) -> (WebsocketClient<TranscriptionsProtocol>, MockPeer) {
    let (coze, mut peers) = mock_factory();
    let client = coze
        .transcriptions(recorder)
        .await
        .expect("transcriptions session");
    (client, next_peer(&mut peers).await)
}

pub async fn open_chat(
    request: ChatCreateRequest,
    recorder: Arc<Recorder>,
) -> (WebsocketClient<ChatProtocol>, MockPeer) {
    let (coze, mut peers) = mock_factory();
    let client = coze.chat(request, recorder).await.expect("chat session");
    (client, next_peer(&mut peers).await)
}

// =============================================================================
// Recording Handler
// =============================================================================

/// Records every callback it receives, in order.
#[derive(Default)]
pub struct Recorder {
    entries: Mutex<Vec<String>>,
    notify: Notify,
    panic_on: Option<&'static str>,
    close_on: Option<&'static str>,
}

impl Recorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Panic inside the callback for `event_type`.
    pub fn panicking_on(event_type: &'static str) -> Arc<Self> {
        Arc::new(Self {
            panic_on: Some(event_type),
            ..Self::default()
        })
    }

    /// Close the session from inside the callback for `event_type`.
    pub fn closing_on(event_type: &'static str) -> Arc<Self> {
        Arc::new(Self {
            close_on: Some(event_type),
            ..Self::default()
        })
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    /// Entries starting with `prefix`.
    pub fn matching(&self, prefix: &str) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .filter(|e| e.starts_with(prefix))
            .cloned()
            .collect()
    }

    /// Wait until `done` holds for the recorded entries.
    pub async fn wait_until(&self, done: impl Fn(&[String]) -> bool) -> Vec<String> {
        let waiting = async {
            loop {
                let notified = self.notify.notified();
                if done(&self.entries.lock()) {
                    return self.entries();
                }
                notified.await;
            }
        };
        match tokio::time::timeout(WAIT, waiting).await {
            Ok(entries) => entries,
            Err(_) => panic!("timed out; recorded so far: {:?}", self.entries()),
        }
    }

    /// Wait until an entry starting with `prefix` is recorded.
    pub async fn wait_for(&self, prefix: &str) -> Vec<String> {
        self.wait_until(|entries| entries.iter().any(|e| e.starts_with(prefix)))
            .await
    }

    fn record(&self, entry: String) {
        self.entries.lock().push(entry);
        self.notify.notify_waiters();
    }

    async fn on_event<P: Protocol>(&self, client: &WebsocketClient<P>, event_type: &str, detail: String) {
        if self.panic_on == Some(event_type) {
            panic!("recorder asked to panic on {event_type}");
        }
        self.record(if detail.is_empty() {
            event_type.to_string()
        } else {
            format!("{event_type}:{detail}")
        });
        if self.close_on == Some(event_type) {
            client.close().await.expect("close from callback");
        }
    }
}

#[async_trait]
impl<P: Protocol> BaseCallbackHandler<P> for Recorder {
    async fn on_client_exception(&self, _client: &WebsocketClient<P>, error: WebsocketError) {
        self.record(format!("on_client_exception:{error:?}"));
    }

    async fn on_closing(&self, _client: &WebsocketClient<P>, code: u16, reason: &str) {
        self.record(format!("on_closing:{code}:{reason}"));
    }

    async fn on_closed(&self, _client: &WebsocketClient<P>, code: u16, reason: &str) {
        self.record(format!("on_closed:{code}:{reason}"));
    }

    async fn on_failure(&self, _client: &WebsocketClient<P>, error: WebsocketError) {
        self.record(format!("on_failure:{error:?}"));
    }
}

#[async_trait]
impl SpeechCallbackHandler for Recorder {
    async fn on_speech_created(&self, client: &WebsocketAudioSpeechClient, _e: SpeechCreatedEvent) {
        self.on_event(client, "speech.created", String::new()).await;
    }

    async fn on_speech_updated(&self, client: &WebsocketAudioSpeechClient, _e: SpeechUpdatedEvent) {
        self.on_event(client, "speech.updated", String::new()).await;
    }

    async fn on_input_text_buffer_completed(
        &self,
        client: &WebsocketAudioSpeechClient,
        _e: InputTextBufferCompletedEvent,
    ) {
        self.on_event(client, "input_text_buffer.completed", String::new())
            .await;
    }

    async fn on_speech_audio_update(
        &self,
        client: &WebsocketAudioSpeechClient,
        e: SpeechAudioUpdateEvent,
    ) {
        self.on_event(client, "speech.audio.update", e.data.delta).await;
    }

    async fn on_speech_audio_completed(
        &self,
        client: &WebsocketAudioSpeechClient,
        _e: SpeechAudioCompletedEvent,
    ) {
        self.on_event(client, "speech.audio.completed", String::new())
            .await;
    }

    async fn on_error(&self, client: &WebsocketAudioSpeechClient, e: ErrorEvent) {
        self.on_event(client, "error", format!("{}:{}", e.data.code, e.data.msg))
            .await;
    }
}

#[async_trait]
impl TranscriptionsCallbackHandler for Recorder {
    async fn on_transcriptions_created(
        &self,
        client: &WebsocketAudioTranscriptionsClient,
        _e: TranscriptionsCreatedEvent,
    ) {
        self.on_event(client, "transcriptions.created", String::new())
            .await;
    }

    async fn on_input_audio_buffer_completed(
        &self,
        client: &WebsocketAudioTranscriptionsClient,
        _e: InputAudioBufferCompletedEvent,
    ) {
        self.on_event(client, "input_audio_buffer.completed", String::new())
            .await;
    }

    async fn on_input_audio_buffer_cleared(
        &self,
        client: &WebsocketAudioTranscriptionsClient,
        _e: InputAudioBufferClearedEvent,
    ) {
        self.on_event(client, "input_audio_buffer.cleared", String::new())
            .await;
    }

    async fn on_transcriptions_message_update(
        &self,
        client: &WebsocketAudioTranscriptionsClient,
        e: TranscriptionsMessageUpdateEvent,
    ) {
        self.on_event(client, "transcriptions.message.update", e.data.content)
            .await;
    }

    async fn on_transcriptions_message_completed(
        &self,
        client: &WebsocketAudioTranscriptionsClient,
        _e: TranscriptionsMessageCompletedEvent,
    ) {
        self.on_event(client, "transcriptions.message.completed", String::new())
            .await;
    }
}

#[async_trait]
impl ChatCallbackHandler for Recorder {
    async fn on_conversation_chat_created(
        &self,
        client: &WebsocketChatClient,
        e: ConversationChatCreatedEvent,
    ) {
        self.on_event(client, "conversation.chat.created", e.data.id)
            .await;
    }

    async fn on_conversation_chat_requires_action(
        &self,
        client: &WebsocketChatClient,
        e: ConversationChatRequiresActionEvent,
    ) {
        self.on_event(client, "conversation.chat.requires_action", e.data.id)
            .await;
    }

    async fn on_conversation_chat_completed(
        &self,
        client: &WebsocketChatClient,
        e: ConversationChatCompletedEvent,
    ) {
        self.on_event(client, "conversation.chat.completed", e.data.id)
            .await;
    }

    async fn on_conversation_message_delta(
        &self,
        client: &WebsocketChatClient,
        e: ConversationMessageDeltaEvent,
    ) {
        self.on_event(client, "conversation.message.delta", e.data.content)
            .await;
    }

    async fn on_conversation_audio_delta(
        &self,
        client: &WebsocketChatClient,
        e: ConversationAudioDeltaEvent,
    ) {
        let bytes = e.decoded_audio().map(|b| b.len()).unwrap_or_default();
        self.on_event(client, "conversation.audio.delta", bytes.to_string())
            .await;
    }

    async fn on_conversation_cleared(
        &self,
        client: &WebsocketChatClient,
        _e: ConversationClearedEvent,
    ) {
        self.on_event(client, "conversation.cleared", String::new())
            .await;
    }
}
