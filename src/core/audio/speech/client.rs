//! Speech synthesis session: text in, audio chunks out.

use async_trait::async_trait;
use once_cell::sync::Lazy;

use super::messages::{
    InputTextBufferAppendEvent, InputTextBufferCompleteEvent, InputTextBufferCompletedEvent,
    SpeechAudioCompletedEvent, SpeechAudioUpdateEvent, SpeechCreatedEvent, SpeechUpdateData,
    SpeechUpdateEvent, SpeechUpdatedEvent,
};
use crate::core::models::ErrorEvent;
use crate::core::websocket::{
    BaseCallbackHandler, EventCatalog, Protocol, WebsocketClient, WebsocketResult,
};

/// Every downstream event of the speech sub-protocol.
#[derive(Debug, Clone, PartialEq)]
pub enum SpeechEvent {
    SpeechCreated(SpeechCreatedEvent),
    SpeechUpdated(SpeechUpdatedEvent),
    InputTextBufferCompleted(InputTextBufferCompletedEvent),
    SpeechAudioUpdate(SpeechAudioUpdateEvent),
    SpeechAudioCompleted(SpeechAudioCompletedEvent),
    Error(ErrorEvent),
}

static SPEECH_CATALOG: Lazy<EventCatalog<SpeechEvent>> = Lazy::new(|| {
    EventCatalog::new()
        .register(SpeechEvent::SpeechCreated)
        .register(SpeechEvent::SpeechUpdated)
        .register(SpeechEvent::InputTextBufferCompleted)
        .register(SpeechEvent::SpeechAudioUpdate)
        .register(SpeechEvent::SpeechAudioCompleted)
        .register(SpeechEvent::Error)
});

/// Binding for `/v1/audio/speech`.
#[derive(Debug, Clone, Copy)]
pub struct SpeechProtocol;

/// A speech synthesis session.
pub type WebsocketAudioSpeechClient = WebsocketClient<SpeechProtocol>;

/// Callbacks for a speech session. Every method defaults to a no-op.
#[async_trait]
pub trait SpeechCallbackHandler: BaseCallbackHandler<SpeechProtocol> {
    async fn on_speech_created(
        &self,
        _client: &WebsocketAudioSpeechClient,
        _event: SpeechCreatedEvent,
    ) {
    }

    async fn on_speech_updated(
        &self,
        _client: &WebsocketAudioSpeechClient,
        _event: SpeechUpdatedEvent,
    ) {
    }

    async fn on_input_text_buffer_completed(
        &self,
        _client: &WebsocketAudioSpeechClient,
        _event: InputTextBufferCompletedEvent,
    ) {
    }

    async fn on_speech_audio_update(
        &self,
        _client: &WebsocketAudioSpeechClient,
        _event: SpeechAudioUpdateEvent,
    ) {
    }

    async fn on_speech_audio_completed(
        &self,
        _client: &WebsocketAudioSpeechClient,
        _event: SpeechAudioCompletedEvent,
    ) {
    }

    async fn on_error(&self, _client: &WebsocketAudioSpeechClient, _event: ErrorEvent) {}
}

#[async_trait]
impl Protocol for SpeechProtocol {
    type Event = SpeechEvent;
    type Handler = dyn SpeechCallbackHandler;

    const NAME: &'static str = "speech";
    const PATH: &'static str = "/v1/audio/speech";

    fn catalog() -> &'static EventCatalog<SpeechEvent> {
        &SPEECH_CATALOG
    }

    async fn dispatch(client: &WebsocketClient<Self>, handler: &Self::Handler, event: SpeechEvent) {
        match event {
            SpeechEvent::SpeechCreated(e) => handler.on_speech_created(client, e).await,
            SpeechEvent::SpeechUpdated(e) => handler.on_speech_updated(client, e).await,
            SpeechEvent::InputTextBufferCompleted(e) => {
                handler.on_input_text_buffer_completed(client, e).await
            }
            SpeechEvent::SpeechAudioUpdate(e) => handler.on_speech_audio_update(client, e).await,
            SpeechEvent::SpeechAudioCompleted(e) => {
                handler.on_speech_audio_completed(client, e).await
            }
            SpeechEvent::Error(e) => handler.on_error(client, e).await,
        }
    }
}

impl WebsocketClient<SpeechProtocol> {
    /// Send `speech.update`.
    pub async fn speech_update(&self, data: SpeechUpdateData) -> WebsocketResult<()> {
        self.send(&SpeechUpdateEvent { data }).await
    }

    /// Send `input_text_buffer.append` with `delta` as the text.
    pub async fn input_text_buffer_append(&self, delta: impl Into<String>) -> WebsocketResult<()> {
        self.send(&InputTextBufferAppendEvent {
            delta: delta.into(),
        })
        .await
    }

    /// Send `input_text_buffer.complete`.
    pub async fn input_text_buffer_complete(&self) -> WebsocketResult<()> {
        self.send(&InputTextBufferCompleteEvent).await
    }
}
