use async_trait::async_trait;
use once_cell::sync::Lazy;

use super::messages::{
    TranscriptionsCreatedEvent, TranscriptionsMessageCompletedEvent,
    TranscriptionsMessageUpdateEvent, TranscriptionsUpdateData, TranscriptionsUpdateEvent,
    TranscriptionsUpdatedEvent,
};
use crate::core::audio::buffer::{
    InputAudioBufferAppendEvent, InputAudioBufferClearEvent, InputAudioBufferClearedEvent,
    InputAudioBufferCompleteEvent, InputAudioBufferCompletedEvent,
};
use crate::core::models::ErrorEvent;
use crate::core::websocket::{
    BaseCallbackHandler, EventCatalog, Protocol, WebsocketClient, WebsocketResult,
};

#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptionsEvent {
    TranscriptionsCreated(TranscriptionsCreatedEvent),
    TranscriptionsUpdated(TranscriptionsUpdatedEvent),
    InputAudioBufferCompleted(InputAudioBufferCompletedEvent),
    InputAudioBufferCleared(InputAudioBufferClearedEvent),
    TranscriptionsMessageUpdate(TranscriptionsMessageUpdateEvent),
    TranscriptionsMessageCompleted(TranscriptionsMessageCompletedEvent),
    Error(ErrorEvent),
}

static TRANSCRIPTIONS_CATALOG: Lazy<EventCatalog<TranscriptionsEvent>> = Lazy::new(|| {
    EventCatalog::new()
        .register(TranscriptionsEvent::TranscriptionsCreated)
        .register(TranscriptionsEvent::TranscriptionsUpdated)
        .register(TranscriptionsEvent::InputAudioBufferCompleted)
        .register(TranscriptionsEvent::InputAudioBufferCleared)
        .register(TranscriptionsEvent::TranscriptionsMessageUpdate)
        .register(TranscriptionsEvent::TranscriptionsMessageCompleted)
        .register(TranscriptionsEvent::Error)
});

/// Binding for `/v1/audio/transcriptions`.
#[derive(Debug, Clone, Copy)]
pub struct TranscriptionsProtocol;

pub type WebsocketAudioTranscriptionsClient = WebsocketClient<TranscriptionsProtocol>;

/// Callbacks for a transcription session. Every method defaults to a no-op.
#[async_trait]
pub trait TranscriptionsCallbackHandler: BaseCallbackHandler<TranscriptionsProtocol> {
    async fn on_transcriptions_created(
        &self,
        _client: &WebsocketAudioTranscriptionsClient,
        _event: TranscriptionsCreatedEvent,
    ) {
    }

    async fn on_transcriptions_updated(
        &self,
        _client: &WebsocketAudioTranscriptionsClient,
        _event: TranscriptionsUpdatedEvent,
    ) {
    }

    async fn on_input_audio_buffer_completed(
        &self,
        _client: &WebsocketAudioTranscriptionsClient,
        _event: InputAudioBufferCompletedEvent,
    ) {
    }

    async fn on_input_audio_buffer_cleared(
        &self,
        _client: &WebsocketAudioTranscriptionsClient,
        _event: InputAudioBufferClearedEvent,
    ) {
    }

    async fn on_transcriptions_message_update(
        &self,
        _client: &WebsocketAudioTranscriptionsClient,
        _event: TranscriptionsMessageUpdateEvent,
    ) {
    }

    async fn on_transcriptions_message_completed(
        &self,
        _client: &WebsocketAudioTranscriptionsClient,
        _event: TranscriptionsMessageCompletedEvent,
    ) {
    }

    async fn on_error(&self, _client: &WebsocketAudioTranscriptionsClient, _event: ErrorEvent) {}
}

#[async_trait]
impl Protocol for TranscriptionsProtocol {
    type Event = TranscriptionsEvent;
    type Handler = dyn TranscriptionsCallbackHandler;

    const NAME: &'static str = "transcriptions";
    const PATH: &'static str = "/v1/audio/transcriptions";

    fn catalog() -> &'static EventCatalog<TranscriptionsEvent> {
        &TRANSCRIPTIONS_CATALOG
    }

    async fn dispatch(
        client: &WebsocketClient<Self>,
        handler: &Self::Handler,
        event: TranscriptionsEvent,
    ) {
        use TranscriptionsEvent as E;

        match event {
            E::TranscriptionsCreated(e) => handler.on_transcriptions_created(client, e).await,
            E::TranscriptionsUpdated(e) => handler.on_transcriptions_updated(client, e).await,
            E::InputAudioBufferCompleted(e) => {
                handler.on_input_audio_buffer_completed(client, e).await
            }
            E::InputAudioBufferCleared(e) => handler.on_input_audio_buffer_cleared(client, e).await,
            E::TranscriptionsMessageUpdate(e) => {
                handler.on_transcriptions_message_update(client, e).await
            }
            E::TranscriptionsMessageCompleted(e) => {
                handler.on_transcriptions_message_completed(client, e).await
            }
            E::Error(e) => handler.on_error(client, e).await,
        }
    }
}

impl WebsocketClient<TranscriptionsProtocol> {
    pub async fn transcriptions_update(&self, data: TranscriptionsUpdateData) -> WebsocketResult<()> {
        self.send(&TranscriptionsUpdateEvent { data }).await
    }

    /// Send raw audio bytes, base64 encoded on the wire.
    pub async fn input_audio_buffer_append(&self, audio: &[u8]) -> WebsocketResult<()> {
        self.send(&InputAudioBufferAppendEvent::from_audio(audio))
            .await
    }

    pub async fn input_audio_buffer_complete(&self) -> WebsocketResult<()> {
        self.send(&InputAudioBufferCompleteEvent).await
    }

    pub async fn input_audio_buffer_clear(&self) -> WebsocketResult<()> {
        self.send(&InputAudioBufferClearEvent).await
    }
}
