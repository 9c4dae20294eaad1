//! Conversational chat session: audio or text in, text and audio out.

use async_trait::async_trait;
use once_cell::sync::Lazy;

use super::messages::*;
use crate::core::audio::buffer::{
    InputAudioBufferAppendEvent, InputAudioBufferClearEvent, InputAudioBufferClearedEvent,
    InputAudioBufferCompleteEvent, InputAudioBufferCompletedEvent,
};
use crate::core::models::{ErrorEvent, ToolOutput};
use crate::core::websocket::{
    BaseCallbackHandler, EventCatalog, Protocol, WebsocketClient, WebsocketError, WebsocketResult,
};

/// Target of a chat session, sent as query parameters on connect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatCreateRequest {
    pub bot_id: String,
    pub workflow_id: Option<String>,
}

impl ChatCreateRequest {
    pub fn new(bot_id: impl Into<String>) -> Self {
        Self {
            bot_id: bot_id.into(),
            workflow_id: None,
        }
    }

    pub fn with_workflow_id(mut self, workflow_id: impl Into<String>) -> Self {
        self.workflow_id = Some(workflow_id.into());
        self
    }

    /// Query pairs for the connect URL. Fails if `bot_id` is empty.
    pub fn query_pairs(&self) -> WebsocketResult<Vec<(&'static str, &str)>> {
        if self.bot_id.trim().is_empty() {
            return Err(WebsocketError::config("bot_id is required for chat"));
        }

        let mut pairs = vec![("bot_id", self.bot_id.as_str())];
        if let Some(workflow_id) = self.workflow_id.as_deref() {
            pairs.push(("workflow_id", workflow_id));
        }
        Ok(pairs)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    ChatCreated(ChatCreatedEvent),
    ChatUpdated(ChatUpdatedEvent),
    ConversationChatCreated(ConversationChatCreatedEvent),
    ConversationChatInProgress(ConversationChatInProgressEvent),
    ConversationChatRequiresAction(ConversationChatRequiresActionEvent),
    ConversationChatCompleted(ConversationChatCompletedEvent),
    ConversationChatFailed(ConversationChatFailedEvent),
    ConversationChatCanceled(ConversationChatCanceledEvent),
    ConversationMessageDelta(ConversationMessageDeltaEvent),
    ConversationMessageCompleted(ConversationMessageCompletedEvent),
    ConversationAudioDelta(ConversationAudioDeltaEvent),
    ConversationAudioCompleted(ConversationAudioCompletedEvent),
    ConversationAudioTranscriptUpdate(ConversationAudioTranscriptUpdateEvent),
    ConversationAudioTranscriptCompleted(ConversationAudioTranscriptCompletedEvent),
    InputAudioBufferCompleted(InputAudioBufferCompletedEvent),
    InputAudioBufferCleared(InputAudioBufferClearedEvent),
    InputAudioBufferSpeechStarted(InputAudioBufferSpeechStartedEvent),
    InputAudioBufferSpeechStopped(InputAudioBufferSpeechStoppedEvent),
    ConversationCleared(ConversationClearedEvent),
    Error(ErrorEvent),
}

static CHAT_CATALOG: Lazy<EventCatalog<ChatEvent>> = Lazy::new(|| {
    EventCatalog::new()
        .register(ChatEvent::ChatCreated)
        .register(ChatEvent::ChatUpdated)
        .register(ChatEvent::ConversationChatCreated)
        .register(ChatEvent::ConversationChatInProgress)
        .register(ChatEvent::ConversationChatRequiresAction)
        .register(ChatEvent::ConversationChatCompleted)
        .register(ChatEvent::ConversationChatFailed)
        .register(ChatEvent::ConversationChatCanceled)
        .register(ChatEvent::ConversationMessageDelta)
        .register(ChatEvent::ConversationMessageCompleted)
        .register(ChatEvent::ConversationAudioDelta)
        .register(ChatEvent::ConversationAudioCompleted)
        .register(ChatEvent::ConversationAudioTranscriptUpdate)
        .register(ChatEvent::ConversationAudioTranscriptCompleted)
        .register(ChatEvent::InputAudioBufferCompleted)
        .register(ChatEvent::InputAudioBufferCleared)
        .register(ChatEvent::InputAudioBufferSpeechStarted)
        .register(ChatEvent::InputAudioBufferSpeechStopped)
        .register(ChatEvent::ConversationCleared)
        .register(ChatEvent::Error)
});

/// Binding for `/v1/chat`.
#[derive(Debug, Clone, Copy)]
pub struct ChatProtocol;

pub type WebsocketChatClient = WebsocketClient<ChatProtocol>;

/// Callbacks for a chat session. Every method defaults to a no-op.
#[async_trait]
pub trait ChatCallbackHandler: BaseCallbackHandler<ChatProtocol> {
    async fn on_chat_created(&self, _client: &WebsocketChatClient, _event: ChatCreatedEvent) {}

    async fn on_chat_updated(&self, _client: &WebsocketChatClient, _event: ChatUpdatedEvent) {}

    async fn on_conversation_chat_created(
        &self,
        _client: &WebsocketChatClient,
        _event: ConversationChatCreatedEvent,
    ) {
    }

    async fn on_conversation_chat_in_progress(
        &self,
        _client: &WebsocketChatClient,
        _event: ConversationChatInProgressEvent,
    ) {
    }

    async fn on_conversation_chat_requires_action(
        &self,
        _client: &WebsocketChatClient,
        _event: ConversationChatRequiresActionEvent,
    ) {
    }

    async fn on_conversation_chat_completed(
        &self,
        _client: &WebsocketChatClient,
        _event: ConversationChatCompletedEvent,
    ) {
    }

    async fn on_conversation_chat_failed(
        &self,
        _client: &WebsocketChatClient,
        _event: ConversationChatFailedEvent,
    ) {
    }

    async fn on_conversation_chat_canceled(
        &self,
        _client: &WebsocketChatClient,
        _event: ConversationChatCanceledEvent,
    ) {
    }

    async fn on_conversation_message_delta(
        &self,
        _client: &WebsocketChatClient,
        _event: ConversationMessageDeltaEvent,
    ) {
    }

    async fn on_conversation_message_completed(
        &self,
        _client: &WebsocketChatClient,
        _event: ConversationMessageCompletedEvent,
    ) {
    }

    async fn on_conversation_audio_delta(
        &self,
        _client: &WebsocketChatClient,
        _event: ConversationAudioDeltaEvent,
    ) {
    }

    async fn on_conversation_audio_completed(
        &self,
        _client: &WebsocketChatClient,
        _event: ConversationAudioCompletedEvent,
    ) {
    }

    async fn on_conversation_audio_transcript_update(
        &self,
        _client: &WebsocketChatClient,
        _event: ConversationAudioTranscriptUpdateEvent,
    ) {
    }

    async fn on_conversation_audio_transcript_completed(
        &self,
        _client: &WebsocketChatClient,
        _event: ConversationAudioTranscriptCompletedEvent,
    ) {
    }

    async fn on_input_audio_buffer_completed(
        &self,
        _client: &WebsocketChatClient,
        _event: InputAudioBufferCompletedEvent,
    ) {
    }

    async fn on_input_audio_buffer_cleared(
        &self,
        _client: &WebsocketChatClient,
        _event: InputAudioBufferClearedEvent,
    ) {
    }

    async fn on_input_audio_buffer_speech_started(
        &self,
        _client: &WebsocketChatClient,
        _event: InputAudioBufferSpeechStartedEvent,
    ) {
    }

    async fn on_input_audio_buffer_speech_stopped(
        &self,
        _client: &WebsocketChatClient,
        _event: InputAudioBufferSpeechStoppedEvent,
    ) {
    }

    async fn on_conversation_cleared(
        &self,
        _client: &WebsocketChatClient,
        _event: ConversationClearedEvent,
    ) {
    }

    async fn on_error(&self, _client: &WebsocketChatClient, _event: ErrorEvent) {}
}

#[async_trait]
impl Protocol for ChatProtocol {
    type Event = ChatEvent;
    type Handler = dyn ChatCallbackHandler;

    const NAME: &'static str = "chat";
    const PATH: &'static str = "/v1/chat";

    fn catalog() -> &'static EventCatalog<ChatEvent> {
        &CHAT_CATALOG
    }

    async fn dispatch(client: &WebsocketClient<Self>, handler: &Self::Handler, event: ChatEvent) {
        use ChatEvent as E;

        match event {
            E::ChatCreated(e) => handler.on_chat_created(client, e).await,
            E::ChatUpdated(e) => handler.on_chat_updated(client, e).await,
            E::ConversationChatCreated(e) => handler.on_conversation_chat_created(client, e).await,
            E::ConversationChatInProgress(e) => {
                handler.on_conversation_chat_in_progress(client, e).await
            }
            E::ConversationChatRequiresAction(e) => {
                handler.on_conversation_chat_requires_action(client, e).await
            }
            E::ConversationChatCompleted(e) => {
                handler.on_conversation_chat_completed(client, e).await
            }
            E::ConversationChatFailed(e) => handler.on_conversation_chat_failed(client, e).await,
            E::ConversationChatCanceled(e) => {
                handler.on_conversation_chat_canceled(client, e).await
            }
            E::ConversationMessageDelta(e) => {
                handler.on_conversation_message_delta(client, e).await
            }
            E::ConversationMessageCompleted(e) => {
                handler.on_conversation_message_completed(client, e).await
            }
            E::ConversationAudioDelta(e) => handler.on_conversation_audio_delta(client, e).await,
            E::ConversationAudioCompleted(e) => {
                handler.on_conversation_audio_completed(client, e).await
            }
            E::ConversationAudioTranscriptUpdate(e) => {
                handler.on_conversation_audio_transcript_update(client, e).await
            }
            E::ConversationAudioTranscriptCompleted(e) => {
                handler
                    .on_conversation_audio_transcript_completed(client, e)
                    .await
            }
            E::InputAudioBufferCompleted(e) => {
                handler.on_input_audio_buffer_completed(client, e).await
            }
            E::InputAudioBufferCleared(e) => handler.on_input_audio_buffer_cleared(client, e).await,
            E::InputAudioBufferSpeechStarted(e) => {
                handler.on_input_audio_buffer_speech_started(client, e).await
            }
            E::InputAudioBufferSpeechStopped(e) => {
                handler.on_input_audio_buffer_speech_stopped(client, e).await
            }
            E::ConversationCleared(e) => handler.on_conversation_cleared(client, e).await,
            E::Error(e) => handler.on_error(client, e).await,
        }
    }
}

impl WebsocketClient<ChatProtocol> {
    pub async fn chat_update(&self, data: ChatUpdateData) -> WebsocketResult<()> {
        self.send(&ChatUpdateEvent { data }).await
    }

    /// Send raw audio bytes, base64 encoded on the wire.
    pub async fn input_audio_buffer_append(&self, audio: &[u8]) -> WebsocketResult<()> {
        self.send(&InputAudioBufferAppendEvent::from_audio(audio))
            .await
    }

    /// Commit buffered audio; the bot answers it as one user turn.
    pub async fn input_audio_buffer_complete(&self) -> WebsocketResult<()> {
        self.send(&InputAudioBufferCompleteEvent).await
    }

    pub async fn input_audio_buffer_clear(&self) -> WebsocketResult<()> {
        self.send(&InputAudioBufferClearEvent).await
    }

    pub async fn conversation_message_create(
        &self,
        message: ConversationMessageCreateEvent,
    ) -> WebsocketResult<()> {
        self.send(&message).await
    }

    pub async fn conversation_clear(&self) -> WebsocketResult<()> {
        self.send(&ConversationClearEvent).await
    }

    /// Answer the tool calls of a chat in `requires_action`.
    pub async fn conversation_chat_submit_tool_outputs(
        &self,
        chat_id: impl Into<String>,
        tool_outputs: Vec<ToolOutput>,
    ) -> WebsocketResult<()> {
        self.send(&ConversationChatSubmitToolOutputsEvent {
            chat_id: chat_id.into(),
            tool_outputs,
        })
        .await
    }

    pub async fn conversation_chat_cancel(&self) -> WebsocketResult<()> {
        self.send(&ConversationChatCancelEvent).await
    }
}
