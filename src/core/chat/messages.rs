//! Wire types for the conversational chat sub-protocol.

use serde::{Deserialize, Serialize};

use crate::core::models::{
    Chat, ChatConfig, InputAudio, Message, MessageContentType, MessageRole, OutputAudio, ToolOutput,
};
use crate::core::websocket::macros::downstream_event;
use crate::core::websocket::{UpstreamEvent, WebsocketResult};

// =============================================================================
// Upstream
// =============================================================================

/// Session settings carried by `chat.update` and echoed by `chat.updated`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatUpdateData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_audio: Option<InputAudio>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_audio: Option<OutputAudio>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_config: Option<ChatConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ChatUpdateEvent {
    pub data: ChatUpdateData,
}

impl UpstreamEvent for ChatUpdateEvent {
    const EVENT_TYPE: &'static str = "chat.update";
}

/// `conversation.message.create`: add a message to the conversation
/// without audio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversationMessageCreateEvent {
    pub role: MessageRole,
    pub content_type: MessageContentType,
    pub content: String,
}

impl ConversationMessageCreateEvent {
    /// A plain text user message.
    pub fn user_text(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content_type: MessageContentType::Text,
            content: content.into(),
        }
    }
}

impl UpstreamEvent for ConversationMessageCreateEvent {
    const EVENT_TYPE: &'static str = "conversation.message.create";
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConversationClearEvent;

impl UpstreamEvent for ConversationClearEvent {
    const EVENT_TYPE: &'static str = "conversation.clear";
}

/// `conversation.chat.submit_tool_outputs`: answer a `requires_action` chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversationChatSubmitToolOutputsEvent {
    pub chat_id: String,
    pub tool_outputs: Vec<ToolOutput>,
}

impl UpstreamEvent for ConversationChatSubmitToolOutputsEvent {
    const EVENT_TYPE: &'static str = "conversation.chat.submit_tool_outputs";
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConversationChatCancelEvent;

impl UpstreamEvent for ConversationChatCancelEvent {
    const EVENT_TYPE: &'static str = "conversation.chat.cancel";
}

// =============================================================================
// Downstream: Session
// =============================================================================

downstream_event! {
    ChatCreatedEvent => "chat.created"
}

downstream_event! {
    ChatUpdatedEvent => "chat.updated", data: Option<ChatUpdateData>
}

downstream_event! {
    ConversationClearedEvent => "conversation.cleared"
}

// =============================================================================
// Downstream: Chat Turn
// =============================================================================

downstream_event! {
    ConversationChatCreatedEvent => "conversation.chat.created", data: Chat
}

downstream_event! {
    ConversationChatInProgressEvent => "conversation.chat.in_progress",
    data: Chat
}

downstream_event! {
    /// The bot called a tool and waits for
    /// `conversation.chat.submit_tool_outputs`.
    ConversationChatRequiresActionEvent => "conversation.chat.requires_action",
    data: Chat
}

downstream_event! {
    ConversationChatCompletedEvent => "conversation.chat.completed",
    data: Chat
}

downstream_event! {
    ConversationChatFailedEvent => "conversation.chat.failed", data: Chat
}

downstream_event! {
    ConversationChatCanceledEvent => "conversation.chat.canceled",
    data: Chat
}

// =============================================================================
// Downstream: Messages and Audio
// =============================================================================

downstream_event! {
    /// Incremental text of the bot's answer.
    ConversationMessageDeltaEvent => "conversation.message.delta", data: Message
}

downstream_event! {
    ConversationMessageCompletedEvent => "conversation.message.completed", data: Message
}

downstream_event! {
    /// One chunk of the bot's spoken answer; `data.content` is base64 audio.
    ConversationAudioDeltaEvent => "conversation.audio.delta", data: Message
}

downstream_event! {
    ConversationAudioCompletedEvent => "conversation.audio.completed", data: Option<Message>
}

impl ConversationAudioDeltaEvent {
    /// Raw audio bytes of this chunk.
    pub fn decoded_audio(&self) -> WebsocketResult<Vec<u8>> {
        self.data.decoded_audio()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AudioTranscriptData {
    #[serde(default)]
    pub content: String,
}

downstream_event! {
    /// Running transcript of the user's speech.
    ConversationAudioTranscriptUpdateEvent => "conversation.audio_transcript.update",
    data: AudioTranscriptData
}

downstream_event! {
    ConversationAudioTranscriptCompletedEvent => "conversation.audio_transcript.completed",
    data: AudioTranscriptData
}

downstream_event! {
    /// Server-side voice activity detection heard the user start talking.
    InputAudioBufferSpeechStartedEvent => "input_audio_buffer.speech_started"
}

downstream_event! {
    InputAudioBufferSpeechStoppedEvent => "input_audio_buffer.speech_stopped"
}
