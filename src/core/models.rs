//! Payload models shared across the realtime sub-protocols.
//!
//! These are the structures carried in the `data` object of upstream and
//! downstream frames. Almost every field is optional: the server omits
//! what it does not know, and clients only set what they want changed.

use base64::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::websocket::macros::downstream_event;
use crate::core::websocket::{WebsocketError, WebsocketResult};

// =============================================================================
// Envelope
// =============================================================================

/// Server-side diagnostics attached to downstream frames.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDetail {
    /// Request log id, useful when reporting issues upstream
    #[serde(default)]
    pub logid: Option<String>,
}

/// Payload of the `error` event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorData {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub msg: String,
}

downstream_event! {
    /// Protocol-level error reported by the server. Shared by every
    /// sub-protocol under the reserved `error` discriminator.
    ErrorEvent => "error", data: ErrorData
}

/// Decode a base64 audio chunk as carried in `delta`/`content` fields.
pub(crate) fn decode_audio(encoded: &str) -> WebsocketResult<Vec<u8>> {
    BASE64_STANDARD
        .decode(encoded)
        .map_err(|e| WebsocketError::decode(format!("invalid base64 audio: {e}")))
}

// =============================================================================
// Audio Configuration
// =============================================================================

/// Input audio description for transcription and chat sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputAudio {
    /// Container format, e.g. "pcm", "wav", "ogg"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Codec, e.g. "pcm", "opus", "g711a"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codec: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bit_depth: Option<u16>,
}

impl InputAudio {
    /// 16-bit mono PCM at the given rate.
    pub fn pcm(sample_rate: u32) -> Self {
        Self {
            format: Some("pcm".to_string()),
            codec: Some("pcm".to_string()),
            sample_rate: Some(sample_rate),
            channel: Some(1),
            bit_depth: Some(16),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PcmConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_size_ms: Option<u32>,
}

/// Output audio description for speech and chat sessions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputAudio {
    /// Codec, e.g. "pcm", "opus"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codec: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pcm_config: Option<PcmConfig>,
    /// Speech rate in the range -50..=100, 0 being normal speed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speech_rate: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_id: Option<String>,
}

impl OutputAudio {
    /// PCM output at the given rate, optionally with a specific voice.
    pub fn pcm(sample_rate: u32, voice_id: Option<String>) -> Self {
        Self {
            codec: Some("pcm".to_string()),
            pcm_config: Some(PcmConfig {
                sample_rate: Some(sample_rate),
                frame_size_ms: None,
            }),
            speech_rate: None,
            voice_id,
        }
    }
}

// =============================================================================
// Chat Objects
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatStatus {
    Created,
    InProgress,
    Completed,
    Failed,
    RequiresAction,
    Canceled,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatUsage {
    #[serde(default)]
    pub token_count: i64,
    #[serde(default)]
    pub output_count: i64,
    #[serde(default)]
    pub input_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallFunction {
    pub name: String,
    #[serde(default)]
    pub arguments: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type", default)]
    pub call_type: String,
    pub function: ToolCallFunction,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitToolOutputs {
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
}

/// Action the server needs from the client before the chat can continue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredAction {
    #[serde(rename = "type")]
    pub action_type: String,
    #[serde(default)]
    pub submit_tool_outputs: Option<SubmitToolOutputs>,
}

/// One chat turn as reported by `conversation.chat.*` events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub conversation_id: String,
    #[serde(default)]
    pub bot_id: Option<String>,
    #[serde(default)]
    pub status: Option<ChatStatus>,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub completed_at: Option<i64>,
    #[serde(default)]
    pub failed_at: Option<i64>,
    #[serde(default)]
    pub last_error: Option<ErrorData>,
    #[serde(default)]
    pub usage: Option<ChatUsage>,
    #[serde(default)]
    pub required_action: Option<RequiredAction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageContentType {
    Text,
    ObjectString,
    Card,
    Audio,
    #[serde(other)]
    Unknown,
}

/// A conversation message, complete or partial.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub bot_id: Option<String>,
    #[serde(default)]
    pub chat_id: Option<String>,
    #[serde(default)]
    pub section_id: Option<String>,
    #[serde(default)]
    pub role: Option<MessageRole>,
    /// Message kind, e.g. "answer", "function_call", "follow_up"
    #[serde(rename = "type", default)]
    pub message_type: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub content_type: Option<MessageContentType>,
    #[serde(default)]
    pub reasoning_content: Option<String>,
}

impl Message {
    /// Decode `content` as base64 audio, for `conversation.audio.delta` frames.
    pub fn decoded_audio(&self) -> WebsocketResult<Vec<u8>> {
        decode_audio(&self.content)
    }
}

/// Conversation-level settings sent with `chat.update`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_save_history: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_data: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_variables: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_params: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub tool_call_id: String,
    pub output: String,
}
