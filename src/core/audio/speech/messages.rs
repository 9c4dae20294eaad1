//! Wire types for the speech synthesis sub-protocol.

use serde::{Deserialize, Serialize};

use crate::core::models::{OutputAudio, decode_audio};
use crate::core::websocket::macros::downstream_event;
use crate::core::websocket::{UpstreamEvent, WebsocketResult};

// =============================================================================
// Upstream
// =============================================================================

/// Session settings carried by `speech.update` and echoed by `speech.updated`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeechUpdateData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_audio: Option<OutputAudio>,
}

/// `speech.update`: change output audio settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SpeechUpdateEvent {
    pub data: SpeechUpdateData,
}

impl UpstreamEvent for SpeechUpdateEvent {
    const EVENT_TYPE: &'static str = "speech.update";
}

/// `input_text_buffer.append`: add text to synthesize.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InputTextBufferAppendEvent {
    pub delta: String,
}

impl UpstreamEvent for InputTextBufferAppendEvent {
    const EVENT_TYPE: &'static str = "input_text_buffer.append";
}

/// `input_text_buffer.complete`: no more text follows for this utterance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InputTextBufferCompleteEvent;

impl UpstreamEvent for InputTextBufferCompleteEvent {
    const EVENT_TYPE: &'static str = "input_text_buffer.complete";
}

// =============================================================================
// Downstream
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SpeechAudioUpdateData {
    /// Base64 encoded audio chunk
    #[serde(default)]
    pub delta: String,
}

downstream_event! {
    /// The speech session is ready.
    SpeechCreatedEvent => "speech.created"
}

downstream_event! {
    /// Acknowledges a `speech.update`.
    SpeechUpdatedEvent => "speech.updated", data: Option<SpeechUpdateData>
}

downstream_event! {
    InputTextBufferCompletedEvent => "input_text_buffer.completed"
}

downstream_event! {
    /// One chunk of synthesized audio.
    SpeechAudioUpdateEvent => "speech.audio.update", data: SpeechAudioUpdateData
}

downstream_event! {
    /// All audio for the committed text has been sent.
    SpeechAudioCompletedEvent => "speech.audio.completed"
}

impl SpeechAudioUpdateEvent {
    /// Raw audio bytes of this chunk.
    pub fn decoded_delta(&self) -> WebsocketResult<Vec<u8>> {
        decode_audio(&self.data.delta)
    }
}
