//! Input audio buffer events shared by the transcription and chat
//! sub-protocols.

use base64::prelude::*;
use serde::Serialize;

use crate::core::websocket::UpstreamEvent;
use crate::core::websocket::macros::downstream_event;

/// `input_audio_buffer.append`: one chunk of input audio, base64 encoded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InputAudioBufferAppendEvent {
    pub delta: String,
}

impl InputAudioBufferAppendEvent {
    /// Encode raw audio bytes.
    pub fn from_audio(audio: &[u8]) -> Self {
        Self {
            delta: BASE64_STANDARD.encode(audio),
        }
    }

    /// Wrap audio that is already base64 encoded.
    pub fn from_base64(delta: impl Into<String>) -> Self {
        Self {
            delta: delta.into(),
        }
    }
}

impl UpstreamEvent for InputAudioBufferAppendEvent {
    const EVENT_TYPE: &'static str = "input_audio_buffer.append";
}

/// `input_audio_buffer.complete`: commit the buffered audio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InputAudioBufferCompleteEvent;

impl UpstreamEvent for InputAudioBufferCompleteEvent {
    const EVENT_TYPE: &'static str = "input_audio_buffer.complete";
}

/// `input_audio_buffer.clear`: discard the buffered audio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InputAudioBufferClearEvent;

impl UpstreamEvent for InputAudioBufferClearEvent {
    const EVENT_TYPE: &'static str = "input_audio_buffer.clear";
}

downstream_event! {
    /// The server accepted the committed input audio.
    InputAudioBufferCompletedEvent => "input_audio_buffer.completed"
}

downstream_event! {
    /// The server discarded the buffered input audio.
    InputAudioBufferClearedEvent => "input_audio_buffer.cleared"
}
