//! Streaming transcription over `/v1/audio/transcriptions`.
//!
//! Audio goes up as base64 `input_audio_buffer.append` chunks and is
//! committed with `input_audio_buffer.complete`. The server answers with
//! `transcriptions.message.update` events carrying the running transcript
//! and a final `transcriptions.message.completed`.

mod client;
mod messages;

pub use client::{
    TranscriptionsCallbackHandler, TranscriptionsEvent, TranscriptionsProtocol,
    WebsocketAudioTranscriptionsClient,
};
pub use messages::{
    TranscriptionsCreatedEvent, TranscriptionsMessageCompletedEvent,
    TranscriptionsMessageUpdateData, TranscriptionsMessageUpdateEvent, TranscriptionsUpdateData,
    TranscriptionsUpdateEvent, TranscriptionsUpdatedEvent,
};
