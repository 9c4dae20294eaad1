//! Audio sub-protocols: speech synthesis and transcription sessions.

pub mod buffer;
pub mod speech;
pub mod transcriptions;

pub use buffer::{
    InputAudioBufferAppendEvent, InputAudioBufferClearEvent, InputAudioBufferClearedEvent,
    InputAudioBufferCompleteEvent, InputAudioBufferCompletedEvent,
};
pub use speech::{SpeechCallbackHandler, SpeechProtocol, WebsocketAudioSpeechClient};
pub use transcriptions::{
    TranscriptionsCallbackHandler, TranscriptionsProtocol, WebsocketAudioTranscriptionsClient,
};
