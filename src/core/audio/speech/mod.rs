//! Speech synthesis over `/v1/audio/speech`.
//!
//! The client streams text with `input_text_buffer.append`, commits it
//! with `input_text_buffer.complete`, and receives base64 audio chunks as
//! `speech.audio.update` events followed by `speech.audio.completed`.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use coze_ws::{ClientConfig, CozeWebsockets};
//! use coze_ws::core::audio::speech::{
//!     SpeechAudioUpdateEvent, SpeechCallbackHandler, SpeechProtocol, WebsocketAudioSpeechClient,
//! };
//! use coze_ws::core::websocket::BaseCallbackHandler;
//!
//! struct Player;
//!
//! impl BaseCallbackHandler<SpeechProtocol> for Player {}
//!
//! #[async_trait]
//! impl SpeechCallbackHandler for Player {
//!     async fn on_speech_audio_update(
//!         &self,
//!         _client: &WebsocketAudioSpeechClient,
//!         event: SpeechAudioUpdateEvent,
//!     ) {
//!         let pcm = event.decoded_delta().unwrap_or_default();
//!         println!("{} bytes of audio", pcm.len());
//!     }
//! }
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let coze = CozeWebsockets::new(ClientConfig::from_env()?)?;
//! let client = coze.speech(Arc::new(Player)).await?;
//! client.input_text_buffer_append("hello").await?;
//! client.input_text_buffer_complete().await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod messages;


pub use client::{
    SpeechCallbackHandler, SpeechEvent, SpeechProtocol, WebsocketAudioSpeechClient,
};
pub use messages::{
    InputTextBufferAppendEvent, InputTextBufferCompleteEvent, InputTextBufferCompletedEvent,
    SpeechAudioCompletedEvent, SpeechAudioUpdateData, SpeechAudioUpdateEvent, SpeechCreatedEvent,
    SpeechUpdateData, SpeechUpdateEvent, SpeechUpdatedEvent,
};
