pub mod audio;
pub mod chat;
pub mod models;
pub mod websocket;

pub use audio::speech::{SpeechCallbackHandler, SpeechProtocol, WebsocketAudioSpeechClient};
pub use audio::transcriptions::{
    TranscriptionsCallbackHandler, TranscriptionsProtocol, WebsocketAudioTranscriptionsClient,
};
pub use chat::{ChatCallbackHandler, ChatCreateRequest, ChatProtocol, WebsocketChatClient};
pub use websocket::{
    BaseCallbackHandler, ConnectRequest, Protocol, SessionState, Transport, TungsteniteTransport,
    WebsocketClient, WebsocketError, WebsocketResult,
};
