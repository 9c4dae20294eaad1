//! Generic WebSocket event-protocol session engine.
//!
//! The engine owns one socket per session, serializes outbound typed
//! events, decodes inbound frames through a per-protocol catalog and
//! dispatches them to a caller-supplied handler from a single worker.
//! Sub-protocols (speech, transcriptions, chat) plug in through
//! [`Protocol`].

pub mod base;
pub mod catalog;
pub mod codec;
pub mod isolation;
pub(crate) mod macros;
pub mod protocol;
pub mod session;
pub mod transport;

pub use base::{
    CLOSE_ABNORMAL, CLOSE_NO_STATUS, CLOSE_NORMAL, SessionState, WebsocketError, WebsocketResult,
};
pub use catalog::{DISCRIMINATOR_FIELD, Decoded, DownstreamEvent, EventCatalog};
pub use codec::{UpstreamEvent, encode, encode_with_id};
pub use protocol::{BaseCallbackHandler, Protocol};
pub use session::{DISPATCH_QUEUE_CAPACITY, WebsocketClient};
pub use transport::{ConnectRequest, FrameSink, FrameStream, Transport, TungsteniteTransport};
