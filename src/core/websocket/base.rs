//! Base types shared by every realtime session.
//!
//! This module defines the error taxonomy, the session lifecycle state
//! and the close-code constants used by the session engine and by the
//! per-protocol clients built on top of it.

use std::fmt;
use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur while running a realtime session.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WebsocketError {
    /// Transport handshake or connect failure
    #[error("Connection failed: {0}")]
    ConnectionError(String),

    /// Write attempted while not open, or the transport rejected the write
    #[error("Send failed: {0}")]
    SendError(String),

    /// Inbound frame could not be decoded
    #[error("Decode failed: {0}")]
    DecodeError(String),

    /// Abrupt disconnect or socket error on an open session
    #[error("Transport failure: {0}")]
    TransportFailure(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Outbound event could not be serialized
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A user callback panicked during dispatch
    #[error("Callback panicked: {0}")]
    CallbackPanicked(String),
}

impl WebsocketError {
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    pub fn send(msg: impl Into<String>) -> Self {
        Self::SendError(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::DecodeError(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::TransportFailure(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Whether this error ends the session it was raised on.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::TransportFailure(_))
    }
}

impl From<serde_json::Error> for WebsocketError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

/// Result type for realtime session operations.
pub type WebsocketResult<T> = Result<T, WebsocketError>;

// =============================================================================
// Lifecycle
// =============================================================================

/// Lifecycle state of a session.
///
/// `Idle -> Open -> {Closing -> Closed} | Failed`. `Closed` and `Failed`
/// are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Open,
    Closing,
    Closed,
    Failed,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Closed | Self::Failed)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "Idle"),
            SessionState::Open => write!(f, "Open"),
            SessionState::Closing => write!(f, "Closing"),
            SessionState::Closed => write!(f, "Closed"),
            SessionState::Failed => write!(f, "Failed"),
        }
    }
}

/// Normal application-initiated closure.
pub const CLOSE_NORMAL: u16 = 1000;

/// Close code reported when the peer closed without a status code.
pub const CLOSE_NO_STATUS: u16 = 1005;

/// Close code reported when the socket went away without a close frame.
pub const CLOSE_ABNORMAL: u16 = 1006;
