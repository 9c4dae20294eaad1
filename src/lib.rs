//! Realtime WebSocket client for the Coze speech, transcription and chat
//! event protocols.
//!
//! Sessions are opened through [`CozeWebsockets`]. Each session sends
//! typed upstream events and dispatches decoded downstream events to a
//! caller-supplied handler, one at a time and in arrival order.

pub mod client;
pub mod config;
pub mod core;
pub mod utils;

// Re-export commonly used items for convenience
pub use client::CozeWebsockets;
pub use config::ClientConfig;
pub use core::*;
