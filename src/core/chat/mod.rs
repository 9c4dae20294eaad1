//! Voice and text chat with a bot over `/v1/chat`.
//!
//! A chat session is opened against one bot (and optionally a workflow).
//! Each user turn, either committed audio or a `conversation.message.create`,
//! produces a `conversation.chat.*` lifecycle with message and audio deltas
//! in between.

mod client;
mod messages;


pub use client::{
    ChatCallbackHandler, ChatCreateRequest, ChatEvent, ChatProtocol, WebsocketChatClient,
};
pub use messages::*;
