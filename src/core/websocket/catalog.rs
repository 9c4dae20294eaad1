//! Downstream decoding: wire frames to typed protocol events.
//!
//! An [`EventCatalog`] maps a discriminator string to a decoder producing
//! the protocol's event enum. Catalogs are immutable once built and each
//! sub-protocol keeps a single process-wide instance.
//!
//! Decoding distinguishes three outcomes:
//!
//! - a known discriminator with a valid payload yields [`Decoded::Event`]
//! - a well-formed frame with an unregistered discriminator yields
//!   [`Decoded::Unknown`], which callers drop
//! - anything else (not JSON, no string `type`, payload not matching the
//!   registered schema) is a [`WebsocketError::DecodeError`]

use std::collections::HashMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::base::{WebsocketError, WebsocketResult};

/// Frame field carrying the event discriminator.
pub const DISCRIMINATOR_FIELD: &str = "type";

/// A server-to-client event with a fixed discriminator.
pub trait DownstreamEvent: DeserializeOwned {
    const EVENT_TYPE: &'static str;
}

type DecodeFn<E> = Box<dyn Fn(Value) -> serde_json::Result<E> + Send + Sync>;

/// Result of decoding one inbound frame.
#[derive(Debug)]
pub enum Decoded<E> {
    Event {
        event_type: &'static str,
        event: E,
    },
    Unknown { event_type: String, payload: Value },
}

/// Lookup table from discriminator to decoder.
pub struct EventCatalog<E> {
    decoders: HashMap<&'static str, DecodeFn<E>>,
}

impl<E: 'static> EventCatalog<E> {
    pub fn new() -> Self {
        Self {
            decoders: HashMap::new(),
        }
    }

    /// Register the decoder for `T`, wrapping decoded values with `wrap`.
    ///
    /// Each discriminator may be registered once.
    pub fn register<T>(mut self, wrap: fn(T) -> E) -> Self
    where
        T: DownstreamEvent + 'static,
    {
        debug_assert!(
            !self.decoders.contains_key(T::EVENT_TYPE),
            "duplicate discriminator {}",
            T::EVENT_TYPE
        );
        self.decoders.insert(
            T::EVENT_TYPE,
            Box::new(move |value| serde_json::from_value::<T>(value).map(wrap)),
        );
        self
    }

    pub fn contains(&self, event_type: &str) -> bool {
        self.decoders.contains_key(event_type)
    }

    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }

    /// Registered discriminators, sorted.
    pub fn event_types(&self) -> Vec<&'static str> {
        let mut types: Vec<_> = self.decoders.keys().copied().collect();
        types.sort_unstable();
        types
    }

    /// Decode a raw text frame.
    pub fn decode(&self, frame: &str) -> WebsocketResult<Decoded<E>> {
        let value: Value = serde_json::from_str(frame)
            .map_err(|e| WebsocketError::decode(format!("frame is not valid JSON: {e}")))?;

        let event_type = match value.get(DISCRIMINATOR_FIELD) {
            Some(Value::String(event_type)) => event_type.clone(),
            Some(_) => {
                return Err(WebsocketError::decode(format!(
                    "`{DISCRIMINATOR_FIELD}` field is not a string"
                )));
            }
            None => {
                return Err(WebsocketError::decode(format!(
                    "frame has no `{DISCRIMINATOR_FIELD}` field"
                )));
            }
        };

        match self.decoders.get_key_value(event_type.as_str()) {
            Some((&known, decoder)) => decoder(value)
                .map(|event| Decoded::Event {
                    event_type: known,
                    event,
                })
                .map_err(|e| WebsocketError::decode(format!("invalid payload for {known}: {e}"))),
            None => Ok(Decoded::Unknown {
                event_type,
                payload: value,
            }),
        }
    }
}

impl<E: 'static> Default for EventCatalog<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for EventCatalog<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<_> = self.decoders.keys().collect();
        types.sort_unstable();
        f.debug_struct("EventCatalog")
            .field("event_types", &types)
            .finish()
    }
}
