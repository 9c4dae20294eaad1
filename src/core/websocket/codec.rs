//! Upstream codec: typed client events to wire frames.
//!
//! Every upstream event type owns its discriminator as an associated
//! constant, so a frame can never carry a `type` that disagrees with its
//! payload. The event value itself is the frame's `data` object.

use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use super::base::{WebsocketError, WebsocketResult};

/// A client-to-server event.
pub trait UpstreamEvent: Serialize {
    /// Wire discriminator emitted in the frame's `type` field.
    const EVENT_TYPE: &'static str;
}

#[derive(Serialize)]
struct Envelope<'a> {
    id: &'a str,
    #[serde(rename = "type")]
    event_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

/// Serialize an upstream event into a text frame with a fresh event id.
pub fn encode<E: UpstreamEvent>(event: &E) -> WebsocketResult<String> {
    encode_with_id(event, &Uuid::new_v4().to_string())
}

/// Serialize an upstream event into a text frame with the given event id.
pub fn encode_with_id<E: UpstreamEvent>(event: &E, id: &str) -> WebsocketResult<String> {
    let data = serde_json::to_value(event)
        .map_err(|e| WebsocketError::SerializationError(format!("{}: {e}", E::EVENT_TYPE)))?;

    let data = match data {
        Value::Null => None,
        Value::Object(map) if map.is_empty() => None,
        Value::Object(map) => Some(Value::Object(map)),
        other => {
            return Err(WebsocketError::SerializationError(format!(
                "{} payload must serialize to an object, got {other}",
                E::EVENT_TYPE
            )));
        }
    };

    let envelope = Envelope {
        id,
        event_type: E::EVENT_TYPE,
        data,
    };
    Ok(serde_json::to_string(&envelope)?)
}
