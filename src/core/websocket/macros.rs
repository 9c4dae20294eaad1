//! Declaration macro for downstream event types.
//!
//! Every downstream event shares the same envelope (`id`, `detail`) and
//! differs only in its discriminator and optional `data` payload. The
//! macro generates the struct and its [`DownstreamEvent`] impl so a new
//! event is a one-line addition.
//!
//! A missing or `null` payload decodes to the payload's default value.
//! Only a payload of the wrong shape is a decode error.
//!
//! ```ignore
//! downstream_event! {
//!     /// Audio chunk for the current utterance.
//!     SpeechAudioUpdateEvent => "speech.audio.update", data: SpeechAudioUpdateData
//! }
//! ```
//!
//! [`DownstreamEvent`]: super::DownstreamEvent

use serde::{Deserialize, Deserializer};

/// Deserialize a field, reading `null` as `T::default()`.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

macro_rules! downstream_event {
    ($(#[$meta:meta])* $name:ident => $event_type:literal $(, data: $data:ty)? $(,)?) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, ::serde::Deserialize)]
        pub struct $name {
            /// Server-assigned event id
            #[serde(default)]
            pub id: Option<String>,
            #[serde(default)]
            pub detail: Option<$crate::core::models::EventDetail>,
            $(
                #[serde(
                    default,
                    deserialize_with = "crate::core::websocket::macros::null_as_default"
                )]
                pub data: $data,
            )?
        }

        impl $crate::core::websocket::DownstreamEvent for $name {
            const EVENT_TYPE: &'static str = $event_type;
        }
    };
}

pub(crate) use downstream_event;
