//! Wire types for the transcription sub-protocol.

use serde::{Deserialize, Serialize};

use crate::core::models::InputAudio;
use crate::core::websocket::UpstreamEvent;
use crate::core::websocket::macros::downstream_event;

/// Session settings carried by `transcriptions.update` and echoed by
/// `transcriptions.updated`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptionsUpdateData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_audio: Option<InputAudio>,
}

/// `transcriptions.update`: change input audio settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TranscriptionsUpdateEvent {
    pub data: TranscriptionsUpdateData,
}

impl UpstreamEvent for TranscriptionsUpdateEvent {
    const EVENT_TYPE: &'static str = "transcriptions.update";
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TranscriptionsMessageUpdateData {
    /// Transcript recognized so far for the current utterance
    #[serde(default)]
    pub content: String,
}

downstream_event! {
    TranscriptionsCreatedEvent => "transcriptions.created"
}

downstream_event! {
    TranscriptionsUpdatedEvent => "transcriptions.updated", data: Option<TranscriptionsUpdateData>
}

downstream_event! {
    /// Incremental transcript. Each update supersedes the previous one.
    TranscriptionsMessageUpdateEvent => "transcriptions.message.update",
    data: TranscriptionsMessageUpdateData
}

downstream_event! {
    /// Transcription of the committed audio is final.
    TranscriptionsMessageCompletedEvent => "transcriptions.message.completed"
}
