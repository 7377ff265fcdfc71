//! OpenAI Realtime API WebSocket message types.
//!
//! Only the events the relay sends or reacts to are typed; every other server
//! event is kept by name and passed through as informational.
//!
//! Client events (sent to server):
//! - session.update
//! - input_audio_buffer.append
//! - conversation.item.create
//! - conversation.item.truncate
//! - response.create
//!
//! Server events (received from server):
//! - error
//! - session.created / session.updated
//! - input_audio_buffer.speech_started
//! - response.audio.delta
//! - response.audio_transcript.delta
//! - response.done
//! - anything else, by name

use base64::prelude::*;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::config::{Modality, OpenAIRealtimeAudioFormat, OpenAIRealtimeVoice};
use crate::config::RealtimeSettings;
use crate::core::relay::{BackendCommand, BackendFrame, ClientKind, RelayError, RelayResult};

// =============================================================================
// Session Configuration
// =============================================================================

/// Session configuration sent in `session.update`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub turn_detection: TurnDetection,
    pub input_audio_format: OpenAIRealtimeAudioFormat,
    pub output_audio_format: OpenAIRealtimeAudioFormat,
    pub voice: OpenAIRealtimeVoice,
    /// System instructions for the assistant
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    pub modalities: Vec<Modality>,
    pub temperature: f32,
}

impl SessionConfig {
    /// Session configuration for a client of the given kind.
    pub fn for_client(settings: &RealtimeSettings, kind: ClientKind) -> Self {
        let format = OpenAIRealtimeAudioFormat::for_client(kind);
        Self {
            turn_detection: TurnDetection::ServerVad {
                threshold: None,
                prefix_padding_ms: None,
                silence_duration_ms: None,
            },
            input_audio_format: format,
            output_audio_format: format,
            voice: OpenAIRealtimeVoice::parse(&settings.voice).unwrap_or_default(),
            instructions: Some(settings.instructions.clone()).filter(|i| !i.is_empty()),
            modalities: vec![Modality::Text, Modality::Audio],
            temperature: settings.temperature,
        }
    }

    /// Opaque form handed to the relay core.
    pub fn to_value(&self) -> RelayResult<serde_json::Value> {
        serde_json::to_value(self).map_err(|e| RelayError::Serialization(e.to_string()))
    }
}

/// Turn detection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TurnDetection {
    /// Server-side VAD
    #[serde(rename = "server_vad")]
    ServerVad {
        #[serde(skip_serializing_if = "Option::is_none")]
        threshold: Option<f32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        prefix_padding_ms: Option<u32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        silence_duration_ms: Option<u32>,
    },
}

// =============================================================================
// Conversation Items
// =============================================================================

/// Conversation item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub item_type: String,
    /// Item role (user, assistant, system)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<ContentPart>,
}

impl ConversationItem {
    /// A user text message.
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            id: None,
            item_type: "message".to_string(),
            role: Some("user".to_string()),
            content: vec![ContentPart {
                content_type: "input_text".to_string(),
                text: Some(text.into()),
            }],
        }
    }
}

/// Content part within a conversation item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentPart {
    /// Content type (input_text, input_audio, text, audio)
    #[serde(rename = "type")]
    pub content_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

// =============================================================================
// Client Events (sent to server)
// =============================================================================

/// Client events sent to the OpenAI Realtime API.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    /// Update session configuration
    #[serde(rename = "session.update")]
    SessionUpdate { session: serde_json::Value },

    /// Append audio to input buffer
    #[serde(rename = "input_audio_buffer.append")]
    InputAudioBufferAppend {
        /// Base64-encoded audio data
        audio: String,
    },

    /// Create a conversation item
    #[serde(rename = "conversation.item.create")]
    ConversationItemCreate { item: ConversationItem },

    /// Truncate a conversation item
    #[serde(rename = "conversation.item.truncate")]
    ConversationItemTruncate {
        item_id: String,
        content_index: u32,
        /// Audio end in ms
        audio_end_ms: u32,
    },

    /// Create a response
    #[serde(rename = "response.create")]
    ResponseCreate,
}

impl ClientEvent {
    /// Create an audio append event from raw bytes.
    pub fn audio_append(data: &[u8]) -> Self {
        ClientEvent::InputAudioBufferAppend {
            audio: BASE64_STANDARD.encode(data),
        }
    }

    /// Wire events for one relay command.
    pub fn from_command(command: BackendCommand) -> Vec<Self> {
        match command {
            BackendCommand::Configure(session) => vec![ClientEvent::SessionUpdate { session }],
            BackendCommand::AppendAudio(audio) => vec![ClientEvent::audio_append(&audio)],
            BackendCommand::Truncate { item_id, offset_ms } => {
                vec![ClientEvent::ConversationItemTruncate {
                    item_id,
                    content_index: 0,
                    audio_end_ms: offset_ms,
                }]
            }
            BackendCommand::Greet { prompt } => vec![
                ClientEvent::ConversationItemCreate {
                    item: ConversationItem::user_text(prompt),
                },
                ClientEvent::ResponseCreate,
            ],
        }
    }
}

// =============================================================================
// Server Events (received from server)
// =============================================================================

/// Server events the relay acts on.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    #[serde(rename = "error")]
    Error {
        #[serde(default)]
        error: Option<ApiError>,
    },

    #[serde(rename = "session.created")]
    SessionCreated {
        #[serde(default)]
        session: Option<Session>,
    },

    #[serde(rename = "session.updated")]
    SessionUpdated {
        #[serde(default)]
        session: Option<Session>,
    },

    /// Speech started (VAD detected speech)
    #[serde(rename = "input_audio_buffer.speech_started")]
    SpeechStarted {
        #[serde(default)]
        audio_start_ms: Option<u64>,
        #[serde(default)]
        item_id: Option<String>,
    },

    /// Audio delta (audio data chunk)
    #[serde(rename = "response.audio.delta")]
    AudioDelta {
        #[serde(default)]
        response_id: Option<String>,
        #[serde(default)]
        item_id: Option<String>,
        /// Base64-encoded audio delta
        delta: String,
    },

    /// Audio transcript delta
    #[serde(rename = "response.audio_transcript.delta")]
    AudioTranscriptDelta {
        #[serde(default)]
        item_id: Option<String>,
        delta: String,
    },

    #[serde(rename = "response.done")]
    ResponseDone {
        #[serde(default)]
        response: Option<Response>,
    },

    /// Any other event
    #[serde(other)]
    Other,
}

/// Events the relay acts on; a body that does not fit is an error.
const SHAPED_EVENT_KINDS: &[&str] = &[
    "response.audio.delta",
    "input_audio_buffer.speech_started",
    "response.audio_transcript.delta",
];

#[derive(Deserialize)]
struct EventKind {
    #[serde(rename = "type")]
    kind: String,
}

/// Decode a server text frame into a relay frame.
pub fn decode_server_event(text: &str) -> RelayResult<BackendFrame> {
    let value: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| RelayError::MalformedFrame(format!("invalid backend JSON: {e}")))?;
    let EventKind { kind } = EventKind::deserialize(&value)
        .map_err(|e| RelayError::MalformedFrame(format!("backend event without type: {e}")))?;
    let event = match ServerEvent::deserialize(&value) {
        Ok(event) => event,
        Err(e) if SHAPED_EVENT_KINDS.contains(&kind.as_str()) => {
            return Err(RelayError::MalformedFrame(format!("invalid {kind} event: {e}")));
        }
        Err(e) => {
            // Pass-through events keep their name even when the body is odd
            debug!("Unexpected {} event body: {}", kind, e);
            return Ok(BackendFrame::Informational {
                kind,
                message: None,
            });
        }
    };

    let frame = match event {
        ServerEvent::AudioDelta { item_id, delta, .. } => {
            let audio = BASE64_STANDARD
                .decode(delta.as_bytes())
                .map_err(|e| RelayError::MalformedFrame(format!("invalid audio delta: {e}")))?;
            BackendFrame::AudioDelta {
                item_id,
                payload: Bytes::from(audio),
            }
        }
        ServerEvent::SpeechStarted { audio_start_ms, .. } => {
            BackendFrame::SpeechStarted { audio_start_ms }
        }
        ServerEvent::AudioTranscriptDelta { delta, .. } => BackendFrame::TranscriptDelta { delta },
        ServerEvent::Error { error } => BackendFrame::Informational {
            kind,
            message: error.and_then(|error| error.summary()),
        },
        ServerEvent::SessionCreated { session } | ServerEvent::SessionUpdated { session } => {
            BackendFrame::Informational {
                kind,
                message: session.and_then(|session| session.id),
            }
        }
        ServerEvent::ResponseDone { response } => BackendFrame::Informational {
            kind,
            message: response.and_then(|response| response.status),
        },
        ServerEvent::Other => BackendFrame::Informational {
            kind,
            message: None,
        },
    };
    Ok(frame)
}

// =============================================================================
// Supporting Types
// =============================================================================

/// API error information.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiError {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiError {
    /// `type: message`, or whichever part is present.
    pub fn summary(&self) -> Option<String> {
        match (&self.error_type, &self.message) {
            (Some(error_type), Some(message)) => Some(format!("{error_type}: {message}")),
            (Some(only), None) | (None, Some(only)) => Some(only.clone()),
            (None, None) => None,
        }
    }
}

/// Session information.
#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

/// Response information.
#[derive(Debug, Clone, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

// =============================================================================
// Tests
// =============================================================================
