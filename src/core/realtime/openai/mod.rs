//! OpenAI Realtime API backend.
//!
//! # Audio Format
//!
//! Telephony sessions run the backend in G.711 u-law at 8kHz so media stream
//! payloads pass through untouched. Browser sessions use PCM 16-bit at 24kHz.

mod config;
mod connector;
mod messages;

pub use config::{
    DEFAULT_REALTIME_MODEL, DEFAULT_TEMPERATURE, Modality, OPENAI_REALTIME_URL,
    OpenAIRealtimeAudioFormat, OpenAIRealtimeVoice,
};
pub use connector::OpenAIConnector;
pub use messages::{ClientEvent, ServerEvent, SessionConfig, TurnDetection, decode_server_event};
