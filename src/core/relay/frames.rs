//! Protocol-neutral frames exchanged between the relays and the two sockets.
//!
//! Wire protocols (Twilio Media Streams on the client side, OpenAI Realtime on
//! the backend side) are decoded into these types by their transport adapters,
//! so the relay core never looks at JSON.

use bytes::Bytes;

/// Frame received from the client (telephony or browser media stream).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientFrame {
    /// Client connected; no stream yet
    Connected,
    /// A new media stream started
    StreamStarted { stream_id: String },
    /// Caller audio with its media timestamp (ms)
    Media { timestamp: u64, payload: Bytes },
    /// Client finished playing a chunk that carried this mark
    Mark { name: Option<String> },
    /// Client ended the stream
    Stopped,
}

/// Frame sent to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    /// AI audio for playback
    Media {
        stream_id: Option<String>,
        payload: Bytes,
    },
    /// Playback mark; the client echoes `name` once the preceding audio played
    Mark { stream_id: String, name: String },
    /// Flush audio buffered for playback
    Clear { stream_id: Option<String> },
    /// Assistant transcript fragment (browser clients)
    Transcript { content: String },
    /// Backend status event (browser clients)
    Status {
        kind: String,
        message: Option<String>,
    },
}

/// Frame received from the AI backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendFrame {
    /// Chunk of response audio, tied to a response item when the backend
    /// names one
    AudioDelta {
        item_id: Option<String>,
        payload: Bytes,
    },
    /// Backend VAD detected the caller speaking
    SpeechStarted { audio_start_ms: Option<u64> },
    /// Assistant transcript fragment
    TranscriptDelta { delta: String },
    /// Anything else; pass-through only
    Informational {
        kind: String,
        message: Option<String>,
    },
}

/// Command sent to the AI backend.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCommand {
    /// Session configuration, passed through untouched
    Configure(serde_json::Value),
    /// Caller audio in the backend's format
    AppendAudio(Bytes),
    /// Discard response content past `offset_ms` of caller-perceived time
    Truncate { item_id: String, offset_ms: u32 },
    /// Seed the conversation with a prompt and ask for a response
    Greet { prompt: String },
}
