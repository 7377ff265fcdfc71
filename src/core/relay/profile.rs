use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::core::codec::{AudioCodec, PassthroughCodec};

/// Kind of client attached to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientKind {
    /// Telephony media stream (g711 u-law, marks, no status events)
    Telephony,
    /// Browser media stream (pcm16, transcripts and status events)
    Browser,
}

impl ClientKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientKind::Telephony => "telephony",
            ClientKind::Browser => "browser",
        }
    }
}

impl fmt::Display for ClientKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a session needs to know about its client and backend setup.
#[derive(Debug, Clone)]
pub struct SessionProfile {
    pub kind: ClientKind,
    /// Session configuration sent to the backend before any audio
    pub configure: serde_json::Value,
    /// Prompt for the opening response; `None` waits for the caller
    pub greeting: Option<String>,
    /// Forward transcripts and backend status events to the client
    pub forward_status: bool,
    pub codec: Arc<dyn AudioCodec>,
}

impl SessionProfile {
    pub fn new(kind: ClientKind, configure: serde_json::Value) -> Self {
        Self {
            kind,
            configure,
            greeting: None,
            forward_status: kind == ClientKind::Browser,
            codec: Arc::new(PassthroughCodec),
        }
    }

    pub fn with_greeting(mut self, greeting: Option<String>) -> Self {
        self.greeting = greeting.filter(|g| !g.trim().is_empty());
        self
    }

    pub fn with_codec(mut self, codec: Arc<dyn AudioCodec>) -> Self {
        self.codec = codec;
        self
    }
}
