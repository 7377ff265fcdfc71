use thiserror::Error;

use crate::core::codec::CodecError;

/// Errors produced while relaying a call.
///
/// Frame-level errors are recovered where they happen (logged, frame dropped);
/// connection-level errors end the session. Use [`RelayError::is_fatal`] to
/// tell them apart.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Frame could not be decoded (bad JSON, missing or invalid field)
    #[error("Malformed frame: {0}")]
    MalformedFrame(String),

    /// Frame decoded but its event kind is not part of the protocol
    #[error("Unknown event kind: {0}")]
    UnknownEvent(String),

    /// Audio payload could not be converted
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// Client socket is gone
    #[error("Client connection closed")]
    ClientClosed,

    /// Backend socket is gone
    #[error("Backend connection closed")]
    BackendClosed,

    /// Transport failure on the client socket
    #[error("Client transport error: {0}")]
    ClientTransport(String),

    /// Transport failure on the backend socket
    #[error("Backend transport error: {0}")]
    BackendTransport(String),

    /// Backend connection could not be established
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Concurrent session limit reached
    #[error("Session capacity reached: {0} active sessions")]
    CapacityReached(usize),

    /// Outgoing frame could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl RelayError {
    /// Whether the error must tear the session down.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            RelayError::MalformedFrame(_)
                | RelayError::UnknownEvent(_)
                | RelayError::Codec(_)
                | RelayError::Serialization(_)
        )
    }
}

/// Result type for relay operations.
pub type RelayResult<T> = Result<T, RelayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_errors_are_transient() {
        assert!(!RelayError::MalformedFrame("missing timestamp".into()).is_fatal());
        assert!(!RelayError::UnknownEvent("dtmf".into()).is_fatal());
        assert!(!RelayError::Codec(CodecError::InvalidPayload("odd length".into())).is_fatal());
    }

    #[test]
    fn test_connection_errors_are_fatal() {
        assert!(RelayError::ClientClosed.is_fatal());
        assert!(RelayError::BackendClosed.is_fatal());
        assert!(RelayError::BackendTransport("reset".into()).is_fatal());
        assert!(RelayError::ConnectionFailed("refused".into()).is_fatal());
    }
}
