pub mod codec;
pub mod media_stream;
pub mod realtime;
pub mod relay;
pub mod session;

// Re-export commonly used types for convenience
pub use codec::{AudioCodec, CodecError, PassthroughCodec};
pub use realtime::OpenAIConnector;
pub use relay::{
    BackendConnector, ClientKind, RelayError, RelayResult, SessionOrchestrator, SessionProfile,
};
pub use session::{SessionState, SharedSession};
