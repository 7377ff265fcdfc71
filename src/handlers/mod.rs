//! HTTP and WebSocket request handlers
//!
//! - `api` - Health and status endpoints
//! - `voice` - Call setup (TwiML) for telephony clients
//! - `stream` - Media stream WebSockets (telephony and browser)

pub mod api;
pub mod stream;
pub mod voice;

pub use stream::{browser_stream_handler, media_stream_handler};
pub use voice::incoming_call;
