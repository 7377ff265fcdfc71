//! Realtime AI backends.
//!
//! A backend is anything implementing
//! [`BackendConnector`](crate::core::relay::BackendConnector). OpenAI's
//! Realtime API is the only one shipped.

pub mod openai;

pub use openai::{OpenAIConnector, SessionConfig};
