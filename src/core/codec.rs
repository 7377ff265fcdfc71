//! Audio codec boundary.
//!
//! The relay treats audio as opaque bytes. Conversion between the client's
//! wire format and the format the backend session was configured with happens
//! behind [`AudioCodec`], called once per frame at the relay boundary.
//!
//! - `decode`: client wire format -> backend format (inbound audio)
//! - `encode`: backend format -> client wire format (outbound audio)

use std::fmt;

use bytes::Bytes;
use thiserror::Error;

/// Errors raised by an audio codec. Always recoverable: the frame is dropped.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Invalid audio payload: {0}")]
    InvalidPayload(String),
}

pub type CodecResult<T> = Result<T, CodecError>;

/// Converts audio between the client and backend formats.
pub trait AudioCodec: Send + Sync + fmt::Debug {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Backend audio -> client wire format.
    fn encode(&self, raw: Bytes) -> CodecResult<Bytes>;

    /// Client wire format -> backend audio.
    fn decode(&self, wire: Bytes) -> CodecResult<Bytes>;
}

/// Codec for sessions where both sides already agree on the audio format
/// (`g711_ulaw` for telephony, `pcm16` for browsers).
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughCodec;

impl AudioCodec for PassthroughCodec {
    fn name(&self) -> &'static str {
        "passthrough"
    }

    #[inline]
    fn encode(&self, raw: Bytes) -> CodecResult<Bytes> {
        Ok(raw)
    }

    #[inline]
    fn decode(&self, wire: Bytes) -> CodecResult<Bytes> {
        Ok(wire)
    }
}
