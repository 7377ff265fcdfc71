//! Outstanding playback acknowledgments.

use std::collections::VecDeque;

/// Prefix for generated ack tokens (`ack-1`, `ack-2`, ...).
const ACK_TOKEN_PREFIX: &str = "ack";

/// FIFO of mark tokens sent to the client but not yet confirmed played.
///
/// Clients may acknowledge after the queue was cleared by an interruption or a
/// stream restart, so popping an empty queue is a no-op rather than an error.
#[derive(Debug, Clone, Default)]
pub struct AckQueue {
    pending: VecDeque<String>,
    /// Tokens issued over the life of the session; never reset
    issued: u64,
}

impl AckQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a token to the tail.
    pub fn push(&mut self, token: impl Into<String>) {
        self.pending.push_back(token.into());
    }

    /// Generate the next session-unique token, push it and return it.
    pub fn issue(&mut self) -> String {
        self.issued += 1;
        let token = format!("{ACK_TOKEN_PREFIX}-{}", self.issued);
        self.pending.push_back(token.clone());
        token
    }

    /// Remove and return the head, if any.
    pub fn pop_if_present(&mut self) -> Option<String> {
        self.pending.pop_front()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Pending tokens, head first.
    pub fn tokens(&self) -> Vec<String> {
        self.pending.iter().cloned().collect()
    }
}
