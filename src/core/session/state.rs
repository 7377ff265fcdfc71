//! Per-call relay state.

use super::acks::AckQueue;
use super::timestamp::TimestampTracker;

/// State shared by the inbound and outbound relays of one call.
///
/// `active_response_item` and `response_start_timestamp` are always set and
/// cleared together: a response is in flight iff both are `Some`.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    stream_id: Option<String>,
    timestamps: TimestampTracker,
    active_response_item: Option<String>,
    response_start_timestamp: Option<u64>,
    pending_acks: AckQueue,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stream_id(&self) -> Option<&str> {
        self.stream_id.as_deref()
    }

    pub fn latest_inbound_timestamp(&self) -> u64 {
        self.timestamps.latest()
    }

    pub fn active_response_item(&self) -> Option<&str> {
        self.active_response_item.as_deref()
    }

    pub fn response_start_timestamp(&self) -> Option<u64> {
        self.response_start_timestamp
    }

    pub fn pending_acks(&self) -> &AckQueue {
        &self.pending_acks
    }

    /// Whether an AI response is currently being streamed to the client.
    pub fn has_active_response(&self) -> bool {
        self.active_response_item.is_some()
    }

    /// A new call segment started: adopt the stream id and drop every piece
    /// of interruption bookkeeping from the previous segment.
    pub fn start_stream(&mut self, stream_id: impl Into<String>) {
        self.stream_id = Some(stream_id.into());
        self.timestamps.reset();
        self.clear_response();
        self.pending_acks.clear();
    }

    /// Record the timestamp of an inbound media frame.
    ///
    /// Returns `false` when the timestamp regressed and was ignored.
    pub fn record_inbound(&mut self, ts: u64) -> bool {
        self.timestamps.record(ts)
    }

    /// Mark `item_id` as the response being streamed.
    ///
    /// Only the first chunk of a response anchors the start timestamp; later
    /// chunks (even for a newer item of the same response) only move the item
    /// id forward. Returns `true` when this call anchored a new response.
    pub fn begin_response(&mut self, item_id: &str) -> bool {
        let anchored = if self.response_start_timestamp.is_none() {
            self.response_start_timestamp = Some(self.timestamps.latest());
            true
        } else {
            false
        };
        if self.active_response_item.as_deref() != Some(item_id) {
            self.active_response_item = Some(item_id.to_string());
        }
        anchored
    }

    pub fn clear_response(&mut self) {
        self.active_response_item = None;
        self.response_start_timestamp = None;
    }

    /// Issue an ack token for an audio chunk about to be sent to the client.
    pub fn issue_ack(&mut self) -> String {
        self.pending_acks.issue()
    }

    /// Client confirmed playback of the oldest outstanding chunk.
    pub fn acknowledge(&mut self) -> Option<String> {
        self.pending_acks.pop_if_present()
    }

    /// Forget the in-flight response and everything queued for playback.
    pub fn reset_playback(&mut self) {
        self.pending_acks.clear();
        self.clear_response();
    }
}
