//! Inbound media clock for a single call.

/// Tracks the most recent inbound media timestamp (milliseconds).
///
/// Clients may jitter, so a lower timestamp is not an error, but the tracked
/// value never moves backward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimestampTracker {
    latest: u64,
}

impl TimestampTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest accepted timestamp in milliseconds.
    #[inline]
    pub fn latest(&self) -> u64 {
        self.latest
    }

    /// Record an inbound timestamp.
    ///
    /// Returns `false` (and leaves the tracker untouched) when `ts` is lower
    /// than the current value.
    pub fn record(&mut self, ts: u64) -> bool {
        if ts < self.latest {
            return false;
        }
        self.latest = ts;
        true
    }

    pub fn reset(&mut self) {
        self.latest = 0;
    }
}
