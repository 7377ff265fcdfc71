//! Barge-in handling.
//!
//! Split in two halves so the state change happens under the session lock and
//! the socket sends happen after it is released:
//!
//! 1. [`plan`] computes the truncation point and resets playback bookkeeping in
//!    one critical section. The other relay never sees a half-reset state.
//! 2. [`execute`] sends the truncate command to the backend and the clear
//!    command to the client.

use tokio::sync::mpsc;
use tracing::{debug, info};

use super::error::{RelayError, RelayResult};
use super::frames::{BackendCommand, ClientCommand};
use crate::core::session::SessionState;

/// Truncation to apply after the caller started speaking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interruption {
    /// Response item being cut off
    pub item_id: String,
    /// Caller-perceived playback time of the item, in milliseconds
    pub offset_ms: u32,
    /// Stream whose playback buffer must be flushed
    pub stream_id: Option<String>,
}

/// Compute the interruption for `state` and reset its playback bookkeeping.
///
/// Returns `None` and leaves `state` untouched when no response is in flight.
pub fn plan(state: &mut SessionState) -> Option<Interruption> {
    let item_id = state.active_response_item()?.to_string();
    let start = state.response_start_timestamp()?;
    let latest = state.latest_inbound_timestamp();

    let elapsed = latest.saturating_sub(start);
    let offset_ms = u32::try_from(elapsed).unwrap_or(u32::MAX);

    debug!(
        "Truncation timing: latest={}ms start={}ms elapsed={}ms pending_acks={}",
        latest,
        start,
        elapsed,
        state.pending_acks().len()
    );

    let stream_id = state.stream_id().map(str::to_string);
    state.reset_playback();

    Some(Interruption {
        item_id,
        offset_ms,
        stream_id,
    })
}

/// Send the truncate and clear commands for `interruption`.
pub async fn execute(
    interruption: Interruption,
    backend: &mpsc::Sender<BackendCommand>,
    client: &mpsc::Sender<ClientCommand>,
) -> RelayResult<()> {
    info!(
        "Interrupting response {} at {}ms",
        interruption.item_id, interruption.offset_ms
    );

    backend
        .send(BackendCommand::Truncate {
            item_id: interruption.item_id,
            offset_ms: interruption.offset_ms,
        })
        .await
        .map_err(|_| RelayError::BackendClosed)?;

    client
        .send(ClientCommand::Clear {
            stream_id: interruption.stream_id,
        })
        .await
        .map_err(|_| RelayError::ClientClosed)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn streaming_state() -> SessionState {
        let mut state = SessionState::new();
        state.start_stream("S1");
        state.record_inbound(0);
        state.begin_response("R1");
        state.issue_ack();
        state.record_inbound(500);
        state
    }

    #[test]
    fn test_plan_computes_elapsed_and_resets() {
        let mut state = streaming_state();

        let interruption = plan(&mut state).unwrap();
        assert_eq!(
            interruption,
            Interruption {
                item_id: "R1".to_string(),
                offset_ms: 500,
                stream_id: Some("S1".to_string()),
            }
        );
        assert!(!state.has_active_response());
        assert_eq!(state.response_start_timestamp(), None);
        assert!(state.pending_acks().is_empty());
        assert_eq!(state.stream_id(), Some("S1"));
        assert_eq!(state.latest_inbound_timestamp(), 500);
    }

    #[test]
    fn test_plan_without_response_is_noop() {
        let mut state = SessionState::new();
        state.start_stream("S1");
        state.record_inbound(250);
        state.issue_ack();

        assert!(plan(&mut state).is_none());
        assert_eq!(state.pending_acks().len(), 1);
        assert_eq!(state.latest_inbound_timestamp(), 250);
    }

    #[test]
    fn test_plan_with_no_elapsed_time() {
        let mut state = SessionState::new();
        state.record_inbound(800);
        state.begin_response("R1");

        assert_eq!(plan(&mut state).unwrap().offset_ms, 0);
    }

    #[test]
    fn test_plan_clamps_large_offsets() {
        let mut state = SessionState::new();
        state.begin_response("R1");
        state.record_inbound(u64::from(u32::MAX) + 10);

        assert_eq!(plan(&mut state).unwrap().offset_ms, u32::MAX);
    }

    #[tokio::test]
    async fn test_execute_sends_truncate_then_clear() {
        let (backend_tx, mut backend_rx) = mpsc::channel(4);
        let (client_tx, mut client_rx) = mpsc::channel(4);

        let interruption = Interruption {
            item_id: "R1".to_string(),
            offset_ms: 500,
            stream_id: Some("S1".to_string()),
        };
        execute(interruption, &backend_tx, &client_tx).await.unwrap();

        assert_eq!(
            backend_rx.try_recv().unwrap(),
            BackendCommand::Truncate {
                item_id: "R1".to_string(),
                offset_ms: 500
            }
        );
        assert_eq!(
            client_rx.try_recv().unwrap(),
            ClientCommand::Clear {
                stream_id: Some("S1".to_string())
            }
        );
    }

    #[tokio::test]
    async fn test_execute_reports_closed_backend() {
        let (backend_tx, backend_rx) = mpsc::channel(1);
        let (client_tx, _client_rx) = mpsc::channel(1);
        drop(backend_rx);

        let interruption = Interruption {
            item_id: "R1".to_string(),
            offset_ms: 10,
            stream_id: None,
        };
        let result = execute(interruption, &backend_tx, &client_tx).await;
        assert!(matches!(result, Err(RelayError::BackendClosed)));
    }
}
