//! Mock sockets for relay tests.
//!
//! - `channel`: in-memory client and backend links driven over mpsc channels
//! - `realtime_mock`: WebSocket server speaking the OpenAI Realtime protocol

// Not every test binary uses every helper
#![allow(dead_code)]

pub mod channel;
pub mod realtime_mock;

use std::future::Future;
use std::time::Duration;

/// Upper bound for any single wait in a test.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Await `future`, panicking if it takes longer than [`TEST_TIMEOUT`].
pub async fn within<F: Future>(future: F) -> F::Output {
    tokio::time::timeout(TEST_TIMEOUT, future)
        .await
        .expect("timed out waiting in test")
}

/// Poll `condition` until it holds or [`TEST_TIMEOUT`] elapses.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    within(async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
}
