//! Per-call session state.
//!
//! One [`SessionState`] exists per active call. It is shared by the inbound
//! and outbound relays through [`SharedSession`], a single mutex that every
//! mutation goes through. Critical sections are synchronous; no lock is ever
//! held across an `.await`.

mod acks;
mod state;
mod timestamp;

use std::sync::Arc;

use parking_lot::Mutex;

pub use acks::AckQueue;
pub use state::SessionState;
pub use timestamp::TimestampTracker;

/// Session state guarded for access from both relays.
pub type SharedSession = Arc<Mutex<SessionState>>;

/// Create a fresh shared session.
pub fn new_shared_session() -> SharedSession {
    Arc::new(Mutex::new(SessionState::new()))
}
