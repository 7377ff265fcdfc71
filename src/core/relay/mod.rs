//! Per-call relay core.
//!
//! A session pairs one client link with one backend link:
//!
//! ```text
//! client frames  -> InboundRelay  -> SessionState -> backend commands
//! backend frames -> OutboundRelay -> SessionState -> client commands
//!                        |
//!                        +-> interruption (speech started while AI talks)
//! ```
//!
//! [`SessionOrchestrator`] runs both relays concurrently and tears the pair
//! down together when either side ends.

mod error;
mod frames;
pub mod interruption;
mod inbound;
mod link;
mod orchestrator;
mod outbound;
mod profile;

pub use error::{RelayError, RelayResult};
pub use frames::{BackendCommand, BackendFrame, ClientCommand, ClientFrame};
pub use inbound::InboundRelay;
pub use interruption::Interruption;
pub use link::{BackendLink, ClientLink, FrameStream, LINK_CHANNEL_CAPACITY, Link};
pub use orchestrator::{
    BackendConnector, SessionEnd, SessionEntry, SessionOrchestrator, SessionSnapshot,
};
pub use outbound::{LOGGED_EVENT_KINDS, OutboundRelay};
pub use profile::{ClientKind, SessionProfile};
