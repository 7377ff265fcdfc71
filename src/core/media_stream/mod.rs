//! Client-side media stream protocol.

mod messages;

pub use messages::{encode_command, parse_frame};
