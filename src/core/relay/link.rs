//! Duplex socket handles used by the relay core.

use std::pin::Pin;

use futures::Stream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::error::RelayResult;
use super::frames::{BackendCommand, BackendFrame, ClientCommand, ClientFrame};

/// Channel capacity for frames queued towards a socket writer.
pub const LINK_CHANNEL_CAPACITY: usize = 1024;

/// Lazily decoded frames read from a socket. Ends on disconnect.
pub type FrameStream<T> = Pin<Box<dyn Stream<Item = RelayResult<T>> + Send>>;

/// One side of a session: decoded inbound frames plus a queue drained by the
/// task that owns the socket's write half.
///
/// Dropping every clone of `outbound` makes the writer close the socket; the
/// optional `writer` handle lets the owner wait for that to finish.
pub struct Link<In, Out> {
    pub frames: FrameStream<In>,
    pub outbound: mpsc::Sender<Out>,
    writer: Option<JoinHandle<()>>,
}

/// Client (telephony or browser) side of a session.
pub type ClientLink = Link<ClientFrame, ClientCommand>;

/// AI backend side of a session.
pub type BackendLink = Link<BackendFrame, BackendCommand>;

impl<In, Out> Link<In, Out> {
    pub fn new(frames: FrameStream<In>, outbound: mpsc::Sender<Out>) -> Self {
        Self {
            frames,
            outbound,
            writer: None,
        }
    }

    /// Attach the task that writes `outbound` to the socket.
    pub fn with_writer(mut self, writer: JoinHandle<()>) -> Self {
        self.writer = Some(writer);
        self
    }

    pub fn into_parts(self) -> (FrameStream<In>, mpsc::Sender<Out>, Option<JoinHandle<()>>) {
        (self.frames, self.outbound, self.writer)
    }

    /// Close the link: stop reading, release the sender and wait for the
    /// writer to shut the socket.
    pub async fn close(self) {
        let (frames, outbound, writer) = self.into_parts();
        drop(frames);
        drop(outbound);
        await_writer(writer).await;
    }
}

/// Wait for a socket writer to finish closing its socket.
pub(crate) async fn await_writer(writer: Option<JoinHandle<()>>) {
    if let Some(handle) = writer
        && let Err(e) = handle.await
    {
        tracing::warn!("Socket writer task failed: {}", e);
    }
}
