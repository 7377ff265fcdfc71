//! In-memory links.
//!
//! Each link is backed by two channels: the test pushes decoded frames in and
//! reads the commands the relay sent. A writer task stands in for the socket
//! writer and counts how many times the "socket" was closed.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use futures::stream;
use tokio::sync::mpsc;

use realtime_relay::core::relay::{
    BackendCommand, BackendConnector, BackendFrame, BackendLink, ClientCommand, ClientFrame,
    ClientLink, FrameStream, LINK_CHANNEL_CAPACITY, Link, RelayError, RelayResult, SessionProfile,
};

/// Test-side ends of a link.
pub struct Harness<In, Out> {
    /// Frames the relay will read; dropping it ends the frame stream
    pub frames: mpsc::UnboundedSender<RelayResult<In>>,
    /// Commands the relay wrote
    pub commands: mpsc::UnboundedReceiver<Out>,
    /// Times the writer closed its socket
    pub closed: Arc<AtomicUsize>,
}

impl<In, Out> Harness<In, Out> {
    pub fn send(&self, frame: In) {
        self.frames.send(Ok(frame)).expect("relay dropped frame stream");
    }

    pub fn send_result(&self, frame: RelayResult<In>) {
        self.frames.send(frame).expect("relay dropped frame stream");
    }

    pub async fn recv(&mut self) -> Out {
        super::within(self.commands.recv())
            .await
            .expect("link writer finished")
    }

    /// Commands already written, without waiting.
    pub fn drain(&mut self) -> Vec<Out> {
        let mut out = Vec::new();
        while let Ok(command) = self.commands.try_recv() {
            out.push(command);
        }
        out
    }

    pub fn close_count(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

pub type ClientHarness = Harness<ClientFrame, ClientCommand>;
pub type BackendHarness = Harness<BackendFrame, BackendCommand>;

/// Build a link and its test harness.
pub fn link_pair<In, Out>() -> (Link<In, Out>, Harness<In, Out>)
where
    In: Send + 'static,
    Out: Send + 'static,
{
    let (frames_tx, frames_rx) = mpsc::unbounded_channel::<RelayResult<In>>();
    let (commands_tx, commands_rx) = mpsc::unbounded_channel::<Out>();
    let (outbound_tx, mut outbound_rx) = mpsc::channel::<Out>(LINK_CHANNEL_CAPACITY);
    let closed = Arc::new(AtomicUsize::new(0));

    let writer_closed = closed.clone();
    let writer = tokio::spawn(async move {
        while let Some(command) = outbound_rx.recv().await {
            if commands_tx.send(command).is_err() {
                break;
            }
        }
        writer_closed.fetch_add(1, Ordering::SeqCst);
    });

    let frames: FrameStream<In> = Box::pin(stream::unfold(frames_rx, |mut rx| async move {
        rx.recv().await.map(|frame| (frame, rx))
    }));

    let link = Link::new(frames, outbound_tx).with_writer(writer);
    let harness = Harness {
        frames: frames_tx,
        commands: commands_rx,
        closed,
    };
    (link, harness)
}

pub fn client_pair() -> (ClientLink, ClientHarness) {
    link_pair()
}

/// Connector handing out in-memory backend links.
///
/// Each successful connect publishes its harness on the channel returned by
/// [`ChannelConnector::new`].
pub struct ChannelConnector {
    harnesses: mpsc::UnboundedSender<BackendHarness>,
    fail: AtomicBool,
    pub connects: AtomicUsize,
}

impl ChannelConnector {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<BackendHarness>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let connector = Arc::new(Self {
            harnesses: tx,
            fail: AtomicBool::new(false),
            connects: AtomicUsize::new(0),
        });
        (connector, rx)
    }

    /// Make every following connect attempt fail.
    pub fn fail_connections(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl BackendConnector for ChannelConnector {
    async fn connect(&self, _profile: &SessionProfile) -> RelayResult<BackendLink> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(RelayError::ConnectionFailed("mock backend unavailable".to_string()));
        }

        let (link, harness) = link_pair();
        self.harnesses
            .send(harness)
            .map_err(|_| RelayError::ConnectionFailed("test dropped harness receiver".to_string()))?;
        Ok(link)
    }
}
