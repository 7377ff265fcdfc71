//! Client -> backend direction.

use std::ops::ControlFlow;
use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::error::{RelayError, RelayResult};
use super::frames::{BackendCommand, ClientFrame};
use super::link::FrameStream;
use crate::core::codec::AudioCodec;
use crate::core::session::SharedSession;

/// Consumes client frames, updates the session and forwards caller audio.
pub struct InboundRelay {
    session: SharedSession,
    backend: mpsc::Sender<BackendCommand>,
    codec: Arc<dyn AudioCodec>,
}

impl InboundRelay {
    pub fn new(
        session: SharedSession,
        backend: mpsc::Sender<BackendCommand>,
        codec: Arc<dyn AudioCodec>,
    ) -> Self {
        Self {
            session,
            backend,
            codec,
        }
    }

    /// Drive the relay until the client disconnects or a fatal error occurs.
    ///
    /// Per-frame errors are logged and skipped.
    pub async fn run(&self, mut frames: FrameStream<ClientFrame>) -> RelayResult<()> {
        while let Some(next) = frames.next().await {
            let outcome = match next {
                Ok(frame) => self.handle_frame(frame).await,
                Err(e) => Err(e),
            };

            match outcome {
                Ok(ControlFlow::Continue(())) => {}
                Ok(ControlFlow::Break(())) => return Ok(()),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => warn!("Dropping client frame: {}", e),
            }
        }

        debug!("Client frame stream ended");
        Ok(())
    }

    /// Apply one client frame. `Break` means the client ended the stream.
    pub async fn handle_frame(&self, frame: ClientFrame) -> RelayResult<ControlFlow<()>> {
        match frame {
            ClientFrame::Connected => {
                debug!("Client connected");
            }
            ClientFrame::StreamStarted { stream_id } => {
                info!("Incoming stream has started {}", stream_id);
                self.session.lock().start_stream(stream_id);
            }
            ClientFrame::Media { timestamp, payload } => {
                if !self.session.lock().record_inbound(timestamp) {
                    warn!("Ignoring regressing media timestamp {}", timestamp);
                }

                if self.backend.is_closed() {
                    debug!("Backend not open, dropping caller audio");
                    return Ok(ControlFlow::Continue(()));
                }

                let audio = self.codec.decode(payload)?;
                self.backend
                    .send(BackendCommand::AppendAudio(audio))
                    .await
                    .map_err(|_| RelayError::BackendClosed)?;
            }
            ClientFrame::Mark { name } => {
                let popped = self.session.lock().acknowledge();
                debug!("Playback mark {:?} acknowledged (popped {:?})", name, popped);
            }
            ClientFrame::Stopped => {
                info!("Client stopped the stream");
                return Ok(ControlFlow::Break(()));
            }
        }
        Ok(ControlFlow::Continue(()))
    }
}
