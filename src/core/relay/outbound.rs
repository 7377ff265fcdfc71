//! Backend -> client direction.

use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::error::{RelayError, RelayResult};
use super::frames::{BackendCommand, BackendFrame, ClientCommand};
use super::interruption;
use super::link::FrameStream;
use crate::core::codec::AudioCodec;
use crate::core::session::SharedSession;

/// Backend event kinds worth an info-level log line.
pub const LOGGED_EVENT_KINDS: &[&str] = &[
    "error",
    "response.content.done",
    "rate_limits.updated",
    "response.done",
    "input_audio_buffer.committed",
    "input_audio_buffer.speech_stopped",
    "input_audio_buffer.speech_started",
    "session.created",
];

/// Consumes backend frames, streams AI audio to the client and triggers
/// interruptions.
pub struct OutboundRelay {
    session: SharedSession,
    client: mpsc::Sender<ClientCommand>,
    backend: mpsc::Sender<BackendCommand>,
    codec: Arc<dyn AudioCodec>,
    forward_status: bool,
}

impl OutboundRelay {
    pub fn new(
        session: SharedSession,
        client: mpsc::Sender<ClientCommand>,
        backend: mpsc::Sender<BackendCommand>,
        codec: Arc<dyn AudioCodec>,
    ) -> Self {
        Self {
            session,
            client,
            backend,
            codec,
            forward_status: false,
        }
    }

    /// Also forward transcripts and informational events to the client.
    pub fn with_status_forwarding(mut self, enabled: bool) -> Self {
        self.forward_status = enabled;
        self
    }

    /// Drive the relay until the backend disconnects or a fatal error occurs.
    pub async fn run(&self, mut frames: FrameStream<BackendFrame>) -> RelayResult<()> {
        while let Some(next) = frames.next().await {
            let outcome = match next {
                Ok(frame) => self.handle_frame(frame).await,
                Err(e) => Err(e),
            };

            match outcome {
                Ok(()) => {}
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => warn!("Dropping backend frame: {}", e),
            }
        }

        debug!("Backend frame stream ended");
        Err(RelayError::BackendClosed)
    }

    pub async fn handle_frame(&self, frame: BackendFrame) -> RelayResult<()> {
        match frame {
            BackendFrame::AudioDelta { item_id, payload } => {
                let audio = self.codec.encode(payload)?;

                // Marks go out only once the client named its stream; only
                // tokens carried by a sent mark can ever be acknowledged.
                let (anchored, stream_id, mark) = {
                    let mut state = self.session.lock();
                    let anchored = match item_id.as_deref() {
                        Some(item_id) => state.begin_response(item_id),
                        None => false,
                    };
                    let stream_id = state.stream_id().map(str::to_string);
                    let mark = stream_id.clone().map(|stream_id| ClientCommand::Mark {
                        stream_id,
                        name: state.issue_ack(),
                    });
                    (anchored, stream_id, mark)
                };

                match &item_id {
                    Some(item_id) if anchored => debug!("Response {} started streaming", item_id),
                    None => debug!("Audio delta without item id; response not tracked"),
                    _ => {}
                }

                self.send_client(ClientCommand::Media {
                    stream_id,
                    payload: audio,
                })
                .await?;

                if let Some(mark) = mark {
                    self.send_client(mark).await?;
                }
            }
            BackendFrame::SpeechStarted { audio_start_ms } => {
                info!("Speech started detected (audio_start_ms={:?})", audio_start_ms);

                let planned = interruption::plan(&mut self.session.lock());
                match planned {
                    Some(interruption) => {
                        interruption::execute(interruption, &self.backend, &self.client).await?;
                    }
                    None => debug!("No active response to interrupt"),
                }

                self.forward_status("input_audio_buffer.speech_started", None)
                    .await?;
            }
            BackendFrame::TranscriptDelta { delta } => {
                if self.forward_status {
                    self.send_client(ClientCommand::Transcript { content: delta })
                        .await?;
                }
            }
            BackendFrame::Informational { kind, message } => {
                if kind == "error" {
                    warn!("Backend reported error: {}", message.as_deref().unwrap_or("-"));
                } else if LOGGED_EVENT_KINDS.contains(&kind.as_str()) {
                    info!("Received backend event: {}", kind);
                } else {
                    debug!("Received backend event: {}", kind);
                }
                self.forward_status(&kind, message).await?;
            }
        }
        Ok(())
    }

    async fn forward_status(&self, kind: &str, message: Option<String>) -> RelayResult<()> {
        if !self.forward_status {
            return Ok(());
        }
        self.send_client(ClientCommand::Status {
            kind: kind.to_string(),
            message,
        })
        .await
    }

    async fn send_client(&self, command: ClientCommand) -> RelayResult<()> {
        self.client
            .send(command)
            .await
            .map_err(|_| RelayError::ClientClosed)
    }
}
