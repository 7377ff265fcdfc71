//! OpenAI Realtime API connector.
//!
//! Opens one WebSocket per session and exposes it to the relay core as a
//! [`BackendLink`]:
//!
//! - reads are decoded lazily into [`BackendFrame`]s
//! - [`BackendCommand`]s are drained by a writer task that owns the sink and
//!   closes the socket once every sender is gone
//!
//! - Endpoint: `wss://api.openai.com/v1/realtime?model=<model>`
//! - Protocol: WebSocket with JSON events

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tracing::{debug, error, info};
use url::Url;
use zeroize::Zeroize;

use super::messages::{ClientEvent, decode_server_event};
use crate::config::RealtimeSettings;
use crate::core::relay::{
    BackendCommand, BackendConnector, BackendFrame, BackendLink, FrameStream,
    LINK_CHANNEL_CAPACITY, RelayError, RelayResult, SessionProfile,
};

/// Connects sessions to the OpenAI Realtime API.
pub struct OpenAIConnector {
    url: String,
    model: String,
    api_key: String,
}

impl OpenAIConnector {
    pub fn new(settings: &RealtimeSettings, api_key: impl Into<String>) -> Self {
        Self {
            url: settings.url.clone(),
            model: settings.model.clone(),
            api_key: api_key.into(),
        }
    }

    /// Build the WebSocket URL with model parameter.
    pub fn ws_url(&self) -> RelayResult<Url> {
        let mut url = Url::parse(&self.url)
            .map_err(|e| RelayError::ConnectionFailed(format!("invalid realtime URL: {e}")))?;
        url.query_pairs_mut().append_pair("model", &self.model);
        Ok(url)
    }
}

impl Drop for OpenAIConnector {
    fn drop(&mut self) {
        self.api_key.zeroize();
    }
}

#[async_trait]
impl BackendConnector for OpenAIConnector {
    async fn connect(&self, profile: &SessionProfile) -> RelayResult<BackendLink> {
        if self.api_key.is_empty() {
            return Err(RelayError::ConnectionFailed(
                "OpenAI API key is not configured".to_string(),
            ));
        }

        let url = self.ws_url()?;
        let mut request = url
            .as_str()
            .into_client_request()
            .map_err(|e| RelayError::ConnectionFailed(e.to_string()))?;

        let auth = HeaderValue::from_str(&format!("Bearer {}", self.api_key))
            .map_err(|e| RelayError::ConnectionFailed(format!("invalid API key: {e}")))?;
        let headers = request.headers_mut();
        headers.insert("Authorization", auth);
        headers.insert("OpenAI-Beta", HeaderValue::from_static("realtime=v1"));

        let (ws_stream, _response) = tokio_tungstenite::connect_async(request)
            .await
            .map_err(|e| RelayError::ConnectionFailed(e.to_string()))?;

        info!(
            "Connected to OpenAI Realtime API ({} session, model {})",
            profile.kind, self.model
        );

        let (mut ws_sink, ws_stream) = ws_stream.split();
        let (tx, mut rx) = mpsc::channel::<BackendCommand>(LINK_CHANNEL_CAPACITY);

        let writer = tokio::spawn(async move {
            'commands: while let Some(command) = rx.recv().await {
                for event in ClientEvent::from_command(command) {
                    let json = match serde_json::to_string(&event) {
                        Ok(j) => j,
                        Err(e) => {
                            error!("Failed to serialize event: {}", e);
                            continue;
                        }
                    };

                    if let Err(e) = ws_sink.send(Message::Text(json.into())).await {
                        error!("Failed to send WebSocket message: {}", e);
                        break 'commands;
                    }
                }
            }

            debug!("Closing OpenAI Realtime connection");
            if let Err(e) = ws_sink.close().await {
                debug!("OpenAI Realtime socket already closed: {}", e);
            }
        });

        let frames: FrameStream<BackendFrame> = Box::pin(ws_stream.filter_map(|msg| async move {
            match msg {
                Ok(Message::Text(text)) => Some(decode_server_event(text.as_str())),
                Ok(Message::Close(frame)) => {
                    info!("WebSocket closed by server: {:?}", frame);
                    None
                }
                Ok(_) => None,
                Err(e) => Some(Err(RelayError::BackendTransport(e.to_string()))),
            }
        }));

        Ok(BackendLink::new(frames, tx).with_writer(writer))
    }
}
