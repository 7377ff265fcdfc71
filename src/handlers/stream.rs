//! Media stream WebSocket handlers.
//!
//! Each accepted socket becomes a [`ClientLink`] and is handed to the session
//! orchestrator together with the profile for its endpoint.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::core::media_stream::{encode_command, parse_frame};
use crate::core::relay::{
    ClientCommand, ClientFrame, ClientKind, ClientLink, FrameStream, LINK_CHANNEL_CAPACITY,
    RelayError,
};
use crate::state::AppState;

/// Maximum WebSocket frame size (1 MB)
const MAX_WS_FRAME_SIZE: usize = 1024 * 1024;

/// Maximum WebSocket message size (1 MB)
const MAX_WS_MESSAGE_SIZE: usize = 1024 * 1024;

/// Telephony media stream (`/media-stream`).
pub async fn media_stream_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    upgrade(ws, state, ClientKind::Telephony)
}

/// Browser media stream (`/browser-stream`).
pub async fn browser_stream_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    upgrade(ws, state, ClientKind::Browser)
}

fn upgrade(ws: WebSocketUpgrade, state: Arc<AppState>, kind: ClientKind) -> Response {
    info!("{} client connection upgrade requested", kind);

    ws.max_frame_size(MAX_WS_FRAME_SIZE)
        .max_message_size(MAX_WS_MESSAGE_SIZE)
        .on_upgrade(move |socket| handle_stream_socket(socket, state, kind))
}

async fn handle_stream_socket(socket: WebSocket, state: Arc<AppState>, kind: ClientKind) {
    info!("{} client connected", kind);

    let link = client_link(socket);
    let profile = match state.profile(kind) {
        Ok(profile) => profile,
        Err(e) => {
            error!("Cannot start {} session: {}", kind, e);
            link.close().await;
            return;
        }
    };

    match state.orchestrator.run(&profile, link).await {
        Ok(end) => info!("{} client disconnected ({:?})", kind, end),
        Err(e) => warn!("{} session failed: {}", kind, e),
    }
}

/// Wrap an accepted socket as a client link.
///
/// The writer task owns the sink; it sends a close frame once every sender of
/// the command channel has been dropped.
pub fn client_link(socket: WebSocket) -> ClientLink {
    let (mut sender, receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<ClientCommand>(LINK_CHANNEL_CAPACITY);

    let writer = tokio::spawn(async move {
        while let Some(command) = rx.recv().await {
            let text = match encode_command(&command) {
                Ok(text) => text,
                Err(e) => {
                    error!("Failed to serialize outgoing message: {}", e);
                    continue;
                }
            };

            if let Err(e) = sender.send(Message::Text(text.into())).await {
                error!("Failed to send WebSocket message: {}", e);
                break;
            }
        }

        debug!("Closing client WebSocket connection");
        if let Err(e) = sender.send(Message::Close(None)).await {
            debug!("Client WebSocket already closed: {}", e);
        }
    });

    let frames: FrameStream<ClientFrame> = Box::pin(receiver.filter_map(|msg| async move {
        match msg {
            Ok(Message::Text(text)) => Some(parse_frame(text.as_str())),
            Ok(Message::Close(frame)) => {
                info!("Client closed WebSocket: {:?}", frame);
                None
            }
            Ok(Message::Binary(data)) => {
                debug!("Ignoring {} byte binary frame", data.len());
                None
            }
            Ok(_) => None,
            Err(e) => Some(Err(RelayError::ClientTransport(e.to_string()))),
        }
    }));

    ClientLink::new(frames, tx).with_writer(writer)
}
