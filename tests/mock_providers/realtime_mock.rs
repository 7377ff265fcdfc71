//! WebSocket mock of the OpenAI Realtime API.
//!
//! Accepts a single connection, records the handshake and every client event,
//! and pushes server events on demand.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};

/// Handshake details seen by the mock.
#[derive(Debug, Clone, Default)]
pub struct Handshake {
    pub uri: String,
    pub authorization: Option<String>,
    pub beta: Option<String>,
}

/// Instruction for the mock connection.
pub enum MockAction {
    Send(Value),
    Close,
}

pub struct MockRealtimeServer {
    /// Endpoint without the model query
    pub url: String,
    /// Client events in arrival order
    pub received: mpsc::UnboundedReceiver<Value>,
    actions: mpsc::UnboundedSender<MockAction>,
    pub handshake: Arc<Mutex<Option<Handshake>>>,
    pub client_closed: Arc<AtomicBool>,
}

impl MockRealtimeServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind mock realtime server");
        let addr = listener.local_addr().expect("mock server has no address");

        let (received_tx, received_rx) = mpsc::unbounded_channel();
        let (actions_tx, mut actions_rx) = mpsc::unbounded_channel::<MockAction>();
        let handshake = Arc::new(Mutex::new(None));
        let client_closed = Arc::new(AtomicBool::new(false));

        let seen = handshake.clone();
        let closed = client_closed.clone();
        tokio::spawn(async move {
            let Ok((stream, _)) = listener.accept().await else {
                return;
            };

            let callback = move |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
                let header = |name: &str| {
                    req.headers()
                        .get(name)
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string)
                };
                *seen.lock() = Some(Handshake {
                    uri: req.uri().to_string(),
                    authorization: header("authorization"),
                    beta: header("openai-beta"),
                });
                Ok(resp)
            };

            let Ok(ws) = accept_hdr_async(stream, callback).await else {
                return;
            };
            let (mut write, mut read) = ws.split();

            loop {
                tokio::select! {
                    msg = read.next() => match msg {
                        Some(Ok(Message::Text(text))) => {
                            if let Ok(value) = serde_json::from_str::<Value>(text.as_str()) {
                                let _ = received_tx.send(value);
                            }
                        }
                        Some(Ok(Message::Close(_))) | None | Some(Err(_)) => {
                            closed.store(true, Ordering::SeqCst);
                            break;
                        }
                        Some(Ok(_)) => {}
                    },
                    action = actions_rx.recv() => match action {
                        Some(MockAction::Send(event)) => {
                            if write.send(Message::Text(event.to_string().into())).await.is_err() {
                                break;
                            }
                        }
                        Some(MockAction::Close) | None => {
                            let _ = write.send(Message::Close(None)).await;
                            break;
                        }
                    },
                }
            }
        });

        Self {
            url: format!("ws://{}/v1/realtime", addr),
            received: received_rx,
            actions: actions_tx,
            handshake,
            client_closed,
        }
    }

    pub fn send(&self, event: Value) {
        let _ = self.actions.send(MockAction::Send(event));
    }

    pub fn close(&self) {
        let _ = self.actions.send(MockAction::Close);
    }

    /// Next client event.
    pub async fn next_event(&mut self) -> Value {
        super::within(self.received.recv())
            .await
            .expect("mock realtime connection ended")
    }

    /// Skip client events until one of type `kind` arrives.
    pub async fn expect_event(&mut self, kind: &str) -> Value {
        loop {
            let event = self.next_event().await;
            if event["type"] == kind {
                return event;
            }
        }
    }
}
