//! Session lifecycle.
//!
//! [`SessionOrchestrator`] owns the registry of live sessions. For each
//! accepted client it connects a backend, primes it with the session
//! configuration, runs both relays until either side ends, then closes both
//! sockets. Every exit path goes through the same teardown.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::error::{RelayError, RelayResult};
use super::frames::BackendCommand;
use super::inbound::InboundRelay;
use super::link::{BackendLink, ClientLink, await_writer};
use super::outbound::OutboundRelay;
use super::profile::{ClientKind, SessionProfile};
use crate::core::session::{SessionState, SharedSession, new_shared_session};

/// Opens the backend side of a session.
#[async_trait]
pub trait BackendConnector: Send + Sync {
    async fn connect(&self, profile: &SessionProfile) -> RelayResult<BackendLink>;
}

/// Why a session ended normally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    ClientDisconnected,
    BackendDisconnected,
}

/// Registry entry for a live session.
#[derive(Debug, Clone)]
pub struct SessionEntry {
    pub kind: ClientKind,
    pub state: SharedSession,
}

/// Point-in-time copy of a live session.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub id: String,
    pub kind: ClientKind,
    pub state: SessionState,
}

pub struct SessionOrchestrator {
    connector: Arc<dyn BackendConnector>,
    sessions: DashMap<String, SessionEntry>,
    active: AtomicUsize,
    max_sessions: Option<usize>,
}

impl SessionOrchestrator {
    pub fn new(connector: Arc<dyn BackendConnector>) -> Self {
        Self {
            connector,
            sessions: DashMap::new(),
            active: AtomicUsize::new(0),
            max_sessions: None,
        }
    }

    /// Cap concurrent sessions. `None` or zero means unlimited.
    pub fn with_max_sessions(mut self, max_sessions: Option<usize>) -> Self {
        self.max_sessions = max_sessions.filter(|max| *max > 0);
        self
    }

    pub fn max_sessions(&self) -> Option<usize> {
        self.max_sessions
    }

    /// Number of sessions holding a slot, including ones still connecting.
    pub fn active_sessions(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    pub fn snapshots(&self) -> Vec<SessionSnapshot> {
        self.sessions
            .iter()
            .map(|entry| SessionSnapshot {
                id: entry.key().clone(),
                kind: entry.value().kind,
                state: entry.value().state.lock().clone(),
            })
            .collect()
    }

    /// Run one session to completion. Both links are closed when this returns.
    pub async fn run(&self, profile: &SessionProfile, client: ClientLink) -> RelayResult<SessionEnd> {
        let Some(slot) = self.reserve() else {
            let active = self.active_sessions();
            warn!("Rejecting {} session: {} sessions active", profile.kind, active);
            client.close().await;
            return Err(RelayError::CapacityReached(active));
        };

        let backend = match self.connector.connect(profile).await {
            Ok(backend) => backend,
            Err(e) => {
                error!("Failed to connect backend for {} session: {}", profile.kind, e);
                client.close().await;
                return Err(e);
            }
        };

        let id = Uuid::new_v4().to_string();
        let state = new_shared_session();
        let _registration = slot.register(&id, profile.kind, state.clone());
        info!(
            session_id = %id,
            kind = %profile.kind,
            codec = profile.codec.name(),
            "Session started"
        );

        let (client_frames, client_tx, client_writer) = client.into_parts();
        let (backend_frames, backend_tx, backend_writer) = backend.into_parts();

        let result = match prime_backend(profile, &backend_tx).await {
            Ok(()) => {
                let inbound =
                    InboundRelay::new(state.clone(), backend_tx.clone(), profile.codec.clone());
                let outbound = OutboundRelay::new(
                    state,
                    client_tx.clone(),
                    backend_tx.clone(),
                    profile.codec.clone(),
                )
                .with_status_forwarding(profile.forward_status);

                tokio::select! {
                    r = inbound.run(client_frames) => r.map(|()| SessionEnd::ClientDisconnected),
                    r = outbound.run(backend_frames) => match r {
                        Ok(()) | Err(RelayError::BackendClosed) => Ok(SessionEnd::BackendDisconnected),
                        Err(e) => Err(e),
                    },
                }
            }
            Err(e) => Err(e),
        };

        // Releasing the last senders makes each writer close its socket.
        drop(client_tx);
        drop(backend_tx);
        await_writer(client_writer).await;
        await_writer(backend_writer).await;

        match &result {
            Ok(end) => info!(session_id = %id, "Session ended: {:?}", end),
            Err(e) => warn!(session_id = %id, "Session ended with error: {}", e),
        }
        result
    }

    fn reserve(&self) -> Option<Slot<'_>> {
        self.active
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| match self.max_sessions {
                Some(max) if n >= max => None,
                _ => Some(n + 1),
            })
            .ok()?;
        Some(Slot {
            orchestrator: self,
            id: None,
        })
    }
}

/// Configure the backend and request the opening response.
async fn prime_backend(
    profile: &SessionProfile,
    backend: &mpsc::Sender<BackendCommand>,
) -> RelayResult<()> {
    debug!("Sending session update");
    backend
        .send(BackendCommand::Configure(profile.configure.clone()))
        .await
        .map_err(|_| RelayError::BackendClosed)?;

    if let Some(prompt) = &profile.greeting {
        debug!("Requesting initial greeting");
        backend
            .send(BackendCommand::Greet {
                prompt: prompt.clone(),
            })
            .await
            .map_err(|_| RelayError::BackendClosed)?;
    }
    Ok(())
}

/// Capacity slot held for the lifetime of a session. Releases the slot and the
/// registry entry on drop.
struct Slot<'a> {
    orchestrator: &'a SessionOrchestrator,
    id: Option<String>,
}

impl<'a> Slot<'a> {
    fn register(mut self, id: &str, kind: ClientKind, state: SharedSession) -> Self {
        self.orchestrator
            .sessions
            .insert(id.to_string(), SessionEntry { kind, state });
        self.id = Some(id.to_string());
        self
    }
}

impl Drop for Slot<'_> {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            self.orchestrator.sessions.remove(&id);
            debug!(session_id = %id, "Session unregistered");
        }
        self.orchestrator.active.fetch_sub(1, Ordering::SeqCst);
    }
}
