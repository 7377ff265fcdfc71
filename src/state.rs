//! Shared application state.

use std::sync::Arc;

use tracing::error;

use crate::config::ServerConfig;
use crate::core::realtime::{OpenAIConnector, SessionConfig};
use crate::core::relay::{BackendConnector, ClientKind, RelayResult, SessionOrchestrator, SessionProfile};

/// State shared by every HTTP and WebSocket handler.
pub struct AppState {
    pub config: ServerConfig,
    pub orchestrator: SessionOrchestrator,
}

impl AppState {
    /// State backed by the OpenAI Realtime API.
    pub fn new(config: ServerConfig) -> Arc<Self> {
        let connector = Arc::new(OpenAIConnector::new(
            &config.realtime,
            config.openai_api_key.clone(),
        ));
        Self::with_connector(config, connector)
    }

    /// State backed by an arbitrary backend.
    pub fn with_connector(config: ServerConfig, connector: Arc<dyn BackendConnector>) -> Arc<Self> {
        let orchestrator = SessionOrchestrator::new(connector).with_max_sessions(config.max_sessions);
        Arc::new(Self {
            config,
            orchestrator,
        })
    }

    /// Session profile for a client of the given kind.
    ///
    /// Only telephony sessions open with a greeting; browser users start the
    /// conversation themselves.
    pub fn profile(&self, kind: ClientKind) -> RelayResult<SessionProfile> {
        let configure = SessionConfig::for_client(&self.config.realtime, kind)
            .to_value()
            .inspect_err(|e| error!("Failed to build session configuration: {}", e))?;

        let greeting = match kind {
            ClientKind::Telephony => self.config.realtime.greeting.clone(),
            ClientKind::Browser => None,
        };

        Ok(SessionProfile::new(kind, configure).with_greeting(greeting))
    }
}
