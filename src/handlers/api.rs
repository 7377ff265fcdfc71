use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    message: &'static str,
}

#[derive(Serialize)]
pub struct StatusResponse {
    status: &'static str,
    openai_key_configured: bool,
    active_sessions: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_sessions: Option<usize>,
    endpoints: Endpoints,
}

#[derive(Serialize)]
pub struct Endpoints {
    incoming_call: &'static str,
    media_stream: &'static str,
    browser_stream: &'static str,
}

/// Liveness check.
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        message: "Media Stream relay is running",
    })
}

/// Server status: credentials present, live session count, endpoints.
pub async fn status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(StatusResponse {
        status: "ok",
        openai_key_configured: state.config.has_openai_key(),
        active_sessions: state.orchestrator.active_sessions(),
        max_sessions: state.orchestrator.max_sessions(),
        endpoints: Endpoints {
            incoming_call: "/incoming-call",
            media_stream: "/media-stream",
            browser_stream: "/browser-stream",
        },
    })
}
