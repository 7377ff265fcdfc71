use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::handlers::{api, voice};
use crate::state::AppState;
use std::sync::Arc;

/// Create the HTTP router: health, status and call setup
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(api::health_check))
        .route("/status", get(api::status))
        // Telephony webhooks use POST by default; GET is kept for manual checks
        .route(
            "/incoming-call",
            get(voice::incoming_call).post(voice::incoming_call),
        )
        .layer(TraceLayer::new_for_http())
}
