pub mod api;
pub mod stream;

use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

/// All routes with state applied. Cross-cutting layers (CORS, security
/// headers) are added by the binary.
pub fn create_router(state: Arc<AppState>) -> Router {
    api::create_api_router()
        .merge(stream::create_stream_router())
        .with_state(state)
}
