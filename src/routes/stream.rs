//! Media stream WebSocket route configuration

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::handlers::stream::{browser_stream_handler, media_stream_handler};
use crate::state::AppState;
use std::sync::Arc;

/// Create the media stream router
///
/// # Endpoints
///
/// - `GET /media-stream` - telephony media stream (Twilio Media Streams,
///   8kHz u-law audio, playback marks)
/// - `GET /browser-stream` - browser media stream (PCM16 audio, transcript and
///   status events)
///
/// # Protocol
///
/// JSON text frames keyed by `event`:
///
/// ```json
/// {"event": "start", "start": {"streamSid": "MZ..."}}
/// {"event": "media", "media": {"timestamp": "1280", "payload": "<base64>"}}
/// {"event": "mark", "mark": {"name": "ack-3"}}
/// ```
///
/// Both endpoints require `media.timestamp` (milliseconds of caller audio,
/// as a string or a number). It is the clock used to cut off an interrupted
/// response, so media frames without one are dropped. Browser clients must
/// send it too, for example milliseconds since capture started.
pub fn create_stream_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/media-stream", get(media_stream_handler))
        .route("/browser-stream", get(browser_stream_handler))
        .layer(TraceLayer::new_for_http())
}
