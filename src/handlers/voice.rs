//! Call setup for telephony clients.
//!
//! The telephony provider fetches `/incoming-call` when a call arrives and
//! gets back TwiML that plays two prompts and connects the call audio to the
//! `/media-stream` WebSocket.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::{info, warn};

use crate::state::AppState;

const CONNECTING_PROMPT: &str = "Please wait while we connect your call to the A. I. voice assistant, \
powered by Twilio and the Open-A.I. Realtime API";

const READY_PROMPT: &str = "O.K. you can start talking!";

/// Answer an incoming call with TwiML connecting it to the media stream.
pub async fn incoming_call(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let host = state
        .config
        .public_host
        .clone()
        .or_else(|| request_host(&headers));

    let Some(host) = host else {
        warn!("Incoming call without a Host header and no PUBLIC_HOST configured");
        return (StatusCode::BAD_REQUEST, "Missing Host header").into_response();
    };

    info!("Incoming call, connecting media stream via {}", host);

    (
        [(header::CONTENT_TYPE, "application/xml")],
        build_twiml(&host),
    )
        .into_response()
}

/// Host name from the request, without port.
fn request_host(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(header::HOST)?.to_str().ok()?.trim();
    let host = match raw.rsplit_once(':') {
        Some((name, port)) if !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()) => name,
        _ => raw,
    };
    Some(host.to_string()).filter(|h| !h.is_empty())
}

pub fn build_twiml(host: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
<Response>\
<Say>{}</Say>\
<Pause length=\"1\"/>\
<Say>{}</Say>\
<Connect><Stream url=\"wss://{}/media-stream\"/></Connect>\
</Response>",
        escape_xml(CONNECTING_PROMPT),
        escape_xml(READY_PROMPT),
        escape_xml(host)
    )
}

fn escape_xml(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
