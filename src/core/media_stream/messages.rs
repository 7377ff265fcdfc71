//! Media stream wire format.
//!
//! JSON text frames keyed by `event`, as sent by Twilio Media Streams and by
//! the browser client (which speaks the same dialect plus transcript/status
//! events going out).
//!
//! Incoming:
//! - `connected`
//! - `start` `{start: {streamSid}}`
//! - `media` `{media: {timestamp, payload}}` (payload base64)
//! - `mark` `{mark: {name}}`
//! - `stop`
//!
//! Outgoing:
//! - `media` `{streamSid, media: {payload}}`
//! - `mark` `{streamSid, mark: {name}}`
//! - `clear` `{streamSid}`
//! - `transcript` `{content}`
//! - `status` `{type, message}`

use base64::prelude::*;
use bytes::Bytes;
use serde::{Deserialize, Deserializer, Serialize};

use crate::core::relay::{ClientCommand, ClientFrame, RelayError, RelayResult};

// =============================================================================
// Incoming
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
enum IncomingEvent {
    Connected,
    Start { start: StartPayload },
    Media { media: MediaPayload },
    Mark {
        #[serde(default)]
        mark: Option<MarkPayload>,
    },
    Stop,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartPayload {
    stream_sid: String,
    #[serde(default)]
    call_sid: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MediaPayload {
    #[serde(deserialize_with = "deserialize_timestamp")]
    timestamp: u64,
    payload: String,
}

#[derive(Debug, Deserialize)]
struct MarkPayload {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Deserialize)]
struct EventName {
    event: String,
}

const KNOWN_EVENTS: &[&str] = &["connected", "start", "media", "mark", "stop"];

/// Media timestamps arrive as decimal strings from Twilio and as numbers from
/// browser clients.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Float(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Float(f) if f.is_finite() && f >= 0.0 => Ok(f as u64),
        Raw::Float(f) => Err(serde::de::Error::custom(format!(
            "invalid timestamp {f}"
        ))),
        Raw::Text(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|_| serde::de::Error::custom(format!("non-numeric timestamp {s:?}"))),
    }
}

/// Decode one client text frame.
///
/// Unknown event kinds yield [`RelayError::UnknownEvent`]; anything that does
/// not match its event's shape yields [`RelayError::MalformedFrame`].
pub fn parse_frame(text: &str) -> RelayResult<ClientFrame> {
    let value: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| RelayError::MalformedFrame(format!("invalid JSON: {e}")))?;
    let EventName { event } = EventName::deserialize(&value)
        .map_err(|e| RelayError::MalformedFrame(format!("frame without event: {e}")))?;

    if !KNOWN_EVENTS.contains(&event.as_str()) {
        return Err(RelayError::UnknownEvent(event));
    }

    let incoming = IncomingEvent::deserialize(&value)
        .map_err(|e| RelayError::MalformedFrame(format!("invalid {event} frame: {e}")))?;

    let frame = match incoming {
        IncomingEvent::Connected => ClientFrame::Connected,
        IncomingEvent::Start { start } => {
            if let Some(call_sid) = &start.call_sid {
                tracing::debug!("Stream {} belongs to call {}", start.stream_sid, call_sid);
            }
            ClientFrame::StreamStarted {
                stream_id: start.stream_sid,
            }
        }
        IncomingEvent::Media { media } => {
            let payload = BASE64_STANDARD
                .decode(media.payload.as_bytes())
                .map_err(|e| RelayError::MalformedFrame(format!("invalid media payload: {e}")))?;
            ClientFrame::Media {
                timestamp: media.timestamp,
                payload: Bytes::from(payload),
            }
        }
        IncomingEvent::Mark { mark } => ClientFrame::Mark {
            name: mark.and_then(|m| m.name),
        },
        IncomingEvent::Stop => ClientFrame::Stopped,
    };
    Ok(frame)
}

// =============================================================================
// Outgoing
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "lowercase")]
enum OutgoingEvent<'a> {
    Media {
        #[serde(rename = "streamSid", skip_serializing_if = "Option::is_none")]
        stream_sid: Option<&'a str>,
        media: OutgoingMedia,
    },
    Mark {
        #[serde(rename = "streamSid")]
        stream_sid: &'a str,
        mark: OutgoingMark<'a>,
    },
    Clear {
        #[serde(rename = "streamSid", skip_serializing_if = "Option::is_none")]
        stream_sid: Option<&'a str>,
    },
    Transcript {
        content: &'a str,
    },
    Status {
        #[serde(rename = "type")]
        kind: &'a str,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<&'a str>,
    },
}

#[derive(Debug, Serialize)]
struct OutgoingMedia {
    payload: String,
}

#[derive(Debug, Serialize)]
struct OutgoingMark<'a> {
    name: &'a str,
}

/// Encode one command as a client text frame.
pub fn encode_command(command: &ClientCommand) -> RelayResult<String> {
    let event = match command {
        ClientCommand::Media { stream_id, payload } => OutgoingEvent::Media {
            stream_sid: stream_id.as_deref(),
            media: OutgoingMedia {
                payload: BASE64_STANDARD.encode(payload),
            },
        },
        ClientCommand::Mark { stream_id, name } => OutgoingEvent::Mark {
            stream_sid: stream_id,
            mark: OutgoingMark { name },
        },
        ClientCommand::Clear { stream_id } => OutgoingEvent::Clear {
            stream_sid: stream_id.as_deref(),
        },
        ClientCommand::Transcript { content } => OutgoingEvent::Transcript { content },
        ClientCommand::Status { kind, message } => OutgoingEvent::Status {
            kind,
            message: message.as_deref(),
        },
    };
    serde_json::to_string(&event).map_err(|e| RelayError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[test]
    fn test_parse_start() {
        let frame = parse_frame(
            r#"{"event":"start","sequenceNumber":"1","start":{"streamSid":"MZ123","callSid":"CA456","tracks":["inbound"]},"streamSid":"MZ123"}"#,
        )
        .unwrap();
        assert_eq!(
            frame,
            ClientFrame::StreamStarted {
                stream_id: "MZ123".to_string()
            }
        );
    }

    #[test]
    fn test_parse_media_string_timestamp() {
        let frame = parse_frame(
            r#"{"event":"media","media":{"track":"inbound","chunk":"2","timestamp":"5120","payload":"AAAA"}}"#,
        )
        .unwrap();
        assert_eq!(
            frame,
            ClientFrame::Media {
                timestamp: 5120,
                payload: Bytes::from_static(&[0, 0, 0]),
            }
        );
    }

    #[test]
    fn test_parse_media_numeric_timestamp() {
        let frame = parse_frame(r#"{"event":"media","media":{"timestamp":40,"payload":""}}"#)
            .unwrap();
        assert_eq!(
            frame,
            ClientFrame::Media {
                timestamp: 40,
                payload: Bytes::new(),
            }
        );
    }

    #[test]
    fn test_parse_media_missing_timestamp() {
        let result = parse_frame(r#"{"event":"media","media":{"payload":"AAAA"}}"#);
        assert!(matches!(result, Err(RelayError::MalformedFrame(_))));
    }

    #[test]
    fn test_parse_media_non_numeric_timestamp() {
        let result = parse_frame(r#"{"event":"media","media":{"timestamp":"soon","payload":"AAAA"}}"#);
        assert!(matches!(result, Err(RelayError::MalformedFrame(_))));
    }

    #[test]
    fn test_parse_media_bad_payload() {
        let result = parse_frame(r#"{"event":"media","media":{"timestamp":"1","payload":"*"}}"#);
        assert!(matches!(result, Err(RelayError::MalformedFrame(_))));
    }

    #[test]
    fn test_parse_mark_with_and_without_name() {
        assert_eq!(
            parse_frame(r#"{"event":"mark","streamSid":"MZ1","mark":{"name":"ack-3"}}"#).unwrap(),
            ClientFrame::Mark {
                name: Some("ack-3".to_string())
            }
        );
        assert_eq!(
            parse_frame(r#"{"event":"mark"}"#).unwrap(),
            ClientFrame::Mark { name: None }
        );
    }

    #[test]
    fn test_parse_connected_and_stop() {
        assert_eq!(
            parse_frame(r#"{"event":"connected","protocol":"Call","version":"1.0.0"}"#).unwrap(),
            ClientFrame::Connected
        );
        assert_eq!(
            parse_frame(r#"{"event":"stop","stop":{"callSid":"CA1"}}"#).unwrap(),
            ClientFrame::Stopped
        );
    }

    #[test]
    fn test_parse_unknown_event() {
        let result = parse_frame(r#"{"event":"dtmf","dtmf":{"digit":"1"}}"#);
        assert!(matches!(result, Err(RelayError::UnknownEvent(kind)) if kind == "dtmf"));
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(parse_frame("{"), Err(RelayError::MalformedFrame(_))));
        assert!(matches!(
            parse_frame(r#"{"media":{}}"#),
            Err(RelayError::MalformedFrame(_))
        ));
    }

    #[test]
    fn test_encode_media() {
        let json = encode_command(&ClientCommand::Media {
            stream_id: Some("MZ1".to_string()),
            payload: Bytes::from_static(&[0, 1, 2, 3]),
        })
        .unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(
            value,
            json!({"event": "media", "streamSid": "MZ1", "media": {"payload": "AAECAw=="}})
        );
    }

    #[test]
    fn test_encode_media_without_stream() {
        let json = encode_command(&ClientCommand::Media {
            stream_id: None,
            payload: Bytes::new(),
        })
        .unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value, json!({"event": "media", "media": {"payload": ""}}));
    }

    #[test]
    fn test_encode_mark_and_clear() {
        let mark: Value = serde_json::from_str(
            &encode_command(&ClientCommand::Mark {
                stream_id: "MZ1".to_string(),
                name: "ack-1".to_string(),
            })
            .unwrap(),
        )
        .unwrap();
        assert_eq!(
            mark,
            json!({"event": "mark", "streamSid": "MZ1", "mark": {"name": "ack-1"}})
        );

        let clear: Value = serde_json::from_str(
            &encode_command(&ClientCommand::Clear {
                stream_id: Some("MZ1".to_string()),
            })
            .unwrap(),
        )
        .unwrap();
        assert_eq!(clear, json!({"event": "clear", "streamSid": "MZ1"}));
    }

    #[test]
    fn test_encode_status_and_transcript() {
        let status: Value = serde_json::from_str(
            &encode_command(&ClientCommand::Status {
                kind: "response.done".to_string(),
                message: None,
            })
            .unwrap(),
        )
        .unwrap();
        assert_eq!(status, json!({"event": "status", "type": "response.done"}));

        let transcript: Value = serde_json::from_str(
            &encode_command(&ClientCommand::Transcript {
                content: "Hello".to_string(),
            })
            .unwrap(),
        )
        .unwrap();
        assert_eq!(transcript, json!({"event": "transcript", "content": "Hello"}));
    }
}
