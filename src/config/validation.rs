use std::path::PathBuf;

use url::Url;

use crate::core::realtime::openai::OpenAIRealtimeVoice;

/// The OpenAI API key must be configured.
pub fn validate_openai_api_key(key: &str) -> Result<(), Box<dyn std::error::Error>> {
    if key.trim().is_empty() {
        return Err(
            "Missing the OpenAI API key. Please set OPENAI_API_KEY or openai.api_key in the config file."
                .into(),
        );
    }
    Ok(())
}

/// Sampling temperature accepted by the Realtime API.
pub fn validate_temperature(temperature: f32) -> Result<(), Box<dyn std::error::Error>> {
    if !(0.0..=2.0).contains(&temperature) {
        return Err(format!("Invalid temperature {temperature}: must be between 0.0 and 2.0").into());
    }
    Ok(())
}

pub fn validate_voice(voice: &str) -> Result<(), Box<dyn std::error::Error>> {
    if OpenAIRealtimeVoice::parse(voice).is_none() {
        let known: Vec<&str> = OpenAIRealtimeVoice::all()
            .iter()
            .map(|v| v.as_str())
            .collect();
        return Err(format!(
            "Unsupported realtime voice '{voice}'. Supported voices: {}",
            known.join(", ")
        )
        .into());
    }
    Ok(())
}

/// The realtime endpoint must be a WebSocket URL.
pub fn validate_realtime_url(url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let parsed =
        Url::parse(url).map_err(|e| format!("Invalid OPENAI_REALTIME_URL '{url}': {e}"))?;
    match parsed.scheme() {
        "ws" | "wss" => Ok(()),
        scheme => Err(format!(
            "Invalid OPENAI_REALTIME_URL '{url}': expected ws or wss scheme, got {scheme}"
        )
        .into()),
    }
}

pub fn validate_max_sessions(max_sessions: Option<usize>) -> Result<(), Box<dyn std::error::Error>> {
    if max_sessions == Some(0) {
        return Err("MAX_SESSIONS must be greater than zero when set".into());
    }
    Ok(())
}

/// Both TLS paths are required once TLS is enabled.
pub fn validate_tls_paths(
    cert_path: Option<PathBuf>,
    key_path: Option<PathBuf>,
) -> Result<(PathBuf, PathBuf), Box<dyn std::error::Error>> {
    let cert_path =
        cert_path.ok_or("TLS is enabled but TLS_CERT_PATH (server.tls.cert_path) is not set")?;
    let key_path =
        key_path.ok_or("TLS is enabled but TLS_KEY_PATH (server.tls.key_path) is not set")?;
    Ok((cert_path, key_path))
}
