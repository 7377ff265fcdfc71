use std::path::PathBuf;

use super::env::EnvConfig;
use super::yaml::YamlConfig;
use super::{DEFAULT_PORT, RealtimeSettings, ServerConfig, TlsConfig, validation};

/// Merge YAML overrides onto environment values and defaults.
///
/// Priority: YAML > ENV > defaults.
pub fn merge_config(yaml: Option<YamlConfig>) -> Result<ServerConfig, Box<dyn std::error::Error>> {
    let env = EnvConfig::from_env()?;
    let yaml = yaml.unwrap_or_default();

    let server = yaml.server.unwrap_or_default();
    let openai = yaml.openai.unwrap_or_default();
    let security = yaml.security.unwrap_or_default();
    let tls_yaml = server.tls.unwrap_or_default();

    let defaults = RealtimeSettings::default();

    let host = server
        .host
        .or(env.host)
        .unwrap_or_else(|| "0.0.0.0".to_string());
    let port = server.port.or(env.port).unwrap_or(DEFAULT_PORT);

    let tls_enabled = tls_yaml.enabled.or(env.tls_enabled).unwrap_or(false);
    let tls = if tls_enabled {
        let cert_path = tls_yaml.cert_path.map(PathBuf::from).or(env.tls_cert_path);
        let key_path = tls_yaml.key_path.map(PathBuf::from).or(env.tls_key_path);
        let (cert_path, key_path) = validation::validate_tls_paths(cert_path, key_path)?;
        Some(TlsConfig {
            cert_path,
            key_path,
        })
    } else {
        None
    };

    // An explicitly empty greeting disables the default one.
    let greeting = match openai.greeting.or(env.greeting) {
        Some(g) if g.trim().is_empty() => None,
        Some(g) => Some(g),
        None => defaults.greeting,
    };

    let realtime = RealtimeSettings {
        url: openai.realtime_url.or(env.realtime_url).unwrap_or(defaults.url),
        model: openai.model.or(env.realtime_model).unwrap_or(defaults.model),
        voice: openai.voice.or(env.realtime_voice).unwrap_or(defaults.voice),
        instructions: openai
            .system_message
            .or(env.system_message)
            .unwrap_or(defaults.instructions),
        temperature: openai
            .temperature
            .or(env.temperature)
            .unwrap_or(defaults.temperature),
        greeting,
    };

    Ok(ServerConfig {
        host,
        port,
        tls,
        openai_api_key: openai.api_key.or(env.openai_api_key).unwrap_or_default(),
        realtime,
        public_host: server.public_host.or(env.public_host),
        cors_allowed_origins: security.cors_allowed_origins.or(env.cors_allowed_origins),
        max_sessions: security.max_sessions.or(env.max_sessions),
    })
}
