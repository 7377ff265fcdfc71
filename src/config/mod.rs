//! Configuration module for the relay server
//!
//! This module handles server configuration from various sources: .env files, YAML files,
//! and environment variables. Priority: YAML > ENV vars > .env values > defaults.
//!
//! # Modules
//! - `yaml`: YAML configuration file loading
//! - `env`: Environment variable loading
//! - `merge`: Merging YAML and environment configurations
//! - `validation`: Configuration validation logic
//!
//! # Example
//! ```rust,no_run
//! use realtime_relay::config::ServerConfig;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load from environment variables only
//! let config = ServerConfig::from_env()?;
//!
//! // Load from YAML file with environment variable overrides
//! let config_path = PathBuf::from("config.yaml");
//! let config = ServerConfig::from_file(&config_path)?;
//!
//! println!("Server listening on {}", config.address());
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;

mod env;
mod merge;
mod validation;
mod yaml;

use crate::core::realtime::openai::{
    DEFAULT_REALTIME_MODEL, DEFAULT_TEMPERATURE, OPENAI_REALTIME_URL, OpenAIRealtimeVoice,
};

/// Default listening port.
pub const DEFAULT_PORT: u16 = 5050;

/// Persona given to the assistant when `SYSTEM_MESSAGE` is not set.
pub const DEFAULT_SYSTEM_MESSAGE: &str = "You are a helpful and bubbly AI assistant who loves to chat about \
anything the user is interested in and is prepared to offer them facts. You have a penchant for dad \
jokes, owl jokes, and rickrolling – subtly. Always stay positive, but work in a joke when appropriate.";

/// Opening prompt for telephony sessions when `AI_GREETING` is not set.
pub const DEFAULT_GREETING: &str = "Greet the user with 'Hello there! I am an AI voice assistant \
powered by Twilio and the OpenAI Realtime API. You can ask me for facts, jokes, or anything you can \
imagine. How can I help you?'";

/// TLS configuration for HTTPS and WSS
#[derive(Debug, Clone)]
pub struct TlsConfig {
    /// Path to the TLS certificate file (PEM format)
    pub cert_path: PathBuf,
    /// Path to the TLS private key file (PEM format)
    pub key_path: PathBuf,
}

/// Settings for the OpenAI Realtime backend session.
#[derive(Debug, Clone, PartialEq)]
pub struct RealtimeSettings {
    /// WebSocket endpoint, without the model query
    pub url: String,
    pub model: String,
    pub voice: String,
    /// System instructions for the assistant
    pub instructions: String,
    pub temperature: f32,
    /// Prompt that makes the AI speak first; `None` waits for the caller
    pub greeting: Option<String>,
}

impl Default for RealtimeSettings {
    fn default() -> Self {
        Self {
            url: OPENAI_REALTIME_URL.to_string(),
            model: DEFAULT_REALTIME_MODEL.to_string(),
            voice: OpenAIRealtimeVoice::default().as_str().to_string(),
            instructions: DEFAULT_SYSTEM_MESSAGE.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            greeting: Some(DEFAULT_GREETING.to_string()),
        }
    }
}

/// Server configuration
///
/// Contains all configuration needed to run the relay server, including:
/// - Server settings (host, port, TLS)
/// - OpenAI credentials and realtime session settings
/// - Call-setup settings (public host)
/// - Security settings (CORS, session limits)
#[derive(Debug, Clone)]
pub struct ServerConfig {
    // Server settings
    pub host: String,
    pub port: u16,

    // TLS configuration (optional)
    pub tls: Option<TlsConfig>,

    /// OpenAI API key for the Realtime API
    pub openai_api_key: String,
    pub realtime: RealtimeSettings,

    /// Host advertised in the call-setup stream URL.
    /// Default: None (taken from the request's Host header)
    pub public_host: Option<String>,

    // Security configuration
    /// CORS allowed origins (comma-separated list or "*" for all)
    /// Default: None (CORS disabled, same-origin only)
    pub cors_allowed_origins: Option<String>,
    /// Maximum concurrent relay sessions
    /// Default: None (unlimited)
    pub max_sessions: Option<usize>,
}

/// Implement Drop to zeroize secret fields when ServerConfig is dropped.
impl Drop for ServerConfig {
    fn drop(&mut self) {
        use zeroize::Zeroize;

        self.openai_api_key.zeroize();
    }
}

impl ServerConfig {
    /// Configuration with defaults for everything but the API key.
    pub fn new(openai_api_key: impl Into<String>) -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            tls: None,
            openai_api_key: openai_api_key.into(),
            realtime: RealtimeSettings::default(),
            public_host: None,
            cors_allowed_origins: None,
            max_sessions: None,
        }
    }

    /// Load configuration from environment variables
    ///
    /// `.env` values must already be loaded into the environment (done in
    /// `main` via `dotenvy`).
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let config = merge::merge_config(None)?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a YAML file with environment variable base
    ///
    /// Priority order (highest to lowest):
    /// 1. YAML file values
    /// 2. Environment variables (actual ENV vars override .env values)
    /// 3. .env file values
    /// 4. Default values
    ///
    /// After loading and merging, performs validation on the final configuration.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The YAML file cannot be read or is malformed
    /// - Environment variables have invalid formats
    /// - Configuration validation fails
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let yaml_config = yaml::YamlConfig::from_file(path)?;
        let config = merge::merge_config(Some(yaml_config))?;
        Self::validate(&config)?;
        Ok(config)
    }

    fn validate(config: &ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
        validation::validate_openai_api_key(&config.openai_api_key)?;
        validation::validate_temperature(config.realtime.temperature)?;
        validation::validate_voice(&config.realtime.voice)?;
        validation::validate_realtime_url(&config.realtime.url)?;
        validation::validate_max_sessions(config.max_sessions)?;
        Ok(())
    }

    /// Get the server address as a string
    ///
    /// Returns the address in the format "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if TLS is enabled
    ///
    /// Returns true if TLS configuration is present
    pub fn is_tls_enabled(&self) -> bool {
        self.tls.is_some()
    }

    pub fn has_openai_key(&self) -> bool {
        !self.openai_api_key.trim().is_empty()
    }
}
