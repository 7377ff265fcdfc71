use std::env;
use std::path::PathBuf;

/// Configuration values read from environment variables.
///
/// Every field is optional; defaults are applied in `merge`.
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub tls_enabled: Option<bool>,
    pub tls_cert_path: Option<PathBuf>,
    pub tls_key_path: Option<PathBuf>,
    pub openai_api_key: Option<String>,
    pub realtime_url: Option<String>,
    pub realtime_model: Option<String>,
    pub realtime_voice: Option<String>,
    pub temperature: Option<f32>,
    pub system_message: Option<String>,
    /// `Some("")` disables the greeting
    pub greeting: Option<String>,
    pub public_host: Option<String>,
    pub cors_allowed_origins: Option<String>,
    pub max_sessions: Option<usize>,
}

impl EnvConfig {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self {
            host: non_empty("HOST"),
            port: parse_var("PORT")?,
            tls_enabled: parse_bool("TLS_ENABLED")?,
            tls_cert_path: non_empty("TLS_CERT_PATH").map(PathBuf::from),
            tls_key_path: non_empty("TLS_KEY_PATH").map(PathBuf::from),
            openai_api_key: non_empty("OPENAI_API_KEY"),
            realtime_url: non_empty("OPENAI_REALTIME_URL"),
            realtime_model: non_empty("OPENAI_REALTIME_MODEL"),
            realtime_voice: non_empty("OPENAI_REALTIME_VOICE"),
            temperature: parse_var("OPENAI_TEMPERATURE")?,
            system_message: non_empty("SYSTEM_MESSAGE"),
            greeting: env::var("AI_GREETING").ok(),
            public_host: non_empty("PUBLIC_HOST"),
            cors_allowed_origins: non_empty("CORS_ALLOWED_ORIGINS"),
            max_sessions: parse_var("MAX_SESSIONS")?,
        })
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T>(key: &str) -> Result<Option<T>, Box<dyn std::error::Error>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match non_empty(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| format!("Invalid {key} value '{raw}': {e}").into()),
        None => Ok(None),
    }
}

fn parse_bool(key: &str) -> Result<Option<bool>, Box<dyn std::error::Error>> {
    match non_empty(key) {
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(Some(true)),
            "false" | "0" | "no" | "off" => Ok(Some(false)),
            _ => Err(format!("Invalid {key} value '{raw}': expected true or false").into()),
        },
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_parse_bool_variants() {
        unsafe {
            env::set_var("TLS_ENABLED", "Yes");
        }
        assert_eq!(parse_bool("TLS_ENABLED").unwrap(), Some(true));

        unsafe {
            env::set_var("TLS_ENABLED", "0");
        }
        assert_eq!(parse_bool("TLS_ENABLED").unwrap(), Some(false));

        unsafe {
            env::set_var("TLS_ENABLED", "maybe");
        }
        assert!(parse_bool("TLS_ENABLED").is_err());

        unsafe {
            env::remove_var("TLS_ENABLED");
        }
        assert_eq!(parse_bool("TLS_ENABLED").unwrap(), None);
    }

    #[test]
    #[serial]
    fn test_blank_values_are_unset() {
        unsafe {
            env::set_var("PUBLIC_HOST", "   ");
            env::set_var("AI_GREETING", "");
        }

        let config = EnvConfig::from_env().unwrap();
        assert_eq!(config.public_host, None);
        // An empty greeting is kept so it can disable the default
        assert_eq!(config.greeting.as_deref(), Some(""));

        unsafe {
            env::remove_var("PUBLIC_HOST");
            env::remove_var("AI_GREETING");
        }
    }
}
