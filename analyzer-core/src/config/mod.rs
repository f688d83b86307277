use crate::error::AppError;
use config::{Config as Cfg, File};
use serde::Deserialize;

/// Default upload limit (20 MiB), large enough for phone photos.
const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub gemini: GeminiSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    /// Sessions (credential, image, last result) expire after this much inactivity.
    #[serde(default = "default_session_idle_minutes")]
    pub session_idle_minutes: i64,
    #[serde(default)]
    pub secure_cookies: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeminiSettings {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Unset means the HTTP client's own default applies.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
    /// OTLP collector endpoint; spans are only exported when set.
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8501
}

fn default_max_upload_bytes() -> usize {
    DEFAULT_MAX_UPLOAD_BYTES
}

fn default_session_idle_minutes() -> i64 {
    60
}

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_api_base() -> String {
    DEFAULT_GEMINI_API_BASE.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
            session_idle_minutes: default_session_idle_minutes(),
            secure_cookies: false,
        }
    }
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_base: default_api_base(),
            request_timeout_secs: None,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            otlp_endpoint: None,
        }
    }
}

impl Settings {
    /// Load from an optional `configuration.*` file, overridden by `APP__*` variables.
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let config = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        Self::from_config(config)
    }

    fn from_config(config: Cfg) -> Result<Self, AppError> {
        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.gemini.model.trim().is_empty() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "gemini.model must not be empty"
            )));
        }
        if self.server.max_upload_bytes == 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "server.max_upload_bytes must be positive"
            )));
        }
        if self.server.session_idle_minutes <= 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "server.session_idle_minutes must be positive"
            )));
        }
        Ok(())
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn from_yaml(yaml: &str) -> Result<Settings, AppError> {
        let config = Cfg::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()?;
        Settings::from_config(config)
    }

    #[test]
    fn empty_source_uses_defaults() {
        let settings = from_yaml("{}").unwrap();
        assert_eq!(settings.server.port, 8501);
        assert_eq!(settings.server.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert_eq!(settings.gemini.model, "gemini-1.5-flash");
        assert_eq!(settings.gemini.api_base, DEFAULT_GEMINI_API_BASE);
        assert!(settings.gemini.request_timeout_secs.is_none());
        assert!(settings.logging.otlp_endpoint.is_none());
        assert_eq!(settings.address(), "0.0.0.0:8501");
    }

    #[test]
    fn file_values_override_defaults() {
        let settings = from_yaml(
            "server:\n  port: 9000\ngemini:\n  model: gemini-2.0-flash\n  request_timeout_secs: 30\nlogging:\n  json: true\n",
        )
        .unwrap();
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.gemini.model, "gemini-2.0-flash");
        assert_eq!(settings.gemini.request_timeout_secs, Some(30));
        assert!(settings.logging.json);
        assert_eq!(settings.server.host, "0.0.0.0");
    }

    #[test]
    fn rejects_blank_model() {
        let err = from_yaml("gemini:\n  model: \"  \"\n").unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
    }

    #[test]
    fn rejects_zero_upload_limit() {
        assert!(from_yaml("server:\n  max_upload_bytes: 0\n").is_err());
    }
}
