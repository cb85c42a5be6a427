//! Configuration management for the INGRES chatbot
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::ChatbotError;
use crate::matcher::MatchMode;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure for the chatbot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatbotConfig {
    /// Translation gateway configuration
    #[serde(default)]
    pub translation: TranslationConfig,
    /// Station registry configuration
    #[serde(default)]
    pub stations: StationsConfig,
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which translation gateway backs the pipeline
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    /// Public Google Translate endpoint
    #[default]
    Google,
    /// Offline gateway that echoes text back
    Passthrough,
}

/// Translation gateway settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationConfig {
    #[serde(default)]
    pub provider: TranslationProvider,
    /// Base URL of the translation provider
    #[serde(default = "default_translation_base_url")]
    pub base_url: String,
    /// Timeout for a single provider call in seconds
    #[serde(default = "default_translation_timeout")]
    pub timeout_seconds: u32,
    /// Optional deadline for a whole exchange in seconds
    #[serde(default)]
    pub deadline_seconds: Option<u64>,
}

/// Station registry settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StationsConfig {
    /// JSON fixture to load instead of the built-in sample data
    #[serde(default)]
    pub fixture_path: Option<String>,
    /// How station names are located in query text
    #[serde(default)]
    pub match_mode: MatchMode,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    /// Maximum accepted request body in bytes
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u32,
    /// PEM certificate chain, enables HTTPS together with `tls_key_path`
    #[serde(default)]
    pub tls_cert_path: Option<String>,
    /// PEM private key
    #[serde(default)]
    pub tls_key_path: Option<String>,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
    /// OTLP/HTTP collector endpoint for trace export
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

// Default value functions
fn default_translation_base_url() -> String {
    "https://translate.googleapis.com".to_string()
}

fn default_translation_timeout() -> u32 {
    10
}

fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    5000
}

fn default_max_body_bytes() -> usize {
    16 * 1024
}

fn default_request_timeout() -> u32 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::default(),
            base_url: default_translation_base_url(),
            timeout_seconds: default_translation_timeout(),
            deadline_seconds: None,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            max_body_bytes: default_max_body_bytes(),
            request_timeout_seconds: default_request_timeout(),
            tls_cert_path: None,
            tls_key_path: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            otlp_endpoint: None,
        }
    }
}

impl TranslationConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.into())
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_seconds.map(Duration::from_secs)
    }
}

impl ServerConfig {
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds.into())
    }
}

impl ChatbotConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // INGRES_TRANSLATION__PROVIDER=passthrough -> translation.provider
        builder = builder.add_source(
            Environment::with_prefix("INGRES")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: ChatbotConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("ingres").join("config.toml"))
    }

    /// Apply default values to empty configuration fields
    pub fn apply_defaults(&mut self) {
        if self.translation.base_url.is_empty() {
            self.translation.base_url = default_translation_base_url();
        }
        if self.translation.timeout_seconds == 0 {
            self.translation.timeout_seconds = default_translation_timeout();
        }
        if self.server.host.is_empty() {
            self.server.host = default_server_host();
        }
        if self.server.max_body_bytes == 0 {
            self.server.max_body_bytes = default_max_body_bytes();
        }
        if self.server.request_timeout_seconds == 0 {
            self.server.request_timeout_seconds = default_request_timeout();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        self.validate_tls_pair()?;
        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.translation.timeout_seconds > 120 {
            return Err(
                ChatbotError::config("Translation timeout cannot exceed 120 seconds").into(),
            );
        }

        if let Some(deadline) = self.translation.deadline_seconds {
            if deadline == 0 || deadline > 300 {
                return Err(ChatbotError::config(
                    "Exchange deadline must be between 1 and 300 seconds",
                )
                .into());
            }
        }

        if self.server.port == 0 {
            return Err(ChatbotError::config("Server port cannot be 0").into());
        }

        if self.server.max_body_bytes > 1024 * 1024 {
            return Err(
                ChatbotError::config("Maximum request body cannot exceed 1 MiB").into(),
            );
        }

        if self.server.request_timeout_seconds > 600 {
            return Err(
                ChatbotError::config("Request timeout cannot exceed 600 seconds").into(),
            );
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(ChatbotError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(ChatbotError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if !is_http_url(&self.translation.base_url) {
            return Err(ChatbotError::config(
                "Translation base URL must be a valid HTTP or HTTPS URL",
            )
            .into());
        }

        if let Some(endpoint) = &self.logging.otlp_endpoint {
            if !is_http_url(endpoint) {
                return Err(ChatbotError::config(
                    "OTLP endpoint must be a valid HTTP or HTTPS URL",
                )
                .into());
            }
        }

        Ok(())
    }

    fn validate_tls_pair(&self) -> Result<()> {
        match (&self.server.tls_cert_path, &self.server.tls_key_path) {
            (Some(_), None) | (None, Some(_)) => Err(ChatbotError::config(
                "tls_cert_path and tls_key_path must be set together",
            )
            .into()),
            _ => Ok(()),
        }
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_default_config() {
        let config = ChatbotConfig::default();
        assert_eq!(config.translation.provider, TranslationProvider::Google);
        assert_eq!(
            config.translation.base_url,
            "https://translate.googleapis.com"
        );
        assert_eq!(config.translation.timeout_seconds, 10);
        assert!(config.translation.deadline().is_none());
        assert_eq!(config.stations.match_mode, MatchMode::Substring);
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = ChatbotConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = ChatbotConfig::default();
        config.translation.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("timeout cannot exceed")
        );

        let mut config = ChatbotConfig::default();
        config.translation.deadline_seconds = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_base_url() {
        let mut config = ChatbotConfig::default();
        config.translation.base_url = "translate.googleapis.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_tls_pair() {
        let mut config = ChatbotConfig::default();
        config.server.tls_cert_path = Some("cert.pem".to_string());
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("must be set together"));

        config.server.tls_key_path = Some("key.pem".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_apply_defaults_fills_empty_values() {
        let mut config = ChatbotConfig::default();
        config.translation.base_url = String::new();
        config.translation.timeout_seconds = 0;
        config.logging.format = String::new();
        config.apply_defaults();
        assert_eq!(
            config.translation.base_url,
            "https://translate.googleapis.com"
        );
        assert_eq!(config.translation.timeout_seconds, 10);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_load_from_toml_file() {
        let path = std::env::temp_dir().join(format!(
            "ingres-config-test-{}.toml",
            std::process::id()
        ));
        fs::write(
            &path,
            r#"
[translation]
provider = "passthrough"
deadline_seconds = 20

[stations]
match_mode = "word_boundary"

[server]
port = 8088
"#,
        )
        .unwrap();

        let config = ChatbotConfig::load_from_path(Some(path.clone())).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(config.translation.provider, TranslationProvider::Passthrough);
        assert_eq!(config.translation.deadline(), Some(Duration::from_secs(20)));
        assert_eq!(config.stations.match_mode, MatchMode::WordBoundary);
        assert_eq!(config.server.port, 8088);
        // untouched sections keep their defaults
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_config_path_generation() {
        let path = ChatbotConfig::get_config_path();
        assert!(path.is_some());
        let path = path.unwrap();
        assert!(path.to_string_lossy().contains("ingres"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }
}
