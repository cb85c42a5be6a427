//! Error types and handling for the INGRES chatbot

use thiserror::Error;

/// User-visible reply whenever an exchange cannot be completed.
pub const FALLBACK_REPLY: &str = "⚠ Error in translation or chatbot logic.";

/// Main error type for the INGRES chatbot
#[derive(Error, Debug)]
pub enum ChatbotError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// The translation provider could not produce a result
    #[error("Translation unavailable: {message}")]
    TranslationUnavailable { message: String },

    /// Station fixture could not be loaded or is invalid
    #[error("Station registry error: {message}")]
    Registry { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl ChatbotError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new translation error
    pub fn translation_unavailable<S: Into<String>>(message: S) -> Self {
        Self::TranslationUnavailable {
            message: message.into(),
        }
    }

    /// Create a new registry error
    pub fn registry<S: Into<String>>(message: S) -> Self {
        Self::Registry {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            ChatbotError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
            ChatbotError::TranslationUnavailable { .. } => FALLBACK_REPLY.to_string(),
            ChatbotError::Registry { .. } => {
                "Station data could not be loaded. Please check the fixture file.".to_string()
            }
            ChatbotError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            ChatbotError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}
