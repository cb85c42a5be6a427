//! INGRES chatbot - multilingual water-level queries
//!
//! This library provides the query-resolution pipeline: translate the
//! user's text to English, match it against the station registry, and
//! translate the canonical answer back into the user's language.

pub mod api;
pub mod config;
pub mod error;
pub mod matcher;
pub mod pipeline;
pub mod stations;
pub mod telemetry;
pub mod translation;
pub mod web;

// Re-export core types for public API
pub use config::ChatbotConfig;
pub use error::{ChatbotError, FALLBACK_REPLY};
pub use matcher::{MatchMode, MatchResult, QueryMatcher};
pub use pipeline::{ChatExchange, ChatFailure, ChatOutcome, ChatPipeline, FailureStage};
pub use stations::{StationReading, StationRegistry};
pub use translation::{
    GoogleTranslator, PassthroughTranslator, TranslationResult, Translator, create_translator,
};

use std::sync::Arc;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, ChatbotError>;

/// Wire registry, matcher and gateway together as configured
pub fn build_pipeline(config: &ChatbotConfig) -> Result<ChatPipeline> {
    let registry = Arc::new(StationRegistry::from_config(&config.stations)?);
    let matcher = QueryMatcher::new(registry, config.stations.match_mode);
    let translator = create_translator(&config.translation)?;

    let pipeline = ChatPipeline::new(translator, matcher);
    Ok(match config.translation.deadline() {
        Some(deadline) => pipeline.with_deadline(deadline),
        None => pipeline,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TranslationProvider;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }

    #[tokio::test]
    async fn test_build_pipeline_from_config() {
        let mut config = ChatbotConfig::default();
        config.translation.provider = TranslationProvider::Passthrough;
        let pipeline = build_pipeline(&config).unwrap();

        assert_eq!(pipeline.matcher().registry().len(), 3);
        let reply = pipeline.respond_text("Pune").await;
        assert!(reply.contains("3.8"));
    }

    #[test]
    fn test_build_pipeline_missing_fixture() {
        let mut config = ChatbotConfig::default();
        config.translation.provider = TranslationProvider::Passthrough;
        config.stations.fixture_path = Some("/nonexistent/stations.json".to_string());
        assert!(build_pipeline(&config).is_err());
    }
}
