//! Translation gateway
//!
//! Wraps the external translation provider behind the [`Translator`] trait.
//! The pipeline only ever sees [`TranslationResult`] or
//! `ChatbotError::TranslationUnavailable`.

mod google;
mod passthrough;

pub use google::GoogleTranslator;
pub use passthrough::PassthroughTranslator;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::Result;
use crate::config::{TranslationConfig, TranslationProvider};

/// Language code every query is normalized to before matching
pub const ENGLISH: &str = "en";

/// Result of one translation call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationResult {
    /// Translated text
    pub text: String,
    /// Language the provider detected in the input, if it reported one
    pub source_language: Option<String>,
}

/// External translation capability
#[async_trait]
pub trait Translator: Send + Sync {
    /// Human-readable provider name.
    fn name(&self) -> &str;

    /// Translate `text` into `target_language`, detecting the source language.
    async fn translate(&self, text: &str, target_language: &str) -> Result<TranslationResult>;
}

/// Create the translator selected by configuration
pub fn create_translator(config: &TranslationConfig) -> Result<Arc<dyn Translator>> {
    let translator: Arc<dyn Translator> = match config.provider {
        TranslationProvider::Google => Arc::new(GoogleTranslator::new(config)?),
        TranslationProvider::Passthrough => Arc::new(PassthroughTranslator::new()),
    };
    info!(provider = translator.name(), "Translation gateway ready");
    Ok(translator)
}
