//! Pass-through translator
//!
//! Returns text unchanged and guesses the source language from the dominant
//! Unicode script. Lets the pipeline run without network access.

use std::collections::BTreeMap;

use async_trait::async_trait;

use super::{ENGLISH, TranslationResult, Translator};
use crate::Result;

/// Offline translator that echoes its input
#[derive(Debug, Clone, Default)]
pub struct PassthroughTranslator;

impl PassthroughTranslator {
    pub fn new() -> Self {
        Self
    }

    /// ISO code of the language most likely written in `text`'s dominant script
    #[must_use]
    pub fn detect_language(text: &str) -> &'static str {
        let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();

        for c in text.chars() {
            if c.is_whitespace() || c.is_ascii_punctuation() || c.is_ascii_digit() {
                continue;
            }
            *counts.entry(script_language(c)).or_insert(0) += 1;
        }

        // Ties go to the non-Latin script
        counts
            .into_iter()
            .max_by_key(|&(language, count)| (count, language != ENGLISH))
            .map(|(language, _)| language)
            .unwrap_or(ENGLISH)
    }
}

fn script_language(c: char) -> &'static str {
    match c as u32 {
        0x0600..=0x06FF | 0x0750..=0x077F => "ur",
        0x0900..=0x097F | 0xA8E0..=0xA8FF => "hi",
        0x0980..=0x09FF => "bn",
        0x0A00..=0x0A7F => "pa",
        0x0A80..=0x0AFF => "gu",
        0x0B00..=0x0B7F => "or",
        0x0B80..=0x0BFF => "ta",
        0x0C00..=0x0C7F => "te",
        0x0C80..=0x0CFF => "kn",
        0x0D00..=0x0D7F => "ml",
        _ => ENGLISH,
    }
}

#[async_trait]
impl Translator for PassthroughTranslator {
    fn name(&self) -> &str {
        "passthrough"
    }

    async fn translate(&self, text: &str, _target_language: &str) -> Result<TranslationResult> {
        Ok(TranslationResult {
            text: text.to_string(),
            source_language: Some(Self::detect_language(text).to_string()),
        })
    }
}
