//! Google Translate gateway
//!
//! Talks to the public `translate_a/single` endpoint with `client=gtx`.
//! The response is a nested JSON array: translated segments at `[0][*][0]`
//! and the detected source language at `[2]`.

use std::time::Instant;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, error, instrument, warn};

use super::{TranslationResult, Translator};
use crate::config::TranslationConfig;
use crate::{ChatbotError, Result};

const USER_AGENT: &str = concat!("ingres-chatbot/", env!("CARGO_PKG_VERSION"));

/// Translation gateway backed by Google Translate
pub struct GoogleTranslator {
    client: reqwest::Client,
    base_url: String,
}

impl GoogleTranslator {
    pub fn new(config: &TranslationConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ChatbotError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    fn name(&self) -> &str {
        "google"
    }

    #[instrument(skip(self, text), fields(chars = text.chars().count()))]
    async fn translate(&self, text: &str, target_language: &str) -> Result<TranslationResult> {
        let url = request_url(&self.base_url, text, target_language);
        let start_time = Instant::now();

        let response = self.client.get(&url).send().await.map_err(|e| {
            error!("Failed to reach translation provider: {}", e);
            ChatbotError::translation_unavailable(format!("request failed: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Translation provider returned {}: {}", status, body);
            return Err(ChatbotError::translation_unavailable(format!(
                "provider returned {status}"
            )));
        }

        let body: Value = response.json().await.map_err(|e| {
            error!("Failed to parse translation response: {}", e);
            ChatbotError::translation_unavailable(format!("unparseable response: {e}"))
        })?;

        let result = parse_response(&body, text)?;
        debug!(
            "Translated to {} in {:.3}s (detected source: {:?})",
            target_language,
            start_time.elapsed().as_secs_f64(),
            result.source_language
        );
        Ok(result)
    }
}

fn request_url(base_url: &str, text: &str, target_language: &str) -> String {
    format!(
        "{}/translate_a/single?client=gtx&sl=auto&tl={}&dt=t&q={}",
        base_url,
        urlencoding::encode(target_language),
        urlencoding::encode(text)
    )
}

fn parse_response(body: &Value, original: &str) -> Result<TranslationResult> {
    let segments = body.get(0).and_then(Value::as_array).ok_or_else(|| {
        ChatbotError::translation_unavailable("response is missing the segment array")
    })?;

    let text: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    if text.is_empty() && !original.trim().is_empty() {
        return Err(ChatbotError::translation_unavailable(
            "provider returned an empty translation",
        ));
    }

    let source_language = body
        .get(2)
        .and_then(Value::as_str)
        .filter(|code| !code.is_empty())
        .map(str::to_string);

    Ok(TranslationResult {
        text,
        source_language,
    })
}
