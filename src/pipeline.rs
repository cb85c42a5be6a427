//! Chat pipeline
//!
//! Runs one exchange: translate the user's text to English, match it against
//! the station registry, and translate the canonical reply back into the
//! language detected on the way in. Every gateway failure ends the exchange
//! with [`FALLBACK_REPLY`]; nothing propagates past [`ChatPipeline::respond`].

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, instrument};

use crate::error::FALLBACK_REPLY;
use crate::matcher::QueryMatcher;
use crate::stations::StationReading;
use crate::translation::{ENGLISH, Translator};
use crate::ChatbotError;

/// A completed exchange. Built per request and never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatExchange {
    pub user_text: String,
    /// Language detected on the inbound translation, used for the reply
    pub detected_language: String,
    pub matched_station: Option<StationReading>,
    /// English sentence produced by the matcher
    pub canonical_reply: String,
    /// Reply translated into `detected_language`
    pub reply_text: String,
}

/// Step at which an exchange was abandoned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    /// Translating the user's text to English
    Inbound,
    /// Translating the reply back to the user's language
    Outbound,
    /// The whole-exchange deadline elapsed
    Deadline,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureStage::Inbound => write!(f, "inbound"),
            FailureStage::Outbound => write!(f, "outbound"),
            FailureStage::Deadline => write!(f, "deadline"),
        }
    }
}

/// An exchange that could not be completed
#[derive(Debug)]
pub struct ChatFailure {
    pub user_text: String,
    pub stage: FailureStage,
    pub error: ChatbotError,
}

/// Result of [`ChatPipeline::respond`]
#[derive(Debug)]
pub enum ChatOutcome {
    Answered(ChatExchange),
    Unavailable(ChatFailure),
}

impl ChatOutcome {
    /// Text to show the user: the localized reply or the fixed warning
    #[must_use]
    pub fn reply_text(&self) -> &str {
        match self {
            ChatOutcome::Answered(exchange) => &exchange.reply_text,
            ChatOutcome::Unavailable(_) => FALLBACK_REPLY,
        }
    }

    #[must_use]
    pub fn is_answered(&self) -> bool {
        matches!(self, ChatOutcome::Answered(_))
    }
}

/// Translate → match → translate back. Stateless and safe to share across tasks.
pub struct ChatPipeline {
    translator: Arc<dyn Translator>,
    matcher: QueryMatcher,
    deadline: Option<Duration>,
}

impl ChatPipeline {
    pub fn new(translator: Arc<dyn Translator>, matcher: QueryMatcher) -> Self {
        Self {
            translator,
            matcher,
            deadline: None,
        }
    }

    /// Bound the whole exchange, both gateway calls included
    #[must_use]
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    #[must_use]
    pub fn matcher(&self) -> &QueryMatcher {
        &self.matcher
    }

    /// Run one exchange. Never fails; gateway errors become `ChatOutcome::Unavailable`.
    #[instrument(name = "chat_exchange", skip(self, user_text), fields(translator = self.translator.name()))]
    pub async fn respond(&self, user_text: &str) -> ChatOutcome {
        let exchange = self.run_exchange(user_text);

        let result = match self.deadline {
            Some(deadline) => match tokio::time::timeout(deadline, exchange).await {
                Ok(result) => result,
                Err(_) => Err((
                    FailureStage::Deadline,
                    ChatbotError::translation_unavailable(format!(
                        "exchange exceeded deadline of {:.1}s",
                        deadline.as_secs_f64()
                    )),
                )),
            },
            None => exchange.await,
        };

        match result {
            Ok(exchange) => {
                info!(
                    detected_language = %exchange.detected_language,
                    matched = exchange.matched_station.is_some(),
                    "Exchange answered"
                );
                ChatOutcome::Answered(exchange)
            }
            Err((stage, error)) => {
                error!(%stage, error = %error, "Exchange failed, replying with fallback");
                ChatOutcome::Unavailable(ChatFailure {
                    user_text: user_text.to_string(),
                    stage,
                    error,
                })
            }
        }
    }

    /// String-in, string-out form of [`respond`](Self::respond)
    pub async fn respond_text(&self, user_text: &str) -> String {
        self.respond(user_text).await.reply_text().to_string()
    }

    async fn run_exchange(
        &self,
        user_text: &str,
    ) -> Result<ChatExchange, (FailureStage, ChatbotError)> {
        let inbound = self
            .translator
            .translate(user_text, ENGLISH)
            .await
            .map_err(|e| (FailureStage::Inbound, e))?;

        let detected_language = inbound.source_language.ok_or_else(|| {
            (
                FailureStage::Inbound,
                ChatbotError::translation_unavailable(
                    "provider did not report a source language",
                ),
            )
        })?;
        debug!(%detected_language, english = %inbound.text, "Inbound translation done");

        let matched = self.matcher.find(&inbound.text.to_lowercase());
        let canonical_reply = matched.canonical_reply();

        let outbound = self
            .translator
            .translate(&canonical_reply, &detected_language)
            .await
            .map_err(|e| (FailureStage::Outbound, e))?;

        Ok(ChatExchange {
            user_text: user_text.to_string(),
            detected_language,
            matched_station: matched.station().cloned(),
            canonical_reply,
            reply_text: outbound.text,
        })
    }
}
