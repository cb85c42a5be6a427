//! Query matcher
//!
//! Locates a registered station name inside English query text and renders
//! the canonical English reply. Localization never happens here.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::stations::{StationReading, StationRegistry};

/// Reply used when no station name appears in the query
pub const NOT_UNDERSTOOD_REPLY: &str = "Sorry, I didn't understand your question.";

/// How a station name must appear in the query to count as a match
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Any contiguous substring; "pune" also matches inside "punepur"
    #[default]
    Substring,
    /// The name must not be flanked by letters or digits
    WordBoundary,
}

/// Outcome of matching a query against the registry
#[derive(Debug, Clone, PartialEq)]
pub enum MatchResult {
    Found(StationReading),
    NotFound,
}

impl MatchResult {
    /// Canonical English sentence for this outcome
    #[must_use]
    pub fn canonical_reply(&self) -> String {
        match self {
            MatchResult::Found(station) => format!(
                "Water level at {} is {} {} (measured on {}).",
                station.station_name, station.data_value, station.unit, station.data_time
            ),
            MatchResult::NotFound => NOT_UNDERSTOOD_REPLY.to_string(),
        }
    }

    #[must_use]
    pub fn station(&self) -> Option<&StationReading> {
        match self {
            MatchResult::Found(station) => Some(station),
            MatchResult::NotFound => None,
        }
    }
}

/// First-match-wins station lookup over a shared registry
#[derive(Debug, Clone)]
pub struct QueryMatcher {
    registry: Arc<StationRegistry>,
    mode: MatchMode,
}

impl QueryMatcher {
    pub fn new(registry: Arc<StationRegistry>, mode: MatchMode) -> Self {
        Self { registry, mode }
    }

    #[must_use]
    pub fn registry(&self) -> &StationRegistry {
        &self.registry
    }

    /// Return the first station, in registry order, whose name occurs in `english_text`
    #[must_use]
    pub fn find(&self, english_text: &str) -> MatchResult {
        let haystack = english_text.to_lowercase();

        let found = self.registry.all_stations().iter().find(|station| {
            let needle = station.station_name.to_lowercase();
            match self.mode {
                MatchMode::Substring => haystack.contains(&needle),
                MatchMode::WordBoundary => contains_word(&haystack, &needle),
            }
        });

        match found {
            Some(station) => {
                debug!(
                    station_code = %station.station_code,
                    station_name = %station.station_name,
                    "Query matched station"
                );
                MatchResult::Found(station.clone())
            }
            None => {
                debug!("No station name found in query");
                MatchResult::NotFound
            }
        }
    }
}

fn contains_word(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(start, matched)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + matched.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}
