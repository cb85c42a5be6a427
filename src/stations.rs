//! Station registry
//!
//! Immutable, ordered catalog of monitoring stations and their latest
//! water-level readings. Registry order is match priority.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::StationsConfig;
use crate::{ChatbotError, Result};

const BUILTIN_FIXTURE: &str = include_str!("../data/stations.json");

/// Latest reading at a monitoring station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationReading {
    /// Opaque station identifier
    pub station_code: String,
    /// Human-readable name, the case-insensitive match key
    pub station_name: String,
    /// Date of measurement
    pub data_time: NaiveDate,
    /// Measured water level
    pub data_value: f64,
    /// Unit of measurement, e.g. "m"
    pub unit: String,
}

impl StationReading {
    pub fn new(
        station_code: impl Into<String>,
        station_name: impl Into<String>,
        data_time: NaiveDate,
        data_value: f64,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            station_code: station_code.into(),
            station_name: station_name.into(),
            data_time,
            data_value,
            unit: unit.into(),
        }
    }
}

/// Read-only station catalog, shared across concurrent exchanges
#[derive(Debug, Clone)]
pub struct StationRegistry {
    stations: Vec<StationReading>,
}

impl StationRegistry {
    /// Build a registry, keeping the given order.
    ///
    /// Blank station names are rejected since they would match every query.
    /// Duplicate names are accepted; the earlier entry always wins a match.
    pub fn new(stations: Vec<StationReading>) -> Result<Self> {
        let mut seen = HashSet::new();
        for station in &stations {
            if station.station_name.trim().is_empty() {
                return Err(ChatbotError::registry(format!(
                    "station '{}' has an empty name",
                    station.station_code
                )));
            }
            if !seen.insert(station.station_name.to_lowercase()) {
                warn!(
                    station_name = %station.station_name,
                    station_code = %station.station_code,
                    "Duplicate station name; only the first entry can be matched"
                );
            }
        }

        debug!("Station registry built with {} stations", stations.len());
        Ok(Self { stations })
    }

    /// Sample fixture shipped with the crate
    pub fn builtin() -> Result<Self> {
        Self::from_json_str(BUILTIN_FIXTURE)
    }

    /// Parse a JSON array of station readings
    pub fn from_json_str(json: &str) -> Result<Self> {
        let stations: Vec<StationReading> = serde_json::from_str(json)
            .map_err(|e| ChatbotError::registry(format!("invalid station fixture: {e}")))?;
        Self::new(stations)
    }

    /// Load a JSON fixture from disk
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let registry = Self::from_json_str(&json)?;
        info!(
            "Loaded {} stations from {}",
            registry.len(),
            path.display()
        );
        Ok(registry)
    }

    /// Registry selected by configuration: the fixture file if set, else the built-in data
    pub fn from_config(config: &StationsConfig) -> Result<Self> {
        match &config.fixture_path {
            Some(path) => Self::from_json_file(path),
            None => Self::builtin(),
        }
    }

    /// All stations in match-priority order
    #[must_use]
    pub fn all_stations(&self) -> &[StationReading] {
        &self.stations
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}
