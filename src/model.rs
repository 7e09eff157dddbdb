/// Station, Coordinates, StationStatus, WaterThresholds, DeviceError
/// core data structures and error handling
///
/// Core data types for the FFWS station monitoring service.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no I/O and no external dependencies — only types and the small
/// amount of logic that belongs to them (history recording, status strings).

use crate::alert::thresholds::classify_level;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum number of readings retained per station. Matches the depth of the
/// dashboard's per-station history chart; older readings are discarded.
pub const HISTORY_CAP: usize = 48;

/// Default unit for water-level readings when the backend omits one.
pub const DEFAULT_UNIT: &str = "m";

// ---------------------------------------------------------------------------
// Coordinates
// ---------------------------------------------------------------------------

/// A WGS84 position, longitude first (the order the map view consumes).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub longitude: f64,
    pub latitude: f64,
}

impl Coordinates {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Coordinates { longitude, latitude }
    }
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Station alert status as shown on the dashboard.
///
/// The backend reports these as lowercase strings; `Unknown` covers devices
/// that report no status and have no thresholds to derive one from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationStatus {
    Safe,
    Warning,
    Alert,
    Unknown,
}

impl StationStatus {
    /// Parses the backend's status string. Unrecognized values map to
    /// `Unknown` rather than failing — a misspelled status must not drop
    /// the station from the list.
    pub fn parse(s: &str) -> StationStatus {
        match s.trim().to_ascii_lowercase().as_str() {
            "safe" => StationStatus::Safe,
            "warning" => StationStatus::Warning,
            // The backend has used both spellings over time.
            "alert" | "danger" => StationStatus::Alert,
            _ => StationStatus::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StationStatus::Safe => "safe",
            StationStatus::Warning => "warning",
            StationStatus::Alert => "alert",
            StationStatus::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for StationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Readings and thresholds
// ---------------------------------------------------------------------------

/// A single water-level measurement.
///
/// The timestamp is kept as the ISO 8601 string delivered by the backend
/// (e.g. "2025-11-03T07:15:00+07:00"); staleness checks parse it on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub value: f64,
    pub datetime: String,
}

/// Water-level thresholds for status classification, in meters.
///
/// Levels in ascending order: warning < alert.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaterThresholds {
    pub warning_level_m: f64,
    pub alert_level_m: f64,
}

// ---------------------------------------------------------------------------
// Station
// ---------------------------------------------------------------------------

/// A monitored sensor location.
///
/// Built from the backend device list on every refresh; `value`, `status`
/// and `history` are updated on each reading tick. Stations are never
/// deleted individually — the whole list is replaced wholesale.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    /// Backend device identifier. Also the stable sort key for the list.
    pub id: String,
    pub name: String,
    /// Missing when the device reports no usable lat/lon. Such stations
    /// still occupy a slot in the cycle; the map step degrades gracefully.
    pub coordinates: Option<Coordinates>,
    pub value: Option<f64>,
    pub unit: String,
    pub status: StationStatus,
    pub thresholds: Option<WaterThresholds>,
    /// Most recent readings, oldest first, capped at `HISTORY_CAP`.
    pub history: Vec<Reading>,
}

impl Station {
    /// Records a new reading: appends to history (evicting the oldest entries
    /// past `HISTORY_CAP`), updates the current value, and re-derives the
    /// status when thresholds are configured.
    pub fn record_reading(&mut self, value: f64, datetime: &str) {
        self.history.push(Reading {
            value,
            datetime: datetime.to_string(),
        });
        if self.history.len() > HISTORY_CAP {
            let excess = self.history.len() - HISTORY_CAP;
            self.history.drain(..excess);
        }
        self.value = Some(value);
        if let Some(t) = &self.thresholds {
            self.status = classify_level(value, t);
        }
    }

    /// Latest recorded reading, if any.
    pub fn latest_reading(&self) -> Option<&Reading> {
        self.history.last()
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when fetching or processing the device list.
#[derive(Debug, PartialEq)]
pub enum DeviceError {
    /// Non-2xx HTTP response from the FFWS backend.
    HttpError(u16),
    /// The response body could not be deserialized.
    ParseError(String),
    /// The request succeeded but the payload contained no devices.
    NoData,
    /// A device record is missing a field we cannot do without.
    MissingField(String),
}

impl std::fmt::Display for DeviceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceError::HttpError(code) => write!(f, "HTTP error: {}", code),
            DeviceError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            DeviceError::NoData => write!(f, "No devices in response"),
            DeviceError::MissingField(field) => write!(f, "Device record missing field: {}", field),
        }
    }
}

impl std::error::Error for DeviceError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
