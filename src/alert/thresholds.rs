//! Water-level threshold classification.
//!
//! The ticker and the map markers both color stations by this status, so the
//! boundary semantics here must match the dashboard exactly: thresholds are
//! inclusive lower bounds (a level sitting exactly on the alert line is an
//! alert, not a warning).

use crate::model::{StationStatus, WaterThresholds};

/// Classifies a water level against a station's thresholds.
///
///   value >= alert_level_m   → Alert
///   value >= warning_level_m → Warning
///   otherwise                → Safe
pub fn classify_level(value: f64, thresholds: &WaterThresholds) -> StationStatus {
    if value >= thresholds.alert_level_m {
        StationStatus::Alert
    } else if value >= thresholds.warning_level_m {
        StationStatus::Warning
    } else {
        StationStatus::Safe
    }
}
