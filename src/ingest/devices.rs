/// FFWS backend device-list client.
///
/// Retrieves the monitored station list from the backend's `/devices`
/// endpoint. The payload is a `{ "data": [...] }` envelope whose records are
/// loosely typed: station names appear under `name`, `device_name`, or
/// `station_name` depending on device generation, and latitude/longitude
/// arrive as either JSON numbers or numeric strings. This module absorbs all
/// of that variance and produces clean `Station` values.

use serde::Deserialize;
use serde_json::Value;

use crate::model::{
    Coordinates, DeviceError, Reading, Station, StationStatus, WaterThresholds, DEFAULT_UNIT,
};

// ---------------------------------------------------------------------------
// API Response Structures
// ---------------------------------------------------------------------------

/// Device list response envelope.
#[derive(Debug, Deserialize)]
pub struct DevicesResponse {
    pub data: Vec<DeviceRecord>,
}

/// A single device record, as loosely shaped as the backend sends it.
#[derive(Debug, Deserialize)]
pub struct DeviceRecord {
    pub id: Option<Value>,
    pub name: Option<String>,
    pub device_name: Option<String>,
    pub station_name: Option<String>,
    /// Number or numeric string, depending on device generation.
    pub latitude: Option<Value>,
    pub longitude: Option<Value>,
    pub value: Option<Value>,
    pub unit: Option<String>,
    pub status: Option<String>,
    pub warning_level: Option<Value>,
    pub danger_level: Option<Value>,
    /// ISO 8601 timestamp of the latest reading, when the backend includes it.
    pub last_update: Option<String>,
}

// ---------------------------------------------------------------------------
// Field coercion helpers
// ---------------------------------------------------------------------------

/// Parses a value that may be a JSON number, a numeric string, or absent.
/// "null", empty, and unparseable strings all coerce to `None`.
fn parse_flexible_f64(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() || trimmed == "null" {
                None
            } else {
                trimmed.parse().ok()
            }
        }
        _ => None,
    }
}

/// Renders a loosely typed id field as a string key.
fn parse_id(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Conversion
// ---------------------------------------------------------------------------

/// Converts a raw device record into a `Station`.
///
/// Records with no resolvable name are rejected — the cycle and the lookup
/// ladder both key on names. Records without usable coordinates are kept
/// (coordinates `None`): they still hold a slot in the cycle, and the
/// coordinator degrades that step gracefully.
pub fn device_to_station(record: DeviceRecord) -> Result<Station, DeviceError> {
    let name = record
        .name
        .as_deref()
        .or(record.device_name.as_deref())
        .or(record.station_name.as_deref())
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(String::from)
        .ok_or_else(|| DeviceError::MissingField("name".to_string()))?;

    // Fall back to the name as id so a registry missing ids still sorts
    // deterministically.
    let id = parse_id(record.id.as_ref()).unwrap_or_else(|| name.clone());

    let latitude = parse_flexible_f64(record.latitude.as_ref());
    let longitude = parse_flexible_f64(record.longitude.as_ref());
    let coordinates = match (longitude, latitude) {
        (Some(lon), Some(lat)) if lon.is_finite() && lat.is_finite() => {
            Some(Coordinates::new(lon, lat))
        }
        _ => None,
    };

    let thresholds = match (
        parse_flexible_f64(record.warning_level.as_ref()),
        parse_flexible_f64(record.danger_level.as_ref()),
    ) {
        (Some(warning_level_m), Some(alert_level_m)) => Some(WaterThresholds {
            warning_level_m,
            alert_level_m,
        }),
        _ => None,
    };

    let value = parse_flexible_f64(record.value.as_ref());
    let status = record
        .status
        .as_deref()
        .map(StationStatus::parse)
        .unwrap_or(StationStatus::Unknown);

    // Seed the history with the current reading when the backend dates it.
    let history = match (value, record.last_update.as_deref()) {
        (Some(v), Some(dt)) => vec![Reading {
            value: v,
            datetime: dt.to_string(),
        }],
        _ => Vec::new(),
    };

    Ok(Station {
        id,
        name,
        coordinates,
        value,
        unit: record.unit.unwrap_or_else(|| DEFAULT_UNIT.to_string()),
        status,
        thresholds,
        history,
    })
}

// ---------------------------------------------------------------------------
// Parsing and fetching
// ---------------------------------------------------------------------------

/// Parses a raw `/devices` response body into stations.
///
/// Individual malformed records (missing name) are skipped, not fatal — one
/// bad device must not drop the whole list. An empty result is `NoData`.
pub fn parse_devices_response(body: &str) -> Result<Vec<Station>, DeviceError> {
    let response: DevicesResponse =
        serde_json::from_str(body).map_err(|e| DeviceError::ParseError(e.to_string()))?;

    let mut stations = Vec::with_capacity(response.data.len());
    let mut skipped = 0usize;
    for record in response.data {
        match device_to_station(record) {
            Ok(station) => stations.push(station),
            Err(_) => skipped += 1,
        }
    }
    if skipped > 0 {
        crate::logging::warn(
            crate::logging::Component::Devices,
            None,
            &format!("skipped {} device record(s) with no resolvable name", skipped),
        );
    }

    if stations.is_empty() {
        return Err(DeviceError::NoData);
    }
    Ok(stations)
}

/// Builds the device-list URL from the configured API base.
pub fn build_devices_url(base_url: &str) -> String {
    format!("{}/devices", base_url.trim_end_matches('/'))
}

/// Fetches the current device list from the FFWS backend.
pub fn fetch_devices(
    client: &reqwest::blocking::Client,
    base_url: &str,
) -> Result<Vec<Station>, DeviceError> {
    let url = build_devices_url(base_url);

    let response = client
        .get(&url)
        .header("Accept", "application/json")
        .send()
        .map_err(|e| DeviceError::ParseError(format!("request failed: {}", e)))?;

    if !response.status().is_success() {
        return Err(DeviceError::HttpError(response.status().as_u16()));
    }

    let body = response
        .text()
        .map_err(|e| DeviceError::ParseError(format!("failed to read body: {}", e)))?;

    parse_devices_response(&body)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------


// ---------------------------------------------------------------------------
// Integration Tests - Live Backend Verification
// ---------------------------------------------------------------------------
//
// Marked #[ignore] so normal CI builds do not depend on the backend being up.
// Run manually with: cargo test -- --ignored live_backend
