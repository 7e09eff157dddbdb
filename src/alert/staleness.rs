/// Reading staleness detection.
///
/// Sensors report every few minutes under normal conditions. During a flood
/// event, stale data is dangerous — a sensor outage or a dead uplink may not
/// be obvious from the dashboard. This module provides staleness checking so
/// the auto-cycle and the ticker can flag gaps instead of presenting an old
/// reading as current.
///
/// # Clock injection
/// All functions accept a `now: DateTime<Utc>` parameter rather than calling
/// `Utc::now()` internally. This makes staleness purely deterministic in
/// tests without mocking or time manipulation.

use crate::model::Reading;

// ---------------------------------------------------------------------------
// Staleness check
// ---------------------------------------------------------------------------

/// Returns `true` if the reading's datetime is older than `max_age_minutes`
/// relative to `now`.
///
/// Staleness is defined as strictly greater than the threshold:
///   age > max_age_minutes  →  stale
///   age == max_age_minutes →  not stale
///
/// Returns an error if the reading's datetime string cannot be parsed.
/// Callers should treat parse failures as stale (fail-safe default).
pub fn is_stale_at(
    reading: &Reading,
    max_age_minutes: u64,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<bool, String> {
    let parsed = chrono::DateTime::parse_from_rfc3339(&reading.datetime)
        .map_err(|e| format!("unparseable reading datetime '{}': {}", reading.datetime, e))?;
    let reading_time = parsed.with_timezone(&chrono::Utc);
    let age_minutes = (now - reading_time).num_minutes();
    if age_minutes < 0 {
        // Clock skew between the backend and us. A reading from the future
        // is not stale.
        return Ok(false);
    }
    Ok(age_minutes as u64 > max_age_minutes)
}

/// Convenience wrapper that uses the real current time.
/// Use `is_stale_at` in tests to keep them deterministic.
pub fn is_stale(reading: &Reading, max_age_minutes: u64) -> Result<bool, String> {
    is_stale_at(reading, max_age_minutes, chrono::Utc::now())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
