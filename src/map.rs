/// Map view capability consumed by the auto-cycle coordinator.
///
/// The coordinator never owns the map; it is handed something that can move
/// the camera and manage markers. Injecting the capability (instead of the
/// dashboard's old pattern of reaching for a globally registered function)
/// removes the "function not yet registered" race — a coordinator without a
/// map simply cannot be constructed.

use crate::model::Coordinates;

// ---------------------------------------------------------------------------
// Fly-to options
// ---------------------------------------------------------------------------

/// Camera animation parameters for a focus change.
#[derive(Debug, Clone, PartialEq)]
pub struct FlyToOptions {
    /// Target zoom; `None` keeps the current zoom level.
    pub zoom: Option<f64>,
    /// Animation duration. The coordinator's settle delay should be at least
    /// this long so `is_at_target` tracks the visible animation.
    pub duration_ms: u64,
}

impl Default for FlyToOptions {
    fn default() -> Self {
        FlyToOptions {
            zoom: Some(13.0),
            duration_ms: 1000,
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failures the map surface can report. All of them are advisory to the
/// coordinator — a failed camera move never stops the cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum MapError {
    /// The map is not initialized yet (startup race).
    NotReady,
    /// The underlying map SDK rejected the operation.
    Unavailable(String),
}

impl std::fmt::Display for MapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MapError::NotReady => write!(f, "Map is not initialized yet"),
            MapError::Unavailable(msg) => write!(f, "Map unavailable: {}", msg),
        }
    }
}

impl std::error::Error for MapError {}

// ---------------------------------------------------------------------------
// Map view contract
// ---------------------------------------------------------------------------

/// The camera/marker surface the coordinator drives.
///
/// Implementations wrap the real mapping SDK; tests use a recording stub.
/// The coordinator only calls these operations and does not manage the map's
/// lifecycle.
pub trait MapView {
    fn fly_to(&mut self, target: Coordinates, options: &FlyToOptions) -> Result<(), MapError>;

    fn add_marker(&mut self, id: &str, position: Coordinates) -> Result<(), MapError>;

    fn remove_marker(&mut self, id: &str) -> Result<(), MapError>;
}
