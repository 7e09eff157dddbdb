/// Coordinator notifications.
///
/// The dashboard used document-level custom events (`autoSwitchActivated`,
/// `autoSwitchError`, ...) to loosely couple the auto-cycle, the map, and the
/// UI shell. This module replaces that bus with a typed observer interface:
/// same pub/sub semantics, no ambient global state.

use crate::model::Station;

// ---------------------------------------------------------------------------
// Error kinds
// ---------------------------------------------------------------------------

/// Advisory error categories surfaced to the UI shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A precondition failed (e.g. start with no stations).
    ValidationError,
    /// The map view is not initialized yet.
    MapNotReady,
    /// A station's location could not be resolved to coordinates.
    CoordinateError,
    /// Anything the map surface threw that we did not anticipate.
    UnexpectedError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ValidationError => "validation_error",
            ErrorKind::MapNotReady => "map_not_ready",
            ErrorKind::CoordinateError => "coordinate_error",
            ErrorKind::UnexpectedError => "unexpected_error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Everything the coordinator tells the outside world.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleEvent {
    /// Cycling started; carries the starting position and the list size.
    Activated {
        current_index: usize,
        station_count: usize,
    },
    /// Cycling stopped (delayed stop elapsed, explicit stop, or empty list).
    Deactivated,
    /// Focus moved to a new station, either by tick or by external sync.
    StationChanged { station: Station, index: usize },
    /// An advisory failure. The cycle keeps running.
    Error { kind: ErrorKind, detail: String },
}

/// Listener for coordinator events. The UI shell implements this to drive
/// its Inactive / Moving / At Marker / Stopping indicator.
pub trait CycleObserver {
    fn on_event(&mut self, event: &CycleEvent);
}

// ---------------------------------------------------------------------------
// Buffering observer
// ---------------------------------------------------------------------------

/// Observer that records every event. The daemon drains it for logging;
/// tests assert against it.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<CycleEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        EventLog { events: Vec::new() }
    }

    pub fn events(&self) -> &[CycleEvent] {
        &self.events
    }

    pub fn drain(&mut self) -> Vec<CycleEvent> {
        std::mem::take(&mut self.events)
    }

    /// Number of recorded events matching a predicate.
    pub fn count(&self, pred: impl Fn(&CycleEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl CycleObserver for EventLog {
    fn on_event(&mut self, event: &CycleEvent) {
        self.events.push(event.clone());
    }
}

/// Cloneable handle to a shared `EventLog`.
///
/// The coordinator owns its observers, so a caller that also wants to read
/// the recorded events keeps one clone of this handle and registers the
/// other. Single-threaded by design, like the coordinator itself.
#[derive(Debug, Clone, Default)]
pub struct SharedEventLog(std::rc::Rc<std::cell::RefCell<EventLog>>);

impl SharedEventLog {
    pub fn new() -> Self {
        SharedEventLog::default()
    }

    pub fn events(&self) -> Vec<CycleEvent> {
        self.0.borrow().events().to_vec()
    }

    pub fn drain(&self) -> Vec<CycleEvent> {
        self.0.borrow_mut().drain()
    }

    pub fn count(&self, pred: impl Fn(&CycleEvent) -> bool) -> usize {
        self.0.borrow().count(pred)
    }
}

impl CycleObserver for SharedEventLog {
    fn on_event(&mut self, event: &CycleEvent) {
        self.0.borrow_mut().on_event(event);
    }
}
