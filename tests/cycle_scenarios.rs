//! End-to-end auto-cycle scenarios.
//!
//! Everything here runs against the public API with a fixed fake clock: the
//! tests construct a `DateTime<Utc>` origin and hand the coordinator explicit
//! `now` values, so timer behavior is exact to the millisecond with no
//! sleeping and no flakiness.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use ffws_service::config::CycleConfig;
use ffws_service::coordinator::{CycleCoordinator, CyclePhase};
use ffws_service::ingest::devices::parse_devices_response;
use ffws_service::map::{FlyToOptions, MapError, MapView};
use ffws_service::model::{Coordinates, Station, StationStatus, DEFAULT_UNIT};
use ffws_service::notify::{CycleEvent, SharedEventLog};

// ---------------------------------------------------------------------------
// Test doubles
// ---------------------------------------------------------------------------

/// Map stub that records every fly-to target in order.
#[derive(Clone, Default)]
struct RecordingMap {
    fly_tos: Rc<RefCell<Vec<Coordinates>>>,
}

impl RecordingMap {
    fn targets(&self) -> Vec<Coordinates> {
        self.fly_tos.borrow().clone()
    }
}

impl MapView for RecordingMap {
    fn fly_to(&mut self, target: Coordinates, _options: &FlyToOptions) -> Result<(), MapError> {
        self.fly_tos.borrow_mut().push(target);
        Ok(())
    }

    fn add_marker(&mut self, _id: &str, _position: Coordinates) -> Result<(), MapError> {
        Ok(())
    }

    fn remove_marker(&mut self, _id: &str) -> Result<(), MapError> {
        Ok(())
    }
}

fn station(id: &str, name: &str, lon: f64, lat: f64) -> Station {
    Station {
        id: id.to_string(),
        name: name.to_string(),
        coordinates: Some(Coordinates::new(lon, lat)),
        value: None,
        unit: DEFAULT_UNIT.to_string(),
        status: StationStatus::Unknown,
        thresholds: None,
        history: Vec::new(),
    }
}

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 11, 3, 9, 0, 0).unwrap()
}

fn at(ms: i64) -> DateTime<Utc> {
    t0() + Duration::milliseconds(ms)
}

fn harness(
    config: CycleConfig,
    stations: Vec<Station>,
) -> (CycleCoordinator<RecordingMap>, RecordingMap, SharedEventLog) {
    let map = RecordingMap::default();
    let log = SharedEventLog::new();
    let mut coordinator = CycleCoordinator::new(map.clone(), config);
    coordinator.add_observer(Box::new(log.clone()));
    coordinator.set_stations(stations, t0());
    (coordinator, map, log)
}

fn abc() -> Vec<Station> {
    vec![
        station("a", "A", 0.0, 0.0),
        station("b", "B", 1.0, 1.0),
        station("c", "C", 2.0, 2.0),
    ]
}

// ---------------------------------------------------------------------------
// Wraparound: A at t=0, B at 1000, C at 2000, A again at 3000
// ---------------------------------------------------------------------------

#[test]
fn wraparound_timeline_matches_interval_exactly() {
    let config = CycleConfig {
        interval_ms: 1000,
        stop_delay_ms: 5000,
        settle_delay_ms: 100,
    };
    let (mut coordinator, map, _log) = harness(config, abc());

    coordinator.start(at(0));
    assert_eq!(map.targets(), vec![Coordinates::new(0.0, 0.0)], "flyTo(A) at t=0");

    // One millisecond early: nothing fires.
    coordinator.advance_to(at(999));
    assert_eq!(map.targets().len(), 1);

    coordinator.advance_to(at(1000));
    assert_eq!(map.targets().last(), Some(&Coordinates::new(1.0, 1.0)), "flyTo(B) at t=1000");

    coordinator.advance_to(at(2000));
    assert_eq!(map.targets().last(), Some(&Coordinates::new(2.0, 2.0)), "flyTo(C) at t=2000");

    coordinator.advance_to(at(3000));
    assert_eq!(map.targets().last(), Some(&Coordinates::new(0.0, 0.0)), "flyTo(A) at t=3000 (wraparound)");
    assert_eq!(map.targets().len(), 4);
}

#[test]
fn index_advances_exactly_n_times_for_n_firings() {
    let config = CycleConfig {
        interval_ms: 1000,
        stop_delay_ms: 5000,
        settle_delay_ms: 100,
    };
    let (mut coordinator, _map, log) = harness(config, abc());
    coordinator.start(at(0));

    let n = 10usize;
    for i in 1..=n {
        coordinator.advance_to(at(1000 * i as i64));
    }
    assert_eq!(coordinator.state().current_index, n % 3);
    assert_eq!(
        log.count(|e| matches!(e, CycleEvent::StationChanged { .. })),
        n,
        "one station change per firing, no double ticks"
    );
}

// ---------------------------------------------------------------------------
// Delayed stop and its cancellation
// ---------------------------------------------------------------------------

#[test]
fn pending_stop_cancelled_inside_grace_window_keeps_cycle_running() {
    // Active at index 1, request_stop at t=0 with stop_delay=500, cancel at
    // t=200 → still active, no Deactivated, next tick unaffected.
    let config = CycleConfig {
        interval_ms: 1000,
        stop_delay_ms: 500,
        settle_delay_ms: 100,
    };
    let (mut coordinator, map, log) = harness(config, abc());
    coordinator.start(at(0));
    coordinator.advance_to(at(1000));
    assert_eq!(coordinator.state().current_index, 1);

    coordinator.request_stop(at(1000));
    assert_eq!(coordinator.phase(), CyclePhase::PendingStop);

    coordinator.advance_to(at(1200));
    coordinator.cancel_pending_stop();

    // Past the would-have-stopped moment (t=1500): still cycling.
    coordinator.advance_to(at(1600));
    assert!(coordinator.state().is_active);
    assert_eq!(log.count(|e| matches!(e, CycleEvent::Deactivated)), 0);

    // The interval was never restarted: the next tick lands at t=2000.
    coordinator.advance_to(at(2000));
    assert_eq!(coordinator.state().current_index, 2);
    assert_eq!(map.targets().len(), 3);
}

#[test]
fn uncancelled_stop_deactivates_after_exactly_stop_delay() {
    let config = CycleConfig {
        interval_ms: 10_000,
        stop_delay_ms: 500,
        settle_delay_ms: 100,
    };
    let (mut coordinator, _map, log) = harness(config, abc());
    coordinator.start(at(0));
    coordinator.request_stop(at(100));

    // One millisecond before the deadline: still active.
    coordinator.advance_to(at(599));
    assert!(coordinator.state().is_active);

    coordinator.advance_to(at(600));
    assert!(!coordinator.state().is_active);
    assert!(coordinator.state().is_at_target);
    assert_eq!(coordinator.phase(), CyclePhase::Inactive);
    assert_eq!(
        log.count(|e| matches!(e, CycleEvent::Deactivated)),
        1,
        "exactly one deactivated notification"
    );
}

#[test]
fn second_interaction_during_grace_window_is_ignored() {
    let config = CycleConfig {
        interval_ms: 10_000,
        stop_delay_ms: 500,
        settle_delay_ms: 100,
    };
    let (mut coordinator, _map, log) = harness(config, abc());
    coordinator.start(at(0));
    coordinator.request_stop(at(0));
    // Re-requesting must not extend the grace window.
    coordinator.request_stop(at(400));
    coordinator.advance_to(at(500));
    assert!(!coordinator.state().is_active);
    assert_eq!(log.count(|e| matches!(e, CycleEvent::Deactivated)), 1);
}

// ---------------------------------------------------------------------------
// List replacement while active
// ---------------------------------------------------------------------------

#[test]
fn emptied_list_deactivates_in_the_same_update() {
    let config = CycleConfig::default();
    let (mut coordinator, _map, log) = harness(config, abc());
    coordinator.start(at(0));

    coordinator.set_stations(Vec::new(), at(100));
    assert!(!coordinator.state().is_active, "deactivated within the same update");
    assert_eq!(log.count(|e| matches!(e, CycleEvent::Deactivated)), 1);

    // No pending timer may resurrect the cycle.
    coordinator.advance_to(at(60_000));
    assert!(!coordinator.state().is_active);
    assert_eq!(log.count(|e| matches!(e, CycleEvent::Deactivated)), 1);
}

#[test]
fn refresh_resorts_by_id_and_keeps_cycling() {
    let config = CycleConfig {
        interval_ms: 1000,
        stop_delay_ms: 5000,
        settle_delay_ms: 100,
    };
    let (mut coordinator, map, _log) = harness(config, abc());
    coordinator.start(at(0));

    // Refresh arrives out of order; the id sort keeps the visit order stable.
    coordinator.set_stations(
        vec![
            station("c", "C", 2.0, 2.0),
            station("a", "A", 0.5, 0.5), // moved sensor, same id
            station("b", "B", 1.0, 1.0),
        ],
        at(500),
    );
    assert!(coordinator.state().is_active);

    coordinator.advance_to(at(1000));
    assert_eq!(map.targets().last(), Some(&Coordinates::new(1.0, 1.0)), "tick still advances to B");
}

// ---------------------------------------------------------------------------
// External index sync
// ---------------------------------------------------------------------------

#[test]
fn external_sync_recenters_without_resetting_remaining_period() {
    let config = CycleConfig {
        interval_ms: 1000,
        stop_delay_ms: 5000,
        settle_delay_ms: 100,
    };
    let (mut coordinator, map, log) = harness(config, abc());
    coordinator.start(at(0));

    // User picks station C from the legend at t=700.
    coordinator.sync_external_index(2, at(700));
    assert_eq!(coordinator.state().current_index, 2);
    assert_eq!(map.targets().last(), Some(&Coordinates::new(2.0, 2.0)));

    // The tick still fires at t=1000 (not t=1700) and advances 2 → 0.
    coordinator.advance_to(at(1000));
    assert_eq!(coordinator.state().current_index, 0);
    assert_eq!(
        log.count(|e| matches!(e, CycleEvent::StationChanged { .. })),
        2,
        "one change from the sync, one from the tick — no double ticks"
    );
}

// ---------------------------------------------------------------------------
// Full pipeline: backend payload → coordinator
// ---------------------------------------------------------------------------

#[test]
fn parsed_backend_payload_drives_the_cycle() {
    let body = r#"{
        "data": [
            {"id": 2, "device_name": "Manggarai BKB", "latitude": "-6.2088", "longitude": "106.8456", "value": "2.31", "status": "warning"},
            {"id": 1, "name": "Katulampa", "latitude": -6.6341, "longitude": 106.8372, "value": 0.8, "status": "safe"}
        ]
    }"#;
    let stations = parse_devices_response(body).expect("payload should parse");

    let config = CycleConfig {
        interval_ms: 1000,
        stop_delay_ms: 5000,
        settle_delay_ms: 100,
    };
    let map = RecordingMap::default();
    let log = SharedEventLog::new();
    let mut coordinator = CycleCoordinator::new(map.clone(), config);
    coordinator.add_observer(Box::new(log.clone()));
    coordinator.set_stations(stations, t0());

    coordinator.start(at(0));
    // Id sort puts Katulampa (id 1) first.
    assert_eq!(map.targets(), vec![Coordinates::new(106.8372, -6.6341)]);

    coordinator.advance_to(at(1000));
    assert_eq!(map.targets().last(), Some(&Coordinates::new(106.8456, -6.2088)));

    let changed_names: Vec<String> = log
        .events()
        .iter()
        .filter_map(|e| match e {
            CycleEvent::StationChanged { station, .. } => Some(station.name.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(changed_names, vec!["Manggarai BKB".to_string()]);
}

// ---------------------------------------------------------------------------
// Settle delay visibility
// ---------------------------------------------------------------------------

#[test]
fn phase_tracks_camera_settling_across_ticks() {
    let config = CycleConfig {
        interval_ms: 1000,
        stop_delay_ms: 5000,
        settle_delay_ms: 300,
    };
    let (mut coordinator, _map, _log) = harness(config, abc());

    coordinator.start(at(0));
    assert_eq!(coordinator.phase(), CyclePhase::Moving);

    coordinator.advance_to(at(300));
    assert_eq!(coordinator.phase(), CyclePhase::AtTarget);

    coordinator.advance_to(at(1000));
    assert_eq!(coordinator.phase(), CyclePhase::Moving, "tick starts a new camera move");

    coordinator.advance_to(at(1300));
    assert_eq!(coordinator.phase(), CyclePhase::AtTarget);
}
