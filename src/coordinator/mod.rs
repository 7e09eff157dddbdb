/// Station auto-cycle coordinator.
///
/// Rotates map focus through the station list on a fixed interval, flying the
/// camera to each station in turn. Stopping goes through a grace period so a
/// single nudge of the map does not flicker the cycle off; a second toggle
/// inside the window cancels the stop. The whole machine is single-threaded
/// and clock-injected: callers hand every operation the current time and
/// drive due timers through `advance_to`, which makes the state machine fully
/// deterministic under test.
///
/// States: Inactive, Active/Moving, Active/AtTarget, Active/PendingStop.
/// Map failures are advisory — a failed camera move is logged, reported as an
/// error event, and treated as settled so the loop is never stuck waiting on
/// an animation that will not happen.

pub mod scheduler;

use chrono::{DateTime, Utc};

use crate::config::CycleConfig;
use crate::logging::{self, Component};
use crate::map::{FlyToOptions, MapError, MapView};
use crate::model::Station;
use crate::notify::{CycleEvent, CycleObserver, ErrorKind};
use crate::stations::StationList;
use scheduler::{Scheduler, TimerId};

// ---------------------------------------------------------------------------
// Cycle state
// ---------------------------------------------------------------------------

/// The coordinator's externally visible state. Owned exclusively by the
/// coordinator; mutated only through its transition methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleState {
    pub is_active: bool,
    pub is_pending_stop: bool,
    pub current_index: usize,
    pub is_at_target: bool,
}

impl Default for CycleState {
    fn default() -> Self {
        CycleState {
            is_active: false,
            is_pending_stop: false,
            current_index: 0,
            is_at_target: true,
        }
    }
}

/// Coarse phase for UI status display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    Inactive,
    Moving,
    AtTarget,
    PendingStop,
}

impl CycleState {
    pub fn phase(&self) -> CyclePhase {
        if !self.is_active {
            CyclePhase::Inactive
        } else if self.is_pending_stop {
            CyclePhase::PendingStop
        } else if self.is_at_target {
            CyclePhase::AtTarget
        } else {
            CyclePhase::Moving
        }
    }
}

// ---------------------------------------------------------------------------
// Coordinator
// ---------------------------------------------------------------------------

pub struct CycleCoordinator<M: MapView> {
    map: M,
    stations: StationList,
    config: CycleConfig,
    state: CycleState,
    scheduler: Scheduler,
    observers: Vec<Box<dyn CycleObserver>>,
    /// Deadline the current Tick timer is armed for. Re-arming adds the
    /// interval to this anchor rather than to `now`, so camera animation and
    /// dispatch latency never accumulate into timing drift.
    next_tick_at: Option<DateTime<Utc>>,
    /// Set when `start` was requested with an empty list; the start fires
    /// from `set_stations` as soon as data arrives.
    pending_start: bool,
}

impl<M: MapView> CycleCoordinator<M> {
    pub fn new(map: M, config: CycleConfig) -> Self {
        CycleCoordinator {
            map,
            stations: StationList::new(),
            config,
            state: CycleState::default(),
            scheduler: Scheduler::new(),
            observers: Vec::new(),
            next_tick_at: None,
            pending_start: false,
        }
    }

    pub fn add_observer(&mut self, observer: Box<dyn CycleObserver>) {
        self.observers.push(observer);
    }

    pub fn state(&self) -> CycleState {
        self.state
    }

    pub fn phase(&self) -> CyclePhase {
        self.state.phase()
    }

    pub fn stations(&self) -> &StationList {
        &self.stations
    }

    pub fn current_station(&self) -> Option<&Station> {
        self.stations.get(self.state.current_index)
    }

    /// Earliest armed timer deadline; the daemon sleeps until this.
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.scheduler.next_deadline()
    }

    // -----------------------------------------------------------------------
    // Public operations
    // -----------------------------------------------------------------------

    /// Starts cycling. No-op when already active. With no station data the
    /// start is deferred: it fires from `set_stations` once devices arrive.
    pub fn start(&mut self, now: DateTime<Utc>) {
        if self.state.is_active {
            logging::debug(Component::Coordinator, None, "start ignored: already running");
            return;
        }
        if self.stations.is_empty() {
            logging::warn(
                Component::Coordinator,
                None,
                "cannot start auto cycle: no station data available; will start when devices arrive",
            );
            self.emit(CycleEvent::Error {
                kind: ErrorKind::ValidationError,
                detail: "no station data available".to_string(),
            });
            self.pending_start = true;
            return;
        }

        // A start during the stop grace period cancels the pending stop.
        self.scheduler.cancel(TimerId::DelayedStop);
        self.state.is_pending_stop = false;

        self.state.is_active = true;
        self.pending_start = false;
        self.state.current_index = self.stations.clamp_index(self.state.current_index);

        // Immediately focus the current station, then arm the repeating tick.
        self.fly_to_current(now);
        self.next_tick_at = Some(now + self.config.interval());
        self.scheduler.arm(TimerId::Tick, now + self.config.interval());

        let count = self.stations.len();
        let index = self.state.current_index;
        logging::info(
            Component::Coordinator,
            None,
            &format!("auto cycle started at index {} of {} stations", index, count),
        );
        self.emit(CycleEvent::Activated {
            current_index: index,
            station_count: count,
        });
    }

    /// Requests a stop. The cycle keeps running for `stop_delay`, during
    /// which `cancel_pending_stop` can revoke it. Idempotent while a stop is
    /// already pending.
    pub fn request_stop(&mut self, now: DateTime<Utc>) {
        if !self.state.is_active {
            logging::debug(Component::Coordinator, None, "stop request ignored: not active");
            return;
        }
        if self.state.is_pending_stop {
            logging::debug(Component::Coordinator, None, "stop already pending");
            return;
        }
        self.state.is_pending_stop = true;
        self.scheduler
            .arm(TimerId::DelayedStop, now + self.config.stop_delay());
        logging::info(
            Component::Coordinator,
            None,
            &format!("stop requested; stopping in {} ms unless cancelled", self.config.stop_delay_ms),
        );
    }

    /// Cancels a pending stop, resuming normal cycling without restarting
    /// the interval.
    pub fn cancel_pending_stop(&mut self) {
        if !self.state.is_pending_stop {
            return;
        }
        self.scheduler.cancel(TimerId::DelayedStop);
        self.state.is_pending_stop = false;
        logging::info(Component::Coordinator, None, "pending stop cancelled, cycle continues");
    }

    /// Stops now: clears every timer, deactivates, and emits a single
    /// `Deactivated`. Safe to call when already inactive.
    pub fn stop_immediately(&mut self) {
        let was_active = self.state.is_active;
        self.scheduler.clear();
        self.next_tick_at = None;
        self.pending_start = false;
        self.state.is_active = false;
        self.state.is_pending_stop = false;
        self.state.is_at_target = true;
        if was_active {
            logging::info(Component::Coordinator, None, "auto cycle stopped");
            self.emit(CycleEvent::Deactivated);
        }
    }

    /// Advances focus to the next station (wrapping) and re-arms the tick.
    /// Safe no-op when inactive or when the list is empty.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        if !self.state.is_active {
            logging::debug(Component::Coordinator, None, "tick skipped: not active");
            return;
        }
        if self.stations.is_empty() {
            logging::warn(Component::Coordinator, None, "tick skipped: no station data");
            return;
        }

        self.state.current_index = (self.state.current_index + 1) % self.stations.len();
        self.fly_to_current(now);

        // Drift-resistant re-arm: anchor on the previous deadline. A deadline
        // already in the past fires on the next advance, catching up one tick
        // per dispatch rather than bursting.
        let next = match self.next_tick_at {
            Some(deadline) => deadline + self.config.interval(),
            None => now + self.config.interval(),
        };
        self.next_tick_at = Some(next);
        self.scheduler.arm(TimerId::Tick, next);

        self.notify_station_changed();
    }

    /// Re-centers on an externally selected station without resetting the
    /// interval, keeping manual selection and auto-cycling consistent.
    pub fn sync_external_index(&mut self, index: usize, now: DateTime<Utc>) {
        if !self.state.is_active {
            return;
        }
        if index >= self.stations.len() {
            logging::warn(
                Component::Coordinator,
                None,
                &format!("external index {} out of range ({} stations)", index, self.stations.len()),
            );
            return;
        }
        if index == self.state.current_index {
            return;
        }
        self.state.current_index = index;
        self.fly_to_current(now);
        self.notify_station_changed();
    }

    /// Installs a fresh station list (wholesale replacement, id-sorted,
    /// index clamped). Forces an immediate stop when the list empties while
    /// active; honors a deferred start when data arrives.
    pub fn set_stations(&mut self, stations: Vec<Station>, now: DateTime<Utc>) {
        self.stations.replace(stations);
        self.state.current_index = self.stations.clamp_index(self.state.current_index);

        if self.stations.is_empty() {
            if self.state.is_active {
                logging::warn(Component::Coordinator, None, "station list emptied; stopping auto cycle");
                self.stop_immediately();
            }
            return;
        }

        if self.pending_start && !self.state.is_active {
            logging::info(Component::Coordinator, None, "devices arrived; starting deferred auto cycle");
            self.pending_start = false;
            self.start(now);
        }
    }

    /// Fires every timer due at or before `now`, in deadline order, looping
    /// until nothing more is due (a tick whose re-armed deadline is still in
    /// the past fires on the next pass).
    pub fn advance_to(&mut self, now: DateTime<Utc>) {
        loop {
            let due = self.scheduler.take_due(now);
            if due.is_empty() {
                return;
            }
            for id in due {
                match id {
                    TimerId::Settle => {
                        self.state.is_at_target = true;
                    }
                    TimerId::DelayedStop => {
                        self.stop_immediately();
                    }
                    TimerId::Tick => {
                        self.tick(now);
                    }
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Commands the map to the current station. Every failure here is
    /// advisory: logged, surfaced as an error event, and treated as settled
    /// so the cycle never hangs on a failed animation.
    fn fly_to_current(&mut self, now: DateTime<Utc>) {
        let (name, direct) = match self.stations.get(self.state.current_index) {
            Some(station) => (station.name.clone(), station.coordinates),
            None => return, // callers guard against empty lists
        };

        // Fall back to name resolution for devices whose record carried no
        // usable lat/lon but that match another entry by name.
        let coordinates = direct.or_else(|| self.stations.coordinates_for_name(&name));
        let Some(target) = coordinates else {
            logging::warn(
                Component::Map,
                Some(&name),
                "no coordinates resolvable for station; skipping camera move",
            );
            self.emit(CycleEvent::Error {
                kind: ErrorKind::CoordinateError,
                detail: format!("coordinates not found for station '{}'", name),
            });
            self.state.is_at_target = true;
            self.scheduler.cancel(TimerId::Settle);
            return;
        };

        let options = FlyToOptions {
            duration_ms: self.config.settle_delay_ms,
            ..FlyToOptions::default()
        };
        match self.map.fly_to(target, &options) {
            Ok(()) => {
                self.state.is_at_target = false;
                self.scheduler
                    .arm(TimerId::Settle, now + self.config.settle_delay());
            }
            Err(MapError::NotReady) => {
                logging::warn(Component::Map, Some(&name), "map not initialized yet; treating move as settled");
                self.emit(CycleEvent::Error {
                    kind: ErrorKind::MapNotReady,
                    detail: "map is not initialized yet".to_string(),
                });
                self.state.is_at_target = true;
                self.scheduler.cancel(TimerId::Settle);
            }
            Err(MapError::Unavailable(msg)) => {
                logging::error(Component::Map, Some(&name), &format!("camera move failed: {}", msg));
                self.emit(CycleEvent::Error {
                    kind: ErrorKind::UnexpectedError,
                    detail: msg,
                });
                self.state.is_at_target = true;
                self.scheduler.cancel(TimerId::Settle);
            }
        }
    }

    fn notify_station_changed(&mut self) {
        let index = self.state.current_index;
        if let Some(station) = self.stations.get(index).cloned() {
            logging::debug(
                Component::Coordinator,
                Some(&station.name),
                &format!("focus moved to index {}", index),
            );
            self.emit(CycleEvent::StationChanged { station, index });
        }
    }

    fn emit(&mut self, event: CycleEvent) {
        for observer in &mut self.observers {
            observer.on_event(&event);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
