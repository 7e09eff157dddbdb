/// Daemon entry point.
///
/// Wires the pieces together: loads configuration, initializes logging,
/// fetches the device list from the FFWS backend, and drives the auto-cycle
/// coordinator with the real clock. The map view here is a console stub that
/// logs camera moves — the service's job is the cycling and the station
/// state; rendering belongs to the dashboard frontend.

use std::path::Path;
use std::time::Duration as StdDuration;

use chrono::Utc;

use ffws_service::config::{load_config, Config};
use ffws_service::coordinator::CycleCoordinator;
use ffws_service::ingest::devices::fetch_devices;
use ffws_service::logging::{self, Component, LogLevel};
use ffws_service::map::{FlyToOptions, MapError, MapView};
use ffws_service::model::Coordinates;
use ffws_service::notify::{CycleEvent, SharedEventLog};

/// Map view that logs camera commands instead of rendering them.
struct ConsoleMap;

impl MapView for ConsoleMap {
    fn fly_to(&mut self, target: Coordinates, options: &FlyToOptions) -> Result<(), MapError> {
        logging::info(
            Component::Map,
            None,
            &format!(
                "fly to ({:.4}, {:.4}) over {} ms",
                target.longitude, target.latitude, options.duration_ms
            ),
        );
        Ok(())
    }

    fn add_marker(&mut self, id: &str, position: Coordinates) -> Result<(), MapError> {
        logging::debug(
            Component::Map,
            Some(id),
            &format!("marker at ({:.4}, {:.4})", position.longitude, position.latitude),
        );
        Ok(())
    }

    fn remove_marker(&mut self, id: &str) -> Result<(), MapError> {
        logging::debug(Component::Map, Some(id), "marker removed");
        Ok(())
    }
}

fn log_events(events: Vec<CycleEvent>) {
    for event in events {
        match event {
            CycleEvent::Activated {
                current_index,
                station_count,
            } => logging::info(
                Component::System,
                None,
                &format!("cycle active at {} of {} stations", current_index, station_count),
            ),
            CycleEvent::Deactivated => {
                logging::info(Component::System, None, "cycle inactive");
            }
            CycleEvent::StationChanged { station, index } => logging::info(
                Component::System,
                Some(&station.name),
                &format!(
                    "now showing station {} (status {}, value {})",
                    index,
                    station.status,
                    station
                        .value
                        .map(|v| format!("{:.2} {}", v, station.unit))
                        .unwrap_or_else(|| "n/a".to_string()),
                ),
            ),
            CycleEvent::Error { kind, detail } => {
                logging::warn(Component::System, None, &format!("cycle error [{}]: {}", kind, detail));
            }
        }
    }
}

fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let client = reqwest::blocking::Client::builder()
        .timeout(StdDuration::from_secs(10))
        .build()?;

    let events = SharedEventLog::new();
    let mut coordinator = CycleCoordinator::new(ConsoleMap, config.cycle.clone());
    coordinator.add_observer(Box::new(events.clone()));

    // Initial fetch; a failure is advisory (the deferred start fires once
    // devices arrive on a later refresh).
    match fetch_devices(&client, &config.devices.base_url) {
        Ok(stations) => {
            logging::info(
                Component::Devices,
                None,
                &format!("loaded {} stations from backend", stations.len()),
            );
            coordinator.set_stations(stations, Utc::now());
        }
        Err(e) => logging::log_fetch_failure("initial device fetch", &e),
    }

    coordinator.start(Utc::now());
    log_events(events.drain());

    let fetch_interval = chrono::Duration::milliseconds(config.devices.fetch_interval_ms as i64);
    let mut next_fetch_at = Utc::now() + fetch_interval;

    loop {
        let now = Utc::now();

        if now >= next_fetch_at {
            match fetch_devices(&client, &config.devices.base_url) {
                Ok(stations) => coordinator.set_stations(stations, now),
                Err(e) => logging::log_fetch_failure("device refresh", &e),
            }
            next_fetch_at = now + fetch_interval;
        }

        coordinator.advance_to(now);
        log_events(events.drain());

        // Sleep until the next timer or fetch, whichever comes first.
        let wake_at = coordinator
            .next_deadline()
            .map_or(next_fetch_at, |d| d.min(next_fetch_at));
        let sleep_ms = (wake_at - Utc::now()).num_milliseconds().clamp(10, 1000);
        std::thread::sleep(StdDuration::from_millis(sleep_ms as u64));
    }
}

fn main() {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "ffws_service.toml".to_string());

    let config = match load_config(Path::new(&config_path)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {}", e);
            std::process::exit(1);
        }
    };

    logging::init_logger(
        LogLevel::parse(&config.log.level),
        config.log.file.as_deref(),
        true,
    );
    logging::info(
        Component::System,
        None,
        &format!(
            "ffws_service starting (interval {} ms, backend {})",
            config.cycle.interval_ms, config.devices.base_url
        ),
    );

    if let Err(e) = run(config) {
        logging::error(Component::System, None, &format!("fatal: {}", e));
        std::process::exit(1);
    }
}
