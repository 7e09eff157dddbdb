//! FFWS station monitoring service.
//!
//! Maintains the flood-monitoring station list fetched from the FFWS backend,
//! classifies water levels against per-station thresholds, and runs the
//! station auto-cycle coordinator that rotates map focus through the list.
//!
//! The coordinator is deliberately single-threaded and clock-injected: every
//! time-dependent operation takes `now` as a parameter and timers are driven
//! through an explicit scheduler, so the whole state machine is deterministic
//! under test.

pub mod alert;
pub mod config;
pub mod coordinator;
pub mod ingest;
pub mod logging;
pub mod map;
pub mod model;
pub mod notify;
pub mod stations;
