/// Service configuration.
///
/// Loaded from a TOML file; every field has a default so an empty (or
/// missing) file yields a working configuration. Defaults mirror the
/// dashboard: 5 s between focus changes, 5 s stop grace period, 1 s camera
/// settle, device refresh every 10 s.

use serde::Deserialize;
use std::path::Path;

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// `[cycle]` — auto-cycle timing.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct CycleConfig {
    /// Milliseconds between automatic focus advances.
    pub interval_ms: u64,
    /// Grace period between a stop request and the actual stop.
    pub stop_delay_ms: u64,
    /// Pause after commanding a camera move, approximating when the
    /// animation visually completes.
    pub settle_delay_ms: u64,
}

impl Default for CycleConfig {
    fn default() -> Self {
        CycleConfig {
            interval_ms: 5000,
            stop_delay_ms: 5000,
            settle_delay_ms: 1000,
        }
    }
}

impl CycleConfig {
    pub fn interval(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(self.interval_ms as i64)
    }

    pub fn stop_delay(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(self.stop_delay_ms as i64)
    }

    pub fn settle_delay(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(self.settle_delay_ms as i64)
    }
}

/// `[devices]` — FFWS backend access.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct DevicesConfig {
    pub base_url: String,
    /// Milliseconds between device list refreshes.
    pub fetch_interval_ms: u64,
}

impl Default for DevicesConfig {
    fn default() -> Self {
        DevicesConfig {
            base_url: "https://ffws-backend.rachmanesa.com/api".to_string(),
            fetch_interval_ms: 10_000,
        }
    }
}

/// `[log]` — logging sink configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    /// Minimum level: "debug" | "info" | "warn" | "error".
    pub level: String,
    /// Optional log file path; console-only when absent.
    pub file: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: "info".to_string(),
            file: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub cycle: CycleConfig,
    pub devices: DevicesConfig,
    pub log: LogConfig,
}

impl Config {
    /// Rejects configurations that would wedge the coordinator.
    pub fn validate(&self) -> Result<(), String> {
        if self.cycle.interval_ms == 0 {
            return Err("cycle.interval_ms must be greater than zero".to_string());
        }
        if self.cycle.stop_delay_ms == 0 {
            return Err("cycle.stop_delay_ms must be greater than zero".to_string());
        }
        if self.devices.base_url.is_empty() {
            return Err("devices.base_url must not be empty".to_string());
        }
        Ok(())
    }
}

/// Loads configuration from a TOML file. A missing file is not an error —
/// the defaults apply, which keeps first-run setups working.
pub fn load_config(path: &Path) -> Result<Config, String> {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(Config::default());
        }
        Err(e) => return Err(format!("failed to read {}: {}", path.display(), e)),
    };
    let config: Config =
        toml::from_str(&contents).map_err(|e| format!("invalid config {}: {}", path.display(), e))?;
    config.validate()?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
