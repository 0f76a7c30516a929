//! Configuration structures
//!
//! Every section defaults to the production contract of the detection
//! service, so an empty file (or no file at all) is a valid configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    ACTUATOR_TIMEOUT_MS, CONFIRM_TIMEOUT_MS, DEFAULT_API_URL, HEALTH_TIMEOUT_MS,
    REJECT_TIMEOUT_MS, RESET_TIMEOUT_MS, SCAN_MAX_ATTEMPTS, SCAN_POLL_INTERVAL_MS,
    SCAN_TIMEOUT_MS, STATUS_POLL_INTERVAL_MS, STATUS_TIMEOUT_MS,
};
use crate::errors::{KioskError, Result};

/// Top-level kiosk configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KioskConfig {
    pub api: ApiConfig,
    pub polling: PollingConfig,
    pub logging: LoggingConfig,
}

impl KioskConfig {
    /// Reject values that would make a loop spin or never start.
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(KioskError::Config("api.base_url must not be empty".into()));
        }
        if self.polling.status_interval_ms == 0 {
            return Err(KioskError::Config("polling.status_interval_ms must be > 0".into()));
        }
        if self.polling.scan_interval_ms == 0 {
            return Err(KioskError::Config("polling.scan_interval_ms must be > 0".into()));
        }
        if self.polling.scan_max_attempts == 0 {
            return Err(KioskError::Config("polling.scan_max_attempts must be > 0".into()));
        }
        self.api.timeouts.validate()
    }
}

/// Remote service connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeouts: TimeoutConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_API_URL.to_string(), timeouts: TimeoutConfig::default() }
    }
}

/// Per-operation request timeouts in milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub health_ms: u64,
    pub status_ms: u64,
    pub scan_ms: u64,
    pub confirm_ms: u64,
    pub reject_ms: u64,
    pub reset_ms: u64,
    pub actuator_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            health_ms: HEALTH_TIMEOUT_MS,
            status_ms: STATUS_TIMEOUT_MS,
            scan_ms: SCAN_TIMEOUT_MS,
            confirm_ms: CONFIRM_TIMEOUT_MS,
            reject_ms: REJECT_TIMEOUT_MS,
            reset_ms: RESET_TIMEOUT_MS,
            actuator_ms: ACTUATOR_TIMEOUT_MS,
        }
    }
}

impl TimeoutConfig {
    fn validate(&self) -> Result<()> {
        let all = [
            ("health_ms", self.health_ms),
            ("status_ms", self.status_ms),
            ("scan_ms", self.scan_ms),
            ("confirm_ms", self.confirm_ms),
            ("reject_ms", self.reject_ms),
            ("reset_ms", self.reset_ms),
            ("actuator_ms", self.actuator_ms),
        ];
        match all.iter().find(|(_, value)| *value == 0) {
            Some((name, _)) => {
                Err(KioskError::Config(format!("api.timeouts.{name} must be > 0")))
            }
            None => Ok(()),
        }
    }

    pub fn health(&self) -> Duration {
        Duration::from_millis(self.health_ms)
    }

    pub fn status(&self) -> Duration {
        Duration::from_millis(self.status_ms)
    }

    pub fn scan(&self) -> Duration {
        Duration::from_millis(self.scan_ms)
    }

    pub fn confirm(&self) -> Duration {
        Duration::from_millis(self.confirm_ms)
    }

    pub fn reject(&self) -> Duration {
        Duration::from_millis(self.reject_ms)
    }

    pub fn reset(&self) -> Duration {
        Duration::from_millis(self.reset_ms)
    }

    pub fn actuator(&self) -> Duration {
        Duration::from_millis(self.actuator_ms)
    }
}

/// Polling cadence for the background poller and scan sessions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    pub status_interval_ms: u64,
    pub scan_interval_ms: u64,
    pub scan_max_attempts: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            status_interval_ms: STATUS_POLL_INTERVAL_MS,
            scan_interval_ms: SCAN_POLL_INTERVAL_MS,
            scan_max_attempts: SCAN_MAX_ATTEMPTS,
        }
    }
}

impl PollingConfig {
    pub fn status_interval(&self) -> Duration {
        Duration::from_millis(self.status_interval_ms)
    }

    pub fn scan_interval(&self) -> Duration {
        Duration::from_millis(self.scan_interval_ms)
    }
}

/// Log output format for the binary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
}
