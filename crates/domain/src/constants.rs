//! Kiosk constants
//!
//! Centralized defaults for the remote service contract and the polling
//! cadence.

// Remote service
pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const API_URL_ENV: &str = "RVM_API_URL";

// Per-operation request timeouts
pub const HEALTH_TIMEOUT_MS: u64 = 3_000;
pub const STATUS_TIMEOUT_MS: u64 = 5_000;
pub const SCAN_TIMEOUT_MS: u64 = 10_000; // scan start may block on camera warm-up
pub const CONFIRM_TIMEOUT_MS: u64 = 5_000;
pub const REJECT_TIMEOUT_MS: u64 = 5_000;
pub const RESET_TIMEOUT_MS: u64 = 5_000;
pub const ACTUATOR_TIMEOUT_MS: u64 = 5_000;

// Background status poller
pub const STATUS_POLL_INTERVAL_MS: u64 = 2_000;

// Scan poll session
pub const SCAN_POLL_INTERVAL_MS: u64 = 500;
pub const SCAN_MAX_ATTEMPTS: u32 = 20;

// Remote paths
pub const PATH_HEALTH: &str = "/api/health";
pub const PATH_STATUS: &str = "/api/status";
pub const PATH_SCAN: &str = "/api/scan";
pub const PATH_CONFIRM: &str = "/api/confirm";
pub const PATH_INVALID_ITEM_REMOVED: &str = "/api/invalid-item-removed";
pub const PATH_RESET: &str = "/api/reset";
pub const PATH_TRIGGER_ACTUATOR: &str = "/api/trigger-arduino";
