//! Diagnostic actuator trigger report

use serde::{Deserialize, Serialize};

/// Hardware state reported alongside an actuator trigger
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActuatorHardwareStatus {
    pub connected: bool,
    pub trapdoor_open: bool,
    pub coupon_printed: bool,
}

/// Response of `POST /api/trigger-arduino`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActuatorReport {
    pub success: bool,
    pub message: String,
    pub trapdoor_triggered: bool,
    pub coupon_triggered: bool,
    pub arduino_status: ActuatorHardwareStatus,
    /// Service-side timestamp, kept verbatim.
    pub timestamp: String,
}
