//! Remote system status as reported by the detection service

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnNull};

use crate::impl_domain_status_conversions;

/// Machine state reported by the remote service.
///
/// Every state other than [`ScanState::Scanning`] is terminal from the point
/// of view of a scan poll session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanState {
    #[default]
    Idle,
    Scanning,
    ValidItem,
    InvalidItem,
    /// Receipt is being issued after a confirmed drop.
    Printing,
}

impl ScanState {
    /// Whether a scan poll session may stop on this state.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Scanning)
    }
}

impl_domain_status_conversions!(ScanState {
    Idle => "idle",
    Scanning => "scanning",
    ValidItem => "valid_item",
    InvalidItem => "invalid_item",
    Printing => "printing",
});

/// Authoritative status snapshot produced by the remote service.
///
/// Decoding also accepts the acknowledgement bodies of `/api/scan` and
/// `/api/confirm`, which add `success` and `message` fields and may send
/// `confidence: null`.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SystemStatus {
    pub state: ScanState,
    #[serde(default)]
    pub item_detected: Option<String>,
    /// Detector confidence in `[0, 1]`.
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SystemStatus {
    /// Status with the given state and nothing detected.
    pub fn with_state(state: ScanState) -> Self {
        Self { state, ..Self::default() }
    }

    pub fn is_scanning(&self) -> bool {
        self.state == ScanState::Scanning
    }
}
