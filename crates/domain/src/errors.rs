//! Error types used throughout the kiosk

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the kiosk synchronization core
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "details")]
pub enum KioskError {
    /// The remote service could not be reached (timeout, refused, DNS).
    #[error("Connectivity error: {0}")]
    Connectivity(String),

    /// The remote service answered with a non-success status.
    #[error("Remote error: {code} - {body}")]
    Remote { code: u16, body: String },

    /// The remote service answered successfully but the body did not decode.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// A scan poll session is already active.
    #[error("A scan is already in progress")]
    ScanInProgress,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl KioskError {
    /// True when the failure means the service is unreachable, as opposed to
    /// reachable but erroring.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Connectivity(_))
    }

    /// True when the service answered, whatever it answered.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. } | Self::InvalidResponse(_))
    }

    /// Stable label suitable for structured log fields.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Connectivity(_) => "connectivity",
            Self::Remote { .. } => "remote",
            Self::InvalidResponse(_) => "invalid_response",
            Self::ScanInProgress => "scan_in_progress",
            Self::Config(_) => "config",
            Self::Internal(_) => "internal",
        }
    }
}

/// Result type alias for kiosk operations
pub type Result<T> = std::result::Result<T, KioskError>;
