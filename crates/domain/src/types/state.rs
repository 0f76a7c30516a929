//! Published state aggregate observed by kiosk consumers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::status::SystemStatus;
use crate::impl_domain_status_conversions;

/// Reachability classification of the remote service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    /// No remote call has completed yet
    #[default]
    Unknown,

    /// Remote service is reachable
    Healthy,

    /// Remote service is unreachable
    Unhealthy,
}

impl_domain_status_conversions!(HealthStatus {
    Unknown => "unknown",
    Healthy => "healthy",
    Unhealthy => "unhealthy",
});

/// Connection view derived from the most recent remote call
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConnectionHealth {
    pub connected: bool,
    pub last_error: Option<String>,
}

/// The single externally observable snapshot.
///
/// Mutated in place by the synchronization core; no history is kept.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PublishedState {
    pub status: SystemStatus,
    /// True while a scan poll session is active or a command is outstanding.
    pub loading: bool,
    pub connected: bool,
    pub connection_error: Option<String>,
    /// Error text of the last failed command, cleared by the next success.
    pub last_command_error: Option<String>,
    pub health: HealthStatus,
    /// Completion time of the last successful status write.
    pub last_synced: Option<DateTime<Utc>>,
}

impl PublishedState {
    /// Reachability part of the snapshot
    pub fn connection(&self) -> ConnectionHealth {
        ConnectionHealth { connected: self.connected, last_error: self.connection_error.clone() }
    }
}
