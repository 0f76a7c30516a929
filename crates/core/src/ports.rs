//! Port interface for the remote detection/control service

use async_trait::async_trait;
use rvm_domain::{ActuatorReport, Result, SystemStatus};

/// One method per remote capability.
///
/// Implementations apply their own per-operation timeout and report
/// unreachable-service failures as [`rvm_domain::KioskError::Connectivity`],
/// keeping [`rvm_domain::KioskError::Remote`] for answers with a non-success
/// status. Implementations must not retry: commands can drive physical
/// actuators.
#[async_trait]
pub trait KioskService: Send + Sync {
    /// Fetch the authoritative status
    async fn get_status(&self) -> Result<SystemStatus>;

    /// Ask the service to start scanning the deposited item
    async fn start_scan(&self) -> Result<SystemStatus>;

    /// Acknowledge a valid item; the service releases the trapdoor and
    /// issues a receipt
    async fn confirm(&self) -> Result<SystemStatus>;

    /// Report that an invalid item was taken back by the user
    async fn reject_invalid_item(&self) -> Result<SystemStatus>;

    /// Emergency reset back to idle
    async fn reset(&self) -> Result<SystemStatus>;

    /// Reachability probe; never fails, true only on a success response
    async fn probe_health(&self) -> bool;

    /// Diagnostic trigger of the actuator board
    async fn trigger_actuator(&self) -> Result<ActuatorReport>;
}
