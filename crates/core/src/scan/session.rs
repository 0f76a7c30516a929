//! Poll session state machine
//!
//! A scan is acknowledged by the service long before the detector has an
//! answer, so the engine polls status until the state leaves `scanning`.
//! The session bounds that wait:
//!
//! ```text
//! Polling ──status != scanning──▶ ResolvedByStatus
//!    │ ────attempts == max──────▶ ResolvedByCap
//!    │ ────deadline passed──────▶ ResolvedByCap
//!    │ ────fetch failed─────────▶ ResolvedByError
//!    └─────owner teardown───────▶ Cancelled
//! ```
//!
//! The machine is pure; the timer lives in
//! [`crate::commands::CommandEngine`].

use std::time::Duration;

use rvm_domain::{KioskError, ScanState, SystemStatus};
use uuid::Uuid;

/// How a session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The service reported a terminal state
    ResolvedByStatus(ScanState),
    /// Attempt cap reached while still scanning
    ResolvedByCap,
    /// A status fetch failed; the session stops at once
    ResolvedByError(String),
    /// The owner tore the session down
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    Polling,
    Resolved(SessionOutcome),
}

/// Result of [`crate::commands::CommandEngine::scan`] once the scan was
/// accepted by the service
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    /// The service reached a terminal state
    Completed(SystemStatus),
    /// Gave up after `attempts` polls; `last` is the final known status and
    /// should be treated as stuck, not as success
    BoundExceeded { attempts: u32, last: SystemStatus },
    /// A poll failed mid-session
    Aborted(KioskError),
    /// Torn down by the owner
    Cancelled,
}

impl ScanOutcome {
    /// Final status known to the session, if any
    pub fn last_status(&self) -> Option<&SystemStatus> {
        match self {
            Self::Completed(status) | Self::BoundExceeded { last: status, .. } => Some(status),
            Self::Aborted(_) | Self::Cancelled => None,
        }
    }
}

/// Ephemeral bounded poll loop state
#[derive(Debug, Clone)]
pub struct PollSession {
    id: Uuid,
    attempt_count: u32,
    max_attempts: u32,
    interval: Duration,
    phase: SessionPhase,
}

impl PollSession {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            id: Uuid::now_v7(),
            attempt_count: 0,
            max_attempts: max_attempts.max(1),
            interval,
            phase: SessionPhase::Polling,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn attempt_count(&self) -> u32 {
        self.attempt_count
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wall-clock budget of the session.
    ///
    /// The last tick fires after `max_attempts` intervals; its fetch gets one
    /// more interval to land.
    pub fn deadline(&self) -> Duration {
        self.interval.saturating_mul(self.max_attempts.saturating_add(1))
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == SessionPhase::Polling
    }

    /// Feed the outcome of one status fetch.
    ///
    /// Counts the attempt and resolves the session when a stop condition
    /// holds. A resolved session ignores further input.
    pub fn observe(&mut self, result: &Result<SystemStatus, KioskError>) -> &SessionPhase {
        if !self.is_active() {
            return &self.phase;
        }
        self.attempt_count += 1;

        self.phase = match result {
            Ok(status) if status.state.is_terminal() => {
                SessionPhase::Resolved(SessionOutcome::ResolvedByStatus(status.state))
            }
            Ok(_) if self.attempt_count >= self.max_attempts => {
                SessionPhase::Resolved(SessionOutcome::ResolvedByCap)
            }
            Ok(_) => SessionPhase::Polling,
            Err(err) => SessionPhase::Resolved(SessionOutcome::ResolvedByError(err.to_string())),
        };
        &self.phase
    }

    /// Resolve by cap once the deadline passed, however many fetches
    /// completed
    pub fn expire(&mut self) {
        if self.is_active() {
            self.phase = SessionPhase::Resolved(SessionOutcome::ResolvedByCap);
        }
    }

    /// Resolve as cancelled unless already resolved
    pub fn cancel(&mut self) {
        if self.is_active() {
            self.phase = SessionPhase::Resolved(SessionOutcome::Cancelled);
        }
    }
}
