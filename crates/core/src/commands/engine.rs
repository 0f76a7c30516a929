//! Command/reconciliation engine
//!
//! Executes the kiosk's user-triggered commands against the remote service
//! and folds their effects into the published state:
//!
//! - `scan` starts a bounded [`PollSession`] after the service accepts the
//!   scan, writing every polled status to the store
//! - `confirm`, `reject_invalid_item` and `reset` are single-shot and
//!   followed by one status refresh
//! - `trigger_actuator` is a diagnostic single-shot without refresh
//!
//! No command is retried. Each one raises `loading` through an
//! [`crate::state::OperationGuard`] for exactly as long as it runs.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rvm_domain::{ActuatorReport, KioskError, PollingConfig, Result, SystemStatus};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, instrument, warn, Instrument};

use crate::ports::KioskService;
use crate::refresh::refresh_status;
use crate::scan::{PollSession, ScanOutcome, SessionOutcome, SessionPhase};
use crate::state::StateStore;

/// Cadence and cap of scan poll sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanSettings {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self::from(&PollingConfig::default())
    }
}

impl From<&PollingConfig> for ScanSettings {
    fn from(config: &PollingConfig) -> Self {
        Self { interval: config.scan_interval(), max_attempts: config.scan_max_attempts }
    }
}

/// Executes commands and owns the scan poll session slot
pub struct CommandEngine {
    service: Arc<dyn KioskService>,
    store: StateStore,
    settings: ScanSettings,
    scan_active: AtomicBool,
    cancel: CancellationToken,
}

impl CommandEngine {
    /// Create an engine.
    ///
    /// Cancelling `cancel` ends any active poll session; it is normally a
    /// child of the owning context's token.
    pub fn new(
        service: Arc<dyn KioskService>,
        store: StateStore,
        settings: ScanSettings,
        cancel: CancellationToken,
    ) -> Self {
        Self { service, store, settings, scan_active: AtomicBool::new(false), cancel }
    }

    /// Whether a scan poll session currently holds the slot
    pub fn is_scanning(&self) -> bool {
        self.scan_active.load(Ordering::SeqCst)
    }

    /// Start a scan and wait for the detector's answer.
    ///
    /// Returns `Err` when the scan could not be started (nothing is polled
    /// in that case) or when another scan is still polling. Once the service
    /// accepted the scan the poll session always ends in an `Ok`
    /// [`ScanOutcome`].
    #[instrument(skip(self))]
    pub async fn scan(&self) -> Result<ScanOutcome> {
        let Some(_slot) = ScanSlot::claim(&self.scan_active) else {
            warn!("Scan requested while a poll session is active");
            return Err(KioskError::ScanInProgress);
        };
        let _loading = self.store.begin_operation();

        match self.service.start_scan().await {
            Ok(ack) => {
                info!(state = %ack.state, "Scan accepted by service");
                self.store.record_command_success();
                let session = PollSession::new(self.settings.max_attempts, self.settings.interval);
                let span = info_span!("poll_session", session_id = %session.id());
                Ok(self.run_session(session, ack).instrument(span).await)
            }
            Err(err) => {
                warn!(error = %err, kind = err.label(), "Scan could not be started");
                self.store.record_command_failure(&err);
                Err(err)
            }
        }
    }

    /// Poll until the session resolves.
    ///
    /// Slow fetches delay later ticks, so the attempt cap alone does not
    /// bound the session; the deadline does. A fetch still in flight when
    /// the deadline passes is dropped.
    async fn run_session(&self, mut session: PollSession, ack: SystemStatus) -> ScanOutcome {
        let mut last = ack;
        let interval = session.interval();
        let started = Instant::now();
        let mut ticker = tokio::time::interval_at(started + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let deadline = tokio::time::sleep_until(started + session.deadline());
        tokio::pin!(deadline);

        loop {
            let result = tokio::select! {
                biased;
                () = self.cancel.cancelled() => {
                    session.cancel();
                    info!(attempts = session.attempt_count(), "Poll session cancelled");
                    return ScanOutcome::Cancelled;
                }
                result = async {
                    ticker.tick().await;
                    self.service.get_status().await
                } => result,
                () = &mut deadline => {
                    session.expire();
                    let attempts = session.attempt_count();
                    warn!(
                        attempts,
                        budget_ms = session.deadline().as_millis() as u64,
                        "Poll session deadline passed"
                    );
                    return ScanOutcome::BoundExceeded { attempts, last };
                }
            };

            match &result {
                Ok(status) => {
                    debug!(attempt = session.attempt_count() + 1, state = %status.state, "Polled status");
                    self.store.apply_status(status.clone());
                    last = status.clone();
                }
                Err(err) => {
                    warn!(attempt = session.attempt_count() + 1, error = %err, "Poll failed, ending session");
                    self.store.record_command_failure(err);
                }
            }

            let SessionPhase::Resolved(outcome) = session.observe(&result).clone() else {
                continue;
            };
            let attempts = session.attempt_count();
            info!(attempts, outcome = ?outcome, "Poll session finished");

            return match (outcome, result) {
                (SessionOutcome::ResolvedByStatus(_), _) => ScanOutcome::Completed(last),
                (SessionOutcome::ResolvedByCap, _) => ScanOutcome::BoundExceeded { attempts, last },
                (_, Err(err)) => ScanOutcome::Aborted(err),
                (SessionOutcome::ResolvedByError(message), Ok(_)) => {
                    ScanOutcome::Aborted(KioskError::Internal(message))
                }
                (SessionOutcome::Cancelled, Ok(_)) => ScanOutcome::Cancelled,
            };
        }
    }

    /// Confirm a valid item, then refresh status once
    #[instrument(skip(self))]
    pub async fn confirm(&self) -> Result<SystemStatus> {
        self.single_shot("confirm", self.service.confirm()).await
    }

    /// Report the invalid item as removed, then refresh status once
    #[instrument(skip(self))]
    pub async fn reject_invalid_item(&self) -> Result<SystemStatus> {
        self.single_shot("reject_invalid_item", self.service.reject_invalid_item()).await
    }

    /// Emergency reset, then refresh status once
    #[instrument(skip(self))]
    pub async fn reset(&self) -> Result<SystemStatus> {
        self.single_shot("reset", self.service.reset()).await
    }

    /// Fire the actuator board directly (diagnostics only)
    #[instrument(skip(self))]
    pub async fn trigger_actuator(&self) -> Result<ActuatorReport> {
        let _loading = self.store.begin_operation();
        match self.service.trigger_actuator().await {
            Ok(report) => {
                info!(
                    success = report.success,
                    trapdoor_triggered = report.trapdoor_triggered,
                    coupon_triggered = report.coupon_triggered,
                    "Actuator triggered"
                );
                self.store.record_command_success();
                Ok(report)
            }
            Err(err) => {
                warn!(error = %err, kind = err.label(), "Actuator trigger failed");
                self.store.record_command_failure(&err);
                Err(err)
            }
        }
    }

    async fn single_shot<F>(&self, command: &'static str, call: F) -> Result<SystemStatus>
    where
        F: Future<Output = Result<SystemStatus>>,
    {
        let _loading = self.store.begin_operation();
        match call.await {
            Ok(ack) => {
                info!(command, state = %ack.state, "Command acknowledged");
                self.store.record_command_success();
                if let Err(err) = refresh_status(self.service.as_ref(), &self.store).await {
                    warn!(command, error = %err, "Status refresh after command failed");
                }
                Ok(ack)
            }
            Err(err) => {
                warn!(command, error = %err, kind = err.label(), "Command failed");
                self.store.record_command_failure(&err);
                Err(err)
            }
        }
    }
}

/// Exclusive claim on the single poll session slot
struct ScanSlot<'a> {
    flag: &'a AtomicBool,
}

impl<'a> ScanSlot<'a> {
    fn claim(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for ScanSlot<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}
