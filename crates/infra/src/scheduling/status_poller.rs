//! Background status poller
//!
//! Fetches `/api/status` on a fixed cadence for as long as the kiosk runs and
//! publishes every outcome to the [`StateStore`]. Failures are recorded and
//! the loop keeps going, so the kiosk reconnects on its own once the service
//! is back.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use rvm_core::StateStore;
//! use rvm_domain::ApiConfig;
//! use rvm_infra::remote::KioskClient;
//! use rvm_infra::scheduling::{StatusPoller, StatusPollerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Arc::new(KioskClient::new(&ApiConfig::default())?);
//! let store = StateStore::new();
//! let mut poller = StatusPoller::new(client, store, StatusPollerConfig::default());
//!
//! poller.start().await?;
//! // ... kiosk runs ...
//! poller.stop().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use rvm_core::{refresh_status, KioskService, StateStore};
use rvm_domain::PollingConfig;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::scheduling::error::{SchedulerError, SchedulerResult};

/// Type alias for task handle to avoid complexity warnings
type TaskHandle = Arc<Mutex<Option<JoinHandle<()>>>>;

/// Configuration for the status poller
#[derive(Debug, Clone)]
pub struct StatusPollerConfig {
    /// Time between two status fetches; the first fetch happens one
    /// interval after start
    pub interval: Duration,
    /// How long `stop` waits for the loop to exit
    pub join_timeout: Duration,
}

impl Default for StatusPollerConfig {
    fn default() -> Self {
        Self::from(&PollingConfig::default())
    }
}

impl From<&PollingConfig> for StatusPollerConfig {
    fn from(config: &PollingConfig) -> Self {
        Self { interval: config.status_interval(), join_timeout: Duration::from_secs(5) }
    }
}

/// Fixed-cadence status poller
pub struct StatusPoller {
    service: Arc<dyn KioskService>,
    store: StateStore,
    config: StatusPollerConfig,
    cancellation_token: CancellationToken,
    task_handle: TaskHandle,
}

impl StatusPoller {
    pub fn new(
        service: Arc<dyn KioskService>,
        store: StateStore,
        config: StatusPollerConfig,
    ) -> Self {
        Self {
            service,
            store,
            config,
            cancellation_token: CancellationToken::new(),
            task_handle: Arc::new(Mutex::new(None)),
        }
    }

    /// Start the poller
    ///
    /// # Errors
    ///
    /// Returns error if the poller is already running
    #[instrument(skip(self), fields(interval_ms = self.config.interval.as_millis() as u64))]
    pub async fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        info!("Starting status poller");

        // Fresh token so the poller can be restarted after stop
        self.cancellation_token = CancellationToken::new();

        let service = Arc::clone(&self.service);
        let store = self.store.clone();
        let interval = self.config.interval;
        let cancel = self.cancellation_token.clone();

        let handle = tokio::spawn(async move {
            Self::poll_loop(service, store, interval, cancel).await;
        });

        *self.task_handle.lock().await = Some(handle);

        info!("Status poller started");
        Ok(())
    }

    /// Stop the poller and wait for the loop to exit
    ///
    /// # Errors
    ///
    /// Returns error if the poller is not running, or the loop does not exit
    /// within the join timeout
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        if !self.is_running() {
            return Err(SchedulerError::NotRunning);
        }

        info!("Stopping status poller");

        self.cancellation_token.cancel();

        if let Some(handle) = self.task_handle.lock().await.take() {
            let join_timeout = self.config.join_timeout;
            tokio::time::timeout(join_timeout, handle)
                .await
                .map_err(|source| SchedulerError::Timeout { duration: join_timeout, source })??;
        }

        info!("Status poller stopped");
        Ok(())
    }

    /// Check if the poller is running
    ///
    /// The poller is running while it holds a task handle that hasn't
    /// finished.
    pub fn is_running(&self) -> bool {
        self.task_handle
            .try_lock()
            .ok()
            .and_then(|guard| guard.as_ref().map(|h| !h.is_finished()))
            .unwrap_or(false)
    }

    async fn poll_loop(
        service: Arc<dyn KioskService>,
        store: StateStore,
        interval: Duration,
        cancel: CancellationToken,
    ) {
        let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    debug!("Status poll loop cancelled");
                    break;
                }
                _ = ticker.tick() => {
                    tokio::select! {
                        () = cancel.cancelled() => {
                            debug!("Status poll loop cancelled mid-fetch");
                            break;
                        }
                        result = refresh_status(service.as_ref(), &store) => {
                            match result {
                                Ok(status) => debug!(state = %status.state, "Status poll tick"),
                                Err(err) => warn!(error = %err, kind = err.label(), "Status poll failed"),
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Ensure the loop is stopped when the poller is dropped
impl Drop for StatusPoller {
    fn drop(&mut self) {
        if !self.cancellation_token.is_cancelled() {
            warn!("StatusPoller dropped while running; cancelling");
            self.cancellation_token.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;

    use async_trait::async_trait;
    use rvm_domain::{ActuatorReport, KioskError, Result, ScanState, SystemStatus};

    use super::*;

    /// Replays status results in order; the last one repeats.
    struct SequenceService {
        results: StdMutex<VecDeque<Result<SystemStatus>>>,
        calls: AtomicUsize,
    }

    impl SequenceService {
        fn new(results: Vec<Result<SystemStatus>>) -> Arc<Self> {
            Arc::new(Self { results: StdMutex::new(results.into()), calls: AtomicUsize::new(0) })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl KioskService for SequenceService {
        async fn get_status(&self) -> Result<SystemStatus> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut results = self.results.lock().unwrap();
            if results.len() > 1 {
                results.pop_front().unwrap()
            } else {
                results.front().cloned().unwrap()
            }
        }

        async fn start_scan(&self) -> Result<SystemStatus> {
            Err(KioskError::Internal("unused".into()))
        }

        async fn confirm(&self) -> Result<SystemStatus> {
            Err(KioskError::Internal("unused".into()))
        }

        async fn reject_invalid_item(&self) -> Result<SystemStatus> {
            Err(KioskError::Internal("unused".into()))
        }

        async fn reset(&self) -> Result<SystemStatus> {
            Err(KioskError::Internal("unused".into()))
        }

        async fn probe_health(&self) -> bool {
            true
        }

        async fn trigger_actuator(&self) -> Result<ActuatorReport> {
            Err(KioskError::Internal("unused".into()))
        }
    }

    const INTERVAL: Duration = Duration::from_secs(2);

    fn config() -> StatusPollerConfig {
        StatusPollerConfig { interval: INTERVAL, join_timeout: Duration::from_secs(5) }
    }

    fn idle() -> Result<SystemStatus> {
        Ok(SystemStatus::with_state(ScanState::Idle))
    }

    async fn advance(by: Duration) {
        tokio::time::sleep(by).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_poller_lifecycle() {
        let service = SequenceService::new(vec![idle()]);
        let mut poller = StatusPoller::new(service, StateStore::new(), config());

        assert!(!poller.is_running());

        poller.start().await.unwrap();
        assert!(poller.is_running());

        poller.stop().await.unwrap();
        assert!(!poller.is_running());

        // Restart after stop is allowed
        poller.start().await.unwrap();
        poller.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_start_fails() {
        let service = SequenceService::new(vec![idle()]);
        let mut poller = StatusPoller::new(service, StateStore::new(), config());

        poller.start().await.unwrap();
        assert!(matches!(poller.start().await, Err(SchedulerError::AlreadyRunning)));

        poller.stop().await.unwrap();
        assert!(matches!(poller.stop().await, Err(SchedulerError::NotRunning)));
    }

    #[tokio::test(start_paused = true)]
    async fn first_fetch_waits_one_interval() {
        let service = SequenceService::new(vec![idle()]);
        let mut poller = StatusPoller::new(service.clone(), StateStore::new(), config());

        poller.start().await.unwrap();
        advance(INTERVAL - Duration::from_millis(100)).await;
        assert_eq!(service.calls(), 0);

        advance(Duration::from_millis(200)).await;
        assert_eq!(service.calls(), 1);

        poller.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn failed_tick_then_recovery() {
        let service = SequenceService::new(vec![
            Err(KioskError::Connectivity("connection refused".into())),
            Ok(SystemStatus::with_state(ScanState::Idle)),
        ]);
        let store = StateStore::new();
        let mut poller = StatusPoller::new(service, store.clone(), config());

        poller.start().await.unwrap();

        advance(INTERVAL + Duration::from_millis(10)).await;
        let state = store.snapshot();
        assert!(!state.connected);
        assert!(!state.connection_error.unwrap_or_default().is_empty());

        advance(INTERVAL).await;
        let state = store.snapshot();
        assert!(state.connected);
        assert!(state.connection_error.is_none());
        assert!(state.last_synced.is_some());

        poller.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn keeps_polling_through_failures() {
        let service =
            SequenceService::new(vec![Err(KioskError::Connectivity("timed out".into()))]);
        let store = StateStore::new();
        let mut poller = StatusPoller::new(service.clone(), store.clone(), config());

        poller.start().await.unwrap();
        advance(INTERVAL * 5 + Duration::from_millis(10)).await;

        assert_eq!(service.calls(), 5);
        assert!(poller.is_running());
        assert!(!store.snapshot().connected);

        poller.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn drop_cancels_loop() {
        let service = SequenceService::new(vec![idle()]);
        let mut poller = StatusPoller::new(service.clone(), StateStore::new(), config());

        poller.start().await.unwrap();
        advance(INTERVAL + Duration::from_millis(10)).await;
        assert_eq!(service.calls(), 1);

        drop(poller);
        advance(INTERVAL * 3).await;

        assert_eq!(service.calls(), 1);
    }
}
