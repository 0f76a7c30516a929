//! Kiosk context - owns the synchronization core for one kiosk session

use std::sync::Arc;

use rvm_core::{
    CommandEngine, HealthMonitor, KioskService, ScanOutcome, ScanSettings, StateStore,
};
use rvm_domain::{ActuatorReport, HealthStatus, KioskConfig, PublishedState, Result, SystemStatus};
use rvm_infra::{KioskClient, SchedulerError, StatusPoller, StatusPollerConfig};
use tokio::sync::{watch, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

/// Composition root for the kiosk
///
/// Construction probes the service, performs the first status fetch when it
/// is healthy and starts the background poller. Presentation code reads
/// [`PublishedState`] through [`KioskContext::snapshot`] or
/// [`KioskContext::subscribe`] and triggers commands through the async
/// methods.
pub struct KioskContext {
    pub config: KioskConfig,
    store: StateStore,
    health: HealthMonitor,
    engine: CommandEngine,
    poller: Mutex<StatusPoller>,
    cancel: CancellationToken,
}

impl KioskContext {
    /// Build a context talking HTTP to `config.api.base_url`.
    ///
    /// # Errors
    ///
    /// Returns `KioskError::Config` for an invalid configuration. An
    /// unreachable service is not an error; it is published as
    /// `connected = false`.
    pub async fn new(config: KioskConfig) -> Result<Self> {
        let client = KioskClient::new(&config.api)?;
        let endpoint = client.base_url().to_string();
        Self::with_service(config, Arc::new(client), endpoint).await
    }

    /// Build a context over any [`KioskService`] implementation.
    #[instrument(skip(config, service, endpoint))]
    pub async fn with_service(
        config: KioskConfig,
        service: Arc<dyn KioskService>,
        endpoint: impl Into<String>,
    ) -> Result<Self> {
        config.validate()?;

        let store = StateStore::new();
        let cancel = CancellationToken::new();

        let health = HealthMonitor::new(Arc::clone(&service), store.clone(), endpoint);
        let engine = CommandEngine::new(
            Arc::clone(&service),
            store.clone(),
            ScanSettings::from(&config.polling),
            cancel.child_token(),
        );

        let initial = health.initialize().await;
        info!(health = %initial, "Initial health check complete");

        // The poller runs whatever the probe said; its ticks are what
        // reconnect an unhealthy kiosk.
        let mut poller =
            StatusPoller::new(service, store.clone(), StatusPollerConfig::from(&config.polling));
        poller.start().await?;

        Ok(Self { config, store, health, engine, poller: Mutex::new(poller), cancel })
    }

    /// Current published state
    pub fn snapshot(&self) -> PublishedState {
        self.store.snapshot()
    }

    /// Receiver notified on every published change
    pub fn subscribe(&self) -> watch::Receiver<PublishedState> {
        self.store.subscribe()
    }

    pub async fn scan(&self) -> Result<ScanOutcome> {
        self.engine.scan().await
    }

    pub async fn confirm(&self) -> Result<SystemStatus> {
        self.engine.confirm().await
    }

    pub async fn reject_invalid_item(&self) -> Result<SystemStatus> {
        self.engine.reject_invalid_item().await
    }

    pub async fn reset(&self) -> Result<SystemStatus> {
        self.engine.reset().await
    }

    pub async fn trigger_actuator(&self) -> Result<ActuatorReport> {
        self.engine.trigger_actuator().await
    }

    /// Re-probe the service health endpoint
    pub async fn check_health(&self) -> HealthStatus {
        self.health.probe().await;
        self.store.snapshot().health
    }

    /// Whether the background poller is still running
    pub async fn is_polling(&self) -> bool {
        self.poller.lock().await.is_running()
    }

    /// Stop the poller and end any active scan session.
    ///
    /// Safe to call more than once.
    ///
    /// # Errors
    ///
    /// Returns `KioskError::Internal` if the poller does not exit within its
    /// join timeout.
    #[instrument(skip(self))]
    pub async fn shutdown(&self) -> Result<()> {
        info!("Shutting down kiosk context");
        self.cancel.cancel();

        match self.poller.lock().await.stop().await {
            Ok(()) | Err(SchedulerError::NotRunning) => Ok(()),
            Err(err) => {
                warn!(error = %err, "Status poller did not stop cleanly");
                Err(err.into())
            }
        }
    }
}

impl Drop for KioskContext {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
